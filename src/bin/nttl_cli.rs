//!
//! nttl CLI binary
//! ----------------
//! Interactive moderation console for a No Time To Lie server. Resolves the
//! stored session on startup, then offers login and the pending-suggestion
//! queue commands over a prompt loop.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;

use nttl_client::api::{HttpApi, SuggestionFilter, SuggestionStatus};
use nttl_client::cli::{print_identity, print_suggestions};
use nttl_client::config::ClientConfig;
use nttl_client::error::AppError;
use nttl_client::identity::{
    FileTokenStore, RegisterRequest, SessionManager, PERM_REVIEW_SUGGESTIONS,
};
use nttl_client::review::{ModerationQueue, MoveDirection};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--connect <url>] [--user <u> --password <p>] [--token-file <path>]\n\nFlags:\n  --connect <url>          Base URL of the API server (default: $NTTL_API_URL or http://127.0.0.1:8000)\n  --user <u>               Username for auto-login on startup\n  --password <p>           Password for auto-login on startup\n  --token-file <path>      Where the bearer token is persisted (default: $NTTL_TOKEN_FILE or .nttl_token)\n  -h, --help               Show this help\n\nInteractive commands:\n  login <user> <password>            sign in and persist the token\n  register <user> <email> <password> create an account and sign in\n  logout                             discard the stored token\n  whoami                             show the resolved identity and grants\n  can <permission>                   query the grant table for the current role\n  list [pending|approved|rejected]   fetch the suggestion queue (default pending)\n  reload                             refetch with the last filter\n  approve <id>                       approve a pending suggestion\n  reject <id>                        reject a pending suggestion\n  move <id> up|down                  reorder the local queue\n  status                             show connection and session state\n  help                               show this help\n  quit | exit                        leave the console"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("nttl moderation console");
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut config = ClientConfig::from_env();
    let mut user: Option<String> = None;
    let mut password: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--connect" => {
                if i + 1 >= args.len() {
                    eprintln!("--connect requires a URL");
                    print_usage(&program);
                    std::process::exit(2);
                }
                config.api_url = args[i + 1].clone();
                i += 2;
            }
            "--user" => {
                if i + 1 >= args.len() {
                    eprintln!("--user requires a value");
                    print_usage(&program);
                    std::process::exit(2);
                }
                user = Some(args[i + 1].clone());
                i += 2;
            }
            "--password" => {
                if i + 1 >= args.len() {
                    eprintln!("--password requires a value");
                    print_usage(&program);
                    std::process::exit(2);
                }
                password = Some(args[i + 1].clone());
                i += 2;
            }
            "--token-file" => {
                if i + 1 >= args.len() {
                    eprintln!("--token-file requires a value");
                    print_usage(&program);
                    std::process::exit(2);
                }
                config.token_file = args[i + 1].clone().into();
                i += 2;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let store = Arc::new(FileTokenStore::new(&config.token_file));
    let api = Arc::new(HttpApi::new(&config.api_url, store.clone())?);
    let session = SessionManager::new(store, api.clone());
    let queue = ModerationQueue::new(api.clone());

    // Pick up a session persisted by an earlier run; a stale token silently
    // drops to anonymous.
    session.resolve().await;
    match session.current_identity() {
        Some(identity) => println!("signed in as {} ({})", identity.username, identity.role),
        None => println!("not signed in"),
    }

    if let (Some(u), Some(p)) = (user, password) {
        match session.login(&u, &p).await {
            Ok(identity) => println!("signed in as {} ({})", identity.username, identity.role),
            Err(e) => eprintln!("login failed: {}", e),
        }
    }

    let mut filter = SuggestionFilter::pending();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("server: {}. Type 'help' for commands.", api.base());
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            // EOF
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => print_usage(&program),
            "login" => {
                if parts.len() < 3 {
                    eprintln!("usage: login <user> <password>");
                    continue;
                }
                match session.login(parts[1], parts[2]).await {
                    Ok(identity) => {
                        println!("signed in as {} ({})", identity.username, identity.role)
                    }
                    Err(e) => eprintln!("login failed: {}", e),
                }
            }
            "register" => {
                if parts.len() < 4 {
                    eprintln!("usage: register <user> <email> <password>");
                    continue;
                }
                let fields = RegisterRequest {
                    username: parts[1].to_string(),
                    email: parts[2].to_string(),
                    password: parts[3].to_string(),
                    full_name: None,
                };
                match session.register(&fields).await {
                    Ok(identity) => {
                        println!("registered and signed in as {}", identity.username)
                    }
                    Err(e) => eprintln!("register failed: {}", e),
                }
            }
            "logout" => {
                session.logout();
                println!("signed out");
            }
            "whoami" => match session.current_identity() {
                Some(identity) => print_identity(&identity),
                None => println!("not signed in"),
            },
            "can" => {
                if parts.len() < 2 {
                    eprintln!("usage: can <permission>");
                    continue;
                }
                println!("{}", session.has_permission(parts[1]));
            }
            "list" | "reload" => {
                if parts[0].eq_ignore_ascii_case("list") && parts.len() > 1 {
                    let status = match parts[1].to_ascii_lowercase().as_str() {
                        "pending" => SuggestionStatus::Pending,
                        "approved" => SuggestionStatus::Approved,
                        "rejected" => SuggestionStatus::Rejected,
                        other => {
                            eprintln!("unknown status '{}'", other);
                            continue;
                        }
                    };
                    filter = SuggestionFilter { status: Some(status), ..SuggestionFilter::default() };
                }
                if !session.has_permission(PERM_REVIEW_SUGGESTIONS) {
                    eprintln!("current role lacks '{}'", PERM_REVIEW_SUGGESTIONS);
                    continue;
                }
                match queue.load(&filter).await {
                    Ok(n) => {
                        println!("{} suggestion(s)", n);
                        print_suggestions(&queue.snapshot(), &queue.in_flight_ids());
                    }
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            "approve" | "reject" => {
                if parts.len() < 2 {
                    eprintln!("usage: {} <id>", parts[0]);
                    continue;
                }
                if !session.has_permission(PERM_REVIEW_SUGGESTIONS) {
                    eprintln!("current role lacks '{}'", PERM_REVIEW_SUGGESTIONS);
                    continue;
                }
                let id = parts[1];
                let result = if parts[0].eq_ignore_ascii_case("approve") {
                    queue.approve(id).await
                } else {
                    queue.reject(id).await
                };
                match result {
                    Ok(Some(s)) => println!("{}: '{}' -> {}", parts[0], s.title, s.status.as_str()),
                    Ok(None) => println!("no pending suggestion with id '{}'", id),
                    Err(AppError::AlreadyInFlight { id }) => {
                        println!("an action for '{}' is still running", id)
                    }
                    Err(e) => eprintln!("error: {}{}", e, if e.is_retryable() { " (retry ok)" } else { "" }),
                }
            }
            "move" => {
                if parts.len() < 3 {
                    eprintln!("usage: move <id> up|down");
                    continue;
                }
                let direction = match parts[2].to_ascii_lowercase().as_str() {
                    "up" => MoveDirection::Up,
                    "down" => MoveDirection::Down,
                    other => {
                        eprintln!("unknown direction '{}'", other);
                        continue;
                    }
                };
                if queue.move_suggestion(parts[1], direction) {
                    print_suggestions(&queue.snapshot(), &queue.in_flight_ids());
                } else {
                    println!("no-op");
                }
            }
            "status" => {
                println!("server: {}", api.base());
                match session.current_identity() {
                    Some(identity) => {
                        println!("session: {} ({})", identity.username, identity.role)
                    }
                    None => println!("session: anonymous"),
                }
                if queue.is_loaded() {
                    println!("queue: {} item(s), {} in flight", queue.len(), queue.in_flight_ids().len());
                } else {
                    println!("queue: not loaded");
                }
            }
            unk => {
                eprintln!("unknown command '{}'; type 'help'", unk);
            }
        }
    }
    Ok(())
}
