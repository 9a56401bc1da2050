//! Session manager integration tests: token resolution, login/logout and the
//! permission/role queries, exercised against fake collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use nttl_client::error::{AppError, AppResult};
use nttl_client::identity::{
    AuthApi, Credentials, Identity, RegisterRequest, Role, SessionManager, SessionState,
    TokenStore, PERM_CREATE_BLOCKS, PERM_MODERATE_CONTENT, PERM_USE_AI_AGENTS, PERM_VIEW,
};

/// Token store that counts its mutations.
#[derive(Default)]
struct CountingStore {
    token: Mutex<Option<String>>,
    sets: AtomicUsize,
    clears: AtomicUsize,
}

impl CountingStore {
    fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())), ..Self::default() }
    }
}

impl TokenStore for CountingStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }
    fn set(&self, token: &str) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        *self.token.lock() = Some(token.to_string());
    }
    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.token.lock() = None;
    }
}

/// Auth API accepting exactly one token and one password.
struct FakeAuth {
    valid_token: String,
    password: String,
    identity: Identity,
    fetch_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

impl FakeAuth {
    fn new(identity: Identity) -> Self {
        Self {
            valid_token: "tok-valid".to_string(),
            password: "s3cr3t!".to_string(),
            identity,
            fetch_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn fetch_current_user(&self, token: &str) -> AppResult<Identity> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if token == self.valid_token {
            Ok(self.identity.clone())
        } else {
            Err(AppError::auth("unauthorized", "token rejected"))
        }
    }

    async fn login(&self, credentials: &Credentials) -> AppResult<String> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if credentials.username == self.identity.username && credentials.password == self.password {
            Ok(self.valid_token.clone())
        } else {
            Err(AppError::auth("unauthorized", "bad credentials"))
        }
    }

    async fn register(&self, _fields: &RegisterRequest) -> AppResult<String> {
        Ok(self.valid_token.clone())
    }
}

fn identity_with_role(role: Role) -> Identity {
    Identity {
        id: "u-1".to_string(),
        username: "mira".to_string(),
        email: "mira@example.org".to_string(),
        full_name: None,
        role,
        xp: 120,
        level: 2,
        is_active: true,
        is_verified: true,
        meta: None,
    }
}

fn manager(store: Arc<CountingStore>, auth: Arc<FakeAuth>) -> SessionManager {
    SessionManager::new(store, auth)
}

#[tokio::test]
async fn resolve_without_token_goes_anonymous_without_fetching() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Builder)));
    let session = manager(store.clone(), auth.clone());

    assert_eq!(session.state(), SessionState::Unresolved);
    session.resolve().await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(auth.fetch_calls.load(Ordering::SeqCst), 0, "no token, no fetch");
    Ok(())
}

#[tokio::test]
async fn resolve_with_valid_token_authenticates() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Builder)));
    let session = manager(store.clone(), auth.clone());

    session.resolve().await;
    assert!(session.state().is_authenticated());
    let identity = session.current_identity().expect("identity after resolve");
    assert_eq!(identity.username, "mira");
    assert!(session.has_role(Role::Builder));
    assert!(session.has_any_role(&[Role::Moderator, Role::Builder]));
    assert!(session.has_permission(PERM_CREATE_BLOCKS));
    assert!(!session.has_permission(PERM_MODERATE_CONTENT));
    assert_eq!(auth.fetch_calls.load(Ordering::SeqCst), 1, "exactly one fetch per resolve");
    Ok(())
}

#[tokio::test]
async fn resolve_with_rejected_token_discards_it_once() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-expired"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Builder)));
    let session = manager(store.clone(), auth.clone());

    session.resolve().await;
    assert_eq!(session.state(), SessionState::Anonymous, "rejected token demotes silently");
    assert_eq!(store.clears.load(Ordering::SeqCst), 1, "token discarded exactly once");
    assert_eq!(store.get(), None);
    assert_eq!(auth.fetch_calls.load(Ordering::SeqCst), 1, "no automatic retry");
    Ok(())
}

#[tokio::test]
async fn resolve_is_idempotent_in_outcome() -> Result<()> {
    // Valid token: repeated resolves converge on the same authenticated state
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Moderator)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;
    let first = session.state();
    session.resolve().await;
    assert_eq!(session.state(), first);

    // Rejected token: the second resolve finds no token and stays anonymous
    let store = Arc::new(CountingStore::with_token("tok-expired"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Moderator)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;
    session.resolve().await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(auth.fetch_calls.load(Ordering::SeqCst), 1, "discarded token is not re-sent");
    Ok(())
}

#[tokio::test]
async fn login_persists_token_and_authenticates() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Moderator)));
    let session = manager(store.clone(), auth.clone());

    let identity = session.login("mira", "s3cr3t!").await?;
    assert_eq!(identity.role, Role::Moderator);
    assert_eq!(store.get().as_deref(), Some("tok-valid"));
    assert!(session.state().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn failed_login_surfaces_auth_error_and_stores_nothing() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Moderator)));
    let session = manager(store.clone(), auth.clone());

    let err = session.login("mira", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }), "expected Auth error, got {:?}", err);
    assert_eq!(store.get(), None);
    assert_eq!(store.sets.load(Ordering::SeqCst), 0);
    assert!(!session.state().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn register_signs_the_new_account_in() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Builder)));
    let session = manager(store.clone(), auth.clone());

    let fields = RegisterRequest {
        username: "mira".to_string(),
        email: "mira@example.org".to_string(),
        password: "s3cr3t!".to_string(),
        full_name: Some("Mira K".to_string()),
    };
    let identity = session.register(&fields).await?;
    assert_eq!(identity.username, "mira");
    assert_eq!(store.get().as_deref(), Some("tok-valid"));
    assert!(session.state().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn logout_is_idempotent() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Admin)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;
    assert!(session.state().is_authenticated());

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(store.get(), None);

    // A second logout with no active session is a no-op beyond the discard
    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    Ok(())
}

#[tokio::test]
async fn queries_answer_false_whenever_no_identity_is_held() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Admin)));
    let session = manager(store.clone(), auth.clone());

    // Unresolved and anonymous alike
    for _ in 0..2 {
        assert!(!session.has_permission(PERM_VIEW));
        assert!(!session.has_permission("*"));
        assert!(!session.has_role(Role::Admin));
        assert!(!session.has_any_role(&[Role::Guest, Role::Admin]));
        session.resolve().await;
    }
    Ok(())
}

#[tokio::test]
async fn moderator_permission_scenario() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Moderator)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;

    assert!(session.has_permission(PERM_MODERATE_CONTENT));
    assert!(session.has_permission(PERM_USE_AI_AGENTS));
    assert!(!session.has_permission("manage_users"));
    Ok(())
}

#[tokio::test]
async fn admin_wildcard_covers_unknown_tokens() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Admin)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;

    assert!(session.has_permission(PERM_MODERATE_CONTENT));
    assert!(session.has_permission("manage_users"));
    assert!(session.has_permission("anything_at_all"));
    Ok(())
}

#[tokio::test]
async fn unrecognized_role_holds_no_permissions() -> Result<()> {
    let store = Arc::new(CountingStore::with_token("tok-valid"));
    let auth = Arc::new(FakeAuth::new(identity_with_role(Role::Unknown)));
    let session = manager(store.clone(), auth.clone());
    session.resolve().await;

    assert!(session.state().is_authenticated(), "unknown role still authenticates");
    assert!(!session.has_permission(PERM_VIEW));
    assert!(!session.has_permission("manage_users"));
    Ok(())
}
