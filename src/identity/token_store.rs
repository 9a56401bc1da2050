//! Token persistence behind a small synchronous trait so the session
//! manager can be wired to a real file in binaries and to fakes in tests.

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Process-lifetime store for ephemeral sessions and tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.lock() = None;
    }
}

/// File-backed store durable across runs. IO failures are logged and treated
/// as an absent token; losing a token only costs a re-login.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn set(&self, token: &str) {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                let _ = fs::create_dir_all(dir);
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            tracing::warn!("token_store.set failed for {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("token_store.clear failed for {}: {}", self.path.display(), e);
            }
        }
    }
}
