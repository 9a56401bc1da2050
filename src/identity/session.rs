use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::AppResult;
use crate::tprintln;

use super::grants;
use super::principal::{Identity, Role};
use super::provider::{AuthApi, Credentials, RegisterRequest};
use super::token_store::TokenStore;

/// Resolution status of the client session.
///
/// `Authenticated` carrying the identity makes "authenticated implies an
/// identity" structural; `Anonymous` additionally implies any stored token
/// has been discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unresolved,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Owns the token lifecycle and the current identity, and answers the
/// role/permission queries pages gate their UI on. Collaborators are
/// injected so the manager can be exercised with fakes.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    auth: Arc<dyn AuthApi>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, auth: Arc<dyn AuthApi>) -> Self {
        Self { store, auth, state: RwLock::new(SessionState::Unresolved) }
    }

    /// Resolve the current identity from the stored token.
    ///
    /// Calls the auth API at most once. Any failure (network, rejected or
    /// expired token, malformed response) discards the stored token and
    /// demotes to anonymous without surfacing an error; a fresh login is the
    /// only recovery. The state is never `Unresolved` once this returns.
    pub async fn resolve(&self) {
        let Some(token) = self.store.get() else {
            tprintln!("session.resolve: no stored token");
            *self.state.write() = SessionState::Anonymous;
            return;
        };
        match self.auth.fetch_current_user(&token).await {
            Ok(identity) => {
                tprintln!("session.resolve: user={} role={}", identity.username, identity.role);
                *self.state.write() = SessionState::Authenticated(identity);
            }
            Err(e) => {
                tprintln!("session.resolve: demoting to anonymous: {}", e);
                self.store.clear();
                *self.state.write() = SessionState::Anonymous;
            }
        }
    }

    /// Exchange credentials for a token, persist it, and resolve the
    /// identity in the same call. A rejected login surfaces the error and
    /// leaves the session untouched.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Identity> {
        let creds = Credentials::new(username, password);
        let token = self.auth.login(&creds).await?;
        self.store.set(&token);
        self.adopt(&token).await
    }

    /// Create an account, persist the returned token, and resolve the new
    /// identity. A rejected registration surfaces the error and leaves the
    /// session untouched.
    pub async fn register(&self, fields: &RegisterRequest) -> AppResult<Identity> {
        let token = self.auth.register(fields).await?;
        self.store.set(&token);
        self.adopt(&token).await
    }

    /// Fetch the identity for a freshly issued token and enter the
    /// authenticated state. A token the server rejects immediately after
    /// issuing it is discarded like any other failed resolution.
    async fn adopt(&self, token: &str) -> AppResult<Identity> {
        match self.auth.fetch_current_user(token).await {
            Ok(identity) => {
                tprintln!("session.login: user={} role={}", identity.username, identity.role);
                *self.state.write() = SessionState::Authenticated(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                self.store.clear();
                *self.state.write() = SessionState::Anonymous;
                Err(e)
            }
        }
    }

    /// Discard the stored token and drop to anonymous. Idempotent; safe to
    /// call with no active session.
    pub fn logout(&self) {
        self.store.clear();
        *self.state.write() = SessionState::Anonymous;
        tprintln!("session.logout");
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        match &*self.state.read() {
            SessionState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    /// False whenever no identity is held; otherwise a grant-table lookup.
    /// Unknown tokens and unknown roles answer false rather than erroring.
    pub fn has_permission(&self, permission: &str) -> bool {
        match &*self.state.read() {
            SessionState::Authenticated(identity) => grants::role_allows(identity.role, permission),
            _ => false,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match &*self.state.read() {
            SessionState::Authenticated(identity) => identity.role == role,
            _ => false,
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        match &*self.state.read() {
            SessionState::Authenticated(identity) => roles.contains(&identity.role),
            _ => false,
        }
    }
}
