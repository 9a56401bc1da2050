//! Client-side identity and session management for the knowledge base.
//! Keep the public surface thin and split implementation across sub-modules.

mod grants;
mod principal;
mod provider;
mod session;
mod token_store;

pub use grants::{
    permissions_for, role_allows, PERM_ALL, PERM_CREATE_BLOCKS, PERM_CREATE_PATHS,
    PERM_CREATE_SUGGESTIONS, PERM_MODERATE_CONTENT, PERM_REVIEW_SUGGESTIONS, PERM_USE_AI_AGENTS,
    PERM_VIEW,
};
pub use principal::{Identity, Role};
pub use provider::{AuthApi, Credentials, RegisterRequest};
pub use session::{SessionManager, SessionState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
