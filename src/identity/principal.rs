use std::fmt;

use serde::{Deserialize, Serialize};

/// Role ladder used by the backend. The set is closed; any value outside it
/// deserializes to `Unknown`, which holds no permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Guest,
    Builder,
    TrustedBuilder,
    Moderator,
    Admin,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Builder => "builder",
            Role::TrustedBuilder => "trusted_builder",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }

    /// Tolerant parse used by CLI input and stored profiles.
    pub fn parse(value: &str) -> Role {
        match value.trim().to_ascii_lowercase().as_str() {
            "guest" => Role::Guest,
            "builder" => Role::Builder,
            "trusted_builder" => Role::TrustedBuilder,
            "moderator" => Role::Moderator,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_level() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// The authenticated principal as served by `/v1/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub xp: i64,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, rename = "metadata")]
    pub meta: Option<serde_json::Value>,
}

impl Identity {
    /// Preferred human-readable name: full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|s| !s.is_empty()).unwrap_or(&self.username)
    }
}
