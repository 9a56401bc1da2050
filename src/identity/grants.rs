//! Static role-to-permission grant table.
//! Built once on first use and never mutated afterwards; queries are plain
//! set lookups. The table is total over the closed role set, and the admin
//! wildcard satisfies every query.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::principal::Role;

pub const PERM_VIEW: &str = "view";
pub const PERM_CREATE_BLOCKS: &str = "create_blocks";
pub const PERM_CREATE_PATHS: &str = "create_paths";
pub const PERM_CREATE_SUGGESTIONS: &str = "create_suggestions";
pub const PERM_REVIEW_SUGGESTIONS: &str = "review_suggestions";
pub const PERM_MODERATE_CONTENT: &str = "moderate_content";
pub const PERM_USE_AI_AGENTS: &str = "use_ai_agents";
/// Wildcard granted to admins; satisfies any permission query.
pub const PERM_ALL: &str = "*";

static EMPTY: Lazy<HashSet<&'static str>> = Lazy::new(HashSet::new);

static GRANTS: Lazy<HashMap<Role, HashSet<&'static str>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(Role::Guest, HashSet::from([PERM_VIEW, PERM_CREATE_SUGGESTIONS]));
    table.insert(
        Role::Builder,
        HashSet::from([PERM_VIEW, PERM_CREATE_SUGGESTIONS, PERM_CREATE_BLOCKS, PERM_CREATE_PATHS]),
    );
    table.insert(
        Role::TrustedBuilder,
        HashSet::from([
            PERM_VIEW,
            PERM_CREATE_SUGGESTIONS,
            PERM_CREATE_BLOCKS,
            PERM_CREATE_PATHS,
            PERM_USE_AI_AGENTS,
        ]),
    );
    table.insert(
        Role::Moderator,
        HashSet::from([
            PERM_VIEW,
            PERM_CREATE_SUGGESTIONS,
            PERM_CREATE_BLOCKS,
            PERM_CREATE_PATHS,
            PERM_USE_AI_AGENTS,
            PERM_REVIEW_SUGGESTIONS,
            PERM_MODERATE_CONTENT,
        ]),
    );
    table.insert(Role::Admin, HashSet::from([PERM_ALL]));
    // Roles outside the closed set hold nothing rather than erroring.
    table.insert(Role::Unknown, HashSet::new());
    table
});

/// True iff `role` may perform `permission`. Unknown roles and unknown
/// permission tokens answer false, never an error.
pub fn role_allows(role: Role, permission: &str) -> bool {
    match GRANTS.get(&role) {
        Some(set) => set.contains(PERM_ALL) || set.contains(permission),
        None => false,
    }
}

/// The grant set for a role. Unknown roles map to the empty set.
pub fn permissions_for(role: Role) -> &'static HashSet<&'static str> {
    GRANTS.get(&role).unwrap_or(&EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TOKENS: &[&str] = &[
        PERM_VIEW,
        PERM_CREATE_BLOCKS,
        PERM_CREATE_PATHS,
        PERM_CREATE_SUGGESTIONS,
        PERM_REVIEW_SUGGESTIONS,
        PERM_MODERATE_CONTENT,
        PERM_USE_AI_AGENTS,
    ];

    #[test]
    fn admin_wildcard_satisfies_everything() {
        for &token in ALL_TOKENS {
            assert!(role_allows(Role::Admin, token), "admin should hold '{}'", token);
        }
        // Including tokens no other role has ever heard of
        assert!(role_allows(Role::Admin, "manage_users"));
        assert!(role_allows(Role::Admin, "definitely_not_a_permission"));
    }

    #[test]
    fn non_admin_roles_are_exact_membership() {
        for role in [Role::Guest, Role::Builder, Role::TrustedBuilder, Role::Moderator] {
            let set = permissions_for(role);
            for &token in ALL_TOKENS {
                assert_eq!(
                    role_allows(role, token),
                    set.contains(token),
                    "{} / {}",
                    role,
                    token
                );
            }
            // Unlisted tokens are always denied
            assert!(!role_allows(role, "manage_users"));
        }
    }

    #[test]
    fn moderator_grant_set() {
        assert!(role_allows(Role::Moderator, PERM_MODERATE_CONTENT));
        assert!(role_allows(Role::Moderator, PERM_USE_AI_AGENTS));
        assert!(role_allows(Role::Moderator, PERM_REVIEW_SUGGESTIONS));
        assert!(!role_allows(Role::Moderator, "manage_users"));
    }

    #[test]
    fn ladder_is_cumulative() {
        for role in [Role::Builder, Role::TrustedBuilder, Role::Moderator] {
            for &token in permissions_for(Role::Guest) {
                assert!(role_allows(role, token), "{} should keep guest grant '{}'", role, token);
            }
        }
        assert!(!role_allows(Role::Guest, PERM_CREATE_BLOCKS));
        assert!(!role_allows(Role::Builder, PERM_USE_AI_AGENTS));
        assert!(!role_allows(Role::TrustedBuilder, PERM_REVIEW_SUGGESTIONS));
    }

    #[test]
    fn unknown_role_holds_nothing() {
        for &token in ALL_TOKENS {
            assert!(!role_allows(Role::Unknown, token));
        }
        assert!(permissions_for(Role::Unknown).is_empty());
    }
}
