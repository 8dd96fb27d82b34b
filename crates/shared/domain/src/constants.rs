//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted before hashing
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Minimum username length requirement
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length requirement
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum length of an audit event key
pub const MAX_EVENT_KEY_LENGTH: usize = 255;

// =============================================================================
// Audit event keys
// =============================================================================

/// Recorded when a user is created
pub const EVENT_USER_CREATED: &str = "user_created";

/// Recorded when a user's profile is updated
pub const EVENT_USER_UPDATED: &str = "user_updated";

/// Recorded when a user is soft deleted
pub const EVENT_USER_DELETED: &str = "user_deleted";

/// Recorded when a user is permanently removed
pub const EVENT_USER_HARD_DELETED: &str = "user_hard_deleted";

/// Recorded when a soft-deleted user is restored
pub const EVENT_USER_RESTORED: &str = "user_restored";

/// Check if a username is syntactically acceptable
pub fn is_valid_username(username: &str) -> bool {
    username.len() >= MIN_USERNAME_LENGTH
        && username.len() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_42"));
        assert!(is_valid_username("team.lead-1"));
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(MAX_USERNAME_LENGTH + 1)));
    }
}
