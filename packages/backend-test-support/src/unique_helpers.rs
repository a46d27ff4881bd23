//! Test helpers for generating unique test data
//!
//! Player identifiers are opaque strings supplied by the transport layer.
//! Tests that share one registry use ULID-suffixed ids so they never collide.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use durak_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("player");
/// let id2 = unique_str("player");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a pair of distinct player ids sharing a prefix.
pub fn unique_player_pair(prefix: &str) -> (String, String) {
    (
        unique_str(&format!("{prefix}-a")),
        unique_str(&format!("{prefix}-b")),
    )
}
