//! ULID-based unique values for test isolation.

use ulid::Ulid;

/// Generate a unique string with the given prefix, formatted `{prefix}-{ulid}`.
///
/// ```
/// use test_support::unique_str;
///
/// let a = unique_str("note");
/// let b = unique_str("note");
/// assert_ne!(a, b);
/// assert!(a.starts_with("note-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique SQL identifier, formatted `{prefix}_{ulid}` in lowercase.
///
/// Safe to splice into DDL unquoted as long as `prefix` is itself a plain
/// identifier.
///
/// ```
/// use test_support::unique_ident;
///
/// let table = unique_ident("scratch");
/// assert!(table.starts_with("scratch_"));
/// assert!(table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
/// ```
pub fn unique_ident(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string().to_lowercase())
}
