//! Shared helpers for the workspace's test binaries.
//!
//! Provides the unified test logging initializer and ULID-based helpers for
//! generating markers and identifiers that never collide between runs.

pub mod logging;
pub mod unique;

pub use unique::{unique_ident, unique_str};
