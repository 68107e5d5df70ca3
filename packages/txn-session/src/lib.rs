//! Transactional test sessions.
//!
//! A [`TestSession`] owns one exclusive database connection, begins a
//! transaction on it and lends test code a [`TxnProxy`]. Whatever the test
//! writes through the proxy is rolled back before the connection closes, on
//! every exit path.

pub mod config;
pub mod error;
pub mod proxy;
pub mod session;

pub use config::SessionConfig;
pub use error::SessionError;
pub use proxy::{Savepoint, TxnProxy};
pub use session::{with_test_txn, PhaseObserver, SessionPhase, TestSession};
