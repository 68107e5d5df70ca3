use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, warn, Instrument};
use ulid::Ulid;

use crate::config::{redact, SessionConfig};
use crate::error::SessionError;
use crate::proxy::TxnProxy;

/// Lifecycle points a session passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connection opened.
    Acquired,
    /// Transaction begun and proxy handed to the caller.
    Begun,
    /// Transaction rolled back (attempted, even if it failed).
    Unwound,
    /// Connection closed (attempted, even if it failed).
    Released,
}

/// Callback notified at each [`SessionPhase`].
pub type PhaseObserver = Arc<dyn Fn(SessionPhase) + Send + Sync>;

/// One exclusive connection whose single transaction is always discarded.
///
/// ```no_run
/// use sea_orm::ConnectionTrait;
/// use txn_session::{SessionConfig, TestSession};
///
/// type BoxError = Box<dyn std::error::Error + Send + Sync>;
///
/// # async fn demo() -> Result<(), BoxError> {
/// let config = SessionConfig::from_env()?;
/// TestSession::acquire(&config)
///     .await?
///     .run(|tx| {
///         Box::pin(async move {
///             tx.execute_unprepared("INSERT INTO notes (body) VALUES ('scratch')")
///                 .await?;
///             Ok::<_, BoxError>(())
///         })
///     })
///     .await
/// # }
/// ```
pub struct TestSession {
    id: Ulid,
    conn: DatabaseConnection,
    release_timeout: Duration,
    observer: Option<PhaseObserver>,
}

impl TestSession {
    /// Open the session's connection. Unreachable databases fail immediately
    /// with [`SessionError::Connection`]; there is no retry.
    pub async fn acquire(config: &SessionConfig) -> Result<Self, SessionError> {
        Self::connect(config, None).await
    }

    /// Like [`TestSession::acquire`], reporting every phase to `observer`.
    pub async fn acquire_with_observer(
        config: &SessionConfig,
        observer: PhaseObserver,
    ) -> Result<Self, SessionError> {
        Self::connect(config, Some(observer)).await
    }

    async fn connect(
        config: &SessionConfig,
        observer: Option<PhaseObserver>,
    ) -> Result<Self, SessionError> {
        let id = Ulid::new();
        let conn = Database::connect(config.connect_options())
            .await
            .map_err(|source| {
                warn!(
                    session_id = %id,
                    url = %redact(config.url()),
                    error = %source,
                    "test session could not connect"
                );
                SessionError::Connection { source }
            })?;

        debug!(session_id = %id, url = %redact(config.url()), phase = "acquired");
        let session = Self {
            id,
            conn,
            release_timeout: config.acquire_timeout(),
            observer,
        };
        session.notify(SessionPhase::Acquired);
        Ok(session)
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Begin a transaction, lend it to `f` through a [`TxnProxy`], then roll
    /// it back and close the connection.
    ///
    /// Cleanup runs whether `f` returns `Ok`, returns `Err` or panics. An
    /// `Err` from `f` is returned unchanged and a panic is resumed, both after
    /// the connection is closed. Fixture failures during cleanup surface only
    /// when `f` itself succeeded.
    ///
    /// Closing waits at most the configured acquire timeout. A nested
    /// transaction opened on the raw [`TxnProxy::transaction`] and carried out
    /// of `f` keeps the connection checked out; the session then gives up with
    /// [`SessionError::Release`] instead of waiting for it.
    pub async fn run<R, E, F>(self, f: F) -> Result<R, E>
    where
        F: for<'t> FnOnce(&'t TxnProxy) -> BoxFuture<'t, Result<R, E>>,
        E: From<SessionError>,
    {
        let span = tracing::debug_span!("test_session", session_id = %self.id);
        self.run_scoped(f).instrument(span).await
    }

    async fn run_scoped<R, E, F>(self, f: F) -> Result<R, E>
    where
        F: for<'t> FnOnce(&'t TxnProxy) -> BoxFuture<'t, Result<R, E>>,
        E: From<SessionError>,
    {
        let TestSession {
            id,
            conn,
            release_timeout,
            observer,
        } = self;
        let report = |phase| notify(observer.as_ref(), phase);

        let txn = match conn.begin().await {
            Ok(txn) => txn,
            Err(source) => {
                if let Err(close_err) = release(conn, release_timeout).await {
                    warn!(error = %close_err, "close after failed begin also failed");
                }
                report(SessionPhase::Released);
                return Err(SessionError::Begin { source }.into());
            }
        };
        debug!(phase = "begun");
        report(SessionPhase::Begun);

        let mut pending = PendingDiscard::armed(id);
        let proxy = TxnProxy::new(txn);
        let outcome = AssertUnwindSafe(async { f(&proxy).await })
            .catch_unwind()
            .await;

        let unwound = discard(proxy.into_inner(), &mut pending).await;
        debug!(phase = "unwound", ok = unwound.is_ok());
        report(SessionPhase::Unwound);

        let released = release(conn, release_timeout).await;
        debug!(phase = "released", ok = released.is_ok());
        report(SessionPhase::Released);

        match outcome {
            Err(panic) => {
                log_suppressed(&unwound, &released);
                resume_unwind(panic)
            }
            Ok(Err(err)) => {
                log_suppressed(&unwound, &released);
                Err(err)
            }
            Ok(Ok(value)) => {
                unwound?;
                released?;
                Ok(value)
            }
        }
    }

    fn notify(&self, phase: SessionPhase) {
        notify(self.observer.as_ref(), phase);
    }
}

/// Open a [`TestSession`] for `config` and run `f` inside it.
pub async fn with_test_txn<R, E, F>(config: &SessionConfig, f: F) -> Result<R, E>
where
    F: for<'t> FnOnce(&'t TxnProxy) -> BoxFuture<'t, Result<R, E>>,
    E: From<SessionError>,
{
    TestSession::acquire(config).await?.run(f).await
}

/// Tracks whether the session's transaction still has to be discarded.
///
/// Armed when the transaction begins and cleared once the rollback has been
/// attempted. If the session future is dropped mid-scope the flag is still
/// set; the transaction is then discarded by the driver when it drops.
struct PendingDiscard {
    session_id: Ulid,
    discard: bool,
}

impl PendingDiscard {
    fn armed(session_id: Ulid) -> Self {
        Self {
            session_id,
            discard: true,
        }
    }
}

impl Drop for PendingDiscard {
    fn drop(&mut self) {
        if self.discard {
            warn!(
                session_id = %self.session_id,
                "test session dropped before unwinding; transaction discarded on drop"
            );
        }
    }
}

async fn discard(
    txn: DatabaseTransaction,
    pending: &mut PendingDiscard,
) -> Result<(), SessionError> {
    let result = txn
        .rollback()
        .await
        .map_err(|source| SessionError::Rollback { source });
    pending.discard = false;
    result
}

async fn release(conn: DatabaseConnection, timeout: Duration) -> Result<(), SessionError> {
    let source = match tokio::time::timeout(timeout, conn.close()).await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(source)) => source,
        Err(_) => DbErr::Custom(format!(
            "connection still checked out after {}ms; a nested transaction outlived the session",
            timeout.as_millis()
        )),
    };
    Err(SessionError::Release { source })
}

fn notify(observer: Option<&PhaseObserver>, phase: SessionPhase) {
    if let Some(observer) = observer {
        observer(phase);
    }
}

fn log_suppressed(unwound: &Result<(), SessionError>, released: &Result<(), SessionError>) {
    for err in [unwound, released].into_iter().filter_map(|r| r.as_ref().err()) {
        warn!(error = %err, "cleanup failure suppressed in favour of caller outcome");
    }
}
