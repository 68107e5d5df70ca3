use std::marker::PhantomData;

use sea_orm::{
    ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, ExecResult, QueryResult, Statement,
    TransactionTrait,
};

/// Transaction-scoped handle lent to test code by a [`TestSession`](crate::TestSession).
///
/// Every [`ConnectionTrait`] operation is forwarded to the held transaction,
/// so entities, query builders and raw statements all run against it. The
/// proxy never commits or rolls back; the session owns that.
pub struct TxnProxy {
    txn: DatabaseTransaction,
}

impl TxnProxy {
    pub(crate) fn new(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// The raw transaction behind this proxy.
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Begin a nested transaction (a savepoint) inside the session's transaction.
    ///
    /// Committing the savepoint only folds its writes into the outer
    /// transaction, which the session still discards. The savepoint borrows
    /// the proxy, so it cannot be returned out of the session's scope:
    ///
    /// ```compile_fail
    /// use txn_session::{with_test_txn, SessionConfig};
    ///
    /// type BoxError = Box<dyn std::error::Error + Send + Sync>;
    ///
    /// # async fn leak(config: &SessionConfig) -> Result<(), BoxError> {
    /// let _escaped = with_test_txn(config, |tx| {
    ///     Box::pin(async move { Ok::<_, BoxError>(tx.savepoint().await?) })
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn savepoint(&self) -> Result<Savepoint<'_>, DbErr> {
        let txn = self.txn.begin().await?;
        Ok(Savepoint {
            txn,
            _proxy: PhantomData,
        })
    }

    pub(crate) fn into_inner(self) -> DatabaseTransaction {
        self.txn
    }
}

impl std::fmt::Debug for TxnProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxnProxy")
            .field("backend", &self.txn.get_database_backend())
            .finish_non_exhaustive()
    }
}

/// A savepoint opened through [`TxnProxy::savepoint`], valid only while the
/// proxy is borrowed.
///
/// Dropping it without [`commit`](Savepoint::commit) rolls the savepoint back.
pub struct Savepoint<'p> {
    txn: DatabaseTransaction,
    _proxy: PhantomData<&'p TxnProxy>,
}

impl Savepoint<'_> {
    /// Release the savepoint, keeping its writes in the outer transaction.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Undo everything written since the savepoint was opened.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

impl std::fmt::Debug for Savepoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Savepoint")
            .field("backend", &self.txn.get_database_backend())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ConnectionTrait for TxnProxy {
    fn get_database_backend(&self) -> DbBackend {
        self.txn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.txn.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.txn.execute_unprepared(sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.txn.query_one(stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.txn.query_all(stmt).await
    }

    fn support_returning(&self) -> bool {
        self.txn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.txn.is_mock_connection()
    }
}

#[async_trait::async_trait]
impl<'p> ConnectionTrait for Savepoint<'p> {
    fn get_database_backend(&self) -> DbBackend {
        self.txn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.txn.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.txn.execute_unprepared(sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.txn.query_one(stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.txn.query_all(stmt).await
    }

    fn support_returning(&self) -> bool {
        self.txn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.txn.is_mock_connection()
    }
}
