//! Shared database facade: lifecycle, the transactional query primitive and schema setup.
//!
//! Every statement runs on a connection checked out of [`ConnectionPool`] inside its own
//! transaction. The checkout is returned to the pool on every exit path before an error
//! reaches the caller.

use std::time::Duration;

use parking_lot::Mutex;
use sqlx::{
    Connection, FromRow, PgConnection, Postgres, Transaction,
    postgres::{PgConnectOptions, PgRow},
};

use crate::config::DatabaseConfig;
use crate::model::{
    SqlParam,
    connector::PgConnector,
    error::{DatabaseError, DatabaseResult},
    params::to_arguments,
    pool::{ConnectionPool, PooledConnection},
};

const SCHEMA: &str = include_str!("schema.sql");

/// Connections idle for less than this are handed out without a ping.
pub const LIVENESS_CHECK_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    Uninitialized,
    Connected,
    Failed,
}

#[derive(Debug)]
pub struct Database {
    options: PgConnectOptions,
    state: Mutex<DatabaseState>,
    // held for the whole of `connect`
    connecting: tokio::sync::Mutex<()>,
    probe: Mutex<Option<PgConnection>>,
    pool: ConnectionPool<PgConnector>,
}

impl Database {
    pub fn new(options: PgConnectOptions, pool_size: usize) -> Self {
        Self {
            pool: ConnectionPool::new(PgConnector::new(options.clone()), pool_size)
                .with_check_after(LIVENESS_CHECK_AFTER),
            options,
            state: Mutex::new(DatabaseState::Uninitialized),
            connecting: tokio::sync::Mutex::new(()),
            probe: Mutex::new(None),
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.connect_options(), config.pool_size())
    }

    /// Opens a probe connection and, when it succeeds, fills the pool.
    /// Never fails loudly: the outcome is the returned flag. Concurrent calls are
    /// serialized, so the pool is filled at most once.
    #[tracing::instrument(skip(self))]
    pub async fn connect(&self) -> bool {
        let _connecting = self.connecting.lock().await;
        if self.is_connected() {
            return true;
        }

        match PgConnection::connect_with(&self.options).await {
            Ok(conn) => {
                *self.probe.lock() = Some(conn);
                let opened = self.pool.initialize().await;
                *self.state.lock() = DatabaseState::Connected;
                tracing::info!(
                    pooled = opened,
                    capacity = self.pool.capacity(),
                    "connection to database is established"
                );
                true
            }
            Err(e) => {
                *self.state.lock() = DatabaseState::Failed;
                tracing::error!("connection to database failed: {}", e);
                false
            }
        }
    }

    pub fn state(&self) -> DatabaseState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == DatabaseState::Connected
    }

    pub fn pool(&self) -> &ConnectionPool<PgConnector> {
        &self.pool
    }

    /// Runs the idempotent DDL script in a single transaction.
    #[tracing::instrument(skip(self))]
    pub async fn startup_database(&self) -> DatabaseResult<()> {
        let mut conn = self.checkout().await?;
        let mut tx = begin(&mut conn).await?;
        let result = sqlx::raw_sql(SCHEMA).execute(&mut *tx).await;
        finish(tx, "<schema>", result).await?;
        self.pool.release(conn);

        tracing::info!("successfully created tables");
        Ok(())
    }

    /// Runs one parameterized statement and returns the raw rows.
    pub async fn exec(&self, statement: &str, params: &[SqlParam]) -> DatabaseResult<Vec<PgRow>> {
        let mut conn = self.checkout().await?;
        let args = to_arguments(params)?;
        let mut tx = begin(&mut conn).await?;
        let result = sqlx::query_with(statement, args).fetch_all(&mut *tx).await;
        let outcome = finish(tx, statement, result).await;
        self.pool.release(conn);
        outcome
    }

    /// Like [`Database::exec`] but decodes every row into `T`.
    pub async fn exec_as<T>(&self, statement: &str, params: &[SqlParam]) -> DatabaseResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut conn = self.checkout().await?;
        let args = to_arguments(params)?;
        let mut tx = begin(&mut conn).await?;
        let result = sqlx::query_as_with::<_, T, _>(statement, args)
            .fetch_all(&mut *tx)
            .await;
        let outcome = finish(tx, statement, result).await;
        self.pool.release(conn);
        outcome
    }

    pub async fn exec_optional<T>(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> DatabaseResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut conn = self.checkout().await?;
        let args = to_arguments(params)?;
        let mut tx = begin(&mut conn).await?;
        let result = sqlx::query_as_with::<_, T, _>(statement, args)
            .fetch_optional(&mut *tx)
            .await;
        let outcome = finish(tx, statement, result).await;
        self.pool.release(conn);
        outcome
    }

    /// For statements that always yield a row, e.g. `INSERT ... RETURNING`.
    pub async fn exec_one<T>(&self, statement: &str, params: &[SqlParam]) -> DatabaseResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.exec_optional(statement, params)
            .await?
            .ok_or_else(|| DatabaseError::sql(statement, sqlx::Error::RowNotFound))
    }

    /// Returns the number of rows the statement touched.
    pub async fn exec_affected(&self, statement: &str, params: &[SqlParam]) -> DatabaseResult<u64> {
        let mut conn = self.checkout().await?;
        let args = to_arguments(params)?;
        let mut tx = begin(&mut conn).await?;
        let result = sqlx::query_with(statement, args)
            .execute(&mut *tx)
            .await
            .map(|done| done.rows_affected());
        let outcome = finish(tx, statement, result).await;
        self.pool.release(conn);
        outcome
    }

    /// Drains the pool and closes the probe connection. Called once at process exit.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) {
        let drained = self.pool.drain().await;
        let probe = self.probe.lock().take();
        if let Some(conn) = probe {
            if let Err(e) = conn.close().await {
                tracing::debug!("error while closing probe connection: {}", e);
            }
        }
        tracing::info!(drained, "database connections closed");
    }

    pub(crate) async fn checkout(&self) -> DatabaseResult<PooledConnection<PgConnection>> {
        if !self.is_connected() {
            tracing::error!("query attempted without an active connection");
            return Err(DatabaseError::NotConnected);
        }
        self.pool.acquire().await
    }
}

pub(crate) async fn begin(conn: &mut PgConnection) -> DatabaseResult<Transaction<'_, Postgres>> {
    conn.begin().await.map_err(|e| sql_error("BEGIN", e))
}

/// Commits on success, rolls back otherwise.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    statement: &str,
    result: Result<T, sqlx::Error>,
) -> DatabaseResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(|e| sql_error("COMMIT", e))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!("rollback failed: {}", rollback);
            }
            Err(sql_error(statement, e))
        }
    }
}

pub(crate) fn sql_error(statement: &str, e: sqlx::Error) -> DatabaseError {
    tracing::error!("SQL error: {}", e);
    tracing::error!("Request: {}", statement);
    DatabaseError::sql(statement, e)
}
