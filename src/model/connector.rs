use async_trait::async_trait;
use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};

use crate::model::{
    error::{DatabaseError, DatabaseResult},
    pool::Connector,
};

/// Opens Postgres sessions for the pool.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PgConnectOptions {
        &self.options
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgConnection;

    async fn open(&self) -> DatabaseResult<PgConnection> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(DatabaseError::ConnectionFailure)
    }

    /// A full round trip to the server. The pool only asks for it once a connection
    /// has been idle for a while, see [`ConnectionPool::with_check_after`].
    ///
    /// [`ConnectionPool::with_check_after`]: crate::model::ConnectionPool::with_check_after
    async fn is_open(&self, conn: &mut PgConnection) -> bool {
        conn.ping().await.is_ok()
    }

    async fn close(&self, conn: PgConnection) {
        if let Err(e) = conn.close().await {
            tracing::debug!("error while closing connection: {}", e);
        }
    }
}
