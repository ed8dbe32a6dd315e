use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum BusinessRuleViolation {
    #[error("post limit reached: {limit} posts within {window_days} days")]
    PostLimitReached { limit: i64, window_days: i64 },
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection failure: {0}")]
    ConnectionFailure(#[source] sqlx::Error),
    #[error("no active connection to the database")]
    NotConnected,
    #[error("connection pool exhausted")]
    PoolExhausted,
    #[error("sql error: {source}. Statement: {statement}")]
    Sql {
        statement: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("parameter encode error: {0}")]
    Encode(#[source] sqlx::Error),
    #[error("business rule violation: {0}")]
    BusinessRule(#[from] BusinessRuleViolation),
}

impl DatabaseError {
    pub fn sql<S: Into<String>>(statement: S, source: sqlx::Error) -> Self {
        Self::Sql {
            statement: statement.into(),
            source,
        }
    }

    /// True for failures callers should treat as overload and retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotConnected | Self::PoolExhausted)
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sql {
                source: sqlx::Error::Database(e),
                ..
            } => e.is_unique_violation(),
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::Sql {
                source: sqlx::Error::Database(e),
                ..
            } => e.is_foreign_key_violation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sql_error_carries_statement() {
        let err = DatabaseError::sql("SELECT broken", sqlx::Error::RowNotFound);
        assert!(err.to_string().contains("SELECT broken"));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn overload_errors_are_retryable() {
        assert!(DatabaseError::PoolExhausted.is_retryable());
        assert!(DatabaseError::NotConnected.is_retryable());
        assert!(!DatabaseError::sql("SELECT 1", sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn business_rule_message() {
        let err: DatabaseError = BusinessRuleViolation::PostLimitReached {
            limit: 7,
            window_days: 7,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "business rule violation: post limit reached: 7 posts within 7 days"
        );
    }
}
