mod connector;
pub use connector::PgConnector;

mod database;
pub use database::{Database, DatabaseState, LIVENESS_CHECK_AFTER};

pub mod entity;

mod error;
pub use error::{BusinessRuleViolation, DatabaseError, DatabaseResult};

mod params;
pub use params::{SqlParam, to_arguments};

pub mod pool;
pub use pool::{ConnectionPool, Connector, DEFAULT_POOL_SIZE, PooledConnection};

mod resource;
pub use resource::{ResourceType, ResourceTyped};
