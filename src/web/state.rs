use std::sync::Arc;

use crate::{Config, model::Database};

/// Shared handles passed to every handler. Built once at bootstrap.
#[derive(Debug, Clone)]
pub struct AppState {
    db: Arc<Database>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
