use std::path::Path;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use tokio::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    token: String,
    login_email: String,
    login_password: String,
    #[serde(default)]
    docs: bool,
}

/// Connection descriptor for the store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    name: String,
    user: String,
    password: String,
    #[serde(default = "default_pool_size")]
    pool_size: usize,
}

fn default_port() -> u16 {
    5432
}

fn default_pool_size() -> usize {
    crate::model::DEFAULT_POOL_SIZE
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                match Self::load(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let bytes = read_config(use_local)?;
        Self::from_slice(&bytes)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let bytes = read_config_from(path)?;
        Self::from_slice(&bytes)
    }

    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        Ok(toml::from_slice(bytes)?)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[inline]
    pub fn login_email(&self) -> &str {
        &self.login_email
    }

    #[inline]
    pub fn login_password(&self) -> &str {
        &self.login_password
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

impl DatabaseConfig {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}
