use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::config::{ConfigError, RuleConfig};

pub const DEFAULT_ROLES_FILE: &str = "roles.txt";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Process-level settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub roles_file: PathBuf,
    pub bind_address: SocketAddr,
    pub rules: RuleConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let roles_file = env::var("ROLES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ROLES_FILE));
        let raw_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = raw_address
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDRESS",
                value: raw_address.clone(),
            })?;

        Ok(Self {
            roles_file,
            bind_address,
            rules: RuleConfig::from_env()?,
        })
    }
}
