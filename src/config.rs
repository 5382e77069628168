//! Configuration management for the chat relay server
//!
//! Values come from `config.toml` when present, with environment overrides
//! (prefix `CHAT_RELAY_`) and built-in defaults, so the server also starts
//! with no configuration file at all.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the listening socket to.
    pub bind_address: String,

    /// TCP port for the listening socket. Port 0 asks the OS for an
    /// ephemeral port, which the integration tests rely on.
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from defaults, then `config.toml`, then environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 7777)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_RELAY"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and port as a socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }
        Ok(())
    }
}
