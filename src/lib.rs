pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;

pub use self::config::ServerConfig;
pub use self::server::Server;
