//! Chat relay server - Entry point
//!
//! A TCP text-chat relay: named clients query who is online, form groups,
//! and exchange direct or group messages over a length-prefixed protocol.

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use chat_relay_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed on {}: {}", config.socket_addr(), e);
            std::process::exit(1);
        }
    };

    // Administrative input: one line per command, read from stdin.
    let (admin_tx, admin_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if admin_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    if let Err(e) = server.run(admin_rx).await {
        error!("Unrecoverable server error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}
