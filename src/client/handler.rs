use log::{error, info};
use std::net::SocketAddr;
use tokio::net::tcp::OwnedReadHalf;

use crate::commands::dispatch;
use crate::protocol::framing::read_frame;
use crate::protocol::parse_command;
use crate::registry::ClientId;
use crate::server::SharedState;

/// Drives one client connection until it goes away.
///
/// - Reads exactly one frame per iteration.
/// - Locks the shared state and dispatches the parsed command; the lock is
///   held for the whole command, so commands never interleave.
/// - A clean disconnect (EOF before a frame, or a zero-length frame) is an
///   implicit `exit` without acknowledgement.
pub async fn handle_connection(
    mut reader: OwnedReadHalf,
    id: ClientId,
    addr: SocketAddr,
    state: SharedState,
) {
    loop {
        match read_frame(&mut reader).await {
            Ok(Some(body)) => {
                let command = parse_command(&body);
                let mut state = state.lock().await;
                if let Err(e) = dispatch(&mut state, id, command).await {
                    error!("Failed to respond to {}: {}", addr, e);
                    break;
                }
            }
            Ok(None) => {
                info!("Connection closed by peer {}", addr);
                break;
            }
            Err(e) => {
                error!("Failed to read from {}: {}", addr, e);
                break;
            }
        }
    }

    let mut state = state.lock().await;
    match state.drop_connection(id) {
        Some(name) => info!("{} disconnected", name),
        None => info!("Unregistered connection {} closed", addr),
    }
}
