//! Command handlers for the chat relay server.
//!
//! One handler per protocol command. Every handler runs with the state
//! lock held, so a command's registry reads, deliveries, and response are
//! atomic with respect to every other command.

use log::{error, info, warn};

use crate::error::FrameError;
use crate::protocol::responses::{
    group_create_failed, group_created, NAME_REJECTED, NOT_REGISTERED, REGISTERED_OK, SEND_FAILED,
    SENT_OK, UNREGISTERED,
};
use crate::protocol::Command;
use crate::registry::ClientId;
use crate::server::ServerState;

/// Dispatch a parsed command for the connection `id`.
///
/// Peer delivery failures are resolved into protocol error responses; an
/// `Err` from here means the *requesting* connection could not be written
/// to, and the caller tears the session down.
pub async fn dispatch(
    state: &mut ServerState,
    id: ClientId,
    command: Command,
) -> Result<(), FrameError> {
    match command {
        Command::CreateClient(name) => handle_cmd_create_client(state, id, &name).await,
        Command::Who => handle_cmd_who(state, id).await,
        Command::CreateGroup { name, members } => {
            handle_cmd_create_group(state, id, &name, &members).await
        }
        Command::Send { target, text } => handle_cmd_send(state, id, &target, &text).await,
        Command::Exit => handle_cmd_exit(state, id).await,
        Command::Invalid(raw) => handle_cmd_invalid(state, id, &raw).await,
    }
}

/// The name registered for `id`, or `None` for a pre-bootstrap connection.
fn registered_name(state: &ServerState, id: ClientId) -> Option<String> {
    state.registry.client_name(id).map(str::to_owned)
}

/// Handles `create_client`: the mandatory bootstrap command.
async fn handle_cmd_create_client(
    state: &mut ServerState,
    id: ClientId,
    name: &str,
) -> Result<(), FrameError> {
    let response = if let Some(existing) = registered_name(state, id) {
        warn!(
            "{}: rejected re-registration as {:?} on the same connection",
            existing, name
        );
        NAME_REJECTED
    } else {
        match state.registry.register_client(id, name) {
            Ok(()) => {
                info!("{} connected.", name);
                REGISTERED_OK
            }
            Err(e) => {
                warn!("Registration rejected for handle {}: {}", id, e);
                NAME_REJECTED
            }
        }
    };
    state.send_to(id, response).await
}

/// Handles `who`: the comma-joined, lexicographically sorted client list.
async fn handle_cmd_who(state: &mut ServerState, id: ClientId) -> Result<(), FrameError> {
    let Some(sender) = registered_name(state, id) else {
        return state.send_to(id, NOT_REGISTERED).await;
    };

    info!("{}: Requests the currently connected client names.", sender);
    let listing = state.registry.client_names().join(",");
    state.send_to(id, &listing).await
}

/// Handles `create_group`.
async fn handle_cmd_create_group(
    state: &mut ServerState,
    id: ClientId,
    name: &str,
    members: &[String],
) -> Result<(), FrameError> {
    let Some(sender) = registered_name(state, id) else {
        return state.send_to(id, NOT_REGISTERED).await;
    };

    match state.registry.create_group(id, name, members) {
        Ok(()) => {
            info!("{}: Group \"{}\" was created successfully.", sender, name);
            state.send_to(id, &group_created(name)).await
        }
        Err(e) => {
            error!("{}: ERROR: failed to create group \"{}\": {}", sender, name, e);
            state.send_to(id, &group_create_failed(name)).await
        }
    }
}

/// Handles `send` to a client or a group the sender belongs to.
///
/// Group fan-out runs in ascending handle order, skips the sender, and
/// aborts on the first delivery failure. A failed delivery never
/// deregisters the unreachable peer.
async fn handle_cmd_send(
    state: &mut ServerState,
    id: ClientId,
    target: &str,
    text: &str,
) -> Result<(), FrameError> {
    let Some(sender) = registered_name(state, id) else {
        return state.send_to(id, NOT_REGISTERED).await;
    };

    let delivery = format!("{}: {}", sender, text);

    if let Some(target_id) = state.registry.client_id(target) {
        return match state.deliver(target_id, &delivery).await {
            Ok(()) => {
                info!("{}: \"{}\" was sent successfully to {}.", sender, text, target);
                state.send_to(id, SENT_OK).await
            }
            Err(e) => {
                error!("{}: ERROR: failed to send \"{}\" to {}: {}", sender, text, target, e);
                state.send_to(id, SEND_FAILED).await
            }
        };
    }

    if state.registry.is_group_member(target, id) {
        let recipients: Vec<ClientId> = state
            .registry
            .group_members(target)
            .map(|members| members.iter().copied().filter(|m| *m != id).collect())
            .unwrap_or_default();

        for peer in recipients {
            if let Err(e) = state.deliver(peer, &delivery).await {
                error!("{}: ERROR: failed to send \"{}\" to {}: {}", sender, text, target, e);
                return state.send_to(id, SEND_FAILED).await;
            }
        }
        info!("{}: \"{}\" was sent successfully to {}.", sender, text, target);
        return state.send_to(id, SENT_OK).await;
    }

    // Unknown target, or a group the sender does not belong to.
    error!("{}: ERROR: failed to send \"{}\" to {}.", sender, text, target);
    state.send_to(id, SEND_FAILED).await
}

/// Handles `exit`: unregister and acknowledge. The connection stays open;
/// the peer closes it after reading the acknowledgement.
async fn handle_cmd_exit(state: &mut ServerState, id: ClientId) -> Result<(), FrameError> {
    let Some(sender) = registered_name(state, id) else {
        return state.send_to(id, NOT_REGISTERED).await;
    };

    state.registry.unregister(id);
    info!("{}: Unregistered successfully.", sender);
    state.send_to(id, UNREGISTERED).await
}

/// A malformed or unknown command. Before bootstrap the answer is `2`;
/// afterwards the server stays silent (the client program validates its
/// own input, so this only shows up from hand-rolled peers).
async fn handle_cmd_invalid(
    state: &mut ServerState,
    id: ClientId,
    raw: &str,
) -> Result<(), FrameError> {
    match registered_name(state, id) {
        Some(sender) => {
            warn!("{}: Unrecognized command {:?}", sender, raw);
            Ok(())
        }
        None => state.send_to(id, NOT_REGISTERED).await,
    }
}
