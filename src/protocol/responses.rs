//! Protocol response text
//!
//! The exact bodies the server sends back to clients.

/// Bootstrap accepted: the connection is now a named client.
pub const REGISTERED_OK: &str = "0";
/// Bootstrap rejected: name illegal, taken, or connection already registered.
pub const NAME_REJECTED: &str = "1";
/// Any non-bootstrap command on an unregistered connection.
pub const NOT_REGISTERED: &str = "2";

pub const SENT_OK: &str = "Sent successfully.";
pub const SEND_FAILED: &str = "ERROR: failed to send.";
pub const UNREGISTERED: &str = "Unregistered successfully.";

/// Unsolicited broadcast sent to every client on administrative shutdown.
pub const SERVER_EXIT: &str = "server_exit";

pub fn group_created(name: &str) -> String {
    format!("Group \"{}\" was created successfully.", name)
}

pub fn group_create_failed(name: &str) -> String {
    format!("ERROR: failed to create group \"{}\".", name)
}
