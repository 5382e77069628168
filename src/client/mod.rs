//! Client connection handling
//!
//! One task per accepted connection; all shared state stays in
//! [`crate::server::ServerState`].

pub mod handler;

pub use handler::handle_connection;
