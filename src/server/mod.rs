//! Server core
//!
//! The accept loop, administrative shutdown channel, and the shared
//! connection/registry state.

pub mod core;

pub use core::{Server, ServerState, SharedState};
