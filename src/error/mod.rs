//! Error handling
//!
//! Defines error types for the chat relay server.

pub mod types;

pub use types::*;
