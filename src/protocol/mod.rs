//! Wire protocol implementation
//!
//! Handles message framing, command parsing, and response text.

pub mod framing;
pub mod parser;
pub mod responses;

pub use framing::{encode, read_frame, write_frame, MAX_BODY_LEN};
pub use parser::{parse_command, Command};
