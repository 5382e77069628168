//! Error types
//!
//! Defines domain-specific error types for each module of the relay server.

use std::fmt;
use std::io;

use crate::registry::ClientId;

/// Client registry errors
#[derive(Debug, PartialEq)]
pub enum RegistryError {
    IllegalName(String),
    NameTaken(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::IllegalName(n) => write!(f, "Illegal name: {}", n),
            RegistryError::NameTaken(n) => write!(f, "Name already taken: {}", n),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Group registry errors
#[derive(Debug, PartialEq)]
pub enum GroupError {
    IllegalName(String),
    UnknownMember(String),
    TooFewMembers(String),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::IllegalName(n) => write!(f, "Illegal group name: {}", n),
            GroupError::UnknownMember(n) => write!(f, "Unknown member: {}", n),
            GroupError::TooFewMembers(n) => {
                write!(f, "Group {} needs at least two distinct members", n)
            }
        }
    }
}

impl std::error::Error for GroupError {}

/// Message delivery errors
#[derive(Debug)]
pub enum SendError {
    PeerUnreachable(ClientId),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::PeerUnreachable(id) => write!(f, "Peer {} is unreachable", id),
        }
    }
}

impl std::error::Error for SendError {}

/// Framing codec errors
#[derive(Debug)]
pub enum FrameError {
    /// Body exceeds what the 4-digit length field can represent.
    TooLarge(usize),
    /// Length field contained something other than 4 decimal digits.
    BadLength([u8; 4]),
    /// Peer closed the connection in the middle of a frame.
    Incomplete,
    /// Frame body is not valid UTF-8.
    InvalidUtf8,
    IoError(io::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooLarge(len) => {
                write!(f, "Body of {} bytes exceeds the 9999-byte frame limit", len)
            }
            FrameError::BadLength(bytes) => {
                write!(f, "Invalid length field: {:?}", bytes)
            }
            FrameError::Incomplete => write!(f, "Connection closed mid-frame"),
            FrameError::InvalidUtf8 => write!(f, "Frame body is not valid UTF-8"),
            FrameError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<io::Error> for FrameError {
    fn from(error: io::Error) -> Self {
        FrameError::IoError(error)
    }
}
