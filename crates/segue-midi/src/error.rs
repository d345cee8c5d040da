//! Error types for the MIDI protocol layer.

use crate::controller::ControllerId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Invalid channel: {0}. Must be 0-15")]
    InvalidChannel(u8),

    #[error("Invalid sysex: {0}")]
    InvalidSysex(String),
}

/// Reasons a logical controller change cannot be expanded to wire messages.
///
/// Never fatal: the caller reports the error and drops the event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown controller type {0}")]
    UnknownController(ControllerId),
}

pub type Result<T> = std::result::Result<T, Error>;
