//! Centralized error type for the segue umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI: {0}")]
    Midi(#[from] segue_midi::Error),

    #[error("Port: {0}")]
    Port(#[from] segue_port::Error),

    #[error("Invalid builder setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T> = std::result::Result<T, Error>;
