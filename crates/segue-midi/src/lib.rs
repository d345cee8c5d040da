//! MIDI protocol layer for the segue output engine.
//!
//! Provides the event model, the controller id space, per-port/per-channel
//! hardware state and the encoder that turns logical controller changes into
//! wire message sequences.
//!
//! # Example
//!
//! ```
//! use segue_midi::{ControllerId, MidiEvent, ProtocolEncoder};
//!
//! let encoder = ProtocolEncoder::default();
//! let event = MidiEvent::controller(0, Some(0), ControllerId::rpn14(0, 0), 0x0200);
//! let wire = encoder.expand(&event).unwrap();
//! assert_eq!(wire.len(), 4);
//! ```

pub mod error;
pub use error::{EncodeError, Error, Result};

pub mod controller;
pub mod encoder;
pub mod event;
pub mod state;
pub mod sysex;
pub mod timecode;

pub use controller::{split14, ControllerBand, ControllerId};
pub use encoder::{band_rule, Expanded, Expansion, ProtocolEncoder};
pub use event::{validate_channel, LiveEvent, MidiEvent, MidiMessage, SysexData, MIDI_CHANNELS};
pub use state::{ControllerStates, HardwareState};
pub use timecode::{MtcRate, Timecode};
