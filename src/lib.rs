//! # Segue - Real-time MIDI Output Engine
//!
//! Schedules and encodes MIDI output for a multi-track sequencer.
//!
//! ## Architecture
//!
//! Segue is an umbrella crate that coordinates:
//! - **segue-midi** - Event model, controller id bands, hardware state, protocol encoder
//! - **segue-port** - Output port runtime (intake, collection, scheduling, routing, transport sync)
//!
//! ## Quick Start
//!
//! ```
//! use segue::prelude::*;
//!
//! let mut port = OutPortBuilder::new("Out 1").build()?;
//! let mut live = port.intake_producer().expect("first call");
//!
//! live.push_now(Some(0), MidiMessage::NoteOn { note: 60, velocity: 100 });
//! port.process(0, 96, 0, 512);
//! # Ok::<(), segue::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `midi-hardware` - Hardware MIDI output via midir

pub use segue_midi as midi;
pub use segue_port as port;

pub use segue_midi::{
    ControllerBand, ControllerId, ControllerStates, EncodeError, Expanded, Expansion,
    HardwareState, LiveEvent, MidiEvent, MidiMessage, MtcRate, ProtocolEncoder, SysexData,
    Timecode, MIDI_CHANNELS,
};

pub use segue_port::{
    ControllerCurve, CurveSet, CycleCollector, CycleWindow, EffectsPipeline, EventList,
    EventTrack, FixedTempoMap, HardwareOutput, IntakeConsumer, IntakeProducer, MidiChannel,
    MidiOutPort, MidiSink, MidiWriter, Passthrough, PipelineChain, PortConfig, Route, RouteKind,
    RouteTable, Router, ScheduledQueue, SyncSettings, SynthSink, TempoMap, TrackSource,
    TransportState, TransportSync, VelocityMeter,
};

mod builder;
mod error;

pub use builder::{OutPortBuilder, DEFAULT_INTAKE_CAPACITY};
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, OutPortBuilder, Result};

    // Events
    pub use crate::midi::{ControllerId, LiveEvent, MidiEvent, MidiMessage};

    // Port runtime
    pub use crate::port::{
        EffectsPipeline, EventTrack, FixedTempoMap, MidiOutPort, MidiSink, Route, RouteTable,
        SyncSettings, SynthSink, TempoMap, TrackSource,
    };
}
