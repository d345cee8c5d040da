//! Real-time MIDI output port for the segue engine.
//!
//! Once per processing cycle a [`MidiOutPort`] merges live input, recorded
//! controller curves and track playback, runs the result through its
//! effects pipeline, and releases everything due before the end of the
//! cycle to its routes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use segue_port::{MidiOutPort, RouteTable, SyncSettings};
//!
//! let routes = Arc::new(RouteTable::new());
//! let mut port = MidiOutPort::new("Out 1", 256, routes, SyncSettings::default());
//! let mut live = port.intake_producer().unwrap();
//! live.push_now(Some(0), segue_midi::MidiMessage::NoteOn { note: 60, velocity: 100 });
//! port.process(0, 96, 0, 512);
//! assert!(port.scheduled().is_empty());
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod channel;
pub mod collector;
pub mod config;
pub mod curve;
pub mod hardware;
pub mod intake;
pub mod meter;
pub mod pipeline;
pub mod port;
pub mod queue;
pub mod router;
pub mod scheduler;
pub mod tempo;
pub mod track;
pub mod transport;

pub use channel::MidiChannel;
pub use collector::{CycleCollector, CycleWindow};
pub use config::{ChannelConfig, CurveConfig, PortConfig};
pub use curve::{ControllerCurve, CurveSet};
pub use hardware::{HardwareOutput, MidiWriter, DEFAULT_HARDWARE_QUEUE};
#[cfg(feature = "midi-io")]
pub use hardware::{list_output_devices, MidirWriter};
pub use intake::{event_intake, event_intake_with_capacity, IntakeConsumer, IntakeProducer};
pub use meter::VelocityMeter;
pub use pipeline::{EffectsPipeline, Passthrough, PipelineChain};
pub use port::MidiOutPort;
pub use queue::EventList;
pub use router::{MidiSink, Route, RouteKind, RouteTable, Router, SynthSink};
pub use scheduler::ScheduledQueue;
pub use tempo::{FixedTempoMap, TempoMap};
pub use track::{EventTrack, TrackSource};
pub use transport::{SyncSettings, TransportState, TransportSync};
