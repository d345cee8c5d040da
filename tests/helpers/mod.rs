//! Test helpers and fixtures for segue integration tests
//!
//! Ports are driven by hand, one cycle at a time, with in-memory sinks in
//! place of devices.

#![allow(dead_code)]

use parking_lot::Mutex;
use segue::prelude::*;
use std::sync::Arc;

pub const TEST_SAMPLE_RATE: u32 = 48000;
pub const TEST_DIVISION: u32 = 384;

/// 125 bpm at 384 ticks per quarter and 48 kHz: exactly 60 frames per tick.
pub const TEST_BPM: f64 = 125.0;
pub const FRAMES_PER_TICK: u64 = 60;

/// Records everything it is handed, as a wire sink or as a synth.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MidiEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<MidiEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<MidiEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn messages(&self) -> Vec<MidiMessage> {
        self.events.lock().iter().map(|e| e.msg.clone()).collect()
    }
}

impl MidiSink for RecordingSink {
    fn put_event(&self, event: MidiEvent) {
        self.events.lock().push(event);
    }
}

impl SynthSink for RecordingSink {
    fn insert_event(&self, event: &MidiEvent) {
        self.events.lock().push(event.clone());
    }
}

pub fn test_sync() -> SyncSettings {
    SyncSettings {
        division: TEST_DIVISION,
        sample_rate: TEST_SAMPLE_RATE,
        ..SyncSettings::default()
    }
}

pub fn test_tempo() -> Arc<FixedTempoMap> {
    Arc::new(FixedTempoMap::new(TEST_BPM, TEST_DIVISION, TEST_SAMPLE_RATE))
}

/// Port routed to one recording hardware sink.
pub fn test_port(sync: SyncSettings) -> (MidiOutPort, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let port = OutPortBuilder::new("Test Out")
        .sync(sync)
        .tempo_map(test_tempo())
        .route(Route::Hardware(sink.clone()))
        .build()
        .expect("Failed to build test port");
    (port, sink)
}

/// Track with tick-timed events.
pub fn test_track(events: impl IntoIterator<Item = MidiEvent>) -> Arc<EventTrack> {
    Arc::new(EventTrack::new(test_tempo()).with_events(events))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
