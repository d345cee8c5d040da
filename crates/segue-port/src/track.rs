//! Upstream track playback.

use crate::tempo::TempoMap;
use parking_lot::RwLock;
use segue_midi::MidiEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A playback track feeding one channel of an output port.
pub trait TrackSource: Send + Sync {
    fn is_muted(&self) -> bool;

    /// Append the track's events in `[from_tick, to_tick)` to `out`, already
    /// timed in frames. Must have no side effects; may be called repeatedly
    /// with the same range. The channel is overwritten by the caller.
    fn events(&self, from_tick: u64, to_tick: u64, out: &mut Vec<MidiEvent>);
}

/// In-memory track whose events are stored with tick times.
pub struct EventTrack {
    events: RwLock<Vec<MidiEvent>>,
    tempo: Arc<dyn TempoMap>,
    muted: AtomicBool,
}

impl EventTrack {
    pub fn new(tempo: Arc<dyn TempoMap>) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            tempo,
            muted: AtomicBool::new(false),
        }
    }

    /// Insert an event whose `time` is a tick position.
    pub fn insert(&self, event: MidiEvent) {
        let mut events = self.events.write();
        let idx = events.partition_point(|e| e.time <= event.time);
        events.insert(idx, event);
    }

    pub fn with_events(self, events: impl IntoIterator<Item = MidiEvent>) -> Self {
        for event in events {
            self.insert(event);
        }
        self
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl TrackSource for EventTrack {
    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    fn events(&self, from_tick: u64, to_tick: u64, out: &mut Vec<MidiEvent>) {
        let events = self.events.read();
        let start = events.partition_point(|e| e.time < from_tick);
        let end = events.partition_point(|e| e.time < to_tick).max(start);
        out.extend(
            events[start..end]
                .iter()
                .map(|e| e.clone().with_time(self.tempo.tick_to_frame(e.time))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::FixedTempoMap;

    #[test]
    fn test_range_and_frame_conversion() {
        let tempo = Arc::new(FixedTempoMap::new(120.0, 480, 48000));
        let track = EventTrack::new(tempo).with_events([
            MidiEvent::note_on(20, 0, 62, 90),
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_off(40, 0, 60, 0),
        ]);

        let mut out = Vec::new();
        track.events(0, 40, &mut out);
        let times: Vec<_> = out.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![0, 1000]);

        out.clear();
        track.events(40, 40, &mut out);
        assert!(out.is_empty());
    }
}
