//! Per-cycle merge of live input, controller curves and track playback.

use crate::channel::MidiChannel;
use crate::curve::CurveSet;
use crate::intake::IntakeConsumer;
use crate::queue::EventList;
use crate::tempo::TempoMap;
use segue_midi::MidiEvent;

/// Tick range and the frame range it maps to, both half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleWindow {
    pub from_tick: u64,
    pub to_tick: u64,
    pub from_frame: u64,
    pub to_frame: u64,
}

impl CycleWindow {
    pub fn new(from_tick: u64, to_tick: u64, from_frame: u64, to_frame: u64) -> Self {
        Self {
            from_tick,
            to_tick,
            from_frame,
            to_frame,
        }
    }

    /// The transport moved during this cycle.
    #[inline]
    pub fn is_rolling(&self) -> bool {
        self.from_tick != self.to_tick
    }
}

/// Owns the merge buffers so a cycle does not reallocate once warmed up.
#[derive(Debug, Default)]
pub struct CycleCollector {
    merged: EventList,
    track_scratch: Vec<MidiEvent>,
}

impl CycleCollector {
    pub fn new() -> Self {
        Self {
            merged: EventList::with_capacity(256),
            track_scratch: Vec::with_capacity(64),
        }
    }

    /// Build the merged list for one cycle.
    ///
    /// Live events without a timestamp are played at `from_frame`. Curves
    /// are only sampled while rolling. Muted channels and channels without
    /// inputs contribute nothing; each remaining channel's note-on
    /// velocities go to its meter.
    pub fn collect(
        &mut self,
        window: &CycleWindow,
        intake: &mut IntakeConsumer,
        port_curves: &CurveSet,
        channels: &[MidiChannel],
        tempo: &dyn TempoMap,
    ) -> &EventList {
        self.merged.clear();
        intake.drain_into(window.from_frame, &mut self.merged);

        if window.is_rolling() {
            port_curves.sample(window.from_tick, window.to_tick, None, tempo, &mut self.merged);
        }

        for channel in channels.iter().filter(|c| c.is_active()) {
            let ch = channel.index();
            if window.is_rolling() {
                channel.curves().sample(
                    window.from_tick,
                    window.to_tick,
                    Some(ch),
                    tempo,
                    &mut self.merged,
                );
            }

            let mut velocity = 0u32;
            for track in channel.inputs().iter().filter(|t| !t.is_muted()) {
                self.track_scratch.clear();
                track.events(window.from_tick, window.to_tick, &mut self.track_scratch);
                for event in self.track_scratch.drain(..) {
                    let event = event.with_channel(Some(ch));
                    velocity += event.note_on_velocity().map_or(0, u32::from);
                    self.merged.add(event);
                }
            }
            channel.meter().add_velocity(velocity);
        }

        &self.merged
    }

    /// Append extra events (clock ticks) to the current cycle's list.
    pub fn push(&mut self, event: MidiEvent) {
        self.merged.add(event);
    }

    pub fn merged(&self) -> &EventList {
        &self.merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::event_intake_with_capacity;
    use crate::tempo::FixedTempoMap;
    use crate::track::EventTrack;
    use segue_midi::{ControllerId, MidiMessage};
    use std::sync::Arc;

    fn channels() -> Vec<MidiChannel> {
        (0..16).map(MidiChannel::new).collect()
    }

    #[test]
    fn test_merges_all_sources_in_time_order() {
        // 50 frames per tick
        let tempo = Arc::new(FixedTempoMap::new(120.0, 480, 48000));
        let (mut producer, mut intake) = event_intake_with_capacity(8);
        producer.push_now(Some(9), MidiMessage::NoteOn { note: 40, velocity: 1 });

        let mut port_curves = CurveSet::new();
        port_curves.curve_mut(ControllerId::MASTER_VOLUME).add(2, 100);

        let mut channels = channels();
        let track = EventTrack::new(tempo.clone()).with_events([
            MidiEvent::note_on(1, 0, 60, 100),
            MidiEvent::note_off(3, 0, 60, 0),
        ]);
        channels[5].add_input(Arc::new(track));
        channels[5].curves_mut().curve_mut(ControllerId::PAN).add(1, 10);

        let mut collector = CycleCollector::new();
        let window = CycleWindow::new(0, 4, 0, 200);
        let merged = collector.collect(&window, &mut intake, &port_curves, &channels, tempo.as_ref());

        let got: Vec<_> = merged.iter().map(|e| (e.time, e.channel)).collect();
        assert_eq!(
            got,
            vec![(0, Some(9)), (50, Some(5)), (50, Some(5)), (100, None), (150, Some(5))]
        );
        // curve sample was added before the track event at the same frame
        assert!(merged.as_slice()[1].is_controller());
        assert!(channels[5].meter().get() > 0.7);
    }

    #[test]
    fn test_paused_skips_curves_but_plays_intake() {
        let tempo = FixedTempoMap::default();
        let (mut producer, mut intake) = event_intake_with_capacity(8);
        producer.push_now(None, MidiMessage::Start);

        let mut port_curves = CurveSet::new();
        port_curves.curve_mut(ControllerId::VOLUME).add(10, 1);

        let mut collector = CycleCollector::new();
        let window = CycleWindow::new(10, 10, 4410, 4900);
        let merged = collector.collect(&window, &mut intake, &port_curves, &channels(), &tempo);
        assert_eq!(merged.as_slice(), &[MidiEvent::realtime(4410, MidiMessage::Start)]);
    }

    #[test]
    fn test_muted_or_unrouted_channels_contribute_nothing() {
        let tempo = Arc::new(FixedTempoMap::default());
        let (_producer, mut intake) = event_intake_with_capacity(8);
        let mut channels = channels();

        let track = Arc::new(EventTrack::new(tempo.clone()).with_events([MidiEvent::note_on(0, 0, 60, 100)]));
        channels[0].add_input(track.clone());
        channels[0].set_mute(true);
        channels[1].curves_mut().curve_mut(ControllerId::VOLUME).add(0, 1);

        let muted_track = Arc::new(EventTrack::new(tempo.clone()).with_events([MidiEvent::note_on(0, 0, 61, 100)]));
        muted_track.set_muted(true);
        channels[2].add_input(muted_track);

        let mut collector = CycleCollector::new();
        let window = CycleWindow::new(0, 100, 0, 10000);
        let merged = collector.collect(&window, &mut intake, &CurveSet::new(), &channels, tempo.as_ref());
        assert!(merged.is_empty());
    }
}
