//! Scheduled queue and time-gated dispatch.

use crate::pipeline::EffectsPipeline;
use crate::queue::EventList;
use segue_midi::MidiEvent;

/// Events waiting for their frame, carried across cycle boundaries.
///
/// Owned by the processing thread. Only a contiguous prefix with
/// `time < to_frame` is ever removed by [`ScheduledQueue::dispatch_ready`].
#[derive(Debug, Default)]
pub struct ScheduledQueue {
    events: EventList,
}

impl ScheduledQueue {
    pub fn new() -> Self {
        Self {
            events: EventList::with_capacity(512),
        }
    }

    /// Run `merged` through the pipeline into the queue.
    pub fn apply(
        &mut self,
        pipeline: &mut dyn EffectsPipeline,
        from_tick: u64,
        to_tick: u64,
        merged: &EventList,
    ) {
        pipeline.apply(from_tick, to_tick, merged, &mut self.events);
    }

    /// Hand every event with `time < to_frame` to `route`, in order, then
    /// erase them. Returns the sum of released note-on velocities.
    pub fn dispatch_ready<F>(&mut self, to_frame: u64, mut route: F) -> u32
    where
        F: FnMut(&MidiEvent),
    {
        let ready = self.events.ready_len(to_frame);
        let mut velocity = 0u32;
        for event in &self.events.as_slice()[..ready] {
            velocity += event.note_on_velocity().map_or(0, u32::from);
            route(event);
        }
        self.events.erase_front(ready);
        velocity
    }

    /// Re-stamp every pending note-off to `frame`, hand it to `route`, then
    /// empty the queue. Returns the number of note-offs flushed.
    pub fn flush_note_offs<F>(&mut self, frame: u64, mut route: F) -> usize
    where
        F: FnMut(&MidiEvent),
    {
        let mut flushed = 0;
        for event in self.events.drain() {
            if event.is_note_off() {
                route(&event.with_time(frame));
                flushed += 1;
            }
        }
        flushed
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
