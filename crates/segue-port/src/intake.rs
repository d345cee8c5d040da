//! Live event intake: one producer thread, drained once per cycle.

use crate::queue::EventList;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use segue_midi::{LiveEvent, MidiMessage};
use tracing::warn;

pub const DEFAULT_INTAKE_CAPACITY: usize = 256;

/// Producer side, handed to the UI or any other live input thread.
pub struct IntakeProducer {
    producer: HeapProd<LiveEvent>,
}

impl IntakeProducer {
    /// Never blocks. Returns `false` and drops `event` if the queue is full;
    /// queued events are left untouched.
    #[inline]
    pub fn push(&mut self, event: LiveEvent) -> bool {
        match self.producer.try_push(event) {
            Ok(()) => true,
            Err(dropped) => {
                warn!(
                    channel = ?dropped.channel,
                    "MIDI intake full ({} events), dropping event",
                    self.producer.capacity()
                );
                false
            }
        }
    }

    /// Queue a message to be played at the start of the next cycle.
    #[inline]
    pub fn push_now(&mut self, channel: Option<u8>, msg: MidiMessage) -> bool {
        self.push(LiveEvent::now(channel, msg))
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.producer.vacant_len()
    }
}

/// Consumer side, owned by the processing thread.
pub struct IntakeConsumer {
    consumer: HeapCons<LiveEvent>,
}

impl IntakeConsumer {
    /// All queued events in submission order. Leaves the queue empty.
    pub fn drain_all(&mut self) -> Vec<LiveEvent> {
        let mut events = Vec::with_capacity(self.consumer.occupied_len());
        while let Some(event) = self.consumer.try_pop() {
            events.push(event);
        }
        events
    }

    /// Drain straight into a cycle list, stamping unstamped events with `now`.
    pub fn drain_into(&mut self, now: u64, out: &mut EventList) -> usize {
        let mut count = 0;
        while let Some(event) = self.consumer.try_pop() {
            out.add(event.resolve(now));
            count += 1;
        }
        count
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.consumer.is_empty()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.consumer.occupied_len()
    }
}

pub fn event_intake() -> (IntakeProducer, IntakeConsumer) {
    event_intake_with_capacity(DEFAULT_INTAKE_CAPACITY)
}

pub fn event_intake_with_capacity(capacity: usize) -> (IntakeProducer, IntakeConsumer) {
    let rb = HeapRb::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (IntakeProducer { producer }, IntakeConsumer { consumer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_midi::MidiEvent;

    fn note(n: u8) -> LiveEvent {
        LiveEvent::now(Some(0), MidiMessage::NoteOn { note: n, velocity: 100 })
    }

    #[test]
    fn test_drain_in_submission_order() {
        let (mut producer, mut consumer) = event_intake_with_capacity(8);
        for n in 60..64 {
            assert!(producer.push(note(n)));
        }
        let notes: Vec<_> = consumer
            .drain_all()
            .into_iter()
            .map(|e| match e.msg {
                MidiMessage::NoteOn { note, .. } => note,
                _ => 0,
            })
            .collect();
        assert_eq!(notes, vec![60, 61, 62, 63]);
        assert!(!consumer.has_pending());
    }

    #[test]
    fn test_overflow_drops_newest() {
        let (mut producer, mut consumer) = event_intake_with_capacity(2);
        assert!(producer.push(note(1)));
        assert!(producer.push(note(2)));
        assert!(!producer.push(note(3)));
        assert_eq!(producer.free_len(), 0);

        let drained = consumer.drain_all();
        assert_eq!(drained, vec![note(1), note(2)]);
    }

    #[test]
    fn test_drain_into_stamps_now() {
        let (mut producer, mut consumer) = event_intake();
        producer.push_now(Some(2), MidiMessage::Program { program: 4 });
        producer.push(LiveEvent::at(900, None, MidiMessage::Clock));

        let mut list = EventList::new();
        assert_eq!(consumer.drain_into(512, &mut list), 2);
        assert_eq!(list.as_slice()[0], MidiEvent::program(512, 2, 4));
        assert_eq!(list.as_slice()[1].time, 900);
    }

    #[test]
    fn test_cross_thread_push() {
        let (mut producer, mut consumer) = event_intake_with_capacity(64);
        let handle = std::thread::spawn(move || {
            for n in 0..32 {
                assert!(producer.push(note(n)));
            }
        });
        handle.join().unwrap();
        assert_eq!(consumer.pending_count(), 32);
        assert_eq!(consumer.drain_all().len(), 32);
    }
}
