//! Time-ordered event list.

use segue_midi::MidiEvent;

/// Events kept sorted by `time`. Same-time events stay in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventList {
    events: Vec<MidiEvent>,
}

impl EventList {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Insert after every event with `time <= event.time`.
    #[inline]
    pub fn add(&mut self, event: MidiEvent) {
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, MidiEvent> {
        self.events.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[MidiEvent] {
        &self.events
    }

    pub fn first_time(&self) -> Option<u64> {
        self.events.first().map(|e| e.time)
    }

    /// Length of the prefix with `time < to_frame`.
    #[inline]
    pub fn ready_len(&self, to_frame: u64) -> usize {
        self.events.partition_point(|e| e.time < to_frame)
    }

    /// Remove the first `count` events.
    pub fn erase_front(&mut self, count: usize) {
        self.events.drain(..count.min(self.events.len()));
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, MidiEvent> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Extend<MidiEvent> for EventList {
    fn extend<I: IntoIterator<Item = MidiEvent>>(&mut self, iter: I) {
        for event in iter {
            self.add(event);
        }
    }
}

impl FromIterator<MidiEvent> for EventList {
    fn from_iter<I: IntoIterator<Item = MidiEvent>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a MidiEvent;
    type IntoIter = std::slice::Iter<'a, MidiEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_time_order() {
        let mut list = EventList::new();
        list.add(MidiEvent::note_on(30, 0, 1, 1));
        list.add(MidiEvent::note_on(10, 0, 2, 1));
        list.add(MidiEvent::note_on(20, 0, 3, 1));
        let times: Vec<_> = list.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn test_same_time_is_stable() {
        let mut list = EventList::new();
        for note in 0..4 {
            list.add(MidiEvent::note_on(5, 0, note, 1));
        }
        list.add(MidiEvent::note_on(0, 0, 99, 1));
        let notes: Vec<_> = list
            .iter()
            .map(|e| match e.msg {
                segue_midi::MidiMessage::NoteOn { note, .. } => note,
                _ => 255,
            })
            .collect();
        assert_eq!(notes, vec![99, 0, 1, 2, 3]);
    }

    #[test]
    fn test_ready_prefix() {
        let list: EventList = [0, 10, 10, 20]
            .iter()
            .map(|&t| MidiEvent::note_on(t, 0, 60, 1))
            .collect();
        assert_eq!(list.ready_len(10), 1);
        assert_eq!(list.ready_len(11), 3);
        assert_eq!(list.ready_len(100), 4);
    }
}
