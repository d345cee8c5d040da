//! Per-port effects pipeline seam.

use crate::queue::EventList;

/// Transforms one cycle's merged events and appends the result to the
/// port's scheduled queue.
///
/// Implementations may reorder, filter or transform, but `output` must stay
/// time-sorted; appending through [`EventList::add`] guarantees that.
pub trait EffectsPipeline: Send {
    fn apply(&mut self, from_tick: u64, to_tick: u64, input: &EventList, output: &mut EventList);
}

/// Copies every event unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl EffectsPipeline for Passthrough {
    fn apply(&mut self, _from_tick: u64, _to_tick: u64, input: &EventList, output: &mut EventList) {
        output.extend(input.iter().cloned());
    }
}

/// Runs stages in order, feeding each one the previous stage's output.
#[derive(Default)]
pub struct PipelineChain {
    stages: Vec<Box<dyn EffectsPipeline>>,
    scratch: EventList,
}

impl PipelineChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl EffectsPipeline + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl EffectsPipeline for PipelineChain {
    fn apply(&mut self, from_tick: u64, to_tick: u64, input: &EventList, output: &mut EventList) {
        let mut current = input.clone();
        for stage in self.stages.iter_mut() {
            self.scratch.clear();
            stage.apply(from_tick, to_tick, &current, &mut self.scratch);
            std::mem::swap(&mut current, &mut self.scratch);
        }
        output.extend(current.drain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_midi::{MidiEvent, MidiMessage};

    struct Transpose(i8);

    impl EffectsPipeline for Transpose {
        fn apply(&mut self, _: u64, _: u64, input: &EventList, output: &mut EventList) {
            for event in input {
                let mut event = event.clone();
                if let MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } =
                    &mut event.msg
                {
                    *note = note.saturating_add_signed(self.0).min(127);
                }
                output.add(event);
            }
        }
    }

    #[test]
    fn test_passthrough_appends_in_order() {
        let input: EventList = [MidiEvent::note_on(5, 0, 60, 1), MidiEvent::note_on(1, 0, 61, 1)]
            .into_iter()
            .collect();
        let mut output: EventList = std::iter::once(MidiEvent::note_on(3, 0, 1, 1)).collect();
        Passthrough.apply(0, 10, &input, &mut output);
        let times: Vec<_> = output.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1, 3, 5]);
    }

    #[test]
    fn test_chain_runs_stages_in_order() {
        let mut chain = PipelineChain::new().with_stage(Transpose(12)).with_stage(Transpose(-1));
        let input: EventList = std::iter::once(MidiEvent::note_on(0, 0, 60, 100)).collect();
        let mut output = EventList::new();
        chain.apply(0, 10, &input, &mut output);
        assert_eq!(output.as_slice(), &[MidiEvent::note_on(0, 0, 71, 100)]);
    }
}
