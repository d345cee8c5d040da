//! Recorded controller curves (automation breakpoints in ticks).

use crate::queue::EventList;
use crate::tempo::TempoMap;
use segue_midi::{ControllerId, MidiEvent};
use std::collections::BTreeMap;

/// Breakpoints of one controller, keyed by tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerCurve {
    id: ControllerId,
    points: BTreeMap<u64, i32>,
    /// Value last brought onto the device by a seek resync.
    current: Option<i32>,
}

impl ControllerCurve {
    pub fn new(id: ControllerId) -> Self {
        Self {
            id,
            points: BTreeMap::new(),
            current: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn add(&mut self, tick: u64, value: i32) {
        self.points.insert(tick, value);
    }

    pub fn remove(&mut self, tick: u64) -> Option<i32> {
        self.points.remove(&tick)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (u64, i32)> + '_ {
        self.points.iter().map(|(&t, &v)| (t, v))
    }

    /// Breakpoints in `[from_tick, to_tick)`.
    pub fn range(&self, from_tick: u64, to_tick: u64) -> impl Iterator<Item = (u64, i32)> + '_ {
        let to_tick = to_tick.max(from_tick);
        self.points.range(from_tick..to_tick).map(|(&t, &v)| (t, v))
    }

    /// Value in effect at `tick`: the last breakpoint at or before it.
    /// `None` before the first breakpoint.
    pub fn value_at(&self, tick: u64) -> Option<i32> {
        self.points.range(..=tick).next_back().map(|(_, &v)| v)
    }

    #[inline]
    pub fn current_value(&self) -> Option<i32> {
        self.current
    }

    #[inline]
    pub fn set_current_value(&mut self, value: Option<i32>) {
        self.current = value;
    }
}

/// All curves of one port or one channel, in controller id order.
#[derive(Debug, Clone, Default)]
pub struct CurveSet {
    curves: BTreeMap<ControllerId, ControllerCurve>,
}

impl CurveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ControllerId) -> Option<&ControllerCurve> {
        self.curves.get(&id)
    }

    /// Curve for `id`, created empty if missing.
    pub fn curve_mut(&mut self, id: ControllerId) -> &mut ControllerCurve {
        self.curves
            .entry(id)
            .or_insert_with(|| ControllerCurve::new(id))
    }

    pub fn insert(&mut self, curve: ControllerCurve) {
        self.curves.insert(curve.id(), curve);
    }

    pub fn remove(&mut self, id: ControllerId) -> Option<ControllerCurve> {
        self.curves.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerCurve> {
        self.curves.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ControllerCurve> {
        self.curves.values_mut()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Append one controller event per breakpoint in `[from_tick, to_tick)`,
    /// timed in frames.
    pub fn sample(
        &self,
        from_tick: u64,
        to_tick: u64,
        channel: Option<u8>,
        tempo: &dyn TempoMap,
        out: &mut EventList,
    ) -> usize {
        let mut count = 0;
        for curve in self.curves.values() {
            for (tick, value) in curve.range(from_tick, to_tick) {
                out.add(MidiEvent::controller(
                    tempo.tick_to_frame(tick),
                    channel,
                    curve.id(),
                    value,
                ));
                count += 1;
            }
        }
        count
    }
}
