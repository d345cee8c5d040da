//! One addressable voice channel of an output port.

use crate::curve::CurveSet;
use crate::meter::VelocityMeter;
use crate::track::TrackSource;
use std::fmt;
use std::sync::Arc;

pub struct MidiChannel {
    index: u8,
    name: String,
    mute: bool,
    auto_read: bool,
    inputs: Vec<Arc<dyn TrackSource>>,
    curves: CurveSet,
    meter: Arc<VelocityMeter>,
}

impl MidiChannel {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            name: format!("Channel {}", index + 1),
            mute: false,
            auto_read: true,
            inputs: Vec::new(),
            curves: CurveSet::new(),
            meter: Arc::new(VelocityMeter::new()),
        }
    }

    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    /// Whether curves are replayed and resynced on seek.
    #[inline]
    pub fn auto_read(&self) -> bool {
        self.auto_read
    }

    pub fn set_auto_read(&mut self, auto_read: bool) {
        self.auto_read = auto_read;
    }

    pub fn add_input(&mut self, track: Arc<dyn TrackSource>) {
        self.inputs.push(track);
    }

    pub fn clear_inputs(&mut self) {
        self.inputs.clear();
    }

    #[inline]
    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Arc<dyn TrackSource>] {
        &self.inputs
    }

    /// Not muted and fed by at least one track.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.mute && self.has_inputs()
    }

    pub fn curves(&self) -> &CurveSet {
        &self.curves
    }

    pub fn curves_mut(&mut self) -> &mut CurveSet {
        &mut self.curves
    }

    pub fn meter(&self) -> &Arc<VelocityMeter> {
        &self.meter
    }
}

impl fmt::Debug for MidiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidiChannel")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("mute", &self.mute)
            .field("auto_read", &self.auto_read)
            .field("inputs", &self.inputs.len())
            .field("curves", &self.curves.len())
            .finish()
    }
}
