//! Tick/frame conversion.

/// Musical-to-sample time mapping supplied by the host.
///
/// `tick_to_frame` must be monotonic non-decreasing.
pub trait TempoMap: Send + Sync {
    fn tick_to_frame(&self, tick: u64) -> u64;
    fn frame_to_tick(&self, frame: u64) -> u64;
}

/// Constant tempo map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTempoMap {
    bpm: f64,
    division: u32,
    sample_rate: u32,
}

impl FixedTempoMap {
    pub fn new(bpm: f64, division: u32, sample_rate: u32) -> Self {
        Self {
            bpm: bpm.max(1.0),
            division: division.max(1),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn division(&self) -> u32 {
        self.division
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    fn frames_per_tick(&self) -> f64 {
        self.sample_rate as f64 * 60.0 / (self.bpm * self.division as f64)
    }
}

impl Default for FixedTempoMap {
    fn default() -> Self {
        Self::new(120.0, 384, 44100)
    }
}

impl TempoMap for FixedTempoMap {
    #[inline]
    fn tick_to_frame(&self, tick: u64) -> u64 {
        (tick as f64 * self.frames_per_tick()).round() as u64
    }

    #[inline]
    fn frame_to_tick(&self, frame: u64) -> u64 {
        (frame as f64 / self.frames_per_tick()).floor() as u64
    }
}
