//! Note-on velocity meters, read from other threads.

use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

#[derive(Debug, Default)]
#[repr(align(64))]
pub struct VelocityMeter {
    value: AtomicF32,
}

impl VelocityMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sum of note-on velocities, scaled to `0.0..=1.0`.
    ///
    #[inline]
    pub fn add_velocity(&self, velocity_sum: u32) {
        if velocity_sum == 0 {
            return;
        }
        let added = velocity_sum as f32 / 127.0;
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |level| {
                Some((level + added).min(1.0))
            });
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    /// Multiply by `factor`; the display side calls this to let the meter fall.
    #[inline]
    pub fn decay(&self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |level| {
                Some(level * factor)
            });
    }

    #[inline]
    pub fn reset(&self) {
        self.value.store(0.0, Ordering::Release);
    }
}
