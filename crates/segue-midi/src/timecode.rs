//! SMPTE/MTC timecode split of a frame position.

use serde::{Deserialize, Serialize};

/// MTC frame rate, as carried in the rate bits of MTC/MMC messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MtcRate {
    Fps24 = 0,
    #[default]
    Fps25 = 1,
    /// 29.97 fps drop-frame
    Fps2997Df = 2,
    Fps30 = 3,
}

impl MtcRate {
    pub fn fps(&self) -> f64 {
        match self {
            MtcRate::Fps24 => 24.0,
            MtcRate::Fps25 => 25.0,
            MtcRate::Fps2997Df => 30000.0 / 1001.0,
            MtcRate::Fps30 => 30.0,
        }
    }

    /// Whole frames per second counted by the timecode.
    fn nominal_fps(&self) -> u32 {
        match self {
            MtcRate::Fps24 => 24,
            MtcRate::Fps25 => 25,
            MtcRate::Fps2997Df | MtcRate::Fps30 => 30,
        }
    }

    #[inline]
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    /// Hundredths of a frame.
    pub subframes: u8,
    pub rate: MtcRate,
}

impl Timecode {
    /// Split an absolute time in seconds.
    pub fn from_seconds(seconds: f64, rate: MtcRate) -> Self {
        let seconds = seconds.max(0.0);
        let total_frames = seconds * rate.fps();
        let whole_frames = total_frames.floor();
        let subframes = ((total_frames - whole_frames) * 100.0) as u8;

        let nominal = rate.nominal_fps() as u64;
        let mut frames = whole_frames as u64;
        if rate == MtcRate::Fps2997Df {
            frames = drop_frame_count(frames);
        }

        let frame = (frames % nominal) as u8;
        let total_secs = frames / nominal;

        Self {
            hours: ((total_secs / 3600) % 24) as u8,
            minutes: ((total_secs / 60) % 60) as u8,
            seconds: (total_secs % 60) as u8,
            frames: frame,
            subframes: subframes.min(99),
            rate,
        }
    }

    pub fn from_frame(frame: u64, sample_rate: u32, rate: MtcRate) -> Self {
        let sample_rate = sample_rate.max(1) as f64;
        Self::from_seconds(frame as f64 / sample_rate, rate)
    }
}

/// Convert an elapsed real-frame count to a drop-frame label count:
/// frame numbers 0 and 1 are skipped every minute except each tenth.
fn drop_frame_count(frames: u64) -> u64 {
    const PER_10_MIN: u64 = 17982;
    const PER_MIN: u64 = 1798;

    let tens = frames / PER_10_MIN;
    let rem = frames % PER_10_MIN;
    let skipped = if rem > 1 { 2 * ((rem - 2) / PER_MIN) } else { 0 };
    frames + 18 * tens + skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        let tc = Timecode::from_frame(0, 48000, MtcRate::Fps25);
        assert_eq!(
            (tc.hours, tc.minutes, tc.seconds, tc.frames, tc.subframes),
            (0, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_hms_split() {
        // 1h 2m 3s and half a frame at 25 fps
        let seconds = 3600.0 + 120.0 + 3.0 + 0.5 / 25.0;
        let tc = Timecode::from_seconds(seconds, MtcRate::Fps25);
        assert_eq!(tc.hours, 1);
        assert_eq!(tc.minutes, 2);
        assert_eq!(tc.seconds, 3);
        assert_eq!(tc.frames, 0);
        assert!((49..=50).contains(&tc.subframes));
    }

    #[test]
    fn test_frames_from_samples() {
        // 10 frames into second 1 at 30 fps
        let sample_rate = 48000;
        let frame = sample_rate as u64 + (sample_rate as u64 / 30) * 10 + 100;
        let tc = Timecode::from_frame(frame, sample_rate, MtcRate::Fps30);
        assert_eq!(tc.seconds, 1);
        assert_eq!(tc.frames, 10);
    }

    #[test]
    fn test_drop_frame_skips_labels() {
        // First label after one minute of 29.97 material is 00:01:00;02
        assert_eq!(drop_frame_count(1800), 1802);
        assert_eq!(drop_frame_count(17982), 18000);
    }
}
