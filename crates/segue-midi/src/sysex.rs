//! Fixed sysex frames (bodies, without `F0`/`F7`).

use crate::controller::ControllerId;
use crate::error::{Error, Result};
use crate::event::SysexData;
use crate::timecode::Timecode;
use smallvec::SmallVec;

/// Universal non-realtime "General MIDI System On".
pub const GM_ON: [u8; 4] = [0x7e, 0x7f, 0x09, 0x01];

/// Roland GS reset, sent as two frames.
pub const GS_ON: [[u8; 9]; 2] = [
    [0x41, 0x10, 0x42, 0x12, 0x40, 0x01, 0x33, 0x50, 0x3c],
    [0x41, 0x10, 0x42, 0x12, 0x40, 0x01, 0x34, 0x50, 0x3b],
];

/// Yamaha "XG System On".
pub const XG_ON: [u8; 7] = [0x43, 0x10, 0x4c, 0x00, 0x00, 0x7e, 0x00];

pub const MMC_STOP: [u8; 4] = [0x7f, 0x7f, 0x06, 0x01];
pub const MMC_DEFERRED_PLAY: [u8; 4] = [0x7f, 0x7f, 0x06, 0x03];

/// Controller values a device holds right after [`GM_ON`].
pub const GM_DEFAULTS: &[(ControllerId, i32)] = &[
    (ControllerId::PROGRAM, 0),
    (ControllerId::PITCH, 0),
    (ControllerId::VOLUME, 100),
    (ControllerId::PAN, 64),
    (ControllerId::REVERB_SEND, 40),
    (ControllerId::CHORUS_SEND, 0),
];

/// Controller values a device holds right after [`XG_ON`].
pub const XG_DEFAULTS: &[(ControllerId, i32)] = &[
    (ControllerId::PROGRAM, 0),
    (ControllerId::MODULATION, 0),
    (ControllerId::PORTAMENTO_TIME, 0),
    (ControllerId::VOLUME, 0x64),
    (ControllerId::PAN, 0x40),
    (ControllerId::EXPRESSION, 0x7f),
    (ControllerId::SUSTAIN, 0),
    (ControllerId::PORTAMENTO, 0),
    (ControllerId::SOSTENUTO, 0),
    (ControllerId::SOFT_PEDAL, 0),
    (ControllerId::HARMONIC_CONTENT, 0x40),
    (ControllerId::RELEASE_TIME, 0x40),
    (ControllerId::ATTACK_TIME, 0x40),
    (ControllerId::BRIGHTNESS, 0x40),
    (ControllerId::REVERB_SEND, 0x28),
    (ControllerId::CHORUS_SEND, 0),
    (ControllerId::VARIATION_SEND, 0),
];

/// Device id meaning "all devices".
pub const ALL_DEVICES: u8 = 127;

/// Universal realtime master volume: `7F dev 04 01 lsb msb`.
pub fn master_volume(device_id: u8, value: i32) -> SysexData {
    SmallVec::from_slice(&[
        0x7f,
        device_id & 0x7f,
        0x04,
        0x01,
        (value & 0x7f) as u8,
        ((value >> 7) & 0x7f) as u8,
    ])
}

/// MMC locate to an absolute timecode: `7F 7F 06 44 06 01 hr mn sc fr sf`.
///
/// The rate code lives in bits 5-6 of the hours byte.
pub fn mmc_locate(tc: &Timecode) -> SysexData {
    SmallVec::from_slice(&[
        0x7f,
        0x7f,
        0x06,
        0x44,
        0x06,
        0x01,
        (tc.hours & 0x1f) | (tc.rate.code() << 5),
        tc.minutes,
        tc.seconds,
        tc.frames,
        tc.subframes,
    ])
}

/// Validate a caller-supplied sysex body: data bytes only, framing stripped.
pub fn checked(body: &[u8]) -> Result<SysexData> {
    if body.is_empty() {
        return Err(Error::InvalidSysex("empty body".into()));
    }
    if let Some(pos) = body.iter().position(|b| b & 0x80 != 0) {
        return Err(Error::InvalidSysex(format!(
            "status byte 0x{:02x} at offset {}",
            body[pos], pos
        )));
    }
    Ok(SmallVec::from_slice(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::MtcRate;

    #[test]
    fn test_master_volume_patches_template() {
        let frame = master_volume(0x10, 0x3fff);
        assert_eq!(frame.as_slice(), &[0x7f, 0x10, 0x04, 0x01, 0x7f, 0x7f]);

        let frame = master_volume(ALL_DEVICES, 200);
        assert_eq!(frame[4], 200 & 0x7f);
        assert_eq!(frame[5], 1);
    }

    #[test]
    fn test_mmc_locate_rate_bits() {
        let tc = Timecode {
            hours: 1,
            minutes: 2,
            seconds: 3,
            frames: 4,
            subframes: 5,
            rate: MtcRate::Fps25,
        };
        let frame = mmc_locate(&tc);
        assert_eq!(frame.len(), 11);
        assert_eq!(frame[6], 1 | (1 << 5));
        assert_eq!(&frame[7..], &[2, 3, 4, 5]);
    }

    #[test]
    fn test_checked_rejects_status_bytes() {
        assert!(checked(&[0x7e, 0x7f]).is_ok());
        assert!(checked(&[]).is_err());
        assert!(checked(&[0xf0, 0x7e]).is_err());
    }
}
