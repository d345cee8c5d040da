//! Controller id space.
//!
//! A [`ControllerId`] is a 32-bit number whose range decides how it reaches
//! the wire. The bands are disjoint and ordered; their thresholds are a fixed
//! protocol contract and must not be reordered:
//!
//! ```text
//! 0x00000 ..0x10000   plain 7-bit controller (the id is the CC number)
//! 0x10000 ..0x20000   14-bit controller pair   (hi CC << 8 | lo CC)
//! 0x20000 ..0x30000   RPN, 7-bit data          (param hi << 8 | param lo)
//! 0x30000 ..0x50000   NRPN, 7-bit data         (includes the internal ids)
//! 0x50000 ..0x60000   RPN, 14-bit data
//! 0x60000 ..0x70000   NRPN, 14-bit data
//! ```
//!
//! The internal band starting at `0x40000` holds synthetic ids (pitch,
//! program, velocity, master volume) that never go out as NRPN; the encoder
//! intercepts them before consulting the range table.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerId(pub u32);

pub const CTRL_7_OFFSET: u32 = 0x0_0000;
pub const CTRL_14_OFFSET: u32 = 0x1_0000;
pub const CTRL_RPN_OFFSET: u32 = 0x2_0000;
pub const CTRL_NRPN_OFFSET: u32 = 0x3_0000;
pub const CTRL_INTERNAL_OFFSET: u32 = 0x4_0000;
pub const CTRL_RPN14_OFFSET: u32 = 0x5_0000;
pub const CTRL_NRPN14_OFFSET: u32 = 0x6_0000;
pub const CTRL_NONE_OFFSET: u32 = 0x7_0000;

/// Which encoding family an id belongs to, by range alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerBand {
    Seven,
    HighRes14,
    Rpn7,
    Nrpn7,
    Rpn14,
    Nrpn14,
    Unknown,
}

impl ControllerId {
    // Standard MIDI CC numbers.
    pub const BANK_HI: Self = Self(0x00);
    pub const MODULATION: Self = Self(0x01);
    pub const PORTAMENTO_TIME: Self = Self(0x05);
    pub const DATA_HI: Self = Self(0x06);
    pub const VOLUME: Self = Self(0x07);
    pub const PAN: Self = Self(0x0a);
    pub const EXPRESSION: Self = Self(0x0b);
    pub const BANK_LO: Self = Self(0x20);
    pub const DATA_LO: Self = Self(0x26);
    pub const SUSTAIN: Self = Self(0x40);
    pub const PORTAMENTO: Self = Self(0x41);
    pub const SOSTENUTO: Self = Self(0x42);
    pub const SOFT_PEDAL: Self = Self(0x43);
    pub const HARMONIC_CONTENT: Self = Self(0x47);
    pub const RELEASE_TIME: Self = Self(0x48);
    pub const ATTACK_TIME: Self = Self(0x49);
    pub const BRIGHTNESS: Self = Self(0x4a);
    pub const REVERB_SEND: Self = Self(0x5b);
    pub const CHORUS_SEND: Self = Self(0x5d);
    pub const VARIATION_SEND: Self = Self(0x5e);
    pub const NRPN_LO: Self = Self(0x62);
    pub const NRPN_HI: Self = Self(0x63);
    pub const RPN_LO: Self = Self(0x64);
    pub const RPN_HI: Self = Self(0x65);

    // Synthetic ids.
    pub const PITCH: Self = Self(CTRL_INTERNAL_OFFSET);
    pub const PROGRAM: Self = Self(CTRL_INTERNAL_OFFSET + 1);
    pub const VELOCITY: Self = Self(CTRL_INTERNAL_OFFSET + 2);
    pub const MASTER_VOLUME: Self = Self(CTRL_INTERNAL_OFFSET + 3);

    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// 14-bit controller pair from coarse and fine CC numbers.
    #[inline]
    pub const fn high_res(hi_cc: u8, lo_cc: u8) -> Self {
        Self(CTRL_14_OFFSET | ((hi_cc as u32 & 0x7f) << 8) | (lo_cc as u32 & 0x7f))
    }

    #[inline]
    pub const fn rpn(param_hi: u8, param_lo: u8) -> Self {
        Self(CTRL_RPN_OFFSET | ((param_hi as u32 & 0x7f) << 8) | (param_lo as u32 & 0x7f))
    }

    #[inline]
    pub const fn nrpn(param_hi: u8, param_lo: u8) -> Self {
        Self(CTRL_NRPN_OFFSET | ((param_hi as u32 & 0x7f) << 8) | (param_lo as u32 & 0x7f))
    }

    #[inline]
    pub const fn rpn14(param_hi: u8, param_lo: u8) -> Self {
        Self(CTRL_RPN14_OFFSET | ((param_hi as u32 & 0x7f) << 8) | (param_lo as u32 & 0x7f))
    }

    #[inline]
    pub const fn nrpn14(param_hi: u8, param_lo: u8) -> Self {
        Self(CTRL_NRPN14_OFFSET | ((param_hi as u32 & 0x7f) << 8) | (param_lo as u32 & 0x7f))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// High half of the controller/parameter number, `(id >> 8) & 0x7f`.
    #[inline]
    pub const fn hi(self) -> u8 {
        ((self.0 >> 8) & 0x7f) as u8
    }

    /// Low half of the controller/parameter number, `id & 0x7f`.
    #[inline]
    pub const fn lo(self) -> u8 {
        (self.0 & 0x7f) as u8
    }

    pub fn band(self) -> ControllerBand {
        match self.0 {
            id if id < CTRL_14_OFFSET => ControllerBand::Seven,
            id if id < CTRL_RPN_OFFSET => ControllerBand::HighRes14,
            id if id < CTRL_NRPN_OFFSET => ControllerBand::Rpn7,
            id if id < CTRL_RPN14_OFFSET => ControllerBand::Nrpn7,
            id if id < CTRL_NRPN14_OFFSET => ControllerBand::Rpn14,
            id if id < CTRL_NONE_OFFSET => ControllerBand::Nrpn14,
            _ => ControllerBand::Unknown,
        }
    }

    #[inline]
    pub fn is_internal(self) -> bool {
        (CTRL_INTERNAL_OFFSET..CTRL_RPN14_OFFSET).contains(&self.0)
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<u32> for ControllerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Split a 14-bit value into `(hi, lo)` 7-bit halves.
#[inline]
pub const fn split14(value: i32) -> (u8, u8) {
    (((value >> 7) & 0x7f) as u8, (value & 0x7f) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ControllerId(0x7f).band(), ControllerBand::Seven);
        assert_eq!(ControllerId(CTRL_14_OFFSET - 1).band(), ControllerBand::Seven);
        assert_eq!(ControllerId(CTRL_14_OFFSET).band(), ControllerBand::HighRes14);
        assert_eq!(ControllerId(CTRL_RPN_OFFSET).band(), ControllerBand::Rpn7);
        assert_eq!(ControllerId(CTRL_NRPN_OFFSET).band(), ControllerBand::Nrpn7);
        assert_eq!(ControllerId(CTRL_RPN14_OFFSET).band(), ControllerBand::Rpn14);
        assert_eq!(ControllerId(CTRL_NRPN14_OFFSET).band(), ControllerBand::Nrpn14);
        assert_eq!(ControllerId(CTRL_NONE_OFFSET).band(), ControllerBand::Unknown);
    }

    #[test]
    fn test_internal_ids_sit_in_nrpn_range() {
        assert_eq!(ControllerId::PROGRAM.band(), ControllerBand::Nrpn7);
        assert!(ControllerId::PROGRAM.is_internal());
        assert!(ControllerId::MASTER_VOLUME.is_internal());
        assert!(!ControllerId::nrpn(1, 2).is_internal());
    }

    #[test]
    fn test_constructors_split_back() {
        let id = ControllerId::high_res(0x07, 0x27);
        assert_eq!(id.hi(), 0x07);
        assert_eq!(id.lo(), 0x27);

        let id = ControllerId::rpn14(0, 1);
        assert_eq!(id.band(), ControllerBand::Rpn14);
        assert_eq!((id.hi(), id.lo()), (0, 1));
    }

    #[test]
    fn test_split14() {
        assert_eq!(split14(0x3fff), (0x7f, 0x7f));
        assert_eq!(split14(8192), (0x40, 0x00));
        assert_eq!(split14(129), (1, 1));
    }
}
