//! Expansion of logical controller changes into wire message sequences.
//!
//! Rules are evaluated in a fixed order, first match wins:
//!
//! 1. [`ControllerId::PROGRAM`]: bank hi (`t`), bank lo (`t+1`), program (`t+2`).
//!    A bank byte of `0xff` means "leave unchanged" and is not sent.
//! 2. [`ControllerId::MASTER_VOLUME`]: one universal master-volume sysex.
//! 3. [`ControllerId::PITCH`]: one pitch-bend message. Its id sits inside the
//!    NRPN 7-bit range, so this rule must run before the table.
//! 4. Otherwise the id's range picks a row of [`BAND_TABLE`].
//!
//! Every sub-message keeps the source channel and is offset from the source
//! time so that receivers see bank select before program change and
//! parameter select before data entry.

use crate::controller::{
    split14, ControllerId, CTRL_14_OFFSET, CTRL_NONE_OFFSET, CTRL_NRPN14_OFFSET,
    CTRL_NRPN_OFFSET, CTRL_RPN14_OFFSET, CTRL_RPN_OFFSET,
};
use crate::error::EncodeError;
use crate::event::{MidiEvent, MidiMessage};
use crate::sysex;
use smallvec::SmallVec;

/// Wire messages produced from one logical event. Never more than four.
pub type Expanded = SmallVec<[MidiEvent; 4]>;

/// Bank byte value meaning "no bank select message".
pub const BANK_UNSET: i32 = 0xff;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Already a plain 7-bit controller.
    Passthrough,
    /// Coarse/fine controller pair.
    HighRes14,
    Rpn7,
    Nrpn7,
    Rpn14,
    Nrpn14,
}

/// `(exclusive upper bound, rule)`, scanned in order.
///
/// Not exhaustive: the synthetic ids (program, master volume, pitch) fall
/// inside these ranges and are handled by exact-id rules first.
pub const BAND_TABLE: [(u32, Expansion); 6] = [
    (CTRL_14_OFFSET, Expansion::Passthrough),
    (CTRL_RPN_OFFSET, Expansion::HighRes14),
    (CTRL_NRPN_OFFSET, Expansion::Rpn7),
    (CTRL_RPN14_OFFSET, Expansion::Nrpn7),
    (CTRL_NRPN14_OFFSET, Expansion::Rpn14),
    (CTRL_NONE_OFFSET, Expansion::Nrpn14),
];

/// Range lookup for ids that are not intercepted by an exact-id rule.
#[inline]
pub fn band_rule(id: ControllerId) -> Option<Expansion> {
    BAND_TABLE
        .iter()
        .find(|(upper, _)| id.raw() < *upper)
        .map(|(_, rule)| *rule)
}

/// Stateless apart from the device id patched into master-volume sysex.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolEncoder {
    device_id: u8,
}

impl Default for ProtocolEncoder {
    fn default() -> Self {
        Self::new(sysex::ALL_DEVICES)
    }
}

impl ProtocolEncoder {
    pub fn new(device_id: u8) -> Self {
        Self { device_id }
    }

    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    pub fn set_device_id(&mut self, device_id: u8) {
        self.device_id = device_id;
    }

    /// Expand `event` into `out`. Non-controller events are copied unchanged.
    pub fn encode(&self, event: &MidiEvent, out: &mut Expanded) -> Result<(), EncodeError> {
        match event.controller_value() {
            Some((id, value)) => self.encode_controller(event, id, value, out),
            None => {
                out.push(event.clone());
                Ok(())
            }
        }
    }

    /// Convenience wrapper returning a fresh buffer.
    pub fn expand(&self, event: &MidiEvent) -> Result<Expanded, EncodeError> {
        let mut out = Expanded::new();
        self.encode(event, &mut out)?;
        Ok(out)
    }

    fn encode_controller(
        &self,
        event: &MidiEvent,
        id: ControllerId,
        value: i32,
        out: &mut Expanded,
    ) -> Result<(), EncodeError> {
        let t = event.time;
        let ch = event.channel;
        let cc = |offset: u64, control: ControllerId, value: i32| {
            MidiEvent::controller(t + offset, ch, control, value)
        };

        if id == ControllerId::PROGRAM {
            let hb = (value >> 16) & 0xff;
            let lb = (value >> 8) & 0xff;
            let program = (value & 0x7f) as u8;
            if hb != BANK_UNSET {
                out.push(cc(0, ControllerId::BANK_HI, hb));
            }
            if lb != BANK_UNSET {
                out.push(cc(1, ControllerId::BANK_LO, lb));
            }
            out.push(MidiEvent::new(t + 2, ch, MidiMessage::Program { program }));
            return Ok(());
        }

        if id == ControllerId::MASTER_VOLUME {
            let body = sysex::master_volume(self.device_id, value);
            out.push(MidiEvent::new(t, None, MidiMessage::Sysex(body)));
            return Ok(());
        }

        if id == ControllerId::PITCH {
            let value = value.clamp(-8192, 8191) as i16;
            out.push(MidiEvent::new(t, ch, MidiMessage::PitchBend { value }));
            return Ok(());
        }

        let rule = band_rule(id).ok_or(EncodeError::UnknownController(id))?;
        let (ctrl_hi, ctrl_lo) = (id.hi() as u32, id.lo() as u32);
        let (data_hi, data_lo) = split14(value);
        let (data_hi, data_lo) = (data_hi as i32, data_lo as i32);

        match rule {
            Expansion::Passthrough => out.push(event.clone()),
            Expansion::HighRes14 => {
                out.push(cc(0, ControllerId(ctrl_hi), data_hi));
                out.push(cc(1, ControllerId(ctrl_lo), data_lo));
            }
            Expansion::Rpn7 | Expansion::Nrpn7 => {
                let (sel_hi, sel_lo) = select_pair(rule);
                out.push(cc(0, sel_hi, ctrl_hi as i32));
                out.push(cc(1, sel_lo, ctrl_lo as i32));
                out.push(cc(2, ControllerId::DATA_HI, value));
            }
            Expansion::Rpn14 | Expansion::Nrpn14 => {
                let (sel_hi, sel_lo) = select_pair(rule);
                out.push(cc(0, sel_hi, ctrl_hi as i32));
                out.push(cc(1, sel_lo, ctrl_lo as i32));
                out.push(cc(2, ControllerId::DATA_HI, data_hi));
                out.push(cc(3, ControllerId::DATA_LO, data_lo));
            }
        }
        Ok(())
    }
}

#[inline]
fn select_pair(rule: Expansion) -> (ControllerId, ControllerId) {
    match rule {
        Expansion::Rpn7 | Expansion::Rpn14 => (ControllerId::RPN_HI, ControllerId::RPN_LO),
        _ => (ControllerId::NRPN_HI, ControllerId::NRPN_LO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cc_of(event: &MidiEvent) -> (u64, u32, i32) {
        let (id, value) = event.controller_value().expect("controller");
        (event.time, id.raw(), value)
    }

    #[test]
    fn test_band_rule_order() {
        assert_eq!(band_rule(ControllerId(0)), Some(Expansion::Passthrough));
        assert_eq!(
            band_rule(ControllerId(CTRL_14_OFFSET)),
            Some(Expansion::HighRes14)
        );
        assert_eq!(
            band_rule(ControllerId(CTRL_RPN14_OFFSET - 1)),
            Some(Expansion::Nrpn7)
        );
        assert_eq!(band_rule(ControllerId(CTRL_NONE_OFFSET)), None);
    }

    #[test]
    fn test_seven_bit_passthrough() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(10, Some(4), ControllerId::VOLUME, 99);
        let out = encoder.expand(&event).unwrap();
        assert_eq!(out.as_slice(), &[event]);
    }

    #[test]
    fn test_non_controller_copied() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::note_on(5, 0, 60, 100);
        let out = encoder.expand(&event).unwrap();
        assert_eq!(out.as_slice(), &[event]);
    }

    #[test]
    fn test_program_with_both_banks() {
        let encoder = ProtocolEncoder::default();
        let value = (1 << 16) | (2 << 8) | 5;
        let event = MidiEvent::controller(100, Some(3), ControllerId::PROGRAM, value);
        let out = encoder.expand(&event).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(cc_of(&out[0]), (100, 0x00, 1));
        assert_eq!(cc_of(&out[1]), (101, 0x20, 2));
        assert_eq!(out[2], MidiEvent::program(102, 3, 5));
    }

    #[test]
    fn test_program_unset_high_bank_is_skipped() {
        let encoder = ProtocolEncoder::default();
        let value = (0xff << 16) | (7 << 8) | 42;
        let event = MidiEvent::controller(0, Some(0), ControllerId::PROGRAM, value);
        let out = encoder.expand(&event).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(cc_of(&out[0]), (1, 0x20, 7));
        assert_eq!(out[1], MidiEvent::program(2, 0, 42));
    }

    #[test]
    fn test_program_no_banks() {
        let encoder = ProtocolEncoder::default();
        let value = (0xff << 16) | (0xff << 8) | 9;
        let event = MidiEvent::controller(0, Some(0), ControllerId::PROGRAM, value);
        let out = encoder.expand(&event).unwrap();
        assert_eq!(out.as_slice(), &[MidiEvent::program(2, 0, 9)]);
    }

    #[test]
    fn test_master_volume_sysex() {
        let encoder = ProtocolEncoder::new(0x11);
        let event = MidiEvent::controller(7, None, ControllerId::MASTER_VOLUME, 0x2005);
        let out = encoder.expand(&event).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, 7);
        match &out[0].msg {
            MidiMessage::Sysex(body) => {
                assert_eq!(body.as_slice(), &[0x7f, 0x11, 0x04, 0x01, 0x05, 0x40]);
            }
            other => panic!("Expected sysex, got {:?}", other),
        }
    }

    #[test]
    fn test_pitch_bend() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(0, Some(1), ControllerId::PITCH, -100);
        let out = encoder.expand(&event).unwrap();
        assert_eq!(out.as_slice(), &[MidiEvent::pitch_bend(0, 1, -100)]);
    }

    #[test]
    fn test_pitch_overrides_its_table_band() {
        assert_eq!(band_rule(ControllerId::PITCH), Some(Expansion::Nrpn7));
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(0, Some(0), ControllerId::PITCH, 5);
        let out = encoder.expand(&event).unwrap();
        assert_eq!(out.as_slice(), &[MidiEvent::pitch_bend(0, 0, 5)]);
    }

    #[test]
    fn test_rpn7_shape() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(50, Some(2), ControllerId::rpn(0, 2), 64);
        let out = encoder.expand(&event).unwrap();

        let got: Vec<_> = out.iter().map(cc_of).collect();
        assert_eq!(got, vec![(50, 0x65, 0), (51, 0x64, 2), (52, 0x06, 64)]);
        assert!(out.iter().all(|e| e.channel == Some(2)));
    }

    #[test]
    fn test_nrpn7_shape() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(0, Some(0), ControllerId::nrpn(1, 8), 3);
        let out = encoder.expand(&event).unwrap();

        let got: Vec<_> = out.iter().map(cc_of).collect();
        assert_eq!(got, vec![(0, 0x63, 1), (1, 0x62, 8), (2, 0x06, 3)]);
    }

    #[test]
    fn test_nrpn14_shape() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(0, Some(0), ControllerId::nrpn14(3, 4), 0x1fff);
        let out = encoder.expand(&event).unwrap();

        let got: Vec<_> = out.iter().map(cc_of).collect();
        assert_eq!(
            got,
            vec![(0, 0x63, 3), (1, 0x62, 4), (2, 0x06, 0x3f), (3, 0x26, 0x7f)]
        );
    }

    #[test]
    fn test_unknown_controller_rejected() {
        let encoder = ProtocolEncoder::default();
        let event = MidiEvent::controller(0, Some(0), ControllerId(CTRL_NONE_OFFSET + 5), 1);
        let mut out = Expanded::new();
        assert_eq!(
            encoder.encode(&event, &mut out),
            Err(EncodeError::UnknownController(ControllerId(CTRL_NONE_OFFSET + 5)))
        );
        assert!(out.is_empty());
    }

    proptest! {
        #[test]
        fn prop_seven_bit_is_identity(id in 0u32..CTRL_14_OFFSET, value in 0i32..128, t in 0u64..1_000_000) {
            let encoder = ProtocolEncoder::default();
            let event = MidiEvent::controller(t, Some(0), ControllerId(id), value);
            let out = encoder.expand(&event).unwrap();
            prop_assert_eq!(out.as_slice(), &[event]);
        }

        #[test]
        fn prop_high_res_recombines(hi in 0u8..128, lo in 0u8..128, value in 0i32..16384, t in 0u64..1_000_000) {
            let encoder = ProtocolEncoder::default();
            let id = ControllerId::high_res(hi, lo);
            let out = encoder.expand(&MidiEvent::controller(t, Some(9), id, value)).unwrap();

            prop_assert_eq!(out.len(), 2);
            let (t0, c0, d0) = cc_of(&out[0]);
            let (t1, c1, d1) = cc_of(&out[1]);
            prop_assert_eq!((t0, t1), (t, t + 1));
            prop_assert_eq!(c0, hi as u32);
            prop_assert_eq!(c1, lo as u32);
            prop_assert_eq!((d0 << 7) | d1, value);
        }

        #[test]
        fn prop_rpn14_order(hi in 0u8..128, lo in 0u8..128, value in 0i32..16384, t in 0u64..1_000_000) {
            let encoder = ProtocolEncoder::default();
            let id = ControllerId::rpn14(hi, lo);
            let out = encoder.expand(&MidiEvent::controller(t, Some(0), id, value)).unwrap();

            let got: Vec<_> = out.iter().map(cc_of).collect();
            prop_assert_eq!(got.len(), 4);
            let controls: Vec<u32> = got.iter().map(|g| g.1).collect();
            prop_assert_eq!(controls, vec![0x65, 0x64, 0x06, 0x26]);
            let times: Vec<u64> = got.iter().map(|g| g.0).collect();
            prop_assert_eq!(times, vec![t, t + 1, t + 2, t + 3]);
            prop_assert_eq!((got[0].2, got[1].2), (hi as i32, lo as i32));
            prop_assert_eq!((got[2].2 << 7) | got[3].2, value);
        }
    }
}
