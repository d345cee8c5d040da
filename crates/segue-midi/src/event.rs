//! Sequencer-side MIDI events with frame timing.
//!
//! A [`MidiEvent`] is either logical (a controller change addressed by a full
//! [`ControllerId`], possibly needing several wire messages) or already
//! wire-level. The [`crate::encoder`] turns the former into the latter.

use crate::controller::ControllerId;
use crate::error::{Error, Result};
use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};
use smallvec::SmallVec;

/// Number of addressable channels on one port.
pub const MIDI_CHANNELS: usize = 16;

/// Accept a channel number only if it addresses one of [`MIDI_CHANNELS`].
pub fn validate_channel(channel: u8) -> Result<u8> {
    if (channel as usize) < MIDI_CHANNELS {
        Ok(channel)
    } else {
        Err(Error::InvalidChannel(channel))
    }
}

/// Sysex body without the `F0`/`F7` framing bytes.
pub type SysexData = SmallVec<[u8; 16]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    Controller { id: ControllerId, value: i32 },
    Program { program: u8 },
    /// Signed, -8192..=8191.
    PitchBend { value: i16 },
    Sysex(SysexData),
    Start,
    Continue,
    Stop,
    Clock,
    /// Position in MIDI beats (sixteenth notes).
    SongPosition { beats: u16 },
}

/// Event scheduled at an absolute frame.
///
/// `channel == None` addresses the whole port (port-level controllers,
/// sysex, transport messages).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    pub time: u64,
    pub channel: Option<u8>,
    pub msg: MidiMessage,
}

impl MidiEvent {
    #[inline]
    pub fn new(time: u64, channel: Option<u8>, msg: MidiMessage) -> Self {
        Self { time, channel, msg }
    }

    #[inline]
    pub fn note_on(time: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(time, Some(channel), MidiMessage::NoteOn { note, velocity })
    }

    #[inline]
    pub fn note_off(time: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(time, Some(channel), MidiMessage::NoteOff { note, velocity })
    }

    #[inline]
    pub fn controller(time: u64, channel: Option<u8>, id: ControllerId, value: i32) -> Self {
        Self::new(time, channel, MidiMessage::Controller { id, value })
    }

    #[inline]
    pub fn program(time: u64, channel: u8, program: u8) -> Self {
        Self::new(time, Some(channel), MidiMessage::Program { program })
    }

    #[inline]
    pub fn pitch_bend(time: u64, channel: u8, value: i16) -> Self {
        Self::new(time, Some(channel), MidiMessage::PitchBend { value })
    }

    pub fn sysex(time: u64, body: &[u8]) -> Self {
        Self::new(time, None, MidiMessage::Sysex(SmallVec::from_slice(body)))
    }

    #[inline]
    pub fn realtime(time: u64, msg: MidiMessage) -> Self {
        Self::new(time, None, msg)
    }

    #[inline]
    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    #[inline]
    pub fn with_channel(mut self, channel: Option<u8>) -> Self {
        self.channel = channel;
        self
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self.msg, MidiMessage::NoteOn { velocity, .. } if velocity > 0)
    }

    #[inline]
    pub fn is_note_off(&self) -> bool {
        matches!(
            self.msg,
            MidiMessage::NoteOff { .. } | MidiMessage::NoteOn { velocity: 0, .. }
        )
    }

    #[inline]
    pub fn is_controller(&self) -> bool {
        matches!(self.msg, MidiMessage::Controller { .. })
    }

    /// Velocity of a note-on, used for metering.
    #[inline]
    pub fn note_on_velocity(&self) -> Option<u8> {
        match self.msg {
            MidiMessage::NoteOn { velocity, .. } if velocity > 0 => Some(velocity),
            _ => None,
        }
    }

    #[inline]
    pub fn controller_value(&self) -> Option<(ControllerId, i32)> {
        match self.msg {
            MidiMessage::Controller { id, value } => Some((id, value)),
            _ => None,
        }
    }

    /// Wire bytes for a wire-level event.
    ///
    /// Returns `None` for controller ids that need expansion first (anything
    /// above 0x7f). Port-level channel messages go out on channel 0.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        let channel = Channel::from_u8(self.channel.unwrap_or(0) & 0x0f);
        let voice = |msg: ChannelVoiceMsg| Some(MidiMsg::ChannelVoice { channel, msg }.to_midi());

        match &self.msg {
            MidiMessage::NoteOn { note, velocity } => voice(ChannelVoiceMsg::NoteOn {
                note: note & 0x7f,
                velocity: velocity & 0x7f,
            }),
            MidiMessage::NoteOff { note, velocity } => voice(ChannelVoiceMsg::NoteOff {
                note: note & 0x7f,
                velocity: velocity & 0x7f,
            }),
            MidiMessage::Controller { id, value } => {
                if id.raw() > 0x7f {
                    return None;
                }
                voice(ChannelVoiceMsg::ControlChange {
                    control: ControlChange::CC {
                        control: id.raw() as u8,
                        value: (*value & 0x7f) as u8,
                    },
                })
            }
            MidiMessage::Program { program } => voice(ChannelVoiceMsg::ProgramChange {
                program: program & 0x7f,
            }),
            MidiMessage::PitchBend { value } => {
                let bend = (*value as i32 + 8192).clamp(0, 16383) as u16;
                voice(ChannelVoiceMsg::PitchBend { bend })
            }
            MidiMessage::Sysex(body) => {
                let mut bytes = Vec::with_capacity(body.len() + 2);
                bytes.push(0xf0);
                bytes.extend(body.iter().map(|b| b & 0x7f));
                bytes.push(0xf7);
                Some(bytes)
            }
            MidiMessage::Clock => Some(vec![0xf8]),
            MidiMessage::Start => Some(vec![0xfa]),
            MidiMessage::Continue => Some(vec![0xfb]),
            MidiMessage::Stop => Some(vec![0xfc]),
            MidiMessage::SongPosition { beats } => {
                Some(vec![0xf2, (beats & 0x7f) as u8, ((beats >> 7) & 0x7f) as u8])
            }
        }
    }
}

/// Event submitted from a live producer.
///
/// `time == None` means "play now": the collector stamps it with the start
/// frame of the cycle that drains it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveEvent {
    pub time: Option<u64>,
    pub channel: Option<u8>,
    pub msg: MidiMessage,
}

impl LiveEvent {
    #[inline]
    pub fn now(channel: Option<u8>, msg: MidiMessage) -> Self {
        Self {
            time: None,
            channel,
            msg,
        }
    }

    #[inline]
    pub fn at(time: u64, channel: Option<u8>, msg: MidiMessage) -> Self {
        Self {
            time: Some(time),
            channel,
            msg,
        }
    }

    #[inline]
    pub fn resolve(self, now: u64) -> MidiEvent {
        MidiEvent {
            time: self.time.unwrap_or(now),
            channel: self.channel,
            msg: self.msg,
        }
    }
}

impl From<MidiEvent> for LiveEvent {
    fn from(event: MidiEvent) -> Self {
        Self::at(event.time, event.channel, event.msg)
    }
}
