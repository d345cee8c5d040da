//! Transport synchronisation output: MIDI clock/song position and MMC.

use segue_midi::sysex::{self, MMC_DEFERRED_PLAY, MMC_STOP};
use segue_midi::{MidiEvent, MidiMessage, MtcRate, Timecode};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_DIVISION: u32 = 384;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// MIDI clock runs at 24 pulses per quarter note.
pub const CLOCKS_PER_QUARTER: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Send MIDI clock, start/continue/stop and song position.
    pub midi_clock: bool,
    /// Send MIDI machine control sysex.
    pub machine_control: bool,
    pub mtc_rate: MtcRate,
    /// Ticks per quarter note.
    pub division: u32,
    pub sample_rate: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            midi_clock: false,
            machine_control: false,
            mtc_rate: MtcRate::default(),
            division: DEFAULT_DIVISION,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl SyncSettings {
    /// Ticks between two clock pulses.
    #[inline]
    pub fn clock_interval(&self) -> u64 {
        (self.division / CLOCKS_PER_QUARTER).max(1) as u64
    }

    /// Song position in MIDI beats (sixteenth notes).
    #[inline]
    pub fn song_position(&self, tick: u64) -> u16 {
        ((tick * 4) / self.division.max(1) as u64).min(0x3fff) as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    /// Between `begin_seek` and `end_seek`.
    Seeking,
}

/// Generates sync messages for transport changes. Messages are appended to
/// `out` at time 0 (immediate) for the port to route.
#[derive(Debug, Clone)]
pub struct TransportSync {
    settings: SyncSettings,
    send_sync: bool,
    state: TransportState,
    resume: TransportState,
}

impl TransportSync {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            send_sync: false,
            state: TransportState::Stopped,
            resume: TransportState::Stopped,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SyncSettings) {
        self.settings = settings;
    }

    /// Per-port switch for all sync output.
    pub fn send_sync(&self) -> bool {
        self.send_sync
    }

    pub fn set_send_sync(&mut self, send_sync: bool) {
        self.send_sync = send_sync;
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    #[inline]
    fn clock_enabled(&self) -> bool {
        self.send_sync && self.settings.midi_clock
    }

    #[inline]
    fn mmc_enabled(&self) -> bool {
        self.send_sync && self.settings.machine_control
    }

    pub fn start(&mut self, cur_tick: u64, out: &mut Vec<MidiEvent>) {
        self.state = TransportState::Playing;
        debug!(cur_tick, "transport start");
        if self.mmc_enabled() {
            out.push(MidiEvent::sysex(0, &MMC_DEFERRED_PLAY));
        }
        if self.clock_enabled() {
            let msg = if cur_tick != 0 {
                MidiMessage::Continue
            } else {
                MidiMessage::Start
            };
            out.push(MidiEvent::realtime(0, msg));
        }
    }

    /// MMC stop and locate to `frame`, if machine control is on.
    pub fn stop(&mut self, frame: u64, out: &mut Vec<MidiEvent>) {
        self.state = TransportState::Stopped;
        debug!(frame, "transport stop");
        if self.mmc_enabled() {
            let tc = Timecode::from_frame(frame, self.settings.sample_rate, self.settings.mtc_rate);
            out.push(MidiEvent::sysex(0, &MMC_STOP));
            out.push(MidiEvent::new(
                0,
                None,
                MidiMessage::Sysex(sysex::mmc_locate(&tc)),
            ));
        }
    }

    /// Stop, song position, continue, if clock sync is on.
    pub fn begin_seek(&mut self, tick: u64, out: &mut Vec<MidiEvent>) {
        if self.state != TransportState::Seeking {
            self.resume = self.state;
        }
        self.state = TransportState::Seeking;
        debug!(tick, "transport seek");
        if self.clock_enabled() {
            let beats = self.settings.song_position(tick);
            out.push(MidiEvent::realtime(0, MidiMessage::Stop));
            out.push(MidiEvent::realtime(0, MidiMessage::SongPosition { beats }));
            out.push(MidiEvent::realtime(0, MidiMessage::Continue));
        }
    }

    pub fn end_seek(&mut self) {
        if self.state == TransportState::Seeking {
            self.state = self.resume;
        }
    }

    /// Ticks in `[from_tick, to_tick)` on which a clock pulse falls.
    /// Empty unless clock sync is on.
    pub fn clock_ticks(&self, from_tick: u64, to_tick: u64) -> impl Iterator<Item = u64> {
        let interval = self.settings.clock_interval();
        let first = from_tick.div_ceil(interval) * interval;
        let end = if self.clock_enabled() { to_tick } else { first };
        (first..end.max(first)).step_by(interval as usize)
    }
}
