//! MIDI output port: drives one processing cycle end to end.
//!
//! ```text
//! intake ─┐
//! curves ─┼─▶ CycleCollector ─▶ EffectsPipeline ─▶ ScheduledQueue
//! tracks ─┘                                            │ time < to_frame
//!                                                      ▼
//!                        sinks ◀── ProtocolEncoder ◀── Router (dedup)
//! ```

use crate::channel::MidiChannel;
use crate::collector::{CycleCollector, CycleWindow};
use crate::curve::CurveSet;
use crate::intake::{event_intake_with_capacity, IntakeConsumer, IntakeProducer};
use crate::meter::VelocityMeter;
use crate::pipeline::{EffectsPipeline, Passthrough};
use crate::router::{RouteTable, Router};
use crate::scheduler::ScheduledQueue;
use crate::tempo::{FixedTempoMap, TempoMap};
use crate::transport::{SyncSettings, TransportState, TransportSync};
use segue_midi::sysex::{self, GM_DEFAULTS, GM_ON, GS_ON, XG_DEFAULTS, XG_ON};
use segue_midi::{
    ControllerId, ControllerStates, MidiEvent, MidiMessage, ProtocolEncoder, MIDI_CHANNELS,
};
use std::sync::Arc;
use tracing::debug;

pub struct MidiOutPort {
    name: String,
    instrument: Option<String>,
    mute: bool,
    intake: IntakeConsumer,
    producer: Option<IntakeProducer>,
    port_curves: CurveSet,
    channels: Vec<MidiChannel>,
    states: ControllerStates,
    collector: CycleCollector,
    pipeline: Box<dyn EffectsPipeline>,
    scheduled: ScheduledQueue,
    router: Router,
    transport: TransportSync,
    tempo: Arc<dyn TempoMap>,
    meter: Arc<VelocityMeter>,
    sync_out: Vec<MidiEvent>,
}

impl MidiOutPort {
    /// Port with 16 channels, a passthrough pipeline and a fixed 120 bpm
    /// tempo map derived from `sync`.
    pub fn new(
        name: impl Into<String>,
        intake_capacity: usize,
        routes: Arc<RouteTable>,
        sync: SyncSettings,
    ) -> Self {
        let name = name.into();
        let (producer, intake) = event_intake_with_capacity(intake_capacity);
        debug!(port = %name, intake_capacity, "MIDI output port created");
        Self {
            name,
            instrument: None,
            mute: false,
            intake,
            producer: Some(producer),
            port_curves: CurveSet::new(),
            channels: (0..MIDI_CHANNELS as u8).map(MidiChannel::new).collect(),
            states: ControllerStates::new(MIDI_CHANNELS),
            collector: CycleCollector::new(),
            pipeline: Box::new(Passthrough),
            scheduled: ScheduledQueue::new(),
            router: Router::new(ProtocolEncoder::default(), routes),
            transport: TransportSync::new(sync),
            tempo: Arc::new(FixedTempoMap::new(120.0, sync.division, sync.sample_rate)),
            meter: Arc::new(VelocityMeter::new()),
            sync_out: Vec::with_capacity(8),
        }
    }

    // ------------------------------------------------------------------
    // Cycle
    // ------------------------------------------------------------------

    /// Run one processing cycle over `[from_tick, to_tick)` /
    /// `[from_frame, to_frame)`. Does nothing while the port is muted.
    pub fn process(&mut self, from_tick: u64, to_tick: u64, from_frame: u64, to_frame: u64) {
        if self.mute {
            return;
        }
        let window = CycleWindow::new(from_tick, to_tick, from_frame, to_frame);
        self.collector.collect(
            &window,
            &mut self.intake,
            &self.port_curves,
            &self.channels,
            self.tempo.as_ref(),
        );
        for tick in self.transport.clock_ticks(from_tick, to_tick) {
            self.collector
                .push(MidiEvent::realtime(self.tempo.tick_to_frame(tick), MidiMessage::Clock));
        }
        self.scheduled
            .apply(self.pipeline.as_mut(), from_tick, to_tick, self.collector.merged());
        self.dispatch_ready(to_frame);
    }

    /// Route every scheduled event with `time < to_frame` and erase it.
    pub fn dispatch_ready(&mut self, to_frame: u64) {
        let router = &mut self.router;
        let states = &mut self.states;
        let velocity = self.scheduled.dispatch_ready(to_frame, |event| {
            router.route_event(event, states);
        });
        self.meter.add_velocity(velocity);
    }

    /// Dedup and fan out one event immediately.
    pub fn route_event(&mut self, event: &MidiEvent) -> bool {
        self.router.route_event(event, &mut self.states)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn start(&mut self, cur_tick: u64) {
        self.transport.start(cur_tick, &mut self.sync_out);
        self.route_sync_out();
    }

    /// Flush pending note-offs, release sustain, then send MMC stop/locate.
    pub fn stop(&mut self, cur_tick: u64) {
        let frame = self.tempo.tick_to_frame(cur_tick);
        self.flush_note_offs(frame);

        for ch in 0..self.channels.len() {
            if !self.channels[ch].has_inputs() {
                continue;
            }
            let ch = ch as u8;
            let sustain_known = self
                .states
                .channel(ch)
                .and_then(|s| s.get(ControllerId::SUSTAIN))
                .is_some();
            if sustain_known {
                self.route_event(&MidiEvent::controller(0, Some(ch), ControllerId::SUSTAIN, 0));
            }
        }

        self.transport.stop(frame, &mut self.sync_out);
        self.route_sync_out();
    }

    /// Jump to `tick`/`frame`: sync messages, note-off flush, then resync
    /// auto-read channel controllers whose curve value changed.
    ///
    /// "Changed" is measured against the value the previous seek resync
    /// sent, not against what playback sent since. A curve value that
    /// playback moved away from and back to is therefore not re-sent.
    pub fn seek(&mut self, tick: u64, frame: u64) {
        self.transport.begin_seek(tick, &mut self.sync_out);
        self.route_sync_out();
        if self.mute {
            self.transport.end_seek();
            return;
        }

        self.flush_note_offs(frame);

        let router = &mut self.router;
        let states = &mut self.states;
        for channel in self.channels.iter_mut() {
            if !channel.is_active() || !channel.auto_read() {
                continue;
            }
            let ch = channel.index();
            for curve in channel.curves_mut().iter_mut() {
                let Some(value) = curve.value_at(tick) else {
                    continue;
                };
                if curve.current_value() == Some(value) {
                    continue;
                }
                router.route_event(&MidiEvent::controller(0, Some(ch), curve.id(), value), states);
                curve.set_current_value(Some(value));
            }
        }
        self.transport.end_seek();
    }

    fn flush_note_offs(&mut self, frame: u64) {
        let router = &mut self.router;
        let states = &mut self.states;
        let flushed = self.scheduled.flush_note_offs(frame, |event| {
            router.route_event(event, states);
        });
        if flushed > 0 {
            debug!(port = %self.name, flushed, frame, "flushed pending note-offs");
        }
    }

    fn route_sync_out(&mut self) {
        for event in self.sync_out.drain(..) {
            self.router.route_event(&event, &mut self.states);
        }
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    // ------------------------------------------------------------------
    // Device initialisation and raw senders
    // ------------------------------------------------------------------

    pub fn send_gm_on(&mut self) {
        self.send_frame(&GM_ON);
        self.seed_channels(GM_DEFAULTS);
        self.meter.reset();
    }

    pub fn send_gs_on(&mut self) {
        for frame in GS_ON.iter() {
            self.send_frame(frame);
        }
    }

    pub fn send_xg_on(&mut self) {
        self.send_frame(&XG_ON);
        self.seed_channels(XG_DEFAULTS);
        self.meter.reset();
    }

    /// Send a caller-built sysex body (no `F0`/`F7`).
    pub fn send_sysex(&mut self, body: &[u8]) -> segue_midi::Result<()> {
        let body = sysex::checked(body)?;
        self.route_event(&MidiEvent::new(0, None, MidiMessage::Sysex(body)));
        Ok(())
    }

    pub fn send_start(&mut self) {
        self.route_event(&MidiEvent::realtime(0, MidiMessage::Start));
    }

    pub fn send_stop(&mut self) {
        self.route_event(&MidiEvent::realtime(0, MidiMessage::Stop));
    }

    pub fn send_continue(&mut self) {
        self.route_event(&MidiEvent::realtime(0, MidiMessage::Continue));
    }

    pub fn send_clock(&mut self) {
        self.route_event(&MidiEvent::realtime(0, MidiMessage::Clock));
    }

    pub fn send_song_position(&mut self, beats: u16) {
        self.route_event(&MidiEvent::realtime(
            0,
            MidiMessage::SongPosition {
                beats: beats & 0x3fff,
            },
        ));
    }

    fn send_frame(&mut self, body: &[u8]) {
        self.route_event(&MidiEvent::sysex(0, body));
    }

    fn seed_channels(&mut self, defaults: &[(ControllerId, i32)]) {
        for state in self.states.channels_mut() {
            state.seed(defaults);
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn instrument(&self) -> Option<&str> {
        self.instrument.as_deref()
    }

    pub fn set_instrument(&mut self, instrument: Option<String>) {
        self.instrument = instrument;
    }

    pub fn is_muted(&self) -> bool {
        self.mute
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn send_sync(&self) -> bool {
        self.transport.send_sync()
    }

    pub fn set_send_sync(&mut self, send_sync: bool) {
        self.transport.set_send_sync(send_sync);
    }

    pub fn sync_settings(&self) -> &SyncSettings {
        self.transport.settings()
    }

    pub fn set_sync_settings(&mut self, settings: SyncSettings) {
        self.transport.set_settings(settings);
    }

    pub fn device_id(&self) -> u8 {
        self.router.encoder().device_id()
    }

    pub fn set_device_id(&mut self, device_id: u8) {
        self.router.set_device_id(device_id);
    }

    pub fn set_pipeline(&mut self, pipeline: Box<dyn EffectsPipeline>) {
        self.pipeline = pipeline;
    }

    pub fn set_tempo_map(&mut self, tempo: Arc<dyn TempoMap>) {
        self.tempo = tempo;
    }

    pub fn tempo_map(&self) -> &Arc<dyn TempoMap> {
        &self.tempo
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        self.router.routes()
    }

    /// The single live-input producer. `None` after the first call.
    pub fn intake_producer(&mut self) -> Option<IntakeProducer> {
        self.producer.take()
    }

    pub fn channel(&self, ch: u8) -> Option<&MidiChannel> {
        self.channels.get(ch as usize)
    }

    pub fn channel_mut(&mut self, ch: u8) -> Option<&mut MidiChannel> {
        self.channels.get_mut(ch as usize)
    }

    pub fn channels(&self) -> &[MidiChannel] {
        &self.channels
    }

    pub fn port_curves(&self) -> &CurveSet {
        &self.port_curves
    }

    pub fn port_curves_mut(&mut self) -> &mut CurveSet {
        &mut self.port_curves
    }

    /// Last-sent controller values, port level and per channel.
    pub fn controller_states(&self) -> &ControllerStates {
        &self.states
    }

    /// Forget all last-sent values, so the next send of anything goes out.
    pub fn reset_controller_states(&mut self) {
        self.states.clear();
    }

    pub fn scheduled(&self) -> &ScheduledQueue {
        &self.scheduled
    }

    pub fn meter(&self) -> &Arc<VelocityMeter> {
        &self.meter
    }

    pub fn channel_meter(&self, ch: u8) -> Option<&Arc<VelocityMeter>> {
        self.channel(ch).map(MidiChannel::meter)
    }
}
