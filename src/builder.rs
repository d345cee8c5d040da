//! Builder for configuring and constructing a [`MidiOutPort`].

use crate::{Error, Result};
use segue_port::{
    EffectsPipeline, MidiOutPort, PortConfig, Route, RouteTable, SyncSettings, TempoMap,
};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "midi-hardware")]
use segue_port::{HardwareOutput, DEFAULT_HARDWARE_QUEUE};

/// Default number of live events the intake can hold between two cycles.
pub const DEFAULT_INTAKE_CAPACITY: usize = segue_port::intake::DEFAULT_INTAKE_CAPACITY;

/// # Example
///
/// ```
/// use segue::prelude::*;
///
/// let port = OutPortBuilder::new("Synth Out")
///     .device_id(0x10)
///     .send_sync(true)
///     .sync(SyncSettings { midi_clock: true, ..Default::default() })
///     .build()?;
/// assert_eq!(port.device_id(), 0x10);
/// # Ok::<(), segue::Error>(())
/// ```
pub struct OutPortBuilder {
    name: String,
    intake_capacity: usize,
    sync: SyncSettings,
    send_sync: bool,
    device_id: Option<u8>,
    pipeline: Option<Box<dyn EffectsPipeline>>,
    tempo: Option<Arc<dyn TempoMap>>,
    routes: Option<Arc<RouteTable>>,
    extra_routes: Vec<Route>,
    config: Option<PortConfig>,

    #[cfg(feature = "midi-hardware")]
    hardware_device: Option<String>,
}

impl OutPortBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            sync: SyncSettings::default(),
            send_sync: false,
            device_id: None,
            pipeline: None,
            tempo: None,
            routes: None,
            extra_routes: Vec::new(),
            config: None,

            #[cfg(feature = "midi-hardware")]
            hardware_device: None,
        }
    }

    /// Default: 256
    pub fn intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    pub fn sync(mut self, settings: SyncSettings) -> Self {
        self.sync = settings;
        self
    }

    /// Default: false
    pub fn send_sync(mut self, enabled: bool) -> Self {
        self.send_sync = enabled;
        self
    }

    /// Default: 127 (all devices)
    pub fn device_id(mut self, device_id: u8) -> Self {
        self.device_id = Some(device_id);
        self
    }

    pub fn pipeline(mut self, pipeline: impl EffectsPipeline + 'static) -> Self {
        self.pipeline = Some(Box::new(pipeline));
        self
    }

    /// Default: constant 120 bpm at the sync settings' division and rate.
    pub fn tempo_map(mut self, tempo: Arc<dyn TempoMap>) -> Self {
        self.tempo = Some(tempo);
        self
    }

    /// Share a route table with other owners instead of creating one.
    pub fn route_table(mut self, routes: Arc<RouteTable>) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.extra_routes.push(route);
        self
    }

    /// Restore saved state. Applied before the explicit settings above.
    pub fn config(mut self, config: PortConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Open a system MIDI output whose name contains `name` and route to it.
    #[cfg(feature = "midi-hardware")]
    pub fn hardware_device(mut self, name: impl Into<String>) -> Self {
        self.hardware_device = Some(name.into());
        self
    }

    pub fn build(self) -> Result<MidiOutPort> {
        if self.intake_capacity == 0 {
            return Err(Error::InvalidSetting(
                "intake capacity must be at least 1".to_string(),
            ));
        }
        if let Some(id) = self.device_id.filter(|id| *id > 0x7f) {
            return Err(Error::InvalidSetting(format!(
                "device id {} is not a 7-bit value",
                id
            )));
        }

        let routes = self.routes.unwrap_or_default();
        for route in self.extra_routes {
            routes.add(route);
        }

        #[cfg(feature = "midi-hardware")]
        if let Some(name) = &self.hardware_device {
            let output = HardwareOutput::connect(name, DEFAULT_HARDWARE_QUEUE)?;
            routes.add(Route::Hardware(Arc::new(output)));
        }

        let mut port = MidiOutPort::new(self.name.clone(), self.intake_capacity, routes, self.sync);
        if let Some(config) = &self.config {
            port.apply_config(config);
            port.set_name(self.name);
        }
        if self.send_sync {
            port.set_send_sync(true);
        }
        if let Some(device_id) = self.device_id {
            port.set_device_id(device_id);
        }
        if let Some(pipeline) = self.pipeline {
            port.set_pipeline(pipeline);
        }
        if let Some(tempo) = self.tempo {
            port.set_tempo_map(tempo);
        }

        debug!(port = %port.name(), routes = port.routes().len(), "output port built");
        Ok(port)
    }
}
