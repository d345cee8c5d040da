//! Persisted port state (JSON).
//!
//! Unknown keys are kept aside and reported, never fatal. A channel entry
//! whose index does not address one of the 16 channels is reported and
//! skipped.

use crate::curve::{ControllerCurve, CurveSet};
use crate::error::Result;
use crate::port::MidiOutPort;
use segue_midi::{sysex::ALL_DEVICES, validate_channel, ControllerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub id: ControllerId,
    /// `(tick, value)` breakpoints.
    pub points: Vec<(u64, i32)>,
}

impl CurveConfig {
    fn from_curve(curve: &ControllerCurve) -> Self {
        Self {
            id: curve.id(),
            points: curve.points().collect(),
        }
    }
}

fn curves_to_config(set: &CurveSet) -> Vec<CurveConfig> {
    set.iter().map(CurveConfig::from_curve).collect()
}

fn curves_from_config(curves: &[CurveConfig]) -> CurveSet {
    let mut set = CurveSet::new();
    for config in curves {
        let curve = set.curve_mut(config.id);
        for &(tick, value) in &config.points {
            curve.add(tick, value);
        }
    }
    set
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Signed so that a bad index is reported per entry, not as a parse error.
    pub idx: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub mute: bool,
    #[serde(default = "default_true")]
    pub auto_read: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curves: Vec<CurveConfig>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub send_sync: bool,
    pub device_id: u8,
    pub mute: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_curves: Vec<CurveConfig>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            instrument: None,
            send_sync: false,
            device_id: ALL_DEVICES,
            mute: false,
            channels: Vec::new(),
            port_curves: Vec::new(),
            unknown: BTreeMap::new(),
        }
    }
}

impl PortConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Log every key that was not understood. Returns how many there were.
    pub fn report_unknown(&self) -> usize {
        let mut count = 0;
        for key in self.unknown.keys() {
            warn!(port = %self.name, "MidiOutPort: unknown tag '{}'", key);
            count += 1;
        }
        for channel in &self.channels {
            for key in channel.unknown.keys() {
                warn!(port = %self.name, idx = channel.idx, "MidiChannel: unknown tag '{}'", key);
                count += 1;
            }
        }
        count
    }
}

impl MidiOutPort {
    /// Snapshot for saving. Channels without inputs are left out.
    pub fn to_config(&self) -> PortConfig {
        PortConfig {
            name: self.name().to_string(),
            instrument: self.instrument().map(str::to_string),
            send_sync: self.send_sync(),
            device_id: self.device_id(),
            mute: self.is_muted(),
            channels: self
                .channels()
                .iter()
                .filter(|c| c.has_inputs())
                .map(|c| ChannelConfig {
                    idx: i64::from(c.index()),
                    name: Some(c.name().to_string()),
                    mute: c.is_muted(),
                    auto_read: c.auto_read(),
                    curves: curves_to_config(c.curves()),
                    unknown: BTreeMap::new(),
                })
                .collect(),
            port_curves: curves_to_config(self.port_curves()),
            unknown: BTreeMap::new(),
        }
    }

    /// Apply a loaded config. Problems are logged and skipped.
    pub fn apply_config(&mut self, config: &PortConfig) {
        config.report_unknown();

        self.set_name(config.name.clone());
        self.set_instrument(config.instrument.clone());
        self.set_send_sync(config.send_sync);
        self.set_device_id(config.device_id);
        self.set_mute(config.mute);
        *self.port_curves_mut() = curves_from_config(&config.port_curves);

        for entry in &config.channels {
            let checked = u8::try_from(entry.idx)
                .map_err(|_| segue_midi::Error::InvalidChannel(u8::MAX))
                .and_then(validate_channel);
            let channel = match checked {
                Ok(ch) => self.channel_mut(ch),
                Err(_) => None,
            };
            let Some(channel) = channel else {
                warn!(port = %config.name, idx = entry.idx, "MidiChannel: bad channel index, ignored");
                continue;
            };
            if let Some(name) = &entry.name {
                channel.set_name(name.clone());
            }
            channel.set_mute(entry.mute);
            channel.set_auto_read(entry.auto_read);
            *channel.curves_mut() = curves_from_config(&entry.curves);
        }
    }
}
