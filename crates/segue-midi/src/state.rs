//! Last-sent controller values for one port or one channel.

use crate::controller::ControllerId;
use std::collections::HashMap;

/// Mirror of what the receiving device currently holds.
///
/// Written only by the router after it decides to send; a suppressed send
/// leaves the store untouched. Missing entries mean "unknown".
#[derive(Debug, Clone, Default)]
pub struct HardwareState {
    values: HashMap<ControllerId, i32>,
}

impl HardwareState {
    pub fn new() -> Self {
        Self {
            values: HashMap::with_capacity(32),
        }
    }

    #[inline]
    pub fn get(&self, id: ControllerId) -> Option<i32> {
        self.values.get(&id).copied()
    }

    #[inline]
    pub fn set(&mut self, id: ControllerId, value: i32) {
        self.values.insert(id, value);
    }

    #[inline]
    pub fn forget(&mut self, id: ControllerId) {
        self.values.remove(&id);
    }

    /// `true` if sending `value` for `id` would not change the device.
    #[inline]
    pub fn is_current(&self, id: ControllerId, value: i32) -> bool {
        self.get(id) == Some(value)
    }

    /// Record a send. Returns `false` if the value was already current.
    #[inline]
    pub fn update(&mut self, id: ControllerId, value: i32) -> bool {
        if self.is_current(id, value) {
            return false;
        }
        self.set(id, value);
        true
    }

    /// Overwrite with the values a device reset is known to leave behind.
    pub fn seed(&mut self, defaults: &[(ControllerId, i32)]) {
        for &(id, value) in defaults {
            self.set(id, value);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Port-level store plus one store per channel.
#[derive(Debug, Clone)]
pub struct ControllerStates {
    port: HardwareState,
    channels: Vec<HardwareState>,
}

impl ControllerStates {
    pub fn new(channels: usize) -> Self {
        Self {
            port: HardwareState::new(),
            channels: (0..channels).map(|_| HardwareState::new()).collect(),
        }
    }

    /// Store addressed by an event channel (`None` = port level).
    ///
    /// Out-of-range channels resolve to `None`.
    #[inline]
    pub fn resolve_mut(&mut self, channel: Option<u8>) -> Option<&mut HardwareState> {
        match channel {
            None => Some(&mut self.port),
            Some(ch) => self.channels.get_mut(ch as usize),
        }
    }

    #[inline]
    pub fn resolve(&self, channel: Option<u8>) -> Option<&HardwareState> {
        match channel {
            None => Some(&self.port),
            Some(ch) => self.channels.get(ch as usize),
        }
    }

    pub fn port(&self) -> &HardwareState {
        &self.port
    }

    pub fn channel(&self, ch: u8) -> Option<&HardwareState> {
        self.channels.get(ch as usize)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut HardwareState> {
        self.channels.iter_mut()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn clear(&mut self) {
        self.port.clear();
        self.channels.iter_mut().for_each(HardwareState::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_by_default() {
        let state = HardwareState::new();
        assert_eq!(state.get(ControllerId::VOLUME), None);
        assert!(!state.is_current(ControllerId::VOLUME, 0));
    }

    #[test]
    fn test_update_reports_changes_only() {
        let mut state = HardwareState::new();
        assert!(state.update(ControllerId::VOLUME, 100));
        assert!(!state.update(ControllerId::VOLUME, 100));
        assert!(state.update(ControllerId::VOLUME, 101));
        assert_eq!(state.get(ControllerId::VOLUME), Some(101));
    }

    #[test]
    fn test_seed_overwrites() {
        let mut state = HardwareState::new();
        state.set(ControllerId::VOLUME, 3);
        state.seed(&[(ControllerId::VOLUME, 100), (ControllerId::PAN, 64)]);
        assert_eq!(state.get(ControllerId::VOLUME), Some(100));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_resolve_port_and_channels() {
        let mut states = ControllerStates::new(16);
        states
            .resolve_mut(None)
            .unwrap()
            .set(ControllerId::MASTER_VOLUME, 1);
        states
            .resolve_mut(Some(3))
            .unwrap()
            .set(ControllerId::PAN, 64);

        assert_eq!(states.port().get(ControllerId::MASTER_VOLUME), Some(1));
        assert_eq!(states.channel(3).unwrap().get(ControllerId::PAN), Some(64));
        assert_eq!(states.channel(2).unwrap().get(ControllerId::PAN), None);
        assert!(states.resolve_mut(Some(16)).is_none());
    }
}
