//! Tracked controller devices and their feature values.
//!
//! Consumers hold [`InputDevice`] handles and query features through the
//! registry. A handle stays valid until its device disconnects or is
//! reconnected, after which it must be re-acquired with
//! [`InputDevices::device_at`].

use log::debug;
use nalgebra::Vector2;
use std::collections::HashMap;

/// Tracked body location a device is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrNode {
    LeftHand,
    RightHand,
}

/// Feature usages shared by common motion controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonUsage {
    TriggerButton,
    /// "A" on the right controller.
    PrimaryButton,
    /// "B" on the right controller.
    SecondaryButton,
    /// Thumbstick, each axis in [-1, 1].
    Primary2DAxis,
}

impl CommonUsage {
    fn is_axis(self) -> bool {
        matches!(self, CommonUsage::Primary2DAxis)
    }
}

/// Handle to a device slot. Generation 0 never names a connected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDevice {
    node: XrNode,
    generation: u32,
}

impl InputDevice {
    pub fn invalid(node: XrNode) -> Self {
        Self {
            node,
            generation: 0,
        }
    }

    pub fn node(&self) -> XrNode {
        self.node
    }
}

#[derive(Debug)]
struct DeviceState {
    name: String,
    generation: u32,
    buttons: HashMap<CommonUsage, bool>,
    axes: HashMap<CommonUsage, Vector2<f32>>,
}

#[derive(Debug, Default)]
pub struct InputDevices {
    slots: HashMap<XrNode, DeviceState>,
    last_generation: u32,
}

impl InputDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a device at `node`, replacing any device already there.
    pub fn connect(&mut self, node: XrNode, name: &str) -> InputDevice {
        self.last_generation += 1;
        let generation = self.last_generation;
        debug!("Device '{}' connected at {:?}", name, node);
        self.slots.insert(
            node,
            DeviceState {
                name: name.to_string(),
                generation,
                buttons: HashMap::new(),
                axes: HashMap::new(),
            },
        );
        InputDevice { node, generation }
    }

    pub fn disconnect(&mut self, node: XrNode) {
        if let Some(state) = self.slots.remove(&node) {
            debug!("Device '{}' disconnected from {:?}", state.name, node);
        }
    }

    /// Current device at `node`; an invalid handle when nothing is connected.
    pub fn device_at(&self, node: XrNode) -> InputDevice {
        self.slots
            .get(&node)
            .map_or(InputDevice::invalid(node), |s| InputDevice {
                node,
                generation: s.generation,
            })
    }

    pub fn is_valid(&self, device: &InputDevice) -> bool {
        device.generation != 0
            && self
                .slots
                .get(&device.node)
                .is_some_and(|s| s.generation == device.generation)
    }

    pub fn name(&self, device: &InputDevice) -> Option<&str> {
        self.state(device).map(|s| s.name.as_str())
    }

    /// Writes a button value on whatever device is at `node`. Ignored when
    /// nothing is connected or `usage` is not a button.
    pub fn set_button(&mut self, node: XrNode, usage: CommonUsage, pressed: bool) {
        if usage.is_axis() {
            return;
        }
        if let Some(state) = self.slots.get_mut(&node) {
            state.buttons.insert(usage, pressed);
        }
    }

    /// Writes an axis value, clamping each component to [-1, 1].
    pub fn set_axis(&mut self, node: XrNode, usage: CommonUsage, value: Vector2<f32>) {
        if !usage.is_axis() {
            return;
        }
        if let Some(state) = self.slots.get_mut(&node) {
            state
                .axes
                .insert(usage, value.map(|c| c.clamp(-1.0, 1.0)));
        }
    }

    /// `None` when the handle is stale or `usage` is not a button.
    pub fn try_get_bool(&self, device: &InputDevice, usage: CommonUsage) -> Option<bool> {
        if usage.is_axis() {
            return None;
        }
        let state = self.state(device)?;
        Some(state.buttons.get(&usage).copied().unwrap_or(false))
    }

    /// `None` when the handle is stale or `usage` is not an axis.
    pub fn try_get_axis(&self, device: &InputDevice, usage: CommonUsage) -> Option<Vector2<f32>> {
        if !usage.is_axis() {
            return None;
        }
        let state = self.state(device)?;
        Some(state.axes.get(&usage).copied().unwrap_or_else(Vector2::zeros))
    }

    fn state(&self, device: &InputDevice) -> Option<&DeviceState> {
        self.slots
            .get(&device.node)
            .filter(|s| device.generation != 0 && s.generation == device.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_is_invalid() {
        let devices = InputDevices::new();
        let right = devices.device_at(XrNode::RightHand);
        assert!(!devices.is_valid(&right));
        assert_eq!(devices.try_get_bool(&right, CommonUsage::TriggerButton), None);
    }

    #[test]
    fn reconnect_invalidates_old_handle() {
        let mut devices = InputDevices::new();
        let first = devices.connect(XrNode::RightHand, "Right Controller");
        assert!(devices.is_valid(&first));

        devices.connect(XrNode::RightHand, "Right Controller");
        assert!(!devices.is_valid(&first));
        assert!(devices.is_valid(&devices.device_at(XrNode::RightHand)));

        devices.disconnect(XrNode::RightHand);
        assert!(!devices.is_valid(&devices.device_at(XrNode::RightHand)));
    }

    #[test]
    fn features_are_typed_and_clamped() {
        let mut devices = InputDevices::new();
        let left = devices.connect(XrNode::LeftHand, "Left Controller");

        assert_eq!(devices.try_get_bool(&left, CommonUsage::TriggerButton), Some(false));
        devices.set_button(XrNode::LeftHand, CommonUsage::TriggerButton, true);
        assert_eq!(devices.try_get_bool(&left, CommonUsage::TriggerButton), Some(true));
        assert_eq!(devices.try_get_bool(&left, CommonUsage::Primary2DAxis), None);

        devices.set_axis(XrNode::LeftHand, CommonUsage::Primary2DAxis, Vector2::new(3.0, -0.5));
        assert_eq!(
            devices.try_get_axis(&left, CommonUsage::Primary2DAxis),
            Some(Vector2::new(1.0, -0.5))
        );
        assert_eq!(devices.try_get_axis(&left, CommonUsage::PrimaryButton), None);
    }
}
