//! Desktop stand-in for the two motion controllers.
//!
//! | Control            | Keys / mouse          |
//! |--------------------|-----------------------|
//! | Left stick         | W A S D               |
//! | Right stick        | Arrow keys            |
//! | Right trigger      | Space                 |
//! | A / B              | E / Q                 |
//! | Right-hand aim     | Drag in the viewport  |

use crate::input::devices::{CommonUsage, InputDevices, XrNode};
use crate::scene::graph::{NodeId, Scene};
use nalgebra::{UnitQuaternion, Vector2, Vector3};
use std::f32::consts::PI;

/// Snapshot of the desktop controls for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatorInput {
    pub move_forward: bool,
    pub move_back: bool,
    pub move_left: bool,
    pub move_right: bool,

    pub stick_left: bool,
    pub stick_right: bool,
    pub stick_up: bool,
    pub stick_down: bool,

    pub trigger: bool,
    pub primary: bool,
    pub secondary: bool,

    /// Pointer drag since last frame, in screen pixels (y down).
    pub aim_delta: Vector2<f32>,
}

pub struct ControllerEmulator {
    pub sensitivity: f32,

    // Right-hand aim
    pub yaw: f32,
    pub pitch: f32,
}

impl ControllerEmulator {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Connects both emulated controllers.
    pub fn connect(&self, devices: &mut InputDevices) {
        devices.connect(XrNode::LeftHand, "Emulated Left Controller");
        devices.connect(XrNode::RightHand, "Emulated Right Controller");
    }

    /// Pushes this frame's controls into the device registry and aims the right hand.
    pub fn apply(
        &mut self,
        input: &EmulatorInput,
        devices: &mut InputDevices,
        scene: &mut Scene,
        right_hand: NodeId,
    ) {
        let left_stick = Vector2::new(
            axis(input.move_right, input.move_left),
            axis(input.move_forward, input.move_back),
        );
        let right_stick = Vector2::new(
            axis(input.stick_right, input.stick_left),
            axis(input.stick_up, input.stick_down),
        );

        devices.set_axis(XrNode::LeftHand, CommonUsage::Primary2DAxis, left_stick);
        devices.set_axis(XrNode::RightHand, CommonUsage::Primary2DAxis, right_stick);
        devices.set_button(XrNode::RightHand, CommonUsage::TriggerButton, input.trigger);
        devices.set_button(XrNode::RightHand, CommonUsage::PrimaryButton, input.primary);
        devices.set_button(XrNode::RightHand, CommonUsage::SecondaryButton, input.secondary);

        if input.aim_delta.norm_squared() > 0.0 {
            // Dragging right turns toward -X, which is right when facing +Z.
            self.yaw -= input.aim_delta.x * self.sensitivity;
            self.pitch -= input.aim_delta.y * self.sensitivity;

            // Clamp pitch to avoid flipping over the pole
            self.pitch = self.pitch.clamp(-PI / 2.0 + 0.01, PI / 2.0 - 0.01);
        }

        if let Some(hand) = scene.node_mut(right_hand) {
            hand.transform.rotation = self.aim_rotation();
        }
    }

    /// Local hand rotation for the current yaw/pitch; +Z is the aim direction.
    pub fn aim_rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -self.pitch)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_drive_sticks_and_buttons() {
        let mut scene = Scene::new();
        let hand = scene.spawn("RightHand", None);
        let mut devices = InputDevices::new();
        let mut emulator = ControllerEmulator::new(0.005);
        emulator.connect(&mut devices);

        let input = EmulatorInput {
            move_forward: true,
            stick_left: true,
            trigger: true,
            ..Default::default()
        };
        emulator.apply(&input, &mut devices, &mut scene, hand);

        let left = devices.device_at(XrNode::LeftHand);
        let right = devices.device_at(XrNode::RightHand);
        assert_eq!(
            devices.try_get_axis(&left, CommonUsage::Primary2DAxis),
            Some(Vector2::new(0.0, 1.0))
        );
        assert_eq!(
            devices.try_get_axis(&right, CommonUsage::Primary2DAxis),
            Some(Vector2::new(-1.0, 0.0))
        );
        assert_eq!(devices.try_get_bool(&right, CommonUsage::TriggerButton), Some(true));
        assert_eq!(devices.try_get_bool(&right, CommonUsage::PrimaryButton), Some(false));
    }

    #[test]
    fn upward_drag_raises_aim() {
        let mut scene = Scene::new();
        let hand = scene.spawn("RightHand", None);
        let mut devices = InputDevices::new();
        let mut emulator = ControllerEmulator::new(0.01);

        let input = EmulatorInput {
            aim_delta: Vector2::new(0.0, -50.0),
            ..Default::default()
        };
        emulator.apply(&input, &mut devices, &mut scene, hand);

        let forward = scene.forward(hand);
        assert!(forward.y > 0.4);
        assert!(forward.z > 0.0);
    }
}
