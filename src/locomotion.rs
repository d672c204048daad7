//! Continuous movement and snap turning of the player rig.

use crate::input::devices::{CommonUsage, InputDevice, InputDevices, XrNode};
use crate::scene::graph::{NodeId, Scene};
use log::debug;
use nalgebra::{Vector2, Vector3};

/// Node handles of the tracked player rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rig {
    /// Moves and turns as a whole; head and hands are its children.
    pub origin: NodeId,
    pub head: NodeId,
    pub left_hand: NodeId,
    pub right_hand: NodeId,
}

/// Moves the rig along the head's horizontal heading with the left stick.
#[derive(Debug, Clone)]
pub struct MoveProvider {
    /// Meters per second at full stick; 0 disables movement.
    pub move_speed: f32,
}

impl MoveProvider {
    pub fn new(move_speed: f32) -> Self {
        Self { move_speed }
    }

    pub fn update(&self, scene: &mut Scene, rig: &Rig, stick: Vector2<f32>, dt: f32) {
        if self.move_speed <= 0.0 || stick.norm_squared() < 1e-6 {
            return;
        }

        let head_forward = scene.forward(rig.head);
        let Some(forward) = flatten(head_forward) else {
            return;
        };
        // Right is forward x up in a right-handed frame.
        let right = forward.cross(&Vector3::y());

        let offset = (forward * stick.y + right * stick.x) * self.move_speed * dt;
        let position = scene.world_position(rig.origin) + offset;
        scene.set_world_position(rig.origin, position);
    }
}

/// Rotates the rig around the head in fixed steps with the right stick.
#[derive(Debug, Clone)]
pub struct SnapTurnProvider {
    /// Degrees per snap.
    pub turn_amount: f32,
    pub enable_turn_left_right: bool,
    pub enable_turn_around: bool,
    /// Stick magnitude that counts as a turn request.
    pub deadzone: f32,
    armed: bool,
}

impl SnapTurnProvider {
    pub fn new(turn_amount: f32, deadzone: f32) -> Self {
        Self {
            turn_amount,
            enable_turn_left_right: true,
            enable_turn_around: true,
            deadzone,
            armed: true,
        }
    }

    /// Yaw in degrees requested by this frame's stick, at most once per deflection.
    fn requested_turn(&mut self, stick: Vector2<f32>) -> Option<f32> {
        let deflected = stick.x.abs() > self.deadzone || stick.y.abs() > self.deadzone;
        if !deflected {
            self.armed = true;
            return None;
        }
        if !self.armed {
            return None;
        }
        // A deflection is spent even when the turn it asks for is disabled.
        self.armed = false;

        let turn = if stick.x.abs() >= stick.y.abs() {
            // Turning right spins toward -X, a negative yaw about +Y.
            self.enable_turn_left_right
                .then(|| -stick.x.signum() * self.turn_amount)
        } else if stick.y < 0.0 {
            self.enable_turn_around.then_some(180.0)
        } else {
            None
        };

        turn
    }

    pub fn update(&mut self, scene: &mut Scene, rig: &Rig, stick: Vector2<f32>) {
        let Some(degrees) = self.requested_turn(stick) else {
            return;
        };
        debug!("Snap turn {:+.0} degrees", degrees);

        let head_before = scene.world_position(rig.head);
        scene.rotate_world(rig.origin, &Vector3::y_axis(), degrees);
        let head_after = scene.world_position(rig.head);

        let origin = scene.world_position(rig.origin);
        scene.set_world_position(rig.origin, origin + (head_before - head_after));
    }
}

/// Owns both providers and the devices they read.
pub struct Locomotion {
    pub move_provider: MoveProvider,
    pub snap_turn: SnapTurnProvider,
    left: InputDevice,
    right: InputDevice,
}

impl Locomotion {
    pub fn new(move_provider: MoveProvider, snap_turn: SnapTurnProvider) -> Self {
        Self {
            move_provider,
            snap_turn,
            left: InputDevice::invalid(XrNode::LeftHand),
            right: InputDevice::invalid(XrNode::RightHand),
        }
    }

    /// Turns and moves the rig from this frame's stick values.
    pub fn update(&mut self, scene: &mut Scene, rig: &Rig, devices: &InputDevices, dt: f32) {
        if !devices.is_valid(&self.left) {
            self.left = devices.device_at(XrNode::LeftHand);
        }
        if !devices.is_valid(&self.right) {
            self.right = devices.device_at(XrNode::RightHand);
        }

        if let Some(stick) = devices.try_get_axis(&self.right, CommonUsage::Primary2DAxis) {
            self.snap_turn.update(scene, rig, stick);
        }
        if let Some(stick) = devices.try_get_axis(&self.left, CommonUsage::Primary2DAxis) {
            self.move_provider.update(scene, rig, stick, dt);
        }
    }
}

fn flatten(v: Vector3<f32>) -> Option<Vector3<f32>> {
    Vector3::new(v.x, 0.0, v.z).try_normalize(1e-6)
}
