//! Grabbing and manipulating models with the right controller.
//!
//! Pressing the right trigger casts a ray from the right hand. A hit on a
//! grabbable collider parents that node to the hand until the trigger is
//! released. While held:
//!
//! - right stick x spins the object about world up,
//! - left stick y grows or shrinks it uniformly (never below `min_scale`),
//! - A pushes it away along the hand's forward axis, B pulls it back.
//!
//! Locomotion is switched off for the duration of the grab.

use crate::input::devices::{CommonUsage, InputDevice, InputDevices, XrNode};
use crate::locomotion::Locomotion;
use crate::scene::graph::{NodeId, Scene};
use crate::scene::layer::{Layer, LayerMask};
use crate::scene::physics::raycast;
use log::{debug, error, info, warn};
use nalgebra::{Vector2, Vector3};

#[derive(Debug, Clone)]
pub struct GrabSettings {
    /// Degrees per second at full stick.
    pub rotation_speed: f32,
    /// Scale units per second at full stick.
    pub scale_speed: f32,
    /// Meters per second while A or B is held.
    pub move_speed: f32,
    pub grab_distance: f32,
    pub min_scale: f32,
    pub grabbable: LayerMask,
}

impl Default for GrabSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 100.0,
            scale_speed: 0.5,
            move_speed: 1.5,
            grab_distance: 10.0,
            min_scale: 0.1,
            grabbable: Layer::GRABBABLE.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabState {
    Idle,
    Grabbing {
        object: NodeId,
        /// Restored on release; `None` means the object was a root.
        original_parent: Option<NodeId>,
    },
}

pub struct ModelGrabber {
    pub settings: GrabSettings,
    right_hand: Option<NodeId>,
    right: InputDevice,
    left: InputDevice,
    state: GrabState,
    trigger_was_pressed: bool,
    /// Locomotion settings to restore after a grab.
    player_move_speed: f32,
    player_turn: (bool, bool),
}

impl ModelGrabber {
    pub fn new(settings: GrabSettings, right_hand: Option<NodeId>, locomotion: &Locomotion) -> Self {
        if right_hand.is_none() {
            error!("Right hand node is not assigned; grabbing is disabled");
        }
        Self {
            settings,
            right_hand,
            right: InputDevice::invalid(XrNode::RightHand),
            left: InputDevice::invalid(XrNode::LeftHand),
            state: GrabState::Idle,
            trigger_was_pressed: false,
            player_move_speed: locomotion.move_provider.move_speed,
            player_turn: (
                locomotion.snap_turn.enable_turn_left_right,
                locomotion.snap_turn.enable_turn_around,
            ),
        }
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn grabbed(&self) -> Option<NodeId> {
        match self.state {
            GrabState::Grabbing { object, .. } => Some(object),
            GrabState::Idle => None,
        }
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbed().is_some()
    }

    /// One frame: refresh devices, detect grab/release, then manipulate.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        devices: &InputDevices,
        locomotion: &mut Locomotion,
        dt: f32,
    ) {
        self.refresh_devices(devices);

        if let Some(pressed) = devices.try_get_bool(&self.right, CommonUsage::TriggerButton) {
            let just_pressed = pressed && !self.trigger_was_pressed;
            self.trigger_was_pressed = pressed;

            if just_pressed && !self.is_grabbing() {
                if self.try_grab(scene) {
                    self.toggle_player_movement(locomotion, false);
                }
            } else if !pressed && self.is_grabbing() {
                self.release(scene);
                self.toggle_player_movement(locomotion, true);
            }
        }

        if let Some(object) = self.grabbed() {
            self.rotate_grabbed(scene, devices, object, dt);
            self.scale_grabbed(scene, devices, object, dt);
            self.move_grabbed(scene, devices, object, dt);
        }
    }

    fn refresh_devices(&mut self, devices: &InputDevices) {
        if !devices.is_valid(&self.right) {
            self.right = devices.device_at(XrNode::RightHand);
            if devices.is_valid(&self.right) {
                debug!("Right controller acquired");
            }
        }
        if !devices.is_valid(&self.left) {
            self.left = devices.device_at(XrNode::LeftHand);
            if devices.is_valid(&self.left) {
                debug!("Left controller acquired");
            }
        }
    }

    fn try_grab(&mut self, scene: &mut Scene) -> bool {
        let Some(hand) = self.right_hand.filter(|&h| scene.contains(h)) else {
            return false;
        };

        let origin = scene.world_position(hand);
        let direction = scene.forward(hand);
        let Some(hit) = raycast(
            scene,
            origin,
            direction,
            self.settings.grab_distance,
            self.settings.grabbable,
        ) else {
            debug!("Grab ray hit nothing");
            return false;
        };

        let original_parent = scene.parent(hit.node);
        if !scene.set_parent(hit.node, Some(hand)) {
            return false;
        }
        info!("Grabbed '{}' at {:.2} m", scene.name(hit.node), hit.distance);
        self.state = GrabState::Grabbing {
            object: hit.node,
            original_parent,
        };
        true
    }

    fn release(&mut self, scene: &mut Scene) {
        let GrabState::Grabbing {
            object,
            original_parent,
        } = self.state
        else {
            return;
        };

        if !scene.set_parent(object, original_parent) {
            warn!(
                "Cannot restore the parent of '{}'; releasing to the scene root",
                scene.name(object)
            );
            scene.set_parent(object, None);
        }
        info!("Released '{}'", scene.name(object));
        self.state = GrabState::Idle;
    }

    fn rotate_grabbed(&self, scene: &mut Scene, devices: &InputDevices, object: NodeId, dt: f32) {
        if let Some(stick) = self.stick(devices, &self.right) {
            let degrees = stick.x * self.settings.rotation_speed * dt;
            scene.rotate_world(object, &Vector3::y_axis(), degrees);
        }
    }

    fn scale_grabbed(&self, scene: &mut Scene, devices: &InputDevices, object: NodeId, dt: f32) {
        if let Some(stick) = self.stick(devices, &self.left) {
            let delta = stick.y * self.settings.scale_speed * dt;
            let floor = Vector3::repeat(self.settings.min_scale);
            if let Some(node) = scene.node_mut(object) {
                let scale = node.transform.scale + Vector3::repeat(delta);
                node.transform.scale = scale.sup(&floor);
            }
        }
    }

    fn move_grabbed(&self, scene: &mut Scene, devices: &InputDevices, object: NodeId, dt: f32) {
        let Some(hand) = self.right_hand else {
            return;
        };
        let step = scene.forward(hand) * self.settings.move_speed * dt;

        let held = |usage| devices.try_get_bool(&self.right, usage) == Some(true);
        let mut offset = Vector3::zeros();
        if held(CommonUsage::PrimaryButton) {
            offset += step;
        }
        if held(CommonUsage::SecondaryButton) {
            offset -= step;
        }
        if offset != Vector3::zeros() {
            let position = scene.world_position(object) + offset;
            scene.set_world_position(object, position);
        }
    }

    fn stick(&self, devices: &InputDevices, device: &InputDevice) -> Option<Vector2<f32>> {
        devices.try_get_axis(device, CommonUsage::Primary2DAxis)
    }

    fn toggle_player_movement(&self, locomotion: &mut Locomotion, enabled: bool) {
        locomotion.move_provider.move_speed = if enabled { self.player_move_speed } else { 0.0 };
        let (left_right, around) = self.player_turn;
        locomotion.snap_turn.enable_turn_left_right = enabled && left_right;
        locomotion.snap_turn.enable_turn_around = enabled && around;
        debug!("Player movement {}", if enabled { "enabled" } else { "disabled" });
    }
}
