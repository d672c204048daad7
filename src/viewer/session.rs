//! Owns the scene and every viewer component, and runs them once per frame.

use crate::input::devices::InputDevices;
use crate::input::emulator::{ControllerEmulator, EmulatorInput};
use crate::io::config::Config;
use crate::locomotion::{Locomotion, MoveProvider, Rig, SnapTurnProvider};
use crate::scene::animation;
use crate::scene::graph::{MeshRenderer, NodeId, Scene};
use crate::scene::layer::LayerMask;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::physics::{RaycastHit, raycast};
use crate::scene::prefab::Prefab;
use crate::ui::widgets::{ButtonId, SliderChannel};
use crate::viewer::grab::{GrabSettings, ModelGrabber};
use crate::viewer::pool::ModelPool;
use crate::viewer::ui::ModelUiController;
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

pub struct ViewerSession {
    pub scene: Scene,
    pub devices: InputDevices,
    pub rig: Rig,
    pub model_parent: NodeId,
    pub locomotion: Locomotion,
    pub pool: ModelPool,
    pub grabber: ModelGrabber,
    pub ui: ModelUiController,
    pub emulator: ControllerEmulator,
    frame: u64,
}

impl ViewerSession {
    /// Builds the rig, ground and model pool, and connects the emulated controllers.
    pub fn new(config: &Config, prefabs: &[Option<Prefab>]) -> Self {
        let mut scene = Scene::new();

        // 1. Rig
        let origin = scene.spawn("XR Origin", None);
        let head = scene.spawn("Head", Some(origin));
        let left_hand = scene.spawn("LeftHand", Some(origin));
        let right_hand = scene.spawn("RightHand", Some(origin));
        set_position(&mut scene, head, [0.0, config.rig.head_height, 0.0]);
        set_position(&mut scene, left_hand, config.rig.left_hand);
        set_position(&mut scene, right_hand, config.rig.right_hand);
        let rig = Rig {
            origin,
            head,
            left_hand,
            right_hand,
        };

        // 2. Environment
        if config.ground.enabled {
            let ground = scene.spawn("Ground", None);
            let [r, g, b] = config.ground.color;
            let material = scene.add_material(Material::from_rgb("Ground", [r, g, b]));
            if let Some(node) = scene.node_mut(ground) {
                node.renderer = Some(MeshRenderer {
                    mesh: Arc::new(Mesh::plane(config.ground.size)),
                    materials: vec![material],
                });
            }
        }
        let model_parent = scene.spawn("Models", None);
        set_position(&mut scene, model_parent, config.rig.model_parent);

        // 3. Devices and locomotion
        let mut devices = InputDevices::new();
        let emulator = ControllerEmulator::new(config.rig.aim_sensitivity);
        emulator.connect(&mut devices);

        let mut snap_turn =
            SnapTurnProvider::new(config.locomotion.turn_amount, config.locomotion.deadzone);
        snap_turn.enable_turn_left_right = config.locomotion.enable_turn_left_right;
        snap_turn.enable_turn_around = config.locomotion.enable_turn_around;
        let locomotion = Locomotion::new(MoveProvider::new(config.locomotion.move_speed), snap_turn);

        // 4. Viewer components
        let grab = &config.grab;
        let settings = GrabSettings {
            rotation_speed: grab.rotation_speed,
            scale_speed: grab.scale_speed,
            move_speed: grab.move_speed,
            grab_distance: grab.grab_distance,
            min_scale: grab.min_scale,
            grabbable: LayerMask::from_names(&grab.layers),
        };
        let grabber = ModelGrabber::new(settings, Some(right_hand), &locomotion);

        let mut ui = ModelUiController::new();
        let pool = ModelPool::populate(&mut scene, prefabs, Some(model_parent), &mut ui);

        info!(
            "Session ready: {} nodes, {} models",
            scene.len(),
            pool.len()
        );

        Self {
            scene,
            devices,
            rig,
            model_parent,
            locomotion,
            pool,
            grabber,
            ui,
            emulator,
            frame: 0,
        }
    }

    /// Feeds desktop controls into the emulated controllers.
    pub fn emulate(&mut self, input: &EmulatorInput) {
        self.emulator
            .apply(input, &mut self.devices, &mut self.scene, self.rig.right_hand);
    }

    /// Grab and manipulation, then locomotion, then animation.
    pub fn update(&mut self, dt: f32) {
        self.grabber
            .update(&mut self.scene, &self.devices, &mut self.locomotion, dt);
        self.locomotion
            .update(&mut self.scene, &self.rig, &self.devices, dt);
        animation::update(&mut self.scene, dt);
        self.frame += 1;
    }

    pub fn click(&mut self, button: ButtonId) {
        self.ui.click(&mut self.scene, button);
    }

    pub fn set_slider(&mut self, channel: SliderChannel, value: f32) {
        self.ui.set_slider(&mut self.scene, channel, value);
    }

    /// Activates the model called `name`, or the first model when `name` is `None`.
    pub fn select_model(&mut self, name: Option<&str>) -> Option<NodeId> {
        let model = match name {
            Some(name) => {
                let found = self
                    .pool
                    .models()
                    .iter()
                    .copied()
                    .find(|&m| self.scene.name(m) == name);
                if found.is_none() {
                    warn!("No model named '{}'", name);
                }
                found
            }
            None => self.pool.models().first().copied(),
        }?;
        self.ui.activate_model(&mut self.scene, model);
        Some(model)
    }

    /// The grab ray as the right hand currently sees it.
    pub fn aim_ray(&self) -> (Point3<f32>, Vector3<f32>, Option<RaycastHit>) {
        let hand = self.rig.right_hand;
        let origin = self.scene.world_position(hand);
        let direction = self.scene.forward(hand);
        let settings = &self.grabber.settings;
        let hit = raycast(
            &self.scene,
            origin,
            direction,
            settings.grab_distance,
            settings.grabbable,
        );
        (origin, direction, hit)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn set_position(scene: &mut Scene, id: NodeId, position: [f32; 3]) {
    if let Some(node) = scene.node_mut(id) {
        node.transform.position = Vector3::from(position);
    }
}
