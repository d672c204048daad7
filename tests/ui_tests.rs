use model_viewer::scene::animation::AnimationClip;
use model_viewer::scene::graph::{NodeId, Scene};
use model_viewer::scene::layer::Layer;
use model_viewer::scene::material::{Material, Rgba};
use model_viewer::scene::mesh::Mesh;
use model_viewer::scene::prefab::{Prefab, PrefabNode};
use model_viewer::ui::widgets::{ButtonAction, ButtonId, Container, SliderChannel};
use model_viewer::viewer::pool::ModelPool;
use model_viewer::viewer::ui::ModelUiController;
use std::sync::Arc;

fn cube_node(name: &str, color: [f32; 3]) -> PrefabNode {
    PrefabNode::new(name).with_mesh(Arc::new(Mesh::cube(1.0)), Material::from_rgb(name, color))
}

fn clips(names: &[&str]) -> Vec<AnimationClip> {
    names
        .iter()
        .map(|n| AnimationClip::new(*n, true, Vec::new()))
        .collect()
}

/// Three models: two-part "Robot" with three clips, "Crate" with one, "Rock" with none.
fn prefabs() -> Vec<Option<Prefab>> {
    let robot = cube_node("Robot", [0.8, 0.1, 0.1])
        .with_child(cube_node("Arm", [0.1, 0.1, 0.8]))
        .with_clips(clips(&["Wave", "Walk", "Idle"]));
    let crate_ = cube_node("Crate", [0.6, 0.4, 0.2]).with_clips(clips(&["Open"]));
    let rock = cube_node("Rock", [0.5, 0.5, 0.5]);

    vec![
        Some(Prefab::new("Robot", robot)),
        Some(Prefab::new("Crate", crate_)),
        None,
        Some(Prefab::new("Rock", rock)),
    ]
}

struct Viewer {
    scene: Scene,
    parent: NodeId,
    pool: ModelPool,
    ui: ModelUiController,
}

impl Viewer {
    fn new() -> Self {
        let mut scene = Scene::new();
        let parent = scene.spawn("Models", None);
        let mut ui = ModelUiController::new();
        let pool = ModelPool::populate(&mut scene, &prefabs(), Some(parent), &mut ui);
        Self {
            scene,
            parent,
            pool,
            ui,
        }
    }

    fn model(&self, name: &str) -> NodeId {
        *self
            .pool
            .models()
            .iter()
            .find(|&&m| self.scene.name(m) == name)
            .unwrap()
    }

    fn model_button(&self, name: &str) -> ButtonId {
        self.ui
            .widgets
            .visible(Container::Models)
            .find(|(_, b)| b.label == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    fn select(&mut self, name: &str) {
        let button = self.model_button(name);
        self.ui.click(&mut self.scene, button);
    }

    fn visible_animations(&self) -> Vec<String> {
        self.ui
            .widgets
            .visible(Container::Animations)
            .map(|(_, b)| b.label.clone())
            .collect()
    }

    fn colors(&self, model: NodeId) -> Vec<Rgba> {
        self.scene
            .renderers_in_children(model, true)
            .into_iter()
            .flat_map(|n| self.scene.node(n).unwrap().renderer.clone().unwrap().materials)
            .map(|m| self.scene.material(m).unwrap().color)
            .collect()
    }
}

// ===========================
// Model pool
// ===========================

#[test]
fn pool_skips_empty_slots_and_hides_models() {
    let viewer = Viewer::new();

    assert_eq!(viewer.pool.len(), 3);
    for &model in viewer.pool.models() {
        let node = viewer.scene.node(model).unwrap();
        assert_eq!(node.layer, Layer::GRABBABLE);
        assert!(!node.active);
        assert_eq!(viewer.scene.parent(model), Some(viewer.parent));
    }
}

#[test]
fn pool_fills_model_list_in_order() {
    let viewer = Viewer::new();

    let labels: Vec<_> = viewer
        .ui
        .widgets
        .visible(Container::Models)
        .map(|(_, b)| b.label.clone())
        .collect();
    assert_eq!(labels, ["Robot", "Crate", "Rock"]);
}

#[test]
fn missing_pool_leaves_model_list_empty() {
    let scene = Scene::new();
    let mut ui = ModelUiController::new();

    ui.update_ui(None, &scene);

    assert_eq!(ui.widgets.visible(Container::Models).count(), 0);
}

#[test]
fn model_list_rebuild_does_not_duplicate() {
    let mut viewer = Viewer::new();
    viewer.ui.update_ui(Some(&viewer.pool), &viewer.scene);

    assert_eq!(viewer.ui.widgets.visible(Container::Models).count(), 3);
}

// ===========================
// Activation
// ===========================

#[test]
fn only_one_model_is_active() {
    let mut viewer = Viewer::new();

    viewer.select("Robot");
    viewer.select("Rock");

    let robot = viewer.model("Robot");
    let rock = viewer.model("Rock");
    assert!(!viewer.scene.is_active_self(robot));
    assert!(viewer.scene.is_active_self(rock));
    assert_eq!(viewer.ui.active_model(), Some(rock));
    assert_eq!(
        viewer
            .pool
            .models()
            .iter()
            .filter(|&&m| viewer.scene.is_active_self(m))
            .count(),
        1
    );
}

#[test]
fn material_set_follows_active_model() {
    let mut viewer = Viewer::new();

    viewer.select("Robot");
    assert_eq!(viewer.ui.material_set().len(), 2, "root and arm");

    viewer.select("Crate");
    let crate_model = viewer.model("Crate");
    let crate_material = viewer.scene.node(crate_model).unwrap().renderer.as_ref().unwrap().materials[0];
    assert_eq!(viewer.ui.material_set().len(), 1);
    assert!(viewer.ui.material_set().contains(&crate_material));
}

#[test]
fn material_set_skips_inactive_children() {
    let mut viewer = Viewer::new();
    let robot = viewer.model("Robot");
    let arm = viewer.scene.find_child(robot, "Arm").unwrap();
    viewer.scene.set_active(arm, false);

    viewer.select("Robot");

    assert_eq!(viewer.ui.material_set().len(), 1);
}

// ===========================
// Animation buttons
// ===========================

#[test]
fn animation_buttons_are_pooled_and_hidden() {
    let mut viewer = Viewer::new();

    viewer.select("Robot");
    assert_eq!(viewer.visible_animations(), ["Wave", "Walk", "Idle"]);
    assert_eq!(viewer.ui.animation_buttons().len(), 3);

    viewer.select("Crate");
    assert_eq!(viewer.visible_animations(), ["Open"]);
    assert_eq!(viewer.ui.animation_buttons().len(), 3, "surplus buttons are kept");

    viewer.select("Rock");
    assert!(viewer.visible_animations().is_empty());

    viewer.select("Robot");
    assert_eq!(viewer.visible_animations(), ["Wave", "Walk", "Idle"]);
    assert_eq!(viewer.ui.animation_buttons().len(), 3);
}

#[test]
fn animation_button_plays_its_clip() {
    let mut viewer = Viewer::new();
    viewer.select("Robot");

    let walk = viewer
        .ui
        .widgets
        .visible(Container::Animations)
        .find(|(_, b)| b.label == "Walk")
        .map(|(id, _)| id)
        .unwrap();
    viewer.ui.click(&mut viewer.scene, walk);

    let robot = viewer.model("Robot");
    let animator = viewer.scene.node(robot).unwrap().animator.as_ref().unwrap();
    assert_eq!(animator.current_clip().map(|c| c.name.as_str()), Some("Walk"));
}

#[test]
fn hidden_animation_button_does_nothing() {
    let mut viewer = Viewer::new();
    viewer.select("Robot");
    let idle = viewer.ui.animation_buttons()[2];
    viewer.select("Crate");

    let button = viewer.ui.widgets.button(idle).unwrap();
    assert!(!button.visible);
    assert!(matches!(button.action, Some(ButtonAction::PlayClip { .. })));

    viewer.ui.click(&mut viewer.scene, idle);

    let robot = viewer.model("Robot");
    let animator = viewer.scene.node(robot).unwrap().animator.as_ref().unwrap();
    assert!(animator.current_clip().is_none());
}

// ===========================
// Color sliders
// ===========================

#[test]
fn sliders_recolor_only_the_active_model() {
    let mut viewer = Viewer::new();
    viewer.select("Robot");
    let crate_before = viewer.colors(viewer.model("Crate"));

    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Green, 0.25);
    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Alpha, 0.5);

    let expected = Rgba::new(1.0, 0.25, 1.0, 0.5);
    for color in viewer.colors(viewer.model("Robot")) {
        assert_eq!(color, expected);
    }
    assert_eq!(viewer.colors(viewer.model("Crate")), crate_before);
}

#[test]
fn switching_models_leaves_the_previous_colors_alone() {
    let mut viewer = Viewer::new();
    viewer.select("Robot");
    let robot_before = viewer.colors(viewer.model("Robot"));

    viewer.select("Crate");
    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Red, 0.1);

    assert_eq!(viewer.colors(viewer.model("Robot")), robot_before);
    for color in viewer.colors(viewer.model("Crate")) {
        assert_eq!(color, Rgba::new(0.1, 1.0, 1.0, 1.0));
    }
}

#[test]
fn sliders_clamp_to_unit_range() {
    let mut viewer = Viewer::new();
    viewer.select("Rock");

    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Red, 3.0);
    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Blue, -1.0);

    assert_eq!(viewer.ui.widgets.slider(SliderChannel::Red).value, 1.0);
    assert_eq!(viewer.ui.widgets.slider(SliderChannel::Blue).value, 0.0);
}

#[test]
fn sliders_without_active_model_change_nothing() {
    let mut viewer = Viewer::new();
    let before: Vec<_> = viewer
        .pool
        .models()
        .iter()
        .map(|&m| viewer.colors(m))
        .collect();

    viewer.ui.set_slider(&mut viewer.scene, SliderChannel::Red, 0.0);

    let after: Vec<_> = viewer
        .pool
        .models()
        .iter()
        .map(|&m| viewer.colors(m))
        .collect();
    assert_eq!(before, after);
    assert_eq!(viewer.ui.widgets.slider(SliderChannel::Red).value, 0.0);
}
