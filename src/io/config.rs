use crate::error::ViewerError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub grab: GrabConfig,
    #[serde(default)]
    pub locomotion: LocomotionConfig,
    #[serde(default)]
    pub rig: RigConfig,
    #[serde(default)]
    pub ground: GroundConfig,
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            grab: GrabConfig::default(),
            locomotion: LocomotionConfig::default(),
            rig: RigConfig::default(),
            ground: GroundConfig::default(),
            models: default_models(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ViewerError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }
}

//=================================
// Window & Render
//=================================

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_title(),
        }
    }
}

fn default_window_width() -> f32 {
    1280.0
}
fn default_window_height() -> f32 {
    760.0
}
fn default_title() -> String {
    "Model Viewer".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    // --- Viewport ---
    #[serde(default = "default_render_width")]
    pub width: usize,
    #[serde(default = "default_render_height")]
    pub height: usize,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,

    // --- Shading ---
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_ambient")]
    pub ambient: f32,
    #[serde(default = "default_light_direction")]
    pub light_direction: [f32; 3],
    #[serde(default = "default_true")]
    pub show_pointer: bool,

    // --- Headless output ---
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_render_width(),
            height: default_render_height(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            background: default_background(),
            ambient: default_ambient(),
            light_direction: default_light_direction(),
            show_pointer: true,
            output: default_output(),
        }
    }
}

fn default_render_width() -> usize {
    800
}
fn default_render_height() -> usize {
    500
}
fn default_fov() -> f32 {
    60.0
}
fn default_near() -> f32 {
    0.05
}
fn default_far() -> f32 {
    100.0
}
fn default_background() -> [f32; 3] {
    [0.12, 0.13, 0.16]
}
fn default_ambient() -> f32 {
    0.25
}
fn default_light_direction() -> [f32; 3] {
    [-0.4, -1.0, 0.6]
}
fn default_output() -> String {
    "viewer_output.png".to_string()
}
fn default_true() -> bool {
    true
}

//=================================
// Interaction
//=================================

#[derive(Debug, Deserialize)]
pub struct GrabConfig {
    /// Degrees per second at full stick.
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_scale_speed")]
    pub scale_speed: f32,
    #[serde(default = "default_grab_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_grab_distance")]
    pub grab_distance: f32,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    /// Layer names the grab ray may hit.
    #[serde(default = "default_grab_layers")]
    pub layers: Vec<String>,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            rotation_speed: default_rotation_speed(),
            scale_speed: default_scale_speed(),
            move_speed: default_grab_move_speed(),
            grab_distance: default_grab_distance(),
            min_scale: default_min_scale(),
            layers: default_grab_layers(),
        }
    }
}

fn default_rotation_speed() -> f32 {
    100.0
}
fn default_scale_speed() -> f32 {
    0.5
}
fn default_grab_move_speed() -> f32 {
    1.5
}
fn default_grab_distance() -> f32 {
    10.0
}
fn default_min_scale() -> f32 {
    0.1
}
fn default_grab_layers() -> Vec<String> {
    vec!["Grabbable".to_string()]
}

#[derive(Debug, Deserialize)]
pub struct LocomotionConfig {
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_turn_amount")]
    pub turn_amount: f32,
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,
    #[serde(default = "default_true")]
    pub enable_turn_left_right: bool,
    #[serde(default = "default_true")]
    pub enable_turn_around: bool,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            turn_amount: default_turn_amount(),
            deadzone: default_deadzone(),
            enable_turn_left_right: true,
            enable_turn_around: true,
        }
    }
}

fn default_move_speed() -> f32 {
    2.0
}
fn default_turn_amount() -> f32 {
    45.0
}
fn default_deadzone() -> f32 {
    0.75
}

//=================================
// Scene layout
//=================================

#[derive(Debug, Deserialize)]
pub struct RigConfig {
    #[serde(default = "default_head_height")]
    pub head_height: f32,
    /// Hand offsets from the rig origin.
    #[serde(default = "default_left_hand")]
    pub left_hand: [f32; 3],
    #[serde(default = "default_right_hand")]
    pub right_hand: [f32; 3],
    /// Radians per dragged pixel.
    #[serde(default = "default_aim_sensitivity")]
    pub aim_sensitivity: f32,
    /// World position of the node models are instanced under.
    #[serde(default = "default_model_parent")]
    pub model_parent: [f32; 3],
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            head_height: default_head_height(),
            left_hand: default_left_hand(),
            right_hand: default_right_hand(),
            aim_sensitivity: default_aim_sensitivity(),
            model_parent: default_model_parent(),
        }
    }
}

fn default_head_height() -> f32 {
    1.6
}
fn default_left_hand() -> [f32; 3] {
    [0.25, 1.3, 0.3]
}
fn default_right_hand() -> [f32; 3] {
    [-0.25, 1.3, 0.3]
}
fn default_aim_sensitivity() -> f32 {
    0.005
}
fn default_model_parent() -> [f32; 3] {
    [0.0, 1.3, 3.0]
}

#[derive(Debug, Deserialize)]
pub struct GroundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ground_size")]
    pub size: f32,
    #[serde(default = "default_ground_color")]
    pub color: [f32; 3],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: default_ground_size(),
            color: default_ground_color(),
        }
    }
}

fn default_ground_size() -> f32 {
    20.0
}
fn default_ground_color() -> [f32; 3] {
    [0.35, 0.37, 0.4]
}

//=================================
// Models
//=================================

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// `cube`, `sphere`, `plane` or a path to an `.obj` file. Omit for an empty node.
    pub mesh: Option<String>,
    #[serde(default = "default_color")]
    pub color: [f32; 4],

    // --- Transform ---
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    pub collider: Option<ColliderConfig>,
    #[serde(default)]
    pub children: Vec<ModelConfig>,
    #[serde(default)]
    pub animations: Vec<AnimationConfig>,
}

impl ModelConfig {
    fn new(name: &str, mesh: Option<&str>, color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            mesh: mesh.map(str::to_string),
            color,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
            collider: None,
            children: Vec::new(),
            animations: Vec::new(),
        }
    }
}

fn default_color() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}
fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColliderConfig {
    Box {
        #[serde(default)]
        center: [f32; 3],
        size: [f32; 3],
    },
    Sphere {
        #[serde(default)]
        center: [f32; 3],
        radius: f32,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub looping: bool,
    #[serde(default)]
    pub tracks: Vec<TrackConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackPropertyConfig {
    Translation,
    /// Values are euler angles in degrees.
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackConfig {
    /// Child path relative to the model, e.g. `Hub` or `Hub/Blade`.
    #[serde(default)]
    pub target: String,
    pub property: TrackPropertyConfig,
    pub times: Vec<f32>,
    pub values: Vec<[f32; 3]>,
}

/// Built-in pool: a cube, a sphere and an animated windmill.
fn default_models() -> Vec<ModelConfig> {
    let cube = ModelConfig {
        scale: [0.6, 0.6, 0.6],
        ..ModelConfig::new("Cube", Some("cube"), [0.85, 0.25, 0.2, 1.0])
    };

    let sphere = ModelConfig {
        scale: [0.7, 0.7, 0.7],
        ..ModelConfig::new("Sphere", Some("sphere"), [0.2, 0.45, 0.9, 1.0])
    };

    let blade = |name: &str, angle: f32| ModelConfig {
        rotation: [0.0, 0.0, angle],
        children: vec![ModelConfig {
            position: [0.0, 0.35, 0.0],
            scale: [0.1, 0.7, 0.04],
            ..ModelConfig::new("Vane", Some("cube"), [0.95, 0.95, 0.9, 1.0])
        }],
        ..ModelConfig::new(name, None, default_color())
    };

    // The hub stays unscaled so the blades under it keep their proportions.
    let hub = ModelConfig {
        position: [0.0, 0.45, -0.2],
        children: vec![
            ModelConfig {
                scale: [0.12, 0.12, 0.12],
                ..ModelConfig::new("Cap", Some("sphere"), [0.3, 0.3, 0.3, 1.0])
            },
            blade("Blade1", 0.0),
            blade("Blade2", 120.0),
            blade("Blade3", 240.0),
        ],
        ..ModelConfig::new("Hub", None, default_color())
    };

    let tower = ModelConfig {
        scale: [0.3, 1.2, 0.3],
        ..ModelConfig::new("Tower", Some("cube"), [0.75, 0.6, 0.45, 1.0])
    };

    let windmill = ModelConfig {
        collider: Some(ColliderConfig::Box {
            center: [0.0, 0.25, -0.1],
            size: [1.6, 2.0, 0.6],
        }),
        children: vec![tower, hub],
        animations: vec![
            AnimationConfig {
                name: "Spin".to_string(),
                looping: true,
                tracks: vec![TrackConfig {
                    target: "Hub".to_string(),
                    property: TrackPropertyConfig::Rotation,
                    times: vec![0.0, 1.0, 2.0, 3.0],
                    values: vec![
                        [0.0, 0.0, 0.0],
                        [0.0, 0.0, 120.0],
                        [0.0, 0.0, 240.0],
                        [0.0, 0.0, 360.0],
                    ],
                }],
            },
            AnimationConfig {
                name: "Pulse".to_string(),
                looping: true,
                tracks: vec![TrackConfig {
                    target: "Hub".to_string(),
                    property: TrackPropertyConfig::Scale,
                    times: vec![0.0, 0.5, 1.0],
                    values: vec![[1.0, 1.0, 1.0], [1.25, 1.25, 1.25], [1.0, 1.0, 1.0]],
                }],
            },
        ],
        ..ModelConfig::new("Windmill", None, default_color())
    };

    vec![cube, sphere, windmill]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[grab]\ngrab_distance = 4.0\n").unwrap();
        assert_eq!(config.grab.grab_distance, 4.0);
        assert_eq!(config.grab.min_scale, 0.1);
        assert_eq!(config.grab.layers, vec!["Grabbable".to_string()]);
        assert_eq!(config.locomotion.turn_amount, 45.0);
        assert_eq!(config.models.len(), 3);
    }

    #[test]
    fn parses_models_with_tracks_and_colliders() {
        let src = r#"
[[models]]
name = "Crate"
mesh = "cube"
color = [1.0, 0.0, 0.0, 0.5]
collider = { type = "sphere", radius = 0.8 }

[[models.animations]]
name = "Lift"
looping = false

[[models.animations.tracks]]
property = "translation"
times = [0.0, 1.0]
values = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
"#;
        let config: Config = toml::from_str(src).unwrap();
        assert_eq!(config.models.len(), 1);
        let model = &config.models[0];
        assert_eq!(model.scale, [1.0, 1.0, 1.0]);
        assert!(matches!(model.collider, Some(ColliderConfig::Sphere { radius, .. }) if radius == 0.8));
        let anim = &model.animations[0];
        assert!(!anim.looping);
        assert_eq!(anim.tracks[0].property, TrackPropertyConfig::Translation);
        assert_eq!(anim.tracks[0].target, "");
    }

    #[test]
    fn default_windmill_is_animated() {
        let models = default_models();
        let windmill = models.iter().find(|m| m.name == "Windmill").unwrap();
        let names: Vec<&str> = windmill.animations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Spin", "Pulse"]);
        assert!(windmill.collider.is_some());
    }
}
