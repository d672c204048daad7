//! Turns `[[models]]` config entries into instantiable prefabs.

use crate::error::ViewerError;
use crate::io::config::{AnimationConfig, ColliderConfig, ModelConfig, TrackPropertyConfig};
use crate::io::obj_loader::load_obj;
use crate::scene::animation::{AnimationClip, Track, TrackProperty, TrackValues};
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::physics::Collider;
use crate::scene::prefab::{Prefab, PrefabNode};
use crate::scene::transform::Transform;
use log::{error, warn};
use nalgebra::{Point3, UnitQuaternion, Vector3, Vector4};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Builds one slot per model. A model whose mesh fails to load becomes `None`.
///
/// Relative `.obj` paths resolve against `base_dir`.
pub fn build_prefabs(models: &[ModelConfig], base_dir: &Path) -> Vec<Option<Prefab>> {
    let mut meshes = MeshCache::new(base_dir);
    models
        .iter()
        .map(|model| match build_node(model, &mut meshes) {
            Ok(root) => Some(Prefab::new(model.name.clone(), root)),
            Err(e) => {
                error!("Model '{}' unavailable: {}", model.name, e);
                None
            }
        })
        .collect()
}

struct MeshCache<'a> {
    base_dir: &'a Path,
    meshes: HashMap<String, Arc<Mesh>>,
}

impl<'a> MeshCache<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            meshes: HashMap::new(),
        }
    }

    fn get(&mut self, key: &str) -> Result<Arc<Mesh>, ViewerError> {
        if let Some(mesh) = self.meshes.get(key) {
            return Ok(Arc::clone(mesh));
        }
        let mesh = match key {
            "cube" => Mesh::cube(1.0),
            "sphere" => Mesh::uv_sphere(0.5, 24, 16),
            "plane" => Mesh::plane(1.0),
            path => load_obj(self.base_dir.join(path))?,
        };
        let mesh = Arc::new(mesh);
        self.meshes.insert(key.to_string(), Arc::clone(&mesh));
        Ok(mesh)
    }
}

fn build_node(model: &ModelConfig, meshes: &mut MeshCache) -> Result<PrefabNode, ViewerError> {
    let mut node = PrefabNode::new(model.name.clone()).with_transform(Transform::from_euler_degrees(
        Vector3::from(model.position),
        model.rotation,
        Vector3::from(model.scale),
    ));

    if let Some(key) = &model.mesh {
        let material = Material::new(model.name.clone(), Vector4::from(model.color));
        node = node.with_mesh(meshes.get(key)?, material);
    }

    node.collider = model.collider.as_ref().map(collider_from_config);

    node = node.with_clips(model.animations.iter().map(clip_from_config).collect());

    for child in &model.children {
        node = node.with_child(build_node(child, meshes)?);
    }

    Ok(node)
}

fn collider_from_config(config: &ColliderConfig) -> Collider {
    match *config {
        ColliderConfig::Box { center, size } => Collider::Box {
            center: Point3::from(center),
            half_extents: Vector3::from(size) * 0.5,
        },
        ColliderConfig::Sphere { center, radius } => Collider::Sphere {
            center: Point3::from(center),
            radius,
        },
    }
}

fn clip_from_config(config: &AnimationConfig) -> AnimationClip {
    let tracks = config
        .tracks
        .iter()
        .filter_map(|track| {
            if track.times.len() != track.values.len() || track.times.is_empty() {
                warn!(
                    "Clip '{}': track on '{}' has {} times but {} values; skipped",
                    config.name,
                    track.target,
                    track.times.len(),
                    track.values.len()
                );
                return None;
            }
            if track.times.windows(2).any(|w| w[1] <= w[0]) {
                warn!(
                    "Clip '{}': key times on '{}' are not increasing; skipped",
                    config.name, track.target
                );
                return None;
            }

            let (property, values) = match track.property {
                TrackPropertyConfig::Translation => (
                    TrackProperty::Translation,
                    TrackValues::Vector(track.values.iter().map(|&v| Vector3::from(v)).collect()),
                ),
                TrackPropertyConfig::Scale => (
                    TrackProperty::Scale,
                    TrackValues::Vector(track.values.iter().map(|&v| Vector3::from(v)).collect()),
                ),
                TrackPropertyConfig::Rotation => (
                    TrackProperty::Rotation,
                    TrackValues::Rotation(
                        track
                            .values
                            .iter()
                            .map(|v| {
                                UnitQuaternion::from_euler_angles(
                                    v[0].to_radians(),
                                    v[1].to_radians(),
                                    v[2].to_radians(),
                                )
                            })
                            .collect(),
                    ),
                ),
            };

            Some(Track {
                target: track.target.clone(),
                property,
                times: track.times.clone(),
                values,
            })
        })
        .collect();

    AnimationClip::new(config.name.clone(), config.looping, tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;

    #[test]
    fn default_models_all_build() {
        let config = Config::default();
        let prefabs = build_prefabs(&config.models, Path::new("."));
        assert_eq!(prefabs.len(), 3);
        assert!(prefabs.iter().all(Option::is_some));

        let windmill = prefabs[2].as_ref().unwrap();
        assert_eq!(windmill.name, "Windmill");
        assert_eq!(windmill.root.clips.len(), 2);
        assert!(windmill.root.collider.is_some());
    }

    #[test]
    fn missing_obj_leaves_empty_slot() {
        let src = r#"
[[models]]
name = "Ghost"
mesh = "missing/ghost.obj"

[[models]]
name = "Box"
mesh = "cube"
"#;
        let config: Config = toml::from_str(src).unwrap();
        let prefabs = build_prefabs(&config.models, Path::new("."));
        assert!(prefabs[0].is_none());
        assert_eq!(prefabs[1].as_ref().map(|p| p.name.as_str()), Some("Box"));
    }

    #[test]
    fn mismatched_track_is_dropped() {
        let src = r#"
[[models]]
name = "Box"
mesh = "cube"

[[models.animations]]
name = "Broken"

[[models.animations.tracks]]
property = "scale"
times = [0.0, 1.0]
values = [[1.0, 1.0, 1.0]]
"#;
        let config: Config = toml::from_str(src).unwrap();
        let prefabs = build_prefabs(&config.models, Path::new("."));
        let clip = &prefabs[0].as_ref().unwrap().root.clips[0];
        assert_eq!(clip.name, "Broken");
        assert!(clip.tracks.is_empty());
    }
}
