//! Ray queries against node colliders.

use crate::core::math::transform::{transform_point, transform_vector};
use crate::scene::graph::{NodeId, Scene};
use crate::scene::layer::LayerMask;
use nalgebra::{Point3, Vector3};

/// Collision volume in the owning node's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Box {
        center: Point3<f32>,
        half_extents: Vector3<f32>,
    },
    Sphere {
        center: Point3<f32>,
        radius: f32,
    },
}

impl Collider {
    pub fn cube(size: f32) -> Self {
        Collider::Box {
            center: Point3::origin(),
            half_extents: Vector3::repeat(size * 0.5),
        }
    }

    /// Box enclosing the given local-space bounds.
    pub fn from_bounds(min: Point3<f32>, max: Point3<f32>) -> Self {
        Collider::Box {
            center: nalgebra::center(&min, &max),
            half_extents: (max - min) * 0.5,
        }
    }

    /// Entry parameter along a local-space ray, `None` on a miss.
    ///
    /// `dir` does not need to be unit length; the returned parameter is in
    /// multiples of `dir`. Rays starting inside the volume never hit it.
    fn intersect_local(&self, origin: &Point3<f32>, dir: &Vector3<f32>) -> Option<f32> {
        match self {
            Collider::Box {
                center,
                half_extents,
            } => {
                let min = center - half_extents;
                let max = center + half_extents;
                let mut t_near = f32::NEG_INFINITY;
                let mut t_far = f32::INFINITY;

                for axis in 0..3 {
                    let o = origin[axis];
                    let d = dir[axis];
                    if d.abs() < 1e-8 {
                        if o < min[axis] || o > max[axis] {
                            return None;
                        }
                        continue;
                    }
                    let inv = 1.0 / d;
                    let (t0, t1) = {
                        let a = (min[axis] - o) * inv;
                        let b = (max[axis] - o) * inv;
                        if a < b { (a, b) } else { (b, a) }
                    };
                    t_near = t_near.max(t0);
                    t_far = t_far.min(t1);
                    if t_near > t_far {
                        return None;
                    }
                }

                (t_near >= 0.0).then_some(t_near)
            }
            Collider::Sphere { center, radius } => {
                let oc = origin - center;
                let a = dir.norm_squared();
                if a < 1e-12 {
                    return None;
                }
                let b = oc.dot(dir);
                let c = oc.norm_squared() - radius * radius;
                if c <= 0.0 {
                    return None;
                }
                let disc = b * b - a * c;
                if disc < 0.0 {
                    return None;
                }
                let t = (-b - disc.sqrt()) / a;
                (t >= 0.0).then_some(t)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub node: NodeId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Point3<f32>,
}

/// Nearest collider hit along a world-space ray.
///
/// Only nodes active in the hierarchy whose layer is in `mask` are tested.
/// Hits farther than `max_distance` are ignored.
pub fn raycast(
    scene: &Scene,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    mask: LayerMask,
) -> Option<RaycastHit> {
    let dir = direction.try_normalize(1e-8)?;

    scene
        .node_ids()
        .filter_map(|id| {
            let node = scene.node(id)?;
            let collider = node.collider.as_ref()?;
            if !mask.contains(node.layer) || !scene.is_active_in_hierarchy(id) {
                return None;
            }

            let world = scene.world_matrix(id);
            let inv = world.try_inverse()?;
            let local_origin = transform_point(&inv, &origin);
            let local_dir = transform_vector(&inv, &dir);

            // Affine maps preserve the ray parameter, so t is world distance for unit `dir`.
            let t = collider.intersect_local(&local_origin, &local_dir)?;
            (t <= max_distance).then(|| RaycastHit {
                node: id,
                distance: t,
                point: origin + dir * t,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::layer::Layer;

    fn scene_with_box(z: f32, layer: Layer) -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let id = scene.spawn("Box", None);
        let node = scene.node_mut(id).unwrap();
        node.transform.position = Vector3::new(0.0, 0.0, z);
        node.collider = Some(Collider::cube(1.0));
        node.layer = layer;
        (scene, id)
    }

    #[test]
    fn hits_within_distance() {
        let (scene, id) = scene_with_box(5.0, Layer::GRABBABLE);
        let hit = raycast(
            &scene,
            Point3::origin(),
            Vector3::z(),
            10.0,
            Layer::GRABBABLE.into(),
        )
        .unwrap();
        assert_eq!(hit.node, id);
        assert!((hit.distance - 4.5).abs() < 1e-4);
    }

    #[test]
    fn misses_beyond_distance() {
        let (scene, _) = scene_with_box(15.0, Layer::GRABBABLE);
        assert!(raycast(&scene, Point3::origin(), Vector3::z(), 10.0, Layer::GRABBABLE.into()).is_none());
    }

    #[test]
    fn filtered_by_layer_and_activation() {
        let (mut scene, id) = scene_with_box(5.0, Layer::DEFAULT);
        let mask: LayerMask = Layer::GRABBABLE.into();
        assert!(raycast(&scene, Point3::origin(), Vector3::z(), 10.0, mask).is_none());

        scene.node_mut(id).unwrap().layer = Layer::GRABBABLE;
        scene.set_active(id, false);
        assert!(raycast(&scene, Point3::origin(), Vector3::z(), 10.0, mask).is_none());
    }

    #[test]
    fn ignores_colliders_behind_origin() {
        let (scene, _) = scene_with_box(-5.0, Layer::GRABBABLE);
        assert!(raycast(&scene, Point3::origin(), Vector3::z(), 10.0, Layer::GRABBABLE.into()).is_none());
    }

    #[test]
    fn origin_inside_collider_is_not_a_hit() {
        let (mut scene, inner) = scene_with_box(0.0, Layer::GRABBABLE);
        scene.node_mut(inner).unwrap().collider = Some(Collider::cube(4.0));
        let ball = scene.spawn("Ball", None);
        scene.node_mut(ball).unwrap().collider = Some(Collider::Sphere {
            center: Point3::origin(),
            radius: 3.0,
        });
        let far = scene.spawn("Far", None);
        let node = scene.node_mut(far).unwrap();
        node.transform.position = Vector3::new(0.0, 0.0, 6.0);
        node.collider = Some(Collider::cube(1.0));

        let hit = raycast(&scene, Point3::origin(), Vector3::z(), 10.0, LayerMask::EVERYTHING).unwrap();
        assert_eq!(hit.node, far);
        assert!((hit.distance - 5.5).abs() < 1e-4);
    }

    #[test]
    fn scaled_sphere_distance_is_world_space() {
        let mut scene = Scene::new();
        let id = scene.spawn("Ball", None);
        let node = scene.node_mut(id).unwrap();
        node.transform.position = Vector3::new(0.0, 0.0, 8.0);
        node.transform.scale = Vector3::repeat(2.0);
        node.collider = Some(Collider::Sphere {
            center: Point3::origin(),
            radius: 1.0,
        });
        let hit = raycast(&scene, Point3::origin(), Vector3::z(), 10.0, LayerMask::EVERYTHING).unwrap();
        assert!((hit.distance - 6.0).abs() < 1e-4);
    }
}
