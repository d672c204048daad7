//! Software viewport: draws every visible mesh renderer with Lambert shading.
//!
//! Opaque materials are drawn first with depth writes. Translucent ones
//! (alpha < 1) follow back to front, depth-tested but not written, and are
//! blended over what is already there. The pointer ray is drawn last.

use crate::core::math::interpolation::{barycentric_coordinates, is_inside_triangle};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::render::camera::Camera;
use crate::render::color::{blend, to_rgba8};
use crate::scene::graph::Scene;
use crate::scene::material::{Material, Rgba};
use crate::scene::mesh::Mesh;
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3, Vector4};
use rayon::prelude::*;
use std::sync::Arc;

/// World-space segment drawn on top of the scene.
#[derive(Debug, Clone, Copy)]
pub struct Pointer {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub color: Vector3<f32>,
}

struct DrawItem {
    mesh: Arc<Mesh>,
    world: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,
    color: Rgba,
    /// Squared distance from the camera, for back-to-front sorting.
    distance_sq: f32,
}

/// Clip-space vertex plus world-space normal.
type ClipVertex = (Vector4<f32>, Vector3<f32>);

pub struct ViewportRenderer {
    pub width: usize,
    pub height: usize,
    pub background: Vector3<f32>,
    pub ambient: f32,
    /// Direction the light travels, normalized.
    pub light_direction: Vector3<f32>,
    color: Vec<Vector3<f32>>,
    depth: Vec<f32>,
}

impl ViewportRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            background: Vector3::new(0.1, 0.1, 0.12),
            ambient: 0.25,
            light_direction: Vector3::new(-0.4, -1.0, 0.6).normalize(),
            color: vec![Vector3::zeros(); size],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Renders one frame into the internal buffers.
    pub fn render(&mut self, scene: &Scene, camera: &Camera, pointer: Option<&Pointer>) {
        self.clear();

        let view_proj = camera.view_projection();
        let (mut opaque, mut translucent): (Vec<DrawItem>, Vec<DrawItem>) = self
            .collect_items(scene, camera)
            .into_iter()
            .partition(|item| item.color.w >= 0.999);

        opaque.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
        for item in &opaque {
            self.draw_item(item, &view_proj, false);
        }

        translucent.sort_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
        for item in &translucent {
            self.draw_item(item, &view_proj, true);
        }

        if let Some(pointer) = pointer {
            self.draw_line(&view_proj, pointer);
        }
    }

    /// Gamma-corrected RGBA8 copy of the color buffer, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.width * self.height * 4];
        if self.width == 0 {
            return out;
        }
        out.par_chunks_mut(self.width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    pixel.copy_from_slice(&to_rgba8(self.color[y * self.width + x]));
                }
            });
        out
    }

    fn clear(&mut self) {
        let background = self.background;
        self.color.par_iter_mut().for_each(|c| *c = background);
        self.depth.par_iter_mut().for_each(|d| *d = f32::INFINITY);
    }

    fn collect_items(&self, scene: &Scene, camera: &Camera) -> Vec<DrawItem> {
        scene
            .node_ids()
            .filter(|&id| scene.is_active_in_hierarchy(id))
            .filter_map(|id| {
                let renderer = scene.node(id)?.renderer.as_ref()?;
                let color = renderer
                    .materials
                    .first()
                    .and_then(|&m| scene.material(m))
                    .map_or_else(|| Material::default().color, |m| m.color);

                let world = scene.world_matrix(id);
                let normal_matrix = world
                    .fixed_view::<3, 3>(0, 0)
                    .into_owned()
                    .try_inverse()?
                    .transpose();
                let distance_sq = (scene.world_position(id) - camera.position).norm_squared();

                Some(DrawItem {
                    mesh: Arc::clone(&renderer.mesh),
                    world,
                    normal_matrix,
                    color,
                    distance_sq,
                })
            })
            .collect()
    }

    fn draw_item(&mut self, item: &DrawItem, view_proj: &Matrix4<f32>, translucent: bool) {
        let mvp = view_proj * item.world;
        let mesh = &item.mesh;

        for tri in mesh.indices.chunks_exact(3) {
            let mut verts: [ClipVertex; 3] = [(Vector4::zeros(), Vector3::zeros()); 3];
            for (slot, &index) in verts.iter_mut().zip(tri) {
                let Some(v) = mesh.vertices.get(index as usize) else {
                    return;
                };
                *slot = (mvp * v.position.to_homogeneous(), item.normal_matrix * v.normal);
            }

            let poly = clip_near(&verts);
            for i in 1..poly.len().saturating_sub(1) {
                self.raster_triangle(&[poly[0], poly[i], poly[i + 1]], item.color, translucent);
            }
        }
    }

    fn raster_triangle(&mut self, verts: &[ClipVertex; 3], color: Rgba, translucent: bool) {
        let (w, h) = (self.width as f32, self.height as f32);

        let mut screen = [Point2::origin(); 3];
        let mut z_ndc = [0.0; 3];
        let mut inv_w = [0.0; 3];
        for (i, (clip, _)) in verts.iter().enumerate() {
            if clip.w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(clip);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, w, h);
            z_ndc[i] = ndc.z;
            inv_w[i] = 1.0 / clip.w;
        }

        // Backface culling: front faces wind clockwise once Y points down
        let e1 = screen[1] - screen[0];
        let e2 = screen[2] - screen[1];
        if e1.x * e2.y - e1.y * e2.x >= 0.0 {
            return;
        }

        let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
        let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
        let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as usize).min(self.width.saturating_sub(1));
        let max_y = (max_y as usize).min(self.height.saturating_sub(1));

        let base = Vector3::new(color.x, color.y, color.z);
        let to_light = -self.light_direction;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(p, screen[0], screen[1], screen[2]) else {
                    return;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                let depth = bary.x * z_ndc[0] + bary.y * z_ndc[1] + bary.z * z_ndc[2];
                let idx = y * self.width + x;
                if !(-1.0..=1.0).contains(&depth) || depth >= self.depth[idx] {
                    continue;
                }

                // Perspective-correct normal
                let pw = Vector3::new(bary.x * inv_w[0], bary.y * inv_w[1], bary.z * inv_w[2]);
                let sum = pw.x + pw.y + pw.z;
                if sum.abs() < 1e-12 {
                    continue;
                }
                let n = (verts[0].1 * pw.x + verts[1].1 * pw.y + verts[2].1 * pw.z) / sum;
                let n = n.try_normalize(1e-8).unwrap_or_else(Vector3::y);

                let diffuse = n.dot(&to_light).max(0.0);
                let shaded = base * (self.ambient + (1.0 - self.ambient) * diffuse);

                if translucent {
                    self.color[idx] = blend(self.color[idx], shaded, color.w);
                } else {
                    self.color[idx] = shaded;
                    self.depth[idx] = depth;
                }
            }
        }
    }

    fn draw_line(&mut self, view_proj: &Matrix4<f32>, pointer: &Pointer) {
        let a = view_proj * pointer.start.to_homogeneous();
        let b = view_proj * pointer.end.to_homogeneous();
        let Some((a, b)) = clip_segment_near(a, b) else {
            return;
        };

        let (w, h) = (self.width as f32, self.height as f32);
        let na = apply_perspective_division(&a);
        let nb = apply_perspective_division(&b);
        let sa = ndc_to_screen(na.x, na.y, w, h);
        let sb = ndc_to_screen(nb.x, nb.y, w, h);

        let d = sb - sa;
        let steps = d.x.abs().max(d.y.abs()).ceil().clamp(1.0, 4096.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = sa + (sb - sa) * t;
            if p.x < 0.0 || p.y < 0.0 || p.x >= w || p.y >= h {
                continue;
            }
            let depth = na.z + (nb.z - na.z) * t;
            let idx = p.y as usize * self.width + p.x as usize;
            if depth < self.depth[idx] {
                self.color[idx] = pointer.color;
            }
        }
    }
}

/// Clips a triangle against the near plane (z >= -w), returning a convex polygon.
fn clip_near(verts: &[ClipVertex; 3]) -> Vec<ClipVertex> {
    let dist = |v: &ClipVertex| v.0.z + v.0.w;
    let mut out = Vec::with_capacity(4);

    for i in 0..3 {
        let curr = verts[i];
        let prev = verts[(i + 2) % 3];
        let (dc, dp) = (dist(&curr), dist(&prev));

        if (dc >= 0.0) != (dp >= 0.0) {
            let t = dp / (dp - dc);
            out.push((prev.0 + (curr.0 - prev.0) * t, prev.1 + (curr.1 - prev.1) * t));
        }
        if dc >= 0.0 {
            out.push(curr);
        }
    }
    out
}

fn clip_segment_near(a: Vector4<f32>, b: Vector4<f32>) -> Option<(Vector4<f32>, Vector4<f32>)> {
    let (da, db) = (a.z + a.w, b.z + b.w);
    match (da >= 0.0, db >= 0.0) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, a + (b - a) * (da / (da - db)))),
        (false, true) => Some((a + (b - a) * (da / (da - db)), b)),
    }
}

/// Pointer from `start` along `direction` for `length` world units.
pub fn pointer_ray(
    start: Point3<f32>,
    direction: Vector3<f32>,
    length: f32,
    color: Vector3<f32>,
) -> Pointer {
    let dir = direction.try_normalize(1e-8).unwrap_or_else(Vector3::z);
    Pointer {
        start,
        end: start + dir * length,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::MeshRenderer;

    fn camera(aspect: f32) -> Camera {
        Camera::new_perspective(
            Point3::origin(),
            Point3::new(0.0, 0.0, 1.0),
            Vector3::y(),
            60f32.to_radians(),
            aspect,
            0.05,
            100.0,
        )
    }

    fn scene_with_cube(color: Rgba) -> Scene {
        let mut scene = Scene::new();
        let id = scene.spawn("Cube", None);
        let material = scene.add_material(Material::new("Cube", color));
        let node = scene.node_mut(id).unwrap();
        node.transform.position = Vector3::new(0.0, 0.0, 3.0);
        node.renderer = Some(MeshRenderer {
            mesh: Arc::new(Mesh::cube(1.0)),
            materials: vec![material],
        });
        scene
    }

    fn center_pixel(renderer: &ViewportRenderer) -> [u8; 4] {
        let rgba = renderer.to_rgba8();
        let idx = ((renderer.height / 2) * renderer.width + renderer.width / 2) * 4;
        [rgba[idx], rgba[idx + 1], rgba[idx + 2], rgba[idx + 3]]
    }

    #[test]
    fn opaque_cube_covers_center() {
        let mut renderer = ViewportRenderer::new(64, 48);
        renderer.background = Vector3::zeros();
        let scene = scene_with_cube(Vector4::new(1.0, 0.0, 0.0, 1.0));
        renderer.render(&scene, &camera(renderer.aspect_ratio()), None);

        let px = center_pixel(&renderer);
        assert!(px[0] > 0);
        assert_eq!(px[1], 0);
        assert_eq!(px[2], 0);
    }

    #[test]
    fn translucent_cube_blends_with_background() {
        let mut renderer = ViewportRenderer::new(64, 48);
        renderer.background = Vector3::new(0.0, 0.0, 1.0);
        renderer.ambient = 1.0;
        let scene = scene_with_cube(Vector4::new(1.0, 0.0, 0.0, 0.5));
        renderer.render(&scene, &camera(renderer.aspect_ratio()), None);

        let px = center_pixel(&renderer);
        assert!(px[0] > 0 && px[2] > 0);
    }

    #[test]
    fn inactive_nodes_are_not_drawn() {
        let mut renderer = ViewportRenderer::new(32, 32);
        renderer.background = Vector3::zeros();
        let mut scene = scene_with_cube(Vector4::new(1.0, 1.0, 1.0, 1.0));
        let id = scene.roots()[0];
        scene.set_active(id, false);
        renderer.render(&scene, &camera(1.0), None);
        assert!(renderer.to_rgba8().chunks(4).all(|p| p[..3] == [0, 0, 0]));
    }

    #[test]
    fn near_clip_keeps_visible_part() {
        let verts: [ClipVertex; 3] = [
            (Vector4::new(0.0, 0.0, 0.5, 1.0), Vector3::y()),
            (Vector4::new(1.0, 0.0, 0.5, 1.0), Vector3::y()),
            (Vector4::new(0.0, 1.0, -2.0, 1.0), Vector3::y()),
        ];
        let poly = clip_near(&verts);
        assert_eq!(poly.len(), 4);
        assert!(poly.iter().all(|v| v.0.z + v.0.w >= -1e-6));
    }
}
