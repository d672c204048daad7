use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// A single vertex in object space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// 3 indices per triangle, counter-clockwise front faces.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds in object space, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);
        for v in &self.vertices {
            min = min.inf(&v.position);
            max = max.sup(&v.position);
        }
        Some((min, max))
    }

    /// Axis-aligned cube centered at the origin with edge length `size`.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        // (normal, u axis, v axis) per face; u x v == normal keeps CCW winding.
        let faces = [
            (Vector3::x(), -Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::x(), -Vector3::z()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), -Vector3::x(), Vector3::y()),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            let center = normal * h;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = center + u * (su * h) + v * (sv * h);
                vertices.push(Vertex::new(Point3::from(p), normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// Latitude/longitude sphere.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::new();
        for r in 0..=rings {
            let phi = PI * r as f32 / rings as f32;
            for s in 0..=segments {
                let theta = 2.0 * PI * s as f32 / segments as f32;
                let n = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(Vertex::new(Point3::from(n * radius), n));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::new();
        for r in 0..rings {
            for s in 0..segments {
                let a = r * stride + s;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }

        Self::new(vertices, indices)
    }

    /// Horizontal square on the XZ plane facing +Y.
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let n = Vector3::y();
        let vertices = vec![
            Vertex::new(Point3::new(-h, 0.0, h), n),
            Vertex::new(Point3::new(h, 0.0, h), n),
            Vertex::new(Point3::new(h, 0.0, -h), n),
            Vertex::new(Point3::new(-h, 0.0, -h), n),
        ];
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_bounds_match_size() {
        let cube = Mesh::cube(2.0);
        let (min, max) = cube.bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = Mesh::cube(1.0);
        for tri in cube.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices[i as usize]);
            let face_normal = (b.position - a.position).cross(&(c.position - a.position));
            assert!(face_normal.dot(&a.normal) > 0.0);
        }
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(Mesh::new(Vec::new(), Vec::new()).bounds().is_none());
    }
}
