use nalgebra::{Point2, UnitQuaternion, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights of point `p` in the screen-space triangle (v1, v2, v3).
///
/// Returns `None` for degenerate triangles (twice-area near zero).
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let rel = p - v1;

    let area_x2 = e1.x * e2.y - e1.y * e2.x;
    if area_x2.abs() < EPSILON {
        return None;
    }

    let inv = 1.0 / area_x2;
    let beta = (rel.x * e2.y - rel.y * e2.x) * inv;
    let gamma = (e1.x * rel.y - e1.y * rel.x) * inv;

    Some(Vector3::new(1.0 - beta - gamma, beta, gamma))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Locates `t` inside a sorted keyframe time list.
///
/// Returns the pair of surrounding indices and the blend factor between them.
/// Times before the first key clamp to it, times after the last clamp to the last.
pub fn keyframe_segment(times: &[f32], t: f32) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if t <= times[0] {
        return Some((0, 0, 0.0));
    }
    if t >= times[last] {
        return Some((last, last, 0.0));
    }

    let next = times.iter().position(|&k| k > t)?;
    let prev = next - 1;
    let span = times[next] - times[prev];
    let factor = if span > EPSILON {
        (t - times[prev]) / span
    } else {
        0.0
    };
    Some((prev, next, factor))
}

pub fn lerp_vec3(a: &Vector3<f32>, b: &Vector3<f32>, t: f32) -> Vector3<f32> {
    a + (b - a) * t
}

pub fn slerp(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    // Opposite quaternions have no unique arc; fall back to the start key.
    a.try_slerp(b, t, EPSILON).unwrap_or(*a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_clamps_outside_range() {
        let times = [0.0, 1.0, 2.0];
        assert_eq!(keyframe_segment(&times, -1.0), Some((0, 0, 0.0)));
        assert_eq!(keyframe_segment(&times, 5.0), Some((2, 2, 0.0)));
        assert_eq!(keyframe_segment(&[], 0.5), None);
    }

    #[test]
    fn segment_blends_between_keys() {
        let (a, b, f) = keyframe_segment(&[0.0, 2.0, 4.0], 3.0).unwrap();
        assert_eq!((a, b), (1, 2));
        assert!((f - 0.5).abs() < 1e-6);
    }

    #[test]
    fn centroid_is_inside() {
        let bary = barycentric_coordinates(
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        )
        .unwrap();
        assert!(is_inside_triangle(bary));
        assert!((bary.sum() - 1.0).abs() < 1e-5);
    }
}
