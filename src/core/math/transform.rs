use nalgebra::{Matrix3, Matrix4, Point2, Point3, Rotation3, UnitQuaternion, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for creating various transformation matrices.
/// Manually implemented to ensure control over the coordinate system (Right-Handed).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Composes Translation * Rotation * Scale.
    pub fn trs(
        position: &Vector3<f32>,
        rotation: &UnitQuaternion<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(position) * rotation.to_homogeneous() * Self::scaling_nonuniform(scale)
    }

    /// Splits an affine matrix back into (position, rotation, scale).
    ///
    /// Scale comes from the basis column lengths, rotation from the normalized basis.
    /// Shear introduced by non-uniform parent scale is dropped.
    pub fn decompose(m: &Matrix4<f32>) -> (Vector3<f32>, UnitQuaternion<f32>, Vector3<f32>) {
        let position = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);

        let c0 = Vector3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
        let c1 = Vector3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
        let c2 = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);

        let mut scale = Vector3::new(c0.norm(), c1.norm(), c2.norm());

        // A mirrored basis keeps its handedness in the scale sign.
        let basis = Matrix3::from_columns(&[c0, c1, c2]);
        if basis.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let safe = |v: Vector3<f32>, s: f32| if s.abs() > 1e-8 { v / s } else { v };
        let rot_basis = Matrix3::from_columns(&[
            safe(c0, scale.x),
            safe(c1, scale.y),
            safe(c2, scale.z),
        ]);

        let rotation = UnitQuaternion::from_rotation_matrix(
            &Rotation3::from_matrix_eps(&rot_basis, 1e-6, 32, Rotation3::identity()),
        );

        (position, rotation, scale)
    }

    /// Creates a View matrix (Look-At, Right-Handed).
    /// Transforms world space coordinates to camera/view space.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        // In RHS, camera looks down -Z
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        let translation = Self::translation(&-eye.coords);

        rotation * translation
    }

    /// Creates a Perspective Projection matrix (Right-Handed).
    /// Maps view frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,                          0.0,
            0.0,              f,   0.0,                          0.0,
            0.0,              0.0, (far + near) * nf,            2.0 * far * near * nf,
            0.0,              0.0, -1.0,                         0.0,
        )
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Transforms a point by an affine matrix.
#[inline]
pub fn transform_point(m: &Matrix4<f32>, p: &Point3<f32>) -> Point3<f32> {
    let v = m * p.to_homogeneous();
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction by an affine matrix (translation ignored).
#[inline]
pub fn transform_vector(m: &Matrix4<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    let r = m * Vector4::new(v.x, v.y, v.z, 0.0);
    Vector3::new(r.x, r.y, r.z)
}

/// Performs perspective division: Clip Space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Converts NDC coordinates to Screen coordinates (Viewport Transform).
/// Note: Y-axis is flipped (NDC +Y is up, Screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn vec3_approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < EPSILON
    }

    #[test]
    fn decompose_recovers_trs() {
        let position = Vector3::new(1.0, -2.0, 3.5);
        let rotation = UnitQuaternion::from_euler_angles(0.3, 1.1, -0.4);
        let scale = Vector3::new(2.0, 0.5, 1.5);

        let (p, r, s) = TransformFactory::decompose(&TransformFactory::trs(&position, &rotation, &scale));

        assert!(vec3_approx(p, position));
        assert!(vec3_approx(s, scale));
        assert!(r.angle_to(&rotation) < EPSILON);
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let m = TransformFactory::translation(&Vector3::new(5.0, 5.0, 5.0));
        let v = transform_vector(&m, &Vector3::z());
        assert!(vec3_approx(v, Vector3::z()));

        let p = transform_point(&m, &Point3::origin());
        assert!(vec3_approx(p.coords, Vector3::new(5.0, 5.0, 5.0)));
    }
}
