use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

/// Local position, rotation and scale of a node relative to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builds a transform from euler angles given in degrees (X, Y, Z).
    pub fn from_euler_degrees(
        position: Vector3<f32>,
        euler_deg: [f32; 3],
        scale: Vector3<f32>,
    ) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::from_euler_angles(
                euler_deg[0].to_radians(),
                euler_deg[1].to_radians(),
                euler_deg[2].to_radians(),
            ),
            scale,
        }
    }

    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        let (position, rotation, scale) = TransformFactory::decompose(m);
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local-to-parent matrix (T * R * S).
    pub fn matrix(&self) -> Matrix4<f32> {
        TransformFactory::trs(&self.position, &self.rotation, &self.scale)
    }

    /// Local +Z axis.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    /// Right-handed: facing +Z with +Y up, right is -X.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation * -Vector3::x()
    }
}
