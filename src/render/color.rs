use nalgebra::Vector3;

/// Converts linear RGB to sRGB (Gamma Correction).
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    let gamma = 1.0 / 2.2;
    Vector3::new(
        color.x.max(0.0).powf(gamma),
        color.y.max(0.0).powf(gamma),
        color.z.max(0.0).powf(gamma),
    )
}

/// Gamma-corrects and quantizes a linear color to opaque RGBA8.
pub fn to_rgba8(color: Vector3<f32>) -> [u8; 4] {
    let srgb = linear_to_srgb(color);
    [
        (srgb.x.clamp(0.0, 1.0) * 255.0) as u8,
        (srgb.y.clamp(0.0, 1.0) * 255.0) as u8,
        (srgb.z.clamp(0.0, 1.0) * 255.0) as u8,
        255,
    ]
}

/// Source-over blend of `src` with coverage `alpha` onto `dst`.
#[inline]
pub fn blend(dst: Vector3<f32>, src: Vector3<f32>, alpha: f32) -> Vector3<f32> {
    let a = alpha.clamp(0.0, 1.0);
    src * a + dst * (1.0 - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_survive_quantization() {
        assert_eq!(to_rgba8(Vector3::zeros()), [0, 0, 0, 255]);
        assert_eq!(to_rgba8(Vector3::new(1.0, 1.0, 1.0)), [255, 255, 255, 255]);
        assert_eq!(to_rgba8(Vector3::new(4.0, -1.0, 1.0)), [255, 0, 255, 255]);
    }

    #[test]
    fn blend_weights_by_alpha() {
        let out = blend(Vector3::zeros(), Vector3::new(1.0, 0.5, 0.0), 0.5);
        assert!((out - Vector3::new(0.5, 0.25, 0.0)).norm() < 1e-6);
    }
}
