use nalgebra::Vector4;

/// Linear RGBA color, each channel in [0, 1].
pub type Rgba = Vector4<f32>;

/// Surface description used by mesh renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Base color; alpha below 1.0 renders translucent.
    pub color: Rgba,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Vector4::new(0.8, 0.8, 0.8, 1.0),
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    pub fn from_rgb(name: impl Into<String>, rgb: [f32; 3]) -> Self {
        Self::new(name, Vector4::new(rgb[0], rgb[1], rgb[2], 1.0))
    }
}
