//! Layer classification used to filter physics queries.
//!
//! Every node sits on exactly one layer. Raycasts take a [`LayerMask`] and
//! only consider colliders whose node layer is contained in it.

/// One of 32 classification layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Layer(u8);

/// Built-in layer names, indexed by layer number.
const LAYER_NAMES: [(&str, u8); 4] = [
    ("Default", 0),
    ("Ignore Raycast", 2),
    ("UI", 5),
    ("Grabbable", 8),
];

impl Layer {
    pub const DEFAULT: Layer = Layer(0);
    pub const IGNORE_RAYCAST: Layer = Layer(2);
    pub const UI: Layer = Layer(5);
    pub const GRABBABLE: Layer = Layer(8);

    /// Returns `None` when `index` is outside 0..32.
    pub fn new(index: u8) -> Option<Self> {
        (index < 32).then_some(Layer(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Looks a layer up by its configured name.
    pub fn from_name(name: &str) -> Option<Self> {
        LAYER_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, i)| Layer(i))
    }

    pub fn name(self) -> Option<&'static str> {
        LAYER_NAMES
            .iter()
            .find(|&&(_, i)| i == self.0)
            .map(|&(n, _)| n)
    }
}

/// Bit set of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const EVERYTHING: LayerMask = LayerMask(u32::MAX);

    pub fn from_layers(layers: &[Layer]) -> Self {
        LayerMask(layers.iter().fold(0, |acc, l| acc | (1u32 << l.0)))
    }

    /// Resolves layer names; unknown names are ignored with a warning.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let layers: Vec<Layer> = names
            .iter()
            .filter_map(|n| {
                let layer = Layer::from_name(n.as_ref());
                if layer.is_none() {
                    log::warn!("Unknown layer name '{}' in mask", n.as_ref());
                }
                layer
            })
            .collect();
        Self::from_layers(&layers)
    }

    #[inline]
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & (1u32 << layer.0) != 0
    }
}

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        LayerMask(1u32 << layer.0)
    }
}
