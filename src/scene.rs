pub mod animation;
pub mod graph;
pub mod layer;
pub mod material;
pub mod mesh;
pub mod physics;
pub mod prefab;
pub mod transform;
