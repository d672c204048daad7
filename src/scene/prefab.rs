use crate::scene::animation::{AnimationClip, Animator};
use crate::scene::graph::{MeshRenderer, Node, NodeId, Scene};
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::physics::Collider;
use crate::scene::transform::Transform;
use std::sync::Arc;

/// Template for a node subtree.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
    pub materials: Vec<Material>,
    /// Explicit collider; meshes without one get a box around their bounds.
    pub collider: Option<Collider>,
    pub clips: Vec<AnimationClip>,
    pub children: Vec<PrefabNode>,
}

impl PrefabNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mesh(mut self, mesh: Arc<Mesh>, material: Material) -> Self {
        self.mesh = Some(mesh);
        self.materials = vec![material];
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: PrefabNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_clips(mut self, clips: Vec<AnimationClip>) -> Self {
        self.clips = clips;
        self
    }
}

/// A named, instantiable model description.
#[derive(Debug, Clone)]
pub struct Prefab {
    pub name: String,
    pub root: PrefabNode,
}

impl Prefab {
    pub fn new(name: impl Into<String>, root: PrefabNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

impl Scene {
    /// Builds a live copy of `prefab` under `parent` and returns its root.
    ///
    /// Materials are copied into the scene per instance, so recoloring one
    /// instance never affects another.
    pub fn instantiate(&mut self, prefab: &Prefab, parent: Option<NodeId>) -> NodeId {
        self.instantiate_node(&prefab.root, parent)
    }

    fn instantiate_node(&mut self, template: &PrefabNode, parent: Option<NodeId>) -> NodeId {
        let mut node = Node::new(template.name.clone());
        node.transform = template.transform.clone();

        if let Some(mesh) = &template.mesh {
            let materials = if template.materials.is_empty() {
                vec![self.add_material(Material::default())]
            } else {
                template
                    .materials
                    .iter()
                    .map(|m| self.add_material(m.clone()))
                    .collect()
            };
            node.renderer = Some(MeshRenderer {
                mesh: Arc::clone(mesh),
                materials,
            });
        }

        node.collider = template.collider.clone().or_else(|| {
            template
                .mesh
                .as_ref()
                .and_then(|m| m.bounds())
                .map(|(min, max)| Collider::from_bounds(min, max))
        });

        if !template.clips.is_empty() {
            node.animator = Some(Animator::new(template.clips.clone()));
        }

        let id = self.insert(node, parent);
        for child in &template.children {
            self.instantiate_node(child, Some(id));
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn instances_do_not_share_materials() {
        let cube = Arc::new(Mesh::cube(1.0));
        let prefab = Prefab::new(
            "Cube",
            PrefabNode::new("Cube").with_mesh(cube, Material::from_rgb("Red", [1.0, 0.0, 0.0])),
        );

        let mut scene = Scene::new();
        let a = scene.instantiate(&prefab, None);
        let b = scene.instantiate(&prefab, None);

        let mat_a = scene.node(a).unwrap().renderer.as_ref().unwrap().materials[0];
        let mat_b = scene.node(b).unwrap().renderer.as_ref().unwrap().materials[0];
        assert_ne!(mat_a, mat_b);

        scene.material_mut(mat_a).unwrap().color = Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(scene.material(mat_b).unwrap().color, Vector4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn mesh_gets_bounds_collider_and_children_follow() {
        let prefab = Prefab::new(
            "Windmill",
            PrefabNode::new("Windmill")
                .with_mesh(Arc::new(Mesh::cube(2.0)), Material::default())
                .with_child(PrefabNode::new("Hub")),
        );
        let mut scene = Scene::new();
        let root = scene.instantiate(&prefab, None);

        assert_eq!(scene.node(root).unwrap().collider, Some(Collider::cube(2.0)));
        let hub = scene.find_child(root, "Hub").unwrap();
        assert!(scene.node(hub).unwrap().collider.is_none());
    }
}
