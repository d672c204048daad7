//! Scene hierarchy: nodes with a parent/children tree, local transforms,
//! activation flags and optional components.
//!
//! Nodes are never destroyed during a session, but handles are still
//! generational (`slotmap`) so a stale id reads as `None` instead of aliasing
//! another node.

use crate::core::math::transform::{TransformFactory, transform_vector};
use crate::scene::animation::Animator;
use crate::scene::layer::Layer;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::physics::Collider;
use crate::scene::transform::Transform;
use log::warn;
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};
use slotmap::{SlotMap, new_key_type};
use std::sync::Arc;

new_key_type! {
    pub struct NodeId;
    pub struct MaterialId;
}

/// Draws a mesh with one material per node.
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: Arc<Mesh>,
    pub materials: Vec<MaterialId>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub transform: Transform,
    /// Own activation flag; see [`Scene::is_active_in_hierarchy`].
    pub active: bool,
    pub layer: Layer,
    pub collider: Option<Collider>,
    pub renderer: Option<MeshRenderer>,
    pub animator: Option<Animator>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::identity(),
            active: true,
            layer: Layer::DEFAULT,
            collider: None,
            renderer: None,
            animator: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    materials: SlotMap<MaterialId, Material>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    //=================================
    // Nodes
    //=================================

    /// Creates an empty, active node. An unknown parent makes it a root.
    pub fn spawn(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.insert(Node::new(name), parent)
    }

    pub fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let parent = parent.filter(|p| {
            let known = self.nodes.contains_key(*p);
            if !known {
                warn!("Parent of '{}' not found; inserting as root", node.name);
            }
            known
        });
        node.parent = parent;
        node.children.clear();
        let id = self.nodes.insert(node);
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("<missing>", |n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    //=================================
    // Materials
    //=================================

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    //=================================
    // Hierarchy
    //=================================

    /// True when `node` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Moves `child` under `new_parent` (or to the root list), keeping its world pose.
    ///
    /// Returns false when either node is unknown or the move would create a cycle.
    pub fn set_parent(&mut self, child: NodeId, new_parent: Option<NodeId>) -> bool {
        if !self.contains(child) {
            warn!("set_parent: unknown child node");
            return false;
        }
        if let Some(p) = new_parent {
            if !self.contains(p) {
                warn!("set_parent: parent of '{}' not found", self.name(child));
                return false;
            }
            if self.is_descendant_of(p, child) {
                warn!(
                    "Cannot parent '{}' under '{}': would create a cycle",
                    self.name(child),
                    self.name(p)
                );
                return false;
            }
        }
        if self.parent(child) == new_parent {
            return true;
        }

        let world = self.world_matrix(child);

        // 1. Detach
        match self.parent(child) {
            Some(old) => self.nodes[old].children.retain(|&c| c != child),
            None => self.roots.retain(|&c| c != child),
        }

        // 2. Attach
        match new_parent {
            Some(p) => self.nodes[p].children.push(child),
            None => self.roots.push(child),
        }
        self.nodes[child].parent = new_parent;

        // 3. Re-express the old world pose relative to the new parent
        let parent_world = new_parent.map_or_else(Matrix4::identity, |p| self.world_matrix(p));
        match parent_world.try_inverse() {
            Some(inv) => self.nodes[child].transform = Transform::from_matrix(&(inv * world)),
            None => warn!(
                "Parent of '{}' has a singular transform; keeping local pose",
                self.name(child)
            ),
        }
        true
    }

    /// Direct child with the given name.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes
            .get(id)?
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// Follows a `/`-separated child path; the empty path is `id` itself.
    pub fn find_path(&self, id: NodeId, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(id, |cur, part| self.find_child(cur, part))
            .filter(|&found| self.contains(found))
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.nodes.get(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Nodes in the subtree that carry a mesh renderer.
    pub fn renderers_in_children(&self, id: NodeId, include_inactive: bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| include_inactive || self.is_active_in_hierarchy(n))
            .filter(|&n| self.nodes[n].renderer.is_some())
            .collect()
    }

    //=================================
    // Activation
    //=================================

    pub fn set_active(&mut self, id: NodeId, active: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.active = active;
        }
    }

    pub fn is_active_self(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.active)
    }

    /// Active only if the node and every ancestor are active.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            match self.nodes.get(cur) {
                Some(n) if n.active => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    //=================================
    // World-space transforms
    //=================================

    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let mut m = Matrix4::identity();
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let Some(node) = self.nodes.get(cur) else {
                break;
            };
            m = node.transform.matrix() * m;
            cursor = node.parent;
        }
        m
    }

    pub fn world_position(&self, id: NodeId) -> Point3<f32> {
        let m = self.world_matrix(id);
        Point3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
    }

    pub fn world_rotation(&self, id: NodeId) -> UnitQuaternion<f32> {
        TransformFactory::decompose(&self.world_matrix(id)).1
    }

    /// World-space +Z of the node, normalized.
    pub fn forward(&self, id: NodeId) -> Vector3<f32> {
        let f = transform_vector(&self.world_matrix(id), &Vector3::z());
        f.try_normalize(1e-8).unwrap_or_else(Vector3::z)
    }

    pub fn set_world_position(&mut self, id: NodeId, position: Point3<f32>) {
        let parent_world = self
            .parent(id)
            .map_or_else(Matrix4::identity, |p| self.world_matrix(p));
        let Some(inv) = parent_world.try_inverse() else {
            return;
        };
        let local = inv * position.to_homogeneous();
        if let Some(node) = self.nodes.get_mut(id) {
            node.transform.position = Vector3::new(local.x, local.y, local.z);
        }
    }

    /// Rotates the node about a world-space axis through its own pivot.
    pub fn rotate_world(&mut self, id: NodeId, axis: &Unit<Vector3<f32>>, degrees: f32) {
        let delta = UnitQuaternion::from_axis_angle(axis, degrees.to_radians());
        let world = delta * self.world_rotation(id);
        let parent_rot = self
            .parent(id)
            .map_or_else(UnitQuaternion::identity, |p| self.world_rotation(p));
        if let Some(node) = self.nodes.get_mut(id) {
            node.transform.rotation = parent_rot.inverse() * world;
        }
    }
}
