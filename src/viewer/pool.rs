use crate::scene::graph::{NodeId, Scene};
use crate::scene::layer::Layer;
use crate::scene::prefab::Prefab;
use crate::viewer::ui::ModelUiController;
use log::{info, warn};

/// Every configured model, instanced once and kept for the whole session.
#[derive(Debug, Default)]
pub struct ModelPool {
    models: Vec<NodeId>,
}

impl ModelPool {
    /// Instances each prefab under `parent`, hidden and grabbable, then
    /// hands the finished pool to the UI.
    ///
    /// `None` slots (models that failed to load) are skipped.
    pub fn populate(
        scene: &mut Scene,
        prefabs: &[Option<Prefab>],
        parent: Option<NodeId>,
        ui: &mut ModelUiController,
    ) -> Self {
        if parent.is_none() {
            warn!("Model parent is not assigned; models are placed at the scene root");
        }

        let mut pool = ModelPool::default();
        for (slot, prefab) in prefabs.iter().enumerate() {
            let Some(prefab) = prefab else {
                warn!("Model slot {} has no prefab; skipped", slot);
                continue;
            };

            let instance = scene.instantiate(prefab, parent);
            if let Some(node) = scene.node_mut(instance) {
                node.name = prefab.name.clone();
                node.layer = Layer::GRABBABLE;
                node.active = false;
            }
            pool.models.push(instance);
        }
        info!("Model pool ready: {} models", pool.models.len());

        ui.update_ui(Some(&pool), scene);
        pool
    }

    pub fn models(&self) -> &[NodeId] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
