//! Model selection, animation buttons and material recoloring.

use crate::scene::graph::{MaterialId, NodeId, Scene};
use crate::scene::material::Rgba;
use crate::ui::widgets::{ButtonAction, ButtonId, Container, SliderChannel, Widgets};
use crate::viewer::pool::ModelPool;
use log::{debug, error, info, warn};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ModelUiController {
    pub widgets: Widgets,
    models: Vec<NodeId>,
    active_model: Option<NodeId>,
    /// Materials of the active model's renderers, rebuilt on every activation.
    materials: HashSet<MaterialId>,
    /// Grown on demand, hidden rather than removed.
    animation_buttons: Vec<ButtonId>,
}

impl ModelUiController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_model(&self) -> Option<NodeId> {
        self.active_model
    }

    pub fn material_set(&self) -> &HashSet<MaterialId> {
        &self.materials
    }

    pub fn animation_buttons(&self) -> &[ButtonId] {
        &self.animation_buttons
    }

    /// Rebuilds the model scroll view: one button per pooled model.
    pub fn update_ui(&mut self, pool: Option<&ModelPool>, scene: &Scene) {
        let Some(pool) = pool else {
            error!("Model pool is not assigned; model list left empty");
            return;
        };

        self.models = pool.models().to_vec();
        self.widgets.clear(Container::Models);
        for &model in &self.models {
            let id = self.widgets.add_button(Container::Models, scene.name(model));
            if let Some(button) = self.widgets.button_mut(id) {
                button.action = Some(ButtonAction::Activate(model));
            }
        }
        info!("Model list populated with {} entries", self.models.len());
    }

    /// Dispatches a click. Hidden or unknown buttons do nothing.
    pub fn click(&mut self, scene: &mut Scene, id: ButtonId) {
        let Some(action) = self
            .widgets
            .button(id)
            .filter(|b| b.visible)
            .and_then(|b| b.action.clone())
        else {
            return;
        };

        match action {
            ButtonAction::Activate(model) => self.activate_model(scene, model),
            ButtonAction::PlayClip { model, clip } => self.play_animation(scene, model, &clip),
        }
    }

    /// Shows `model` alone and points the animation list and sliders at it.
    pub fn activate_model(&mut self, scene: &mut Scene, model: NodeId) {
        if !scene.contains(model) {
            warn!("Cannot activate a model that is not in the scene");
            return;
        }

        if let Some(previous) = self.active_model {
            scene.set_active(previous, false);
        }
        scene.set_active(model, true);
        self.active_model = Some(model);
        info!("Active model: '{}'", scene.name(model));

        self.materials.clear();
        for node in scene.renderers_in_children(model, false) {
            if let Some(renderer) = scene.node(node).and_then(|n| n.renderer.as_ref()) {
                self.materials.extend(renderer.materials.iter().copied());
            }
        }

        let clips: Option<Vec<String>> = scene
            .node(model)
            .and_then(|n| n.animator.as_ref())
            .map(|a| a.clip_names().map(str::to_string).collect());

        match clips {
            Some(clips) => self.update_animation_list(model, &clips),
            None => self.hide_buttons_from(0),
        }
    }

    fn update_animation_list(&mut self, model: NodeId, clips: &[String]) {
        for (i, clip) in clips.iter().enumerate() {
            let id = match self.animation_buttons.get(i) {
                Some(&id) => id,
                None => {
                    let id = self.widgets.add_button(Container::Animations, clip);
                    self.animation_buttons.push(id);
                    id
                }
            };
            if let Some(button) = self.widgets.button_mut(id) {
                button.label = clip.clone();
                button.visible = true;
                button.action = Some(ButtonAction::PlayClip {
                    model,
                    clip: clip.clone(),
                });
            }
        }
        self.hide_buttons_from(clips.len());
        debug!(
            "Animation list: {} clips, {} pooled buttons",
            clips.len(),
            self.animation_buttons.len()
        );
    }

    fn hide_buttons_from(&mut self, start: usize) {
        for &id in self.animation_buttons.iter().skip(start) {
            if let Some(button) = self.widgets.button_mut(id) {
                button.visible = false;
            }
        }
    }

    fn play_animation(&mut self, scene: &mut Scene, model: NodeId, clip: &str) {
        match scene.node_mut(model).and_then(|n| n.animator.as_mut()) {
            Some(animator) => {
                animator.play(clip);
            }
            None => warn!("Model has no animator to play '{}'", clip),
        }
    }

    /// Slider callback: stores the value, then recolors the active model.
    pub fn set_slider(&mut self, scene: &mut Scene, channel: SliderChannel, value: f32) {
        self.widgets.set_slider_value(channel, value);
        self.update_color(scene);
    }

    /// Applies the current RGBA slider values to every cached material.
    pub fn update_color(&self, scene: &mut Scene) {
        if self.active_model.is_none() {
            return;
        }

        let color = self.slider_color();
        for &id in &self.materials {
            if let Some(material) = scene.material_mut(id) {
                material.color = color;
            }
        }
    }

    pub fn slider_color(&self) -> Rgba {
        let [r, g, b, a] = SliderChannel::ALL.map(|c| self.widgets.slider(c).value);
        Rgba::new(r, g, b, a)
    }
}
