//! Retained widget state for the viewer panel.
//!
//! Widgets hold data only. Clicking a button yields its [`ButtonAction`],
//! which the UI controller dispatches; the desktop front-end just draws
//! whatever is visible here.

use crate::scene::graph::NodeId;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct ButtonId;
}

/// What a button does when clicked.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    /// Make a pooled model the active one.
    Activate(NodeId),
    /// Play a clip by name on the animator of `model`.
    PlayClip { model: NodeId, clip: String },
}

#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub visible: bool,
    pub action: Option<ButtonAction>,
}

/// Which scroll view a button lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Models,
    Animations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderChannel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl SliderChannel {
    pub const ALL: [SliderChannel; 4] = [
        SliderChannel::Red,
        SliderChannel::Green,
        SliderChannel::Blue,
        SliderChannel::Alpha,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SliderChannel::Red => "R",
            SliderChannel::Green => "G",
            SliderChannel::Blue => "B",
            SliderChannel::Alpha => "A",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Slider {
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            value: 1.0,
            min: 0.0,
            max: 1.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct Widgets {
    buttons: SlotMap<ButtonId, Button>,
    model_list: Vec<ButtonId>,
    animation_list: Vec<ButtonId>,
    sliders: [Slider; 4],
}

impl Widgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new visible button without an action.
    pub fn add_button(&mut self, container: Container, label: &str) -> ButtonId {
        let id = self.buttons.insert(Button {
            label: label.to_string(),
            visible: true,
            action: None,
        });
        self.list_mut(container).push(id);
        id
    }

    /// Removes every button in `container`.
    pub fn clear(&mut self, container: Container) {
        let ids = std::mem::take(self.list_mut(container));
        for id in ids {
            self.buttons.remove(id);
        }
    }

    pub fn button(&self, id: ButtonId) -> Option<&Button> {
        self.buttons.get(id)
    }

    pub fn button_mut(&mut self, id: ButtonId) -> Option<&mut Button> {
        self.buttons.get_mut(id)
    }

    /// All buttons of a container in display order, hidden ones included.
    pub fn buttons_in(&self, container: Container) -> &[ButtonId] {
        match container {
            Container::Models => &self.model_list,
            Container::Animations => &self.animation_list,
        }
    }

    /// Visible buttons of a container in display order.
    pub fn visible(&self, container: Container) -> impl Iterator<Item = (ButtonId, &Button)> {
        self.buttons_in(container)
            .iter()
            .filter_map(|&id| self.buttons.get(id).map(|b| (id, b)))
            .filter(|(_, b)| b.visible)
    }

    pub fn slider(&self, channel: SliderChannel) -> &Slider {
        &self.sliders[channel.index()]
    }

    /// Stores a clamped value and returns it.
    pub fn set_slider_value(&mut self, channel: SliderChannel, value: f32) -> f32 {
        let slider = &mut self.sliders[channel.index()];
        slider.value = value.clamp(slider.min, slider.max);
        slider.value
    }

    fn list_mut(&mut self, container: Container) -> &mut Vec<ButtonId> {
        match container {
            Container::Models => &mut self.model_list,
            Container::Animations => &mut self.animation_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_skips_hidden_buttons() {
        let mut widgets = Widgets::new();
        let a = widgets.add_button(Container::Animations, "Spin");
        let b = widgets.add_button(Container::Animations, "Pulse");
        widgets.button_mut(a).unwrap().visible = false;

        let shown: Vec<ButtonId> = widgets.visible(Container::Animations).map(|(id, _)| id).collect();
        assert_eq!(shown, vec![b]);
        assert_eq!(widgets.buttons_in(Container::Animations).len(), 2);
        assert_eq!(widgets.visible(Container::Models).count(), 0);
    }

    #[test]
    fn slider_values_are_clamped() {
        let mut widgets = Widgets::new();
        assert_eq!(widgets.slider(SliderChannel::Alpha).value, 1.0);
        assert_eq!(widgets.set_slider_value(SliderChannel::Red, 1.7), 1.0);
        assert_eq!(widgets.set_slider_value(SliderChannel::Red, -0.2), 0.0);
        assert_eq!(widgets.slider(SliderChannel::Red).value, 0.0);
    }

    #[test]
    fn clear_removes_only_that_container() {
        let mut widgets = Widgets::new();
        let model = widgets.add_button(Container::Models, "Cube");
        let anim = widgets.add_button(Container::Animations, "Spin");
        widgets.clear(Container::Models);
        assert!(widgets.button(model).is_none());
        assert!(widgets.button(anim).is_some());
    }
}
