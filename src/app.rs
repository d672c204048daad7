//! Desktop front end: an egui window around the software viewport, plus the
//! headless runner used for scripted renders.

use crate::error::ViewerError;
use crate::input::emulator::EmulatorInput;
use crate::io::config::{Config, RenderConfig};
use crate::io::image::{save_rgba, screenshot_path};
use crate::render::camera::Camera;
use crate::render::viewport::{Pointer, ViewportRenderer, pointer_ray};
use crate::ui::widgets::{ButtonAction, ButtonId, Container, SliderChannel};
use crate::viewer::session::ViewerSession;
use egui::{Color32, ColorImage, RichText, Vec2};
use log::{error, info};
use nalgebra::{Point3, Vector2, Vector3};
use std::path::{Path, PathBuf};
use std::time::Instant;

const HEADLESS_DT: f32 = 1.0 / 60.0;
/// Upper bound on a single frame step, in seconds.
const MAX_DT: f32 = 0.1;

const POINTER_IDLE: Vector3<f32> = Vector3::new(0.6, 0.6, 0.6);
const POINTER_HOVER: Vector3<f32> = Vector3::new(0.2, 0.9, 0.3);
const POINTER_GRAB: Vector3<f32> = Vector3::new(1.0, 0.85, 0.1);

/// Builds the viewport renderer and head camera from the render settings.
pub fn build_renderer(config: &RenderConfig) -> (ViewportRenderer, Camera) {
    let mut renderer = ViewportRenderer::new(config.width, config.height);
    renderer.background = Vector3::from(config.background);
    renderer.ambient = config.ambient;
    renderer.light_direction = Vector3::from(config.light_direction)
        .try_normalize(1e-6)
        .unwrap_or_else(|| -Vector3::y());

    let camera = Camera::new_perspective(
        Point3::origin(),
        Point3::new(0.0, 0.0, 1.0),
        Vector3::y(),
        config.fov.to_radians(),
        renderer.aspect_ratio(),
        config.near,
        config.far,
    );
    (renderer, camera)
}

/// Pointer colored by what the grab ray would do right now.
pub fn grab_pointer(session: &ViewerSession) -> Pointer {
    let (origin, direction, hit) = session.aim_ray();
    let max = session.grabber.settings.grab_distance;
    let (length, color) = if session.grabber.is_grabbing() {
        (hit.map_or(max, |h| h.distance), POINTER_GRAB)
    } else if let Some(hit) = hit {
        (hit.distance, POINTER_HOVER)
    } else {
        (max, POINTER_IDLE)
    };
    pointer_ray(origin, direction, length, color)
}

/// Renders the session from the rig's head.
pub fn render_session(
    session: &ViewerSession,
    renderer: &mut ViewportRenderer,
    camera: &mut Camera,
    show_pointer: bool,
) {
    camera.follow(&session.scene, session.rig.head);
    let pointer = show_pointer.then(|| grab_pointer(session));
    renderer.render(&session.scene, camera, pointer.as_ref());
}

/// Steps the session without a window and writes the last frame to `output`.
pub fn run_headless(
    config: &Config,
    session: &mut ViewerSession,
    frames: u32,
    output: &Path,
) -> Result<(), ViewerError> {
    let start = Instant::now();
    let (mut renderer, mut camera) = build_renderer(&config.render);

    info!("--- Headless run ---");
    info!("Resolution: {}x{}", renderer.width, renderer.height);
    info!("Frames: {} at {:.1} fps", frames, 1.0 / HEADLESS_DT);

    for _ in 0..frames {
        session.update(HEADLESS_DT);
    }
    render_session(session, &mut renderer, &mut camera, config.render.show_pointer);

    let rgba = renderer.to_rgba8();
    save_rgba(&rgba, renderer.width, renderer.height, output)?;
    info!("Saved {} ({:?})", output.display(), start.elapsed());
    Ok(())
}

pub struct ViewerApp {
    pub session: ViewerSession,
    pub renderer: ViewportRenderer,
    pub camera: Camera,
    pub show_pointer: bool,

    viewport_image: Option<egui::TextureHandle>,
    /// Drag on the viewport from the previous frame, fed to the aim.
    pending_aim: Vec2,
    last_frame_time: Option<Instant>,
    status_message: String,
    screenshot_dir: PathBuf,
}

impl ViewerApp {
    pub fn new(config: &Config, session: ViewerSession, cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (renderer, camera) = build_renderer(&config.render);
        let screenshot_dir = Path::new(&config.render.output)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            session,
            renderer,
            camera,
            show_pointer: config.render.show_pointer,
            viewport_image: None,
            pending_aim: Vec2::ZERO,
            last_frame_time: None,
            status_message: String::from("Pick a model from the list"),
            screenshot_dir,
        }
    }

    fn read_input(&mut self, ctx: &egui::Context) -> EmulatorInput {
        let aim_delta = Vector2::new(self.pending_aim.x, self.pending_aim.y);
        self.pending_aim = Vec2::ZERO;

        if ctx.wants_keyboard_input() {
            return EmulatorInput {
                aim_delta,
                ..Default::default()
            };
        }

        ctx.input(|i| EmulatorInput {
            move_forward: i.key_down(egui::Key::W),
            move_back: i.key_down(egui::Key::S),
            move_left: i.key_down(egui::Key::A),
            move_right: i.key_down(egui::Key::D),
            stick_left: i.key_down(egui::Key::ArrowLeft),
            stick_right: i.key_down(egui::Key::ArrowRight),
            stick_up: i.key_down(egui::Key::ArrowUp),
            stick_down: i.key_down(egui::Key::ArrowDown),
            trigger: i.key_down(egui::Key::Space),
            primary: i.key_down(egui::Key::E),
            secondary: i.key_down(egui::Key::Q),
            aim_delta,
        })
    }

    fn step(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32())
            .min(MAX_DT);
        self.last_frame_time = Some(now);

        let input = self.read_input(ctx);
        self.session.emulate(&input);
        self.session.update(dt);

        render_session(
            &self.session,
            &mut self.renderer,
            &mut self.camera,
            self.show_pointer,
        );
        let image = ColorImage::from_rgba_unmultiplied(
            [self.renderer.width, self.renderer.height],
            &self.renderer.to_rgba8(),
        );
        match &mut self.viewport_image {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.viewport_image =
                    Some(ctx.load_texture("viewport", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn save_screenshot(&mut self) {
        let path = screenshot_path(&self.screenshot_dir);
        let rgba = self.renderer.to_rgba8();
        match save_rgba(&rgba, self.renderer.width, self.renderer.height, &path) {
            Ok(()) => self.status_message = format!("Saved {}", path.display()),
            Err(e) => {
                error!("Screenshot failed: {e}");
                self.status_message = format!("Screenshot failed: {e}");
            }
        }
    }

    fn draw_side_panel(&mut self, ui: &mut egui::Ui) {
        let mut clicked: Vec<ButtonId> = Vec::new();

        ui.heading("Models");
        egui::ScrollArea::vertical()
            .id_salt("models")
            .max_height(180.0)
            .show(ui, |ui| {
                let active = self.session.ui.active_model();
                for (id, button) in self.session.ui.widgets.visible(Container::Models) {
                    let is_active = matches!(
                        button.action,
                        Some(ButtonAction::Activate(m)) if Some(m) == active
                    );
                    if ui.selectable_label(is_active, &button.label).clicked() {
                        clicked.push(id);
                    }
                }
            });

        ui.separator();
        ui.heading("Animations");
        egui::ScrollArea::vertical()
            .id_salt("animations")
            .max_height(140.0)
            .show(ui, |ui| {
                let mut any = false;
                for (id, button) in self.session.ui.widgets.visible(Container::Animations) {
                    any = true;
                    if ui.button(&button.label).clicked() {
                        clicked.push(id);
                    }
                }
                if !any {
                    ui.small("No animations");
                }
            });

        for id in clicked {
            self.session.click(id);
        }

        ui.separator();
        ui.heading("Color");
        for channel in SliderChannel::ALL {
            let slider = self.session.ui.widgets.slider(channel);
            let (mut value, min, max) = (slider.value, slider.min, slider.max);
            if ui
                .add(egui::Slider::new(&mut value, min..=max).text(channel.label()))
                .changed()
            {
                self.session.set_slider(channel, value);
            }
        }
        let [r, g, b, a] = SliderChannel::ALL.map(|c| self.session.ui.widgets.slider(c).value);
        let swatch = Color32::from_rgba_unmultiplied(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (a * 255.0) as u8,
        );
        ui.label(RichText::new("■ current").color(swatch));

        ui.separator();
        let grab_text = match self.session.grabber.grabbed() {
            Some(node) => RichText::new(format!("Holding {}", self.session.scene.name(node)))
                .color(Color32::YELLOW),
            None => RichText::new("Not holding anything").color(Color32::GRAY),
        };
        ui.label(grab_text);
        ui.checkbox(&mut self.show_pointer, "Show pointer");

        ui.separator();
        ui.small("Drag viewport: aim right hand");
        ui.small("WASD: move   Arrows: right stick");
        ui.small("Space: trigger (hold to grab)");
        ui.small("While holding: Left / Right spins, W / S scales");
        ui.small("E / Q: push / pull held model");
        ui.small("P: screenshot");
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.step(ctx);

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::P)) {
            self.save_screenshot();
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Model Viewer");
                ui.separator();
                ui.label(&self.status_message);
            });
        });

        egui::SidePanel::left("left_panel")
            .min_width(240.0)
            .resizable(false)
            .show(ctx, |ui| {
                self.draw_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = &self.viewport_image {
                let available = ui.available_size();
                let aspect = self.renderer.aspect_ratio();
                let (width, height) = if available.x / available.y.max(1.0) > aspect {
                    (available.y * aspect, available.y)
                } else {
                    (available.x, available.x / aspect)
                };

                let response = ui.add(
                    egui::Image::new(texture)
                        .fit_to_exact_size(Vec2::new(width, height))
                        .sense(egui::Sense::click_and_drag()),
                );
                if response.dragged() {
                    self.pending_aim += response.drag_delta();
                }
            }
        });

        ctx.request_repaint();
    }
}

/// Opens the viewer window and blocks until it is closed.
pub fn start_gui(config: Config, session: ViewerSession) -> Result<(), ViewerError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(&config, session, cc)))),
    )?;
    Ok(())
}
