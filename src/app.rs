// src/app.rs
//! Application driver
//!
//! Owns the winit event loop and the per-frame cadence. The loop has two
//! states: awaiting assets (the model load has not resolved; the animator
//! no-ops) and active (registry populated; the full celestial pass runs each
//! frame). The transition fires exactly once, when the one-shot load channel
//! yields a model that binds, and never goes back.

use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::celestial::CelestialAnimator;
use crate::gfx::{camera::Camera, scene::loader::ModelLoadTask, scene::Scene, RenderEngine};
use crate::params::Parameters;
use crate::ui::{
    panel::{scene_panel, SceneStatus},
    UiManager,
};

pub struct HomesteadApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    params: Parameters,
    animator: CelestialAnimator,
    load_task: Option<ModelLoadTask>,
    gpu_scene_ready: bool,
}

impl HomesteadApp {
    /// Create a new application with default settings
    pub async fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let scene = Scene::new(Camera::new(1.0));

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                params: Parameters::default(),
                animator: CelestialAnimator::default(),
                load_task: None,
                gpu_scene_ready: false,
            },
        }
    }

    /// Starts loading the diorama model on a worker thread.
    ///
    /// The load races the first frames; until it resolves the loop renders
    /// the empty backdrop and the animator stays idle.
    pub fn load_model(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::info!("loading model '{}'", path.display());
        self.app_state.load_task = Some(ModelLoadTask::spawn(path));
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    /// Polls the one-shot load channel and installs the model on success.
    ///
    /// The task is dropped after it resolves either way, so a failure is
    /// reported once and the loop stays in the awaiting-assets state.
    fn poll_model_load(&mut self) {
        let Some(task) = self.load_task.as_mut() else {
            return;
        };
        let Some(outcome) = task.poll() else {
            return;
        };
        self.load_task = None;

        let models = match outcome {
            Ok(models) => models,
            Err(err) => {
                log::error!("model load failed: {err}");
                return;
            }
        };

        match self.scene.install_model(models) {
            Ok(()) => {
                if let Some(render_engine) = self.render_engine.as_ref() {
                    self.scene
                        .init_gpu_resources(render_engine.device(), render_engine.queue());
                    self.gpu_scene_ready = true;
                }
                log::info!("scene active");
            }
            Err(err) => {
                log::error!("model binding failed: {err}");
            }
        }
    }

    fn status(&self) -> SceneStatus {
        if self.scene.registry.is_populated() {
            SceneStatus::Active
        } else {
            SceneStatus::AwaitingAssets
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default().with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene.camera.resize_projection(width, height);

            let window_clone = window_handle.clone();
            let renderer =
                pollster::block_on(
                    async move { RenderEngine::new(window_clone, width, height).await },
                );

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            // The load may already have resolved before the GPU came up
            if self.scene.registry.is_populated() && !self.gpu_scene_ready {
                self.scene
                    .init_gpu_resources(renderer.device(), renderer.queue());
                self.gpu_scene_ready = true;
            }

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let window = window.clone();

        // Let the UI see the event first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene.camera.resize_projection(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.poll_model_load();
                let status = self.status();

                // poll_model_load may have re-borrowed; fetch the engine again
                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };

                self.scene.update();
                self.animator.animate(&mut self.scene.registry, &self.params);
                self.scene.sync_celestial_transforms(render_engine.queue());
                render_engine.update(self.scene.camera.uniform, &self.scene.registry);

                let clear_color = self.params.clear_color;
                let bloom = self.params.bloom;

                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    let params = &mut self.params;
                    let window_clone = window.clone();
                    render_engine.render_frame_with_ui(
                        &self.scene,
                        clear_color,
                        &bloom,
                        |device, queue, encoder, color_attachment| {
                            ui_manager.draw(
                                device,
                                queue,
                                encoder,
                                &window_clone,
                                color_attachment,
                                |ui| {
                                    scene_panel(ui, params, status);
                                },
                            );
                        },
                    );
                } else {
                    render_engine.render_frame_simple(&self.scene, clear_color, &bloom);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
