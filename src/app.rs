// src/app.rs
//! Application shell
//!
//! Owns the winit event loop and wires the frame sequence: drain input,
//! build the UI frame, advance the camera controller, refresh matrices,
//! then hand the scene to the render engine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use cgmath::Point3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::KeyCode,
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::gfx::{camera::Camera, rendering::render_engine::RenderEngine, scene::Scene};
use crate::input::{FlyController, InputDispatcher};
use crate::ui::{draw_entity_editor, UiCaptureListener, UiManager};

// UI callback type
pub type UiCallback = Box<dyn Fn(&imgui::Ui)>;

/// The viewer application
///
/// Build the scene through [`scene_mut`](NeepApp::scene_mut), optionally add
/// a UI callback, then call [`run`](NeepApp::run).
pub struct NeepApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
    ui_callback: Option<UiCallback>,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    dispatcher: InputDispatcher,
    controller: Rc<RefCell<FlyController>>,
    ui_wants_mouse: Rc<Cell<bool>>,
    ui_wants_keyboard: Rc<Cell<bool>>,
    cursor_captured: bool,
    selected_entity: Option<usize>,
    last_frame: Instant,
    ui_callback: Option<UiCallback>,
}

impl NeepApp {
    /// Creates the application with a default perspective camera
    pub fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let mut camera = Camera::perspective(1280, 720, 60.0)
            .expect("default camera parameters are valid");
        camera.position = Point3::new(0.0, 2.0, 8.0);
        let scene = Scene::new(camera);

        let controller = Rc::new(RefCell::new(FlyController::new(5.0, 0.002)));
        let ui_wants_mouse = Rc::new(Cell::new(false));
        let ui_wants_keyboard = Rc::new(Cell::new(false));

        // Overlay first so it can intercept while focused, controller after
        let mut dispatcher = InputDispatcher::new();
        dispatcher.add_listener(Rc::new(RefCell::new(UiCaptureListener::new(
            ui_wants_mouse.clone(),
            ui_wants_keyboard.clone(),
        ))));
        dispatcher.add_listener(controller.clone());

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                dispatcher,
                controller,
                ui_wants_mouse,
                ui_wants_keyboard,
                cursor_captured: false,
                selected_entity: None,
                last_frame: Instant::now(),
                ui_callback: None,
            },
            ui_callback: None,
        }
    }

    /// Access the scene for setup before `run`
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    /// Adds a UI callback drawn every frame after the entity editor
    pub fn set_ui<F>(&mut self, ui_fn: F)
    where
        F: Fn(&imgui::Ui) + 'static,
    {
        self.ui_callback = Some(Box::new(ui_fn));
    }

    /// Runs the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        self.app_state.ui_callback = self.ui_callback.take();

        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl Default for NeepApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a cursor-capture mode, returning the mode actually in effect
fn set_cursor_captured(window: &Window, captured: bool) -> bool {
    if captured {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
            .is_ok();
        if !grabbed {
            log::warn!("cursor capture is not available on this platform");
        }
        window.set_cursor_visible(!grabbed);
        grabbed
    } else {
        let _ = window.set_cursor_grab(CursorGrabMode::None);
        window.set_cursor_visible(true);
        false
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("neep viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene.camera.resize(width, height);

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            self.scene.init_gpu_resources(
                renderer.device(),
                renderer.queue(),
                renderer.transform_bind_group_layout(),
            );

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            self.cursor_captured = set_cursor_captured(&window_handle, true);
            self.last_frame = Instant::now();

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };

        // Feed imgui's input state and mirror its capture flags into the
        // dispatch chain
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            ui_manager.feed_event(&window, &ui_event);
            self.ui_wants_mouse.set(ui_manager.wants_mouse());
            self.ui_wants_keyboard.set(ui_manager.wants_keyboard());
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if !repeat => match key_code {
                    KeyCode::Escape => event_loop.exit(),
                    KeyCode::Tab => {
                        // Toggle between mouse look and UI interaction; the
                        // controller resynchronizes on the way back.
                        if self.cursor_captured {
                            set_cursor_captured(&window, false);
                            self.cursor_captured = false;
                        } else {
                            self.cursor_captured = set_cursor_captured(&window, true);
                        }
                    }
                    _ => self.dispatcher.dispatch_key_down(key_code),
                },
                ElementState::Released => self.dispatcher.dispatch_key_up(key_code),
                _ => (),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.dispatcher
                    .dispatch_mouse_move(position.x, position.y, self.cursor_captured);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                // Applied synchronously: the next frame's passes already see
                // correctly-sized attachments
                self.scene.camera.resize(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;

                // Build this frame's UI (may edit entity transforms)
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    let scene = &mut self.scene;
                    let selected = &mut self.selected_entity;
                    let ui_callback = &self.ui_callback;
                    ui_manager.build_frame(&window, |ui| {
                        draw_entity_editor(ui, scene, selected);
                        if let Some(callback) = ui_callback {
                            callback(ui);
                        }
                    });
                    self.ui_wants_mouse.set(ui_manager.wants_mouse());
                    self.ui_wants_keyboard.set(ui_manager.wants_keyboard());
                }

                // Input is fully drained; finalize the pose, then matrices,
                // then uniforms, then passes
                self.controller
                    .borrow_mut()
                    .update(delta, &mut self.scene.camera);
                self.scene.update();
                render_engine.update(&self.scene.camera);

                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    render_engine.render_frame(
                        &self.scene,
                        Some(|device: &wgpu::Device,
                              queue: &wgpu::Queue,
                              encoder: &mut wgpu::CommandEncoder,
                              view: &wgpu::TextureView| {
                            ui_manager.draw(device, queue, encoder, view);
                        }),
                    );
                } else {
                    render_engine.render_frame_simple(&self.scene);
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

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.dispatcher.clear_listeners();
    }
}
