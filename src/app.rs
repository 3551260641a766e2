//! The winit application shell.
//!
//! [`run`] opens the window, brings up the GPU and then drives one simulate-plan-execute cycle
//! per redraw. Startup failures end the event loop and are returned to the caller.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::AssetLibrary;
use crate::config::AppConfig;
use crate::demo::DemoState;
use crate::error::{RenderError, StartupError};
use crate::gpu::GpuContext;
use crate::input::{Command, Input};
use crate::orbit_camera::OrbitCamera;
use crate::render_graph::{FrameExecutor, FrameGeometry};

/// Everything that exists once the window is up.
struct Renderer {
    window: Arc<Window>,
    gpu: GpuContext,
    assets: AssetLibrary,
    executor: FrameExecutor,
    camera: OrbitCamera,
    demo: DemoState,
    input: Input,
    camera_speed: f32,
    last_frame: Instant,
}

impl Renderer {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, StartupError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone(), config.present_mode())?;
        let assets = AssetLibrary::load(&gpu, &config.asset_dir);
        let executor = FrameExecutor::new(&gpu, config.shadow_map_size);

        Ok(Self {
            window,
            gpu,
            assets,
            executor,
            camera: OrbitCamera::from_config(&config.camera),
            demo: DemoState::new(),
            input: Input::new(),
            camera_speed: config.camera.speed,
            last_frame: Instant::now(),
        })
    }

    /// Applies queued key commands. Returns `false` when the user asked to quit.
    fn handle_commands(&mut self) -> bool {
        for command in self.input.drain_commands() {
            match command {
                Command::Demo(action) => self.demo.apply(action),
                Command::PauseCamera => self.camera.toggle_pause(self.camera_speed),
                Command::Quit => return false,
            }
        }
        true
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.camera.update(dt);
        self.demo.update(dt);

        let (plan, water) = self.demo.plan(
            &self.camera.camera(),
            self.gpu.aspect(),
            self.gpu.supports_wireframe,
        );
        let geometry = FrameGeometry {
            particles: self.demo.particles(),
            water: &water,
        };
        self.executor
            .execute(&self.gpu, &plan, geometry, &self.assets)
    }
}

enum AppState {
    Pending(AppConfig),
    Running(Box<Renderer>),
    Finished,
}

struct LakefireApp {
    state: AppState,
    failure: Option<StartupError>,
}

impl LakefireApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: StartupError) {
        self.failure = Some(error);
        self.state = AppState::Finished;
        event_loop.exit();
    }
}

impl ApplicationHandler for LakefireApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending(config) = &self.state else {
            return;
        };
        match Renderer::new(event_loop, config) {
            Ok(renderer) => {
                log::info!(
                    "running at {}x{}, shadow maps {}px",
                    renderer.gpu.width(),
                    renderer.gpu.height(),
                    renderer.executor.shadow_map_size()
                );
                renderer.window.request_redraw();
                self.state = AppState::Running(Box::new(renderer));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(renderer) = &mut self.state else {
            return;
        };

        renderer.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.state = AppState::Finished;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if !renderer.handle_commands() {
                    self.state = AppState::Finished;
                    event_loop.exit();
                    return;
                }
                if let Err(err) = renderer.redraw() {
                    self.fail(event_loop, err.into());
                    return;
                }
                renderer.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Runs the demo until the window closes.
pub fn run(config: AppConfig) -> Result<(), StartupError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LakefireApp {
        state: AppState::Pending(config),
        failure: None,
    };
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
