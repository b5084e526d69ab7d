//! Shorebreak - swell lines rolling onto a sandy beach
//!
//! A top-down shoreline drawn entirely in a fragment shader: layered waves,
//! crest foam, a wet sand band and the waterline advancing and retreating.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use shorebreak::cli::Args;
use shorebreak::error::RenderError;
use shorebreak::export::{save_noise_heightmap, save_snapshot};
use shorebreak::frame::{FixedStepClock, FrameClock, FrameLoop, FrameOutcome, SurfaceSize, WallClock};
use shorebreak::noise::Fbm;
use shorebreak::params::{RecordingConfig, RenderConfig, ShoreParams};
use shorebreak::rendering::RenderSystem;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    frame_loop: FrameLoop<Box<dyn FrameClock>>,

    // Configuration
    params: ShoreParams,
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,
}

impl App {
    fn new(
        params: ShoreParams,
        render_config: RenderConfig,
        recording_config: Option<RecordingConfig>,
    ) -> Self {
        // Recording steps time per frame so captures are independent of GPU speed
        let clock: Box<dyn FrameClock> = match &recording_config {
            Some(config) => Box::new(FixedStepClock::new(config.fps)),
            None => Box::new(WallClock::new()),
        };

        Self {
            window: None,
            render_system: None,
            frame_loop: FrameLoop::new(clock),
            params,
            render_config,
            recording_config,
        }
    }

    /// Physical surface size for the window, with the scale factor capped
    fn surface_size(&self, window: &Window) -> SurfaceSize {
        let inner = window.inner_size();
        SurfaceSize::from_physical(
            inner.width,
            inner.height,
            window.scale_factor(),
            self.render_config.max_scale_factor,
        )
    }

    /// Stop drawing, release GPU resources and leave the event loop
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
        self.render_system.take();
        event_loop.exit();
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let size = self.surface_size(&window);
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        match self.frame_loop.run_frame(render_system, size) {
            Ok(FrameOutcome::Drawn(frame)) => {
                if let Some(config) = &self.recording_config {
                    if frame.frame_index + 1 >= config.total_frames() as u64 {
                        log::info!(
                            "Recording complete: {} frames in {}",
                            frame.frame_index + 1,
                            config.frames_dir()
                        );
                        self.shutdown(event_loop);
                    }
                }
            }
            Ok(FrameOutcome::Skipped) | Ok(FrameOutcome::Stopped) => {}
            Err(RenderError::SurfaceLost) => {
                log::warn!("Surface lost, reconfigured");
            }
            Err(RenderError::Timeout) => {
                log::warn!("Frame acquisition timed out, skipping frame");
            }
            Err(e) => {
                log::error!("Render error: {}", e);
                self.shutdown(event_loop);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || !self.frame_loop.is_running() {
            return; // Already initialized, or failed once
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Shorebreak")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                self.shutdown(event_loop);
                return;
            }
        };

        // Initialize rendering system
        let size = self.surface_size(&window);
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            size,
            self.params.clone(),
            self.recording_config.clone(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                self.shutdown(event_loop);
                return;
            }
        };

        log::info!("Shorebreak is running, press ESC to quit");

        // Animation time counts from the first drawable moment
        self.frame_loop.restart_clock();

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                // Size is re-read at the start of the next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
        self.render_system.take();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let params = args.shore_params()?;
    let render_config = args.render_config()?;

    // Headless modes render on the CPU and exit
    if args.dump_noise.is_some() || args.snapshot.is_some() {
        if let Some(path) = &args.dump_noise {
            save_noise_heightmap(&Fbm, args.noise_size, args.noise_frequency, path)?;
        }
        if let Some(path) = &args.snapshot {
            let size = SurfaceSize::new(args.width, args.height);
            save_snapshot(params, args.time, size, path)?;
        }
        return Ok(());
    }

    let recording_config = args.create_recording_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(params, render_config, recording_config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
