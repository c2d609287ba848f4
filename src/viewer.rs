//! Viewer builder and window loop

use crate::config::ViewerConfig;
use crate::controls::RenderMode;
use crate::error::ViewerError;
use crate::gpu::Renderer;
use crate::input::Input;
use crate::scene::Scene;
use crate::time::Time;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

/// A storm viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```no_run
/// use stormview::Viewer;
///
/// Viewer::new()
///     .with_particle_count(50_000)
///     .with_seed(7)
///     .run()
///     .unwrap();
/// ```
pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    /// Create a viewer with default settings.
    pub fn new() -> Self {
        Self::with_config(ViewerConfig::default())
    }

    /// Create a viewer from a full configuration.
    pub fn with_config(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Set the number of rain drops.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.rain.count = count;
        self
    }

    /// Seed both the rain and the lightning so runs are repeatable.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.rain.seed = Some(seed);
        self.config.flash.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Run the viewer. This blocks until the window is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        self.config.validate()?;
        let scene = Scene::new(&self.config)?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, scene);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    input: Input,
    time: Time,
    error: Option<ViewerError>,
}

impl App {
    fn new(config: ViewerConfig, scene: Scene) -> Self {
        Self {
            time: frame_clock(&config),
            config,
            window: None,
            renderer: None,
            scene,
            input: Input::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let settings = &self.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(settings.width, settings.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        if settings.grab_cursor {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("Could not grab cursor: {}", e);
            }
            window.set_cursor_visible(false);
        }

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            settings,
            self.scene.rain().len(),
            self.scene.rain().ground_level(),
        ))?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        // Window and device setup is not part of the first step
        self.time = frame_clock(&self.config);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        let dt = self.time.update();
        let outcome = self.scene.update(&self.input, dt);
        self.input.begin_frame();
        if outcome.quit {
            event_loop.exit();
            return;
        }

        let mode = self.scene.render_mode();
        if !renderer.supports(mode) {
            log::warn!("{:?} rendering is not supported by this GPU, keeping fill", mode);
            self.scene.set_render_mode(RenderMode::Fill);
        }

        let frame = self.scene.frame(renderer.aspect());
        match renderer.render(&frame, self.scene.rain(), self.time.elapsed()) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if self.time.fps_updated() {
            let fps = self.time.fps();
            log::debug!("{:.1} fps, {} drops recycled last frame", fps, outcome.recycled);
            window.set_title(&format!("{} - {:.0} fps", self.config.window.title, fps));
        }

        window.request_redraw();
    }
}

fn frame_clock(config: &ViewerConfig) -> Time {
    let mut time = Time::new();
    time.set_fixed_delta(config.simulation.step.fixed_delta());
    time.set_max_delta(Some(config.simulation.max_delta));
    time
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                log::info!("Resized to {}x{}", physical_size.width, physical_size.height);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.add_mouse_motion(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let viewer = Viewer::new().with_particle_count(64).with_seed(3);
        assert_eq!(viewer.config().rain.count, 64);
        assert_eq!(viewer.config().rain.seed, Some(3));
        assert_eq!(viewer.config().flash.seed, Some(3));
        assert_eq!(viewer.config().camera, ViewerConfig::default().camera);
    }
}
