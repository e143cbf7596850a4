use std::sync::Arc;

use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

// Import from the library crate
use voxscape::{
    controller::{input::native::key_code_name, FrameLoopContext, InputEvent},
    error::StartupError,
    logging,
    view::{CubeRenderer, GpuContext, RenderState, TextureImage},
};

struct App {
    window: Option<Arc<Window>>,
    render_state: Option<RenderState>,
    frame_ctx: FrameLoopContext,
    startup_error: Option<StartupError>,
}

impl App {
    fn new(frame_ctx: FrameLoopContext) -> Self {
        Self {
            window: None,
            render_state: None,
            frame_ctx,
            startup_error: None,
        }
    }

    fn init_graphics(&mut self, window: Arc<Window>) -> Result<RenderState, StartupError> {
        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new_native(window, size.width, size.height))?;

        let path = voxscape::texture_path();
        let image = TextureImage::load(&path)?;

        let clear_color = self.frame_ctx.scene.style.clear_color;
        let render_state = pollster::block_on(RenderState::new(gpu, &image, clear_color))?;
        self.frame_ctx.handle_event(&InputEvent::Resized { width: size.width, height: size.height });
        self.frame_ctx.mark_texture_ready();
        Ok(render_state)
    }

    fn set_mouse_locked(&mut self, locked: bool) {
        let Some(window) = &self.window else { return };
        if locked {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                warn!("cursor grab unavailable: {e}");
                return;
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!("cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
        self.frame_ctx.handle_event(&InputEvent::PointerLockChanged { locked });
    }

    fn handle_key(&mut self, code: &str, state: ElementState) {
        match state {
            ElementState::Pressed if self.frame_ctx.wants_pointer_release(code) => self.set_mouse_locked(false),
            ElementState::Pressed => {
                self.frame_ctx.handle_event(&InputEvent::KeyDown(code.to_string()));
            }
            ElementState::Released => {
                self.frame_ctx.handle_event(&InputEvent::KeyUp(code.to_string()));
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_state) = self.render_state.as_mut() else { return };
        let Some(frame) = self.frame_ctx.take_frame() else { return };

        if let Err(e) = render_state.render(&frame) {
            if e.is_fatal() {
                error!("render failed: {e}");
                self.frame_ctx.halt();
                event_loop.exit();
            } else {
                self.frame_ctx.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("voxscape")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.init_graphics(window.clone()) {
            Ok(render_state) => {
                info!("renderer ready");
                self.render_state = Some(render_state);
                self.window = Some(window);
            }
            Err(e) => {
                error!("startup failed: {e}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_state) = self.render_state.as_mut() {
                    render_state.resize(size.width, size.height);
                }
                if size.width > 0 && size.height > 0 {
                    self.frame_ctx.handle_event(&InputEvent::Resized { width: size.width, height: size.height });
                }
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => {
                if let Some(name) = key_code_name(code) {
                    self.handle_key(name, state);
                }
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                if !self.frame_ctx.input_state.pointer_locked {
                    self.set_mouse_locked(true);
                }
            }
            WindowEvent::Focused(false) => {
                self.frame_ctx.handle_event(&InputEvent::FocusLost);
                self.set_mouse_locked(false);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.frame_ctx.handle_event(&InputEvent::MouseMove { dx: delta.0 as f32, dy: delta.1 as f32 });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.frame_ctx.is_halted() || !self.frame_ctx.scene.is_dirty() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let frame_ctx = voxscape::default_frame_loop(1280, 720).map_err(|e| {
        error!("startup failed: {e}");
        StartupError::from(e)
    })?;
    let mut app = App::new(frame_ctx);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
