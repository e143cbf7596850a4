// Re-export all public modules so they can be used from main.rs
pub mod error;
pub mod logging;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

use controller::{CameraController, FrameLoopContext, InputProcessor};
use error::SceneError;
use model::{Camera, HeightMap, Scene, SceneStyle, TERRACED_HILL};

/// Texture loaded at startup, relative to the working directory (native) or page (web)
pub const DEFAULT_TEXTURE_PATH: &str = "assets/texture.png";

/// Texture path, overridable natively through `VOXSCAPE_TEXTURE`
#[cfg(not(target_arch = "wasm32"))]
pub fn texture_path() -> String {
    std::env::var("VOXSCAPE_TEXTURE").unwrap_or_else(|_| DEFAULT_TEXTURE_PATH.to_string())
}

/// Scene and input wiring for a height map given as nested rows
pub fn frame_loop_for<R: AsRef<[u32]>>(rows: &[R], width: u32, height: u32) -> Result<FrameLoopContext, SceneError> {
    let height_map = HeightMap::from_rows(rows)?;
    tracing::info!(
        rows = height_map.rows(),
        cols = height_map.cols(),
        cubes = height_map.cube_count(),
        "height map loaded"
    );
    let scene = Scene::new(Camera::new(width, height), height_map, SceneStyle::default());
    Ok(FrameLoopContext::new(scene, InputProcessor::default(), CameraController::default()))
}

/// The terraced hill scene both shells start with
pub fn default_frame_loop(width: u32, height: u32) -> Result<FrameLoopContext, SceneError> {
    frame_loop_for(&TERRACED_HILL, width, height)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::{error, info, warn};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, Window};

    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_move_to_input};
    use crate::controller::{FrameLoopContext, InputEvent};
    use crate::error::StartupError;
    use crate::view::{CubeRenderer, GpuContext, RenderState, TextureImage};
    use crate::{default_frame_loop, logging, DEFAULT_TEXTURE_PATH};

    const WIDTH: u32 = 800;
    const HEIGHT: u32 = 600;

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas(WIDTH, HEIGHT)?;
        setup_app(&window, &document, &canvas).await.map_err(|e| {
            error!("startup failed: {e}");
            js_error(e.to_string())
        })
    }

    /// Main application setup for WASM
    async fn setup_app(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
    ) -> Result<(), StartupError> {
        let gpu = GpuContext::new(canvas, WIDTH, HEIGHT).await?;
        let image = TextureImage::fetch(DEFAULT_TEXTURE_PATH).await?;

        let frame_ctx = Rc::new(RefCell::new(default_frame_loop(gpu.config.width, gpu.config.height)?));
        let clear_color = frame_ctx.borrow().scene.style.clear_color;
        let mut render_state = RenderState::new(gpu, &image, clear_color).await?;
        frame_ctx.borrow_mut().mark_texture_ready();
        info!("renderer ready");

        if let Err(e) = setup_input_listeners(document, window, canvas, frame_ctx.clone()) {
            warn!("failed to register input listeners: {e:?}");
        }

        // Draw only when something changed since the last animation frame
        let f = RcCellCallback::new(window.clone(), move || {
            let Some(frame) = frame_ctx.borrow_mut().take_frame() else { return };
            if let Err(e) = render_state.render(&frame) {
                if e.is_fatal() {
                    error!("render failed: {e}");
                    frame_ctx.borrow_mut().halt();
                } else {
                    frame_ctx.borrow_mut().request_redraw();
                }
            }
        });
        f.start();

        Ok(())
    }

    /// Setup all input event listeners with platform-agnostic abstractions
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        frame_ctx: Rc<RefCell<FrameLoopContext>>,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let frame_ctx = frame_ctx.clone();
            let document_for_exit = document.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if frame_ctx.borrow().wants_pointer_release(&e.code()) {
                    document_for_exit.exit_pointer_lock();
                    return;
                }
                if frame_ctx.borrow_mut().handle_event(&keyboard_event_to_input(&e, true)) {
                    e.prevent_default();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let frame_ctx = frame_ctx.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                frame_ctx.borrow_mut().handle_event(&keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - clear all keys
        {
            let frame_ctx = frame_ctx.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                frame_ctx.borrow_mut().handle_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Pointer lock change
        {
            let frame_ctx = frame_ctx.clone();
            let doc_pl = document.clone();
            let plc = Closure::wrap(Box::new(move |_e: Event| {
                let locked = doc_pl.pointer_lock_element().is_some();
                frame_ctx.borrow_mut().handle_event(&InputEvent::PointerLockChanged { locked });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
            plc.forget();
        }

        // Canvas click to enter pointer lock
        {
            let canvas_click = canvas.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                if let Ok(html_el) = canvas_click.clone().dyn_into::<HtmlElement>() {
                    html_el.request_pointer_lock();
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        // Mouse move, ignored by the frame loop unless pointer lock is engaged
        {
            let frame_ctx = frame_ctx.clone();
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                frame_ctx.borrow_mut().handle_event(&mouse_move_to_input(&e));
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        Ok(())
    }

    fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// `requestAnimationFrame` loop that re-arms itself after every call
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    error!("requestAnimationFrame failed: {e:?}");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
