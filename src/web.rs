//! Browser host binding
//!
//! `GridCanvas` is the JavaScript-facing handle for one canvas. It owns the
//! engine and the GPU state and drives them from `requestAnimationFrame`.
//! Initialization failures leave an inert handle: nothing is drawn and no
//! exception reaches the page.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, PointerEvent};

use crate::engine::GridEngine;
use crate::error::RenderError;
use crate::renderer::GridRenderState;
use crate::settings::{QualityPreset, Settings};

struct CanvasState {
    canvas: HtmlCanvasElement,
    engine: GridEngine,
    render: GridRenderState,
    /// Pending `requestAnimationFrame` id
    frame_handle: Option<i32>,
    running: bool,
    pointer_listener: Option<Closure<dyn FnMut(PointerEvent)>>,
}

impl CanvasState {
    /// Match the backing store to the displayed size before drawing
    fn reconcile_size(&mut self) {
        let (width, height) = backing_size(&self.canvas);
        if width == 0 || height == 0 {
            return;
        }
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.render.resize(width, height);
            log::debug!("Canvas resized to {}x{}", width, height);
        }
    }

    fn draw(&mut self, time: f64) {
        let size = (self.canvas.width() as f32, self.canvas.height() as f32);
        let Some(plan) = self.engine.frame(time, size) else {
            return;
        };
        match self.render.render(&plan) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.render.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("{}", RenderError::from(e)),
        }
    }

    /// CSS pixel offset to backing-store pixels
    fn to_canvas_pixels(&self, x: f32, y: f32) -> (f32, f32) {
        let client_w = self.canvas.client_width().max(1) as f32;
        let client_h = self.canvas.client_height().max(1) as f32;
        (
            x * self.canvas.width() as f32 / client_w,
            y * self.canvas.height() as f32 / client_h,
        )
    }

    fn canvas_size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) {
        let mut settings = self.engine.settings().clone();
        update(&mut settings);
        settings.save();
        self.engine.set_settings(settings);
    }
}

/// JavaScript handle for one animated board canvas
#[wasm_bindgen]
pub struct GridCanvas {
    /// `None` when initialization failed
    state: Option<Rc<RefCell<CanvasState>>>,
}

#[wasm_bindgen]
impl GridCanvas {
    /// Attach to `<canvas id=canvas_id>` and start the frame loop.
    ///
    /// `shader_source` replaces the bundled fragment stage.
    pub async fn create(canvas_id: String, shader_source: Option<String>) -> GridCanvas {
        init_logging();

        match init(&canvas_id, shader_source.as_deref()).await {
            Ok(state) => {
                let state = Rc::new(RefCell::new(state));
                attach_pointer_listener(&state);
                state.borrow_mut().running = true;
                request_frame(&state);
                log::info!("Canvas #{} running", canvas_id);
                GridCanvas { state: Some(state) }
            }
            Err(e) => {
                log::error!("Canvas #{} disabled: {}", canvas_id, e);
                GridCanvas { state: None }
            }
        }
    }

    /// Whether initialization succeeded and the loop is running
    pub fn is_active(&self) -> bool {
        self.state
            .as_ref()
            .map(|s| s.borrow().running)
            .unwrap_or(false)
    }

    /// Publish a new board snapshot (JSON)
    pub fn set_state(&self, json: &str) -> Result<(), JsValue> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        state
            .borrow_mut()
            .engine
            .apply_json(json, now())
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_complete(&self, complete: bool) {
        if let Some(state) = &self.state {
            state.borrow_mut().engine.set_complete(complete);
        }
    }

    /// Pointer position in CSS pixels relative to the canvas
    pub fn pointer_move(&self, x: f32, y: f32) {
        if let Some(state) = &self.state {
            let mut s = state.borrow_mut();
            let (px, py) = s.to_canvas_pixels(x, y);
            s.engine.set_mouse(px, py);
        }
    }

    /// Board cell `[x, y]` under a CSS-pixel position, if any.
    ///
    /// Only pointer movement is listened for here; the host resolves clicks
    /// and drags by calling this from its own handlers.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Vec<i32>> {
        let state = self.state.as_ref()?;
        let s = state.borrow();
        let (px, py) = s.to_canvas_pixels(x, y);
        s.engine
            .cell_at(s.canvas_size(), px, py)
            .map(|c| vec![c.x, c.y])
    }

    pub fn set_animations(&self, enabled: bool) {
        if let Some(state) = &self.state {
            state
                .borrow_mut()
                .update_settings(|s| s.animations = enabled);
        }
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        if let Some(state) = &self.state {
            state
                .borrow_mut()
                .update_settings(|s| s.reduced_motion = reduced);
        }
    }

    /// "low", "medium" or "high"; anything else is ignored
    pub fn set_quality(&self, preset: &str) {
        let Some(quality) = QualityPreset::parse(preset) else {
            log::warn!("Unknown quality preset: {}", preset);
            return;
        };
        if let Some(state) = &self.state {
            state.borrow_mut().update_settings(|s| s.quality = quality);
            log::info!("Quality set to {}", quality.as_str());
        }
    }

    /// Stop the frame loop and discard all animation state
    pub fn destroy(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let mut s = state.borrow_mut();
        s.running = false;
        if let (Some(window), Some(handle)) = (web_sys::window(), s.frame_handle.take()) {
            let _ = window.cancel_animation_frame(handle);
        }
        if let Some(listener) = s.pointer_listener.take() {
            let _ = s
                .canvas
                .remove_event_listener_with_callback("pointermove", listener.as_ref().unchecked_ref());
        }
        s.engine.reset();
        log::info!("Canvas destroyed");
    }
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // Later canvases on the same page find the logger already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Animation-frame clock (ms)
fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, RenderError> {
    let window = web_sys::window().ok_or(RenderError::NoWindow)?;
    let document = window.document().ok_or(RenderError::NoWindow)?;
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| RenderError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| RenderError::NotACanvas(canvas_id.to_string()))
}

/// Displayed size times device pixel ratio
fn backing_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    let width = (canvas.client_width() as f64 * dpr) as u32;
    let height = (canvas.client_height() as f64 * dpr) as u32;
    (width, height)
}

async fn init(canvas_id: &str, shader_source: Option<&str>) -> Result<CanvasState, RenderError> {
    let canvas = find_canvas(canvas_id)?;
    let (width, height) = backing_size(&canvas);
    canvas.set_width(width);
    canvas.set_height(height);

    // WebGPU where available, WebGL2 otherwise
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|_| RenderError::NoAdapter)?;

    let info = adapter.get_info();
    log::info!("Using adapter: {:?} ({:?})", info.name, info.backend);

    let render = GridRenderState::new(surface, &adapter, width, height, shader_source).await?;

    let seed = js_sys::Date::now() as u64;
    let engine = GridEngine::with_seed(Settings::load(), seed);

    Ok(CanvasState {
        canvas,
        engine,
        render,
        frame_handle: None,
        running: false,
        pointer_listener: None,
    })
}

fn attach_pointer_listener(state: &Rc<RefCell<CanvasState>>) {
    // Weak: the listener is owned by the state it updates
    let weak = Rc::downgrade(state);
    let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if let Ok(mut s) = state.try_borrow_mut() {
            let (x, y) = s.to_canvas_pixels(event.offset_x() as f32, event.offset_y() as f32);
            s.engine.set_mouse(x, y);
        }
    });

    let mut s = state.borrow_mut();
    let _ = s
        .canvas
        .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    s.pointer_listener = Some(closure);
}

/// Schedule the next frame.
///
/// The callback holds a `Weak`: a cancelled callback never runs, so a strong
/// handle would keep the GPU state alive after `destroy`.
fn request_frame(state: &Rc<RefCell<CanvasState>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(crate::weak_frame(state, frame_loop));
    let handle = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
    state.borrow_mut().frame_handle = handle.ok();
}

fn frame_loop(state: &Rc<RefCell<CanvasState>>, time: f64) {
    {
        let mut s = state.borrow_mut();
        s.frame_handle = None;
        if !s.running {
            return;
        }
        s.reconcile_size();
        s.draw(time);
    }

    request_frame(state);
}
