//! Decorative WebGL background: a slowly rotating point-cloud sphere that leans toward the
//! pointer and recolours itself on `themechange`.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use js_sys::{Float32Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, HtmlCanvasElement, PointerEvent, WebGlBuffer, WebGlProgram,
    WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation, Window,
};

use crate::dom::{js_value_to_string, listen, window};
use crate::log;
use crate::theme::{THEME_CHANGE_EVENT, Theme, theme_from_event};

const VERTEX_SHADER_SOURCE: &str = r#"
attribute vec3 a_position;
uniform float u_time;
uniform vec2 u_tilt;
uniform float u_aspect;
uniform float u_point_size;
varying float v_depth;
void main() {
  float yaw = u_time * 0.12 + u_tilt.x * 0.6;
  float pitch = u_tilt.y * 0.4;
  float cy = cos(yaw);
  float sy = sin(yaw);
  float cp = cos(pitch);
  float sp = sin(pitch);
  vec3 p = a_position;
  p = vec3(cy * p.x + sy * p.z, p.y, -sy * p.x + cy * p.z);
  p = vec3(p.x, cp * p.y - sp * p.z, sp * p.y + cp * p.z);
  float z = p.z + 3.2;
  v_depth = clamp((4.2 - z) / 2.0, 0.0, 1.0);
  gl_Position = vec4(p.x * 1.6 / (z * u_aspect), p.y * 1.6 / z, 0.0, 1.0);
  gl_PointSize = u_point_size * (0.6 + v_depth);
}
"#;

const FRAGMENT_SHADER_SOURCE: &str = r#"
precision mediump float;
uniform vec3 u_color;
varying float v_depth;
void main() {
  vec2 c = gl_PointCoord - vec2(0.5);
  float d = dot(c, c);
  if (d > 0.25) {
    discard;
  }
  gl_FragColor = vec4(u_color, (0.25 + 0.75 * v_depth) * (1.0 - d * 4.0));
}
"#;

pub const CANVAS_ID: &str = "bg-canvas";
pub const DEFAULT_POINT_COUNT: usize = 900;
const MAX_DPR: f64 = 2.0;
const POINT_SIZE_CSS: f64 = 2.5;
const TILT_EASING: f32 = 0.06;
const RESIZE_SETTLE_MS: i32 = 140;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub clear: [f32; 3],
    pub point: [f32; 3],
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            clear: [0.97, 0.97, 0.99],
            point: [0.25, 0.35, 0.85],
        },
        Theme::Dark => Palette {
            clear: [0.04, 0.05, 0.09],
            point: [0.45, 0.75, 1.0],
        },
    }
}

/// Evenly spread unit vectors (Fibonacci lattice), flattened as `x, y, z` triples.
pub fn sphere_points(count: usize) -> Vec<f32> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let mut out = Vec::with_capacity(count * 3);
    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
        let radius = (1.0 - y * y).max(0.0).sqrt();
        let theta = golden_angle * i as f64;
        out.push((theta.cos() * radius) as f32);
        out.push(y as f32);
        out.push((theta.sin() * radius) as f32);
    }
    out
}

/// Maps a client position to -1..1 on both axes, y up.
pub fn normalized_pointer(client_x: f64, client_y: f64, width: f64, height: f64) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let x = (client_x / width) * 2.0 - 1.0;
    let y = 1.0 - (client_y / height) * 2.0;
    (x.clamp(-1.0, 1.0) as f32, y.clamp(-1.0, 1.0) as f32)
}

fn ease_toward(current: (f32, f32), target: (f32, f32), factor: f32) -> (f32, f32) {
    (
        current.0 + (target.0 - current.0) * factor,
        current.1 + (target.1 - current.1) * factor,
    )
}

fn gl_error_name(error: u32) -> &'static str {
    match error {
        Gl::NO_ERROR => "NO_ERROR",
        Gl::INVALID_ENUM => "INVALID_ENUM",
        Gl::INVALID_VALUE => "INVALID_VALUE",
        Gl::INVALID_OPERATION => "INVALID_OPERATION",
        Gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        Gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        Gl::CONTEXT_LOST_WEBGL => "CONTEXT_LOST_WEBGL",
        _ => "UNKNOWN_ERROR",
    }
}

fn gl_check(gl: &Gl, label: &str) -> Option<String> {
    let error = gl.get_error();
    if error == Gl::NO_ERROR {
        None
    } else {
        Some(format!(
            "gl error after {}: {} (0x{:x})",
            label,
            gl_error_name(error),
            error
        ))
    }
}

pub fn create_webgl_context(canvas: &HtmlCanvasElement) -> Result<Gl, JsValue> {
    // Decoration only: ask for the cheapest context the browser will give us.
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("alpha"), &JsValue::FALSE)?;
    Reflect::set(&options, &JsValue::from_str("antialias"), &JsValue::FALSE)?;
    Reflect::set(&options, &JsValue::from_str("depth"), &JsValue::FALSE)?;
    Reflect::set(&options, &JsValue::from_str("stencil"), &JsValue::FALSE)?;
    Reflect::set(
        &options,
        &JsValue::from_str("powerPreference"),
        &JsValue::from_str("low-power"),
    )?;

    let options = JsValue::from(options);
    let ctx = canvas
        .get_context_with_context_options("webgl", &options)?
        .or_else(|| canvas.get_context("webgl").ok().flatten())
        .ok_or_else(|| JsValue::from_str("WebGL unavailable"))?;

    ctx.dyn_into::<Gl>()
        .map_err(|_| JsValue::from_str("WebGL context is not a WebGlRenderingContext"))
}

fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("Unable to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "Unknown shader error".to_string());
        Err(JsValue::from_str(&info))
    }
}

pub fn create_program(gl: &Gl) -> Result<WebGlProgram, JsValue> {
    let vertex_shader = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER_SOURCE)?;
    let fragment_shader = compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER_SOURCE)?;

    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("Unable to create program"))?;

    gl.attach_shader(&program, &vertex_shader);
    gl.attach_shader(&program, &fragment_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "Unknown program error".to_string());
        Err(JsValue::from_str(&info))
    }
}

fn uniform(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation, JsValue> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| JsValue::from_str(&format!("Missing {} uniform", name)))
}

struct SceneState {
    gl: Gl,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    a_position: u32,
    u_time: WebGlUniformLocation,
    u_tilt: WebGlUniformLocation,
    u_aspect: WebGlUniformLocation,
    u_point_size: WebGlUniformLocation,
    u_color: WebGlUniformLocation,
    canvas: HtmlCanvasElement,
    point_count: i32,
    palette: Palette,
    tilt: (f32, f32),
    pointer: (f32, f32),
    dpr: f64,
    max_renderbuffer_size: i32,
    context_lost: bool,
    last_gl_error: Option<String>,
}

fn update_viewport(state: &mut SceneState) -> Result<(), JsValue> {
    if state.context_lost {
        return Ok(());
    }

    let window = window()?;
    let dpr = window.device_pixel_ratio().min(MAX_DPR);
    let css_width = window.inner_width()?.as_f64().unwrap_or(1.0).max(1.0);
    let css_height = window.inner_height()?.as_f64().unwrap_or(1.0).max(1.0);
    let mut width = css_width * dpr;
    let mut height = css_height * dpr;

    let max_dim = (state.max_renderbuffer_size.max(1) as f64).min(4096.0);
    let max_side = width.max(height);
    if max_side > max_dim {
        let scale = max_dim / max_side;
        width *= scale;
        height *= scale;
    }

    let width = width.floor().max(1.0) as u32;
    let height = height.floor().max(1.0) as u32;
    if state.canvas.width() != width {
        state.canvas.set_width(width);
    }
    if state.canvas.height() != height {
        state.canvas.set_height(height);
    }
    state.dpr = dpr;
    state.gl.viewport(0, 0, width as i32, height as i32);
    state.last_gl_error = gl_check(&state.gl, "viewport");
    Ok(())
}

fn render(state: &mut SceneState, time_ms: f64) {
    if state.context_lost {
        return;
    }

    state.tilt = ease_toward(state.tilt, state.pointer, TILT_EASING);

    let gl = &state.gl;
    gl.use_program(Some(&state.program));
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&state.buffer));
    gl.enable_vertex_attrib_array(state.a_position);
    gl.vertex_attrib_pointer_with_i32(state.a_position, 3, Gl::FLOAT, false, 0, 0);

    let aspect = state.canvas.width().max(1) as f32 / state.canvas.height().max(1) as f32;
    gl.uniform1f(Some(&state.u_time), (time_ms / 1000.0) as f32);
    gl.uniform2f(Some(&state.u_tilt), state.tilt.0, state.tilt.1);
    gl.uniform1f(Some(&state.u_aspect), aspect);
    gl.uniform1f(Some(&state.u_point_size), (POINT_SIZE_CSS * state.dpr) as f32);
    let [r, g, b] = state.palette.point;
    gl.uniform3f(Some(&state.u_color), r, g, b);

    let [r, g, b] = state.palette.clear;
    gl.clear_color(r, g, b, 1.0);
    gl.clear(Gl::COLOR_BUFFER_BIT);
    gl.draw_arrays(Gl::POINTS, 0, state.point_count);

    let error = gl_check(gl, "render");
    if error.is_some() && error != state.last_gl_error {
        log::warn("background_gl_error", error.as_deref().unwrap_or_default());
    }
    state.last_gl_error = error;
}

fn init_scene(canvas: HtmlCanvasElement, theme: Theme) -> Result<SceneState, JsValue> {
    let gl = create_webgl_context(&canvas)?;
    let program = create_program(&gl)?;
    gl.use_program(Some(&program));

    let a_position = gl.get_attrib_location(&program, "a_position");
    if a_position < 0 {
        return Err(JsValue::from_str("Missing a_position attribute"));
    }
    let a_position = a_position as u32;

    let points = sphere_points(DEFAULT_POINT_COUNT);
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("Unable to create point buffer"))?;
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
    let points_array = Float32Array::from(points.as_slice());
    gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &points_array, Gl::STATIC_DRAW);

    gl.enable(Gl::BLEND);
    gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);

    let max_renderbuffer_size = gl
        .get_parameter(Gl::MAX_RENDERBUFFER_SIZE)?
        .as_f64()
        .unwrap_or(0.0) as i32;

    Ok(SceneState {
        u_time: uniform(&gl, &program, "u_time")?,
        u_tilt: uniform(&gl, &program, "u_tilt")?,
        u_aspect: uniform(&gl, &program, "u_aspect")?,
        u_point_size: uniform(&gl, &program, "u_point_size")?,
        u_color: uniform(&gl, &program, "u_color")?,
        gl,
        program,
        buffer,
        a_position,
        canvas,
        point_count: (points.len() / 3) as i32,
        palette: palette(theme),
        tilt: (0.0, 0.0),
        pointer: (0.0, 0.0),
        dpr: 1.0,
        max_renderbuffer_size,
        context_lost: false,
        last_gl_error: None,
    })
}

/// Starts the background on `#bg-canvas`. Returns `Ok(false)` when the page has no canvas.
pub fn start(window: &Window, document: &Document, theme: Theme) -> Result<bool, JsValue> {
    let Some(canvas) = document
        .get_element_by_id(CANVAS_ID)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    else {
        return Ok(false);
    };

    let state = Rc::new(RefCell::new(init_scene(canvas.clone(), theme)?));
    update_viewport(&mut state.borrow_mut())?;

    let raf_holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let raf_holder_cb = Rc::clone(&raf_holder);
    let state_frame = Rc::clone(&state);
    let frame = Closure::wrap(Box::new(move |ts: f64| {
        let mut state = state_frame.borrow_mut();
        if state.context_lost {
            // Dropping the loop here; a restored context needs a page reload.
            return;
        }
        render(&mut state, ts);
        drop(state);

        if let Some(cb) = raf_holder_cb.borrow().as_ref() {
            if let Ok(win) = crate::dom::window() {
                let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>);
    window.request_animation_frame(frame.as_ref().unchecked_ref())?;
    *raf_holder.borrow_mut() = Some(frame);

    let state_pointer = Rc::clone(&state);
    let window_pointer = window.clone();
    listen(window, "pointermove", move |event: Event| {
        let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
            return;
        };
        let width = window_pointer
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = window_pointer
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        state_pointer.borrow_mut().pointer = normalized_pointer(
            pointer.client_x() as f64,
            pointer.client_y() as f64,
            width,
            height,
        );
    })?;

    let state_theme = Rc::clone(&state);
    listen(window, THEME_CHANGE_EVENT, move |event: Event| {
        if let Some(theme) = theme_from_event(&event) {
            state_theme.borrow_mut().palette = palette(theme);
        }
    })?;

    let state_ctxlost = Rc::clone(&state);
    listen(&canvas, "webglcontextlost", move |event: Event| {
        event.prevent_default();
        let mut state = state_ctxlost.borrow_mut();
        state.context_lost = true;
        let _ = state.canvas.set_attribute("data-state", "lost");
        log::warn("background_context_lost", "");
    })?;

    let resize_timer_handle: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
    let state_settle = Rc::clone(&state);
    let resize_settle_cb: Rc<Closure<dyn FnMut()>> = Rc::new(Closure::wrap(Box::new(move || {
        if let Err(err) = update_viewport(&mut state_settle.borrow_mut()) {
            log::warn("background_resize_failed", &js_value_to_string(&err));
        }
    })
        as Box<dyn FnMut()>));

    let window_resize = window.clone();
    listen(window, "resize", move |_event: Event| {
        if let Some(id) = resize_timer_handle.borrow_mut().take() {
            window_resize.clear_timeout_with_handle(id);
        }
        if let Ok(id) = window_resize.set_timeout_with_callback_and_timeout_and_arguments_0(
            resize_settle_cb.as_ref().as_ref().unchecked_ref(),
            RESIZE_SETTLE_MS,
        ) {
            *resize_timer_handle.borrow_mut() = Some(id);
        }
    })?;

    let _ = canvas.set_attribute("data-state", "running");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_points_are_unit_vectors() {
        let points = sphere_points(64);
        assert_eq!(points.len(), 64 * 3);
        for p in points.chunks_exact(3) {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4, "length {}", len);
        }
    }

    #[test]
    fn sphere_points_span_both_poles() {
        let points = sphere_points(DEFAULT_POINT_COUNT);
        let ys: Vec<f32> = points.chunks_exact(3).map(|p| p[1]).collect();
        assert!(ys.iter().cloned().fold(f32::MIN, f32::max) > 0.99);
        assert!(ys.iter().cloned().fold(f32::MAX, f32::min) < -0.99);
    }

    #[test]
    fn pointer_is_centred_and_clamped() {
        assert_eq!(normalized_pointer(500.0, 400.0, 1000.0, 800.0), (0.0, 0.0));
        assert_eq!(normalized_pointer(0.0, 0.0, 1000.0, 800.0), (-1.0, 1.0));
        assert_eq!(normalized_pointer(1200.0, 900.0, 1000.0, 800.0), (1.0, -1.0));
        assert_eq!(normalized_pointer(10.0, 10.0, 0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn palettes_differ_per_theme() {
        assert_ne!(palette(Theme::Light), palette(Theme::Dark));
    }

    #[test]
    fn tilt_eases_toward_pointer() {
        let eased = ease_toward((0.0, 0.0), (1.0, -1.0), 0.5);
        assert_eq!(eased, (0.5, -0.5));
    }
}
