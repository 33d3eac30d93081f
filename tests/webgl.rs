use portfolio_ui::background::{create_program, create_webgl_context, palette, sphere_points};
use portfolio_ui::theme::Theme;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGlRenderingContext as Gl};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let window = web_sys::window().expect("no window");
    let document = window.document().expect("no document");
    document
        .create_element("canvas")
        .expect("create canvas")
        .dyn_into::<HtmlCanvasElement>()
        .expect("canvas element")
}

#[wasm_bindgen_test]
fn background_program_links() {
    let gl = create_webgl_context(&canvas()).expect("webgl context");
    let program = create_program(&gl).expect("link program");

    assert!(gl.get_attrib_location(&program, "a_position") >= 0);
    assert!(gl.get_uniform_location(&program, "u_color").is_some());
    assert!(gl.get_error() == Gl::NO_ERROR);
}

#[wasm_bindgen_test]
fn background_can_draw_points() {
    let gl = create_webgl_context(&canvas()).expect("webgl context");
    let program = create_program(&gl).expect("link program");
    gl.use_program(Some(&program));

    let points = sphere_points(32);
    let buffer = gl.create_buffer().expect("create buffer");
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
    let array = js_sys::Float32Array::from(points.as_slice());
    gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);

    let a_position = gl.get_attrib_location(&program, "a_position") as u32;
    gl.enable_vertex_attrib_array(a_position);
    gl.vertex_attrib_pointer_with_i32(a_position, 3, Gl::FLOAT, false, 0, 0);

    let [r, g, b] = palette(Theme::Dark).clear;
    gl.clear_color(r, g, b, 1.0);
    gl.clear(Gl::COLOR_BUFFER_BIT);
    gl.draw_arrays(Gl::POINTS, 0, 32);

    assert!(gl.get_error() == Gl::NO_ERROR);
}
