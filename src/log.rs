//! Console logging.
//!
//! Every line is `portfolio: <event> (<detail>)` so page logs can be filtered by prefix. Native
//! builds (unit tests) write to stderr instead of calling into the JS console.

fn line(event: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("portfolio: {}", event)
    } else {
        format!("portfolio: {} ({})", event, detail)
    }
}

#[cfg(target_arch = "wasm32")]
pub fn info(event: &str, detail: &str) {
    web_sys::console::info_1(&line(event, detail).into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(event: &str, detail: &str) {
    web_sys::console::warn_1(&line(event, detail).into());
}

#[cfg(target_arch = "wasm32")]
pub fn error(event: &str, detail: &str) {
    web_sys::console::error_1(&line(event, detail).into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn info(event: &str, detail: &str) {
    eprintln!("{}", line(event, detail));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(event: &str, detail: &str) {
    eprintln!("{}", line(event, detail));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(event: &str, detail: &str) {
    eprintln!("{}", line(event, detail));
}
