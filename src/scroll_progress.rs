use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, Window};

use crate::dom::{html_element_by_id, js_value_to_string, listen, listen_passive};
use crate::log;

/// Share of the page scrolled past, in percent. Zero when the page fits in the viewport.
pub fn progress_percent(scroll_height: f64, viewport_height: f64, scroll_y: f64) -> f64 {
    let scrollable = scroll_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

#[derive(Clone)]
pub struct ScrollProgress {
    window: Window,
    document: Document,
    bar: HtmlElement,
}

impl ScrollProgress {
    pub fn new(window: &Window, document: &Document) -> Option<Self> {
        Some(Self {
            window: window.clone(),
            document: document.clone(),
            bar: html_element_by_id(document, "scrollProgress")?,
        })
    }

    pub fn update(&self) -> Result<f64, JsValue> {
        let scroll_height = self
            .document
            .document_element()
            .map(|el| el.scroll_height() as f64)
            .unwrap_or(0.0);
        let viewport_height = self.window.inner_height()?.as_f64().unwrap_or(0.0);
        let scroll_y = self.window.scroll_y()?;

        let percent = progress_percent(scroll_height, viewport_height, scroll_y);
        self.bar
            .style()
            .set_property("width", &format!("{}%", percent))?;
        Ok(percent)
    }

    pub fn wire(&self) -> Result<(), JsValue> {
        let on_scroll = self.clone();
        listen_passive(&self.window, "scroll", move |_event: Event| {
            if let Err(err) = on_scroll.update() {
                log::warn("scroll_progress_scroll_failed", &js_value_to_string(&err));
            }
        })?;
        let on_resize = self.clone();
        listen(&self.window, "resize", move |_event: Event| {
            if let Err(err) = on_resize.update() {
                log::warn("scroll_progress_resize_failed", &js_value_to_string(&err));
            }
        })?;
        self.update()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_page_has_no_progress() {
        assert_eq!(progress_percent(600.0, 800.0, 0.0), 0.0);
        assert_eq!(progress_percent(800.0, 800.0, 0.0), 0.0);
    }

    #[test]
    fn midway_and_bounds() {
        assert_eq!(progress_percent(3000.0, 1000.0, 1000.0), 50.0);
        assert_eq!(progress_percent(3000.0, 1000.0, 2000.0), 100.0);
        // Elastic overscroll reports positions outside the scrollable range.
        assert_eq!(progress_percent(3000.0, 1000.0, -40.0), 0.0);
        assert_eq!(progress_percent(3000.0, 1000.0, 2100.0), 100.0);
    }
}
