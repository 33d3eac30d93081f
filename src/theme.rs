//! Light/dark appearance, persisted across sessions and broadcast as `themechange`.

use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Event, HtmlElement, Window};

use crate::dom::{bool_attr, listen};
use crate::log;
use crate::storage::KeyValueStore;

pub const THEME_CHANGE_EVENT: &str = "themechange";
const DARK_CLASS: &str = "dark";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// A saved preference wins; otherwise follow the OS colour scheme.
    pub fn initial(saved: Option<&str>, prefers_dark: bool) -> Self {
        saved.and_then(Self::parse).unwrap_or(if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        })
    }

    fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-moon",
            Self::Dark => "fas fa-sun",
        }
    }
}

pub fn theme_change_event(theme: Theme) -> Result<CustomEvent, JsValue> {
    let detail = Object::new();
    Reflect::set(
        &detail,
        &JsValue::from_str("mode"),
        &JsValue::from_str(theme.as_str()),
    )?;
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    CustomEvent::new_with_event_init_dict(THEME_CHANGE_EVENT, &init)
}

/// Reads `detail.mode` from a `themechange` event.
pub fn theme_from_event(event: &Event) -> Option<Theme> {
    let custom = event.dyn_ref::<CustomEvent>()?;
    let mode = Reflect::get(&custom.detail(), &JsValue::from_str("mode")).ok()?;
    Theme::parse(&mode.as_string()?)
}

pub struct ThemeManager {
    window: Window,
    body: HtmlElement,
    toggle: Option<Element>,
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl ThemeManager {
    pub fn new(
        window: &Window,
        document: &Document,
        store: Rc<dyn KeyValueStore>,
        key: &str,
    ) -> Option<Self> {
        Some(Self {
            window: window.clone(),
            body: document.body()?,
            toggle: document.get_element_by_id("themeToggle"),
            store,
            key: key.to_string(),
        })
    }

    fn prefers_dark(&self) -> bool {
        self.window
            .match_media("(prefers-color-scheme: dark)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }

    pub fn saved(&self) -> Option<Theme> {
        match self.store.get(&self.key) {
            Ok(value) => value.as_deref().and_then(Theme::parse),
            Err(err) => {
                log::warn("theme_read_failed", &err.to_string());
                None
            }
        }
    }

    pub fn current(&self) -> Theme {
        if self.body.class_list().contains(DARK_CLASS) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn apply(&self, theme: Theme) {
        let dark = theme == Theme::Dark;
        let _ = self.body.class_list().toggle_with_force(DARK_CLASS, dark);

        if let Some(toggle) = &self.toggle {
            if let Ok(Some(icon)) = toggle.query_selector("i") {
                icon.set_class_name(theme.icon_class());
            }
            let _ = toggle.set_attribute("aria-pressed", bool_attr(dark));
        }

        match theme_change_event(theme) {
            Ok(event) => {
                let _ = self.window.dispatch_event(&event);
            }
            Err(_) => log::warn("theme_event_failed", theme.as_str()),
        }
    }

    /// Applies the saved or OS-preferred theme without persisting it.
    pub fn restore(&self) -> Theme {
        let saved = self.saved();
        let theme = Theme::initial(saved.map(Theme::as_str), self.prefers_dark());
        self.apply(theme);
        theme
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.apply(next);
        if let Err(err) = self.store.set(&self.key, next.as_str()) {
            log::error("theme_persist_failed", &err.to_string());
        }
        next
    }

    pub fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let Some(toggle) = &self.toggle else {
            return Ok(());
        };
        let manager = Rc::clone(self);
        listen(toggle, "click", move |_event: Event| {
            manager.toggle();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_value_beats_os_preference() {
        assert_eq!(Theme::initial(Some("light"), true), Theme::Light);
        assert_eq!(Theme::initial(Some("dark"), false), Theme::Dark);
    }

    #[test]
    fn unknown_saved_value_falls_back_to_os_preference() {
        assert_eq!(Theme::initial(Some("sepia"), true), Theme::Dark);
        assert_eq!(Theme::initial(None, false), Theme::Light);
    }

    #[test]
    fn toggling_twice_is_identity() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(theme.toggled().toggled(), theme);
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
    }
}
