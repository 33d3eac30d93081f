use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event};

use crate::dom::{bool_attr, listen, query_all_within};

const ACTIVE_CLASS: &str = "active";

/// Hamburger-driven menu overlay.
pub struct NavController {
    menu: Element,
    hamburger: Element,
}

impl NavController {
    pub fn new(document: &Document) -> Option<Self> {
        Some(Self {
            menu: document.get_element_by_id("navMenu")?,
            hamburger: document.get_element_by_id("hamburger")?,
        })
    }

    pub fn is_open(&self) -> bool {
        self.menu.class_list().contains(ACTIVE_CLASS)
    }

    fn set_open(&self, open: bool) {
        let _ = self.menu.class_list().toggle_with_force(ACTIVE_CLASS, open);
        let _ = self
            .hamburger
            .class_list()
            .toggle_with_force(ACTIVE_CLASS, open);
        let _ = self.hamburger.set_attribute("aria-expanded", bool_attr(open));
    }

    pub fn toggle(&self) -> bool {
        let open = !self.is_open();
        self.set_open(open);
        open
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    pub fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let nav = Rc::clone(self);
        listen(&self.hamburger, "click", move |_event: Event| {
            nav.toggle();
        })?;

        for link in query_all_within(&self.menu, ".nav-link") {
            let nav = Rc::clone(self);
            listen(&link, "click", move |_event: Event| nav.close())?;
        }
        Ok(())
    }
}
