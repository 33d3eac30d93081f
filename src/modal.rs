use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, KeyboardEvent};

use crate::dom::{listen, query_all, set_body_scroll_locked};

const ACTIVE_CLASS: &str = "active";

/// Named overlay panels (`.modal`). Open state lives only in the `active` class.
pub struct ModalController {
    document: Document,
}

impl ModalController {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
        }
    }

    fn modals(&self) -> Vec<Element> {
        query_all(&self.document, ".modal")
    }

    pub fn open(&self, id: &str) -> bool {
        let Some(modal) = self.document.get_element_by_id(id) else {
            return false;
        };
        let _ = modal.class_list().add_1(ACTIVE_CLASS);
        set_body_scroll_locked(&self.document, true);
        true
    }

    pub fn close(&self, id: &str) -> bool {
        let Some(modal) = self.document.get_element_by_id(id) else {
            return false;
        };
        self.close_element(&modal);
        true
    }

    fn close_element(&self, modal: &Element) {
        let _ = modal.class_list().remove_1(ACTIVE_CLASS);
        set_body_scroll_locked(&self.document, false);
    }

    pub fn close_all(&self) {
        for modal in self.modals() {
            let _ = modal.class_list().remove_1(ACTIVE_CLASS);
        }
        set_body_scroll_locked(&self.document, false);
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.document
            .get_element_by_id(id)
            .is_some_and(|modal| modal.class_list().contains(ACTIVE_CLASS))
    }

    fn on_document_click(&self, event: &Event) {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };

        if let Ok(Some(trigger)) = target.closest("[data-modal-open]") {
            if let Some(id) = trigger.get_attribute("data-modal-open") {
                event.prevent_default();
                self.open(&id);
            }
            return;
        }
        if let Ok(Some(trigger)) = target.closest("[data-modal-close]") {
            if let Some(id) = trigger.get_attribute("data-modal-close") {
                event.prevent_default();
                self.close(&id);
            }
            return;
        }

        // Backdrop: the click landed on the overlay itself, not its content.
        if target.class_list().contains("modal") {
            self.close_element(&target);
        }
    }

    pub fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let modals = Rc::clone(self);
        listen(&self.document, "click", move |event: Event| {
            modals.on_document_click(&event);
        })?;

        let modals = Rc::clone(self);
        listen(&self.document, "keydown", move |event: Event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Escape");
            if is_escape {
                modals.close_all();
            }
        })
    }
}
