use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, FormData, HtmlButtonElement, HtmlElement, HtmlFormElement};

use super::validate::Field;
use super::{ContactFields, ContactFlow, FieldErrors, SubmitOutcome};
use crate::dom::{bool_attr, html_element_by_id, js_value_to_string, listen, set_display};
use crate::log;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    Success,
    Error(String),
}

pub struct ContactForm {
    document: Document,
    form: HtmlFormElement,
    success: Option<HtmlElement>,
    error: Option<HtmlElement>,
    flow: ContactFlow,
    pending: Cell<bool>,
}

impl ContactForm {
    pub fn new(document: &Document, flow: ContactFlow) -> Option<Self> {
        let form = document
            .get_element_by_id("contactForm")?
            .dyn_into::<HtmlFormElement>()
            .ok()?;
        Some(Self {
            document: document.clone(),
            form,
            success: html_element_by_id(document, "successMessage"),
            error: html_element_by_id(document, "errorMessage"),
            flow,
            pending: Cell::new(false),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub fn read_fields(&self) -> Result<ContactFields, JsValue> {
        let data = FormData::new_with_form(&self.form)?;
        let field = |name: &str| data.get(name).as_string().unwrap_or_default();
        Ok(ContactFields {
            name: field("name"),
            email: field("email"),
            message: field("message"),
        })
    }

    pub fn clear_field_errors(&self) {
        for field in Field::ALL {
            if let Some(slot) = self.document.get_element_by_id(field.error_slot()) {
                slot.set_text_content(Some(""));
            }
        }
    }

    pub fn show_field_errors(&self, errors: &FieldErrors) {
        for error in errors.iter() {
            if let Some(slot) = self.document.get_element_by_id(error.field().error_slot()) {
                slot.set_text_content(Some(error.message()));
            }
        }
    }

    /// Shows exactly one of the success and error banners.
    pub fn show_banner(&self, banner: &Banner) {
        let success = matches!(banner, Banner::Success);
        if let Some(el) = &self.success {
            set_display(el, success);
        }
        let Some(el) = &self.error else {
            return;
        };
        set_display(el, !success);
        if let Banner::Error(text) = banner {
            // Markup is `<strong>Label</strong> text`; only the trailing text node changes.
            if let Some(node) = el
                .query_selector("strong")
                .ok()
                .flatten()
                .and_then(|strong| strong.next_sibling())
            {
                node.set_text_content(Some(&format!(" {}", text)));
            }
        }
    }

    fn set_pending(&self, pending: bool) {
        self.pending.set(pending);
        let _ = self.form.set_attribute("aria-busy", bool_attr(pending));
        if let Some(button) = self
            .form
            .query_selector("button[type=\"submit\"], button:not([type])")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(pending);
        }
    }

    pub fn render(&self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Invalid(errors) => self.show_field_errors(errors),
            SubmitOutcome::Sent => {
                self.form.reset();
                self.show_banner(&Banner::Success);
            }
            SubmitOutcome::Failed(message) => self.show_banner(&Banner::Error(message.clone())),
        }
    }

    /// Runs one submission. Ignored while a previous one is still in flight.
    pub async fn submit(self: Rc<Self>) {
        if self.is_pending() {
            return;
        }

        let fields = match self.read_fields() {
            Ok(fields) => fields,
            Err(err) => {
                log::error("contact_read_failed", &js_value_to_string(&err));
                return;
            }
        };
        self.clear_field_errors();

        let created_at = String::from(js_sys::Date::new_0().to_iso_string());
        self.set_pending(true);
        let outcome = self.flow.submit(&fields, &created_at).await;
        self.set_pending(false);
        self.render(&outcome);
    }

    pub fn wire(self: &Rc<Self>) -> Result<(), JsValue> {
        let contact = Rc::clone(self);
        listen(&self.form, "submit", move |event: Event| {
            event.prevent_default();
            spawn_local(Rc::clone(&contact).submit());
        })
    }
}
