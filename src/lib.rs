pub mod background;
pub mod config;
pub mod contact;
pub mod dom;
pub mod error;
pub mod log;
pub mod modal;
pub mod nav;
pub mod reveal;
pub mod scroll_progress;
pub mod storage;
pub mod theme;
pub mod typing;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, Window};

use crate::config::Config;
use crate::contact::{ContactFlow, ContactForm, select_submitter};
use crate::dom::{js_value_to_string, listen, set_status};
use crate::modal::ModalController;
use crate::nav::NavController;
use crate::scroll_progress::ScrollProgress;
use crate::storage::open_store;
use crate::theme::{Theme, ThemeManager};
use crate::typing::Typewriter;

thread_local! {
    static PORTFOLIO: RefCell<Option<Portfolio>> = const { RefCell::new(None) };
}

/// Every page controller, built once when the document is ready.
pub struct Portfolio {
    config: Config,
    theme: Option<Rc<ThemeManager>>,
    nav: Option<Rc<NavController>>,
    modals: Rc<ModalController>,
    scroll: Option<ScrollProgress>,
    contact: Option<Rc<ContactForm>>,
    reveal_count: usize,
    background: bool,
}

fn report(feature: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::error(&format!("{}_setup_failed", feature), &js_value_to_string(&err));
    }
}

impl Portfolio {
    /// Wires every feature the markup provides. Missing elements disable their feature; a
    /// failing feature is logged and the rest still mount.
    pub fn mount(window: &Window, document: &Document) -> Result<Self, JsValue> {
        let search = window.location().search().unwrap_or_default();
        let config = Config::from_document(document, &search);
        let store = open_store(window);

        let nav = NavController::new(document).map(Rc::new);
        if let Some(nav) = &nav {
            report("nav", nav.wire());
        }

        let theme = ThemeManager::new(window, document, Rc::clone(&store), &config.theme_key)
            .map(Rc::new);
        let initial_theme = match &theme {
            Some(theme) => {
                report("theme", theme.wire());
                theme.restore()
            }
            None => Theme::Light,
        };

        if let Some(target) = document.query_selector(".typing")? {
            match Typewriter::new(config.phrases.clone(), config.typing) {
                Some(typewriter) => report("typing", typing::start(target, typewriter)),
                None => log::warn("typing_skipped", "no phrases"),
            }
        }

        let reveal_count = match reveal::observe(window, document, config.reveal_threshold) {
            Ok(count) => count,
            Err(err) => {
                log::error("reveal_setup_failed", &js_value_to_string(&err));
                0
            }
        };

        let modals = Rc::new(ModalController::new(document));
        report("modal", modals.wire());

        let contact = ContactForm::new(
            document,
            ContactFlow::new(select_submitter(
                &config.backend,
                Rc::clone(&store),
                &config.messages_key,
            )),
        )
        .map(Rc::new);
        if let Some(contact) = &contact {
            report("contact", contact.wire());
            log::info("contact_backend", config.backend.name());
        }

        let scroll = ScrollProgress::new(window, document);
        if let Some(scroll) = &scroll {
            report("scroll_progress", scroll.wire());
        }

        let background = if config.background {
            match background::start(window, document, initial_theme) {
                Ok(started) => started,
                Err(err) => {
                    log::warn("background_unavailable", &js_value_to_string(&err));
                    false
                }
            }
        } else {
            false
        };

        Ok(Self {
            config,
            theme,
            nav,
            modals,
            scroll,
            contact,
            reveal_count,
            background,
        })
    }

    /// One line describing what mounted, for the startup log.
    pub fn summary(&self) -> String {
        format!(
            "theme={} nav={} scroll={} contact={} backend={} reveal={} background={}",
            self.theme.as_ref().map_or("off", |theme| theme.current().as_str()),
            self.nav.is_some(),
            self.scroll.is_some(),
            self.contact.is_some(),
            self.config.backend.name(),
            self.reveal_count,
            self.background,
        )
    }
}

fn mount_now() -> Result<(), JsValue> {
    let window = dom::window()?;
    let document = dom::document()?;
    let portfolio = Portfolio::mount(&window, &document)?;
    let summary = portfolio.summary();
    PORTFOLIO.with(|slot| *slot.borrow_mut() = Some(portfolio));
    set_status(&document, "ready");
    log::info("ready", &summary);
    Ok(())
}

fn fail(err: &JsValue) {
    if let Ok(document) = dom::document() {
        set_status(&document, "error");
    }
    log::error("fatal", &js_value_to_string(err));
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        fail(&err);
    }
}

fn start_impl() -> Result<(), JsValue> {
    let document = dom::document()?;
    set_status(&document, "loading");

    if document.ready_state() != "loading" {
        return mount_now();
    }

    listen(&document, "DOMContentLoaded", move |_event: Event| {
        if let Err(err) = mount_now() {
            fail(&err);
        }
    })
}

fn with_modals<R>(f: impl FnOnce(&ModalController) -> R) -> Option<R> {
    let mounted = PORTFOLIO.with(|slot| slot.borrow().as_ref().map(|p| Rc::clone(&p.modals)));
    match mounted {
        Some(modals) => Some(f(&modals)),
        None => dom::document()
            .ok()
            .map(|document| f(&ModalController::new(&document))),
    }
}

/// For inline `onclick` handlers in markup.
#[wasm_bindgen]
pub fn open_modal(id: &str) -> bool {
    with_modals(|modals| modals.open(id)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn close_modal(id: &str) -> bool {
    with_modals(|modals| modals.close(id)).unwrap_or(false)
}
