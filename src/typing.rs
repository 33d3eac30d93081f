//! Typing-text animation: reveals a phrase one character at a time, holds, deletes it faster
//! than it was typed, then moves on to the next phrase. Loops for the life of the page.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{js_value_to_string, window};
use crate::log;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingTiming {
    pub type_ms: u32,
    pub delete_ms: u32,
    pub hold_ms: u32,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            type_ms: 120,
            delete_ms: 60,
            hold_ms: 1200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub delay_ms: u32,
}

#[derive(Clone, Debug)]
pub struct Typewriter {
    phrases: Vec<String>,
    timing: TypingTiming,
    phrase: usize,
    chars: usize,
    deleting: bool,
}

impl Typewriter {
    pub fn new(phrases: Vec<String>, timing: TypingTiming) -> Option<Self> {
        if phrases.is_empty() {
            return None;
        }
        Some(Self {
            phrases,
            timing,
            phrase: 0,
            chars: 0,
            deleting: false,
        })
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase
    }

    fn prefix(&self) -> String {
        self.phrases[self.phrase].chars().take(self.chars).collect()
    }

    /// Produces the text to show now and how long to wait before the next tick.
    pub fn tick(&mut self) -> Frame {
        let len = self.phrases[self.phrase].chars().count();

        if !self.deleting {
            let text = self.prefix();
            if self.chars >= len {
                self.deleting = true;
                return Frame {
                    text,
                    delay_ms: self.timing.hold_ms,
                };
            }
            self.chars += 1;
            return Frame {
                text,
                delay_ms: self.timing.type_ms,
            };
        }

        self.chars = self.chars.saturating_sub(1);
        let text = self.prefix();
        if self.chars == 0 {
            self.deleting = false;
            self.phrase = (self.phrase + 1) % self.phrases.len();
            return Frame {
                text,
                delay_ms: self.timing.type_ms,
            };
        }
        Frame {
            text,
            delay_ms: self.timing.delete_ms,
        }
    }
}

fn schedule(callback: &Closure<dyn FnMut()>, delay_ms: u32) -> Result<(), JsValue> {
    window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        delay_ms.min(i32::MAX as u32) as i32,
    )?;
    Ok(())
}

/// Drives `typewriter` into `target` with a self re-arming timeout. There is no stop hook; the
/// callback and its state live until the page unloads.
pub fn start(target: Element, typewriter: Typewriter) -> Result<(), JsValue> {
    let state = Rc::new(RefCell::new(typewriter));
    let holder: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

    let holder_cb = Rc::clone(&holder);
    let tick = Closure::wrap(Box::new(move || {
        let frame = state.borrow_mut().tick();
        target.set_text_content(Some(&frame.text));

        if let Some(callback) = holder_cb.borrow().as_ref() {
            if let Err(err) = schedule(callback, frame.delay_ms) {
                log::error("typing_schedule_failed", &js_value_to_string(&err));
            }
        }
    }) as Box<dyn FnMut()>);

    schedule(&tick, 0)?;
    *holder.borrow_mut() = Some(tick);
    Ok(())
}
