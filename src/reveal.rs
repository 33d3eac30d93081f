//! Scroll-triggered reveal. Each `.reveal` element gains `visible` the first time enough of it
//! enters the viewport and is then dropped from observation.

use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::dom::query_all;
use crate::log;

pub const VISIBLE_CLASS: &str = "visible";

// Observer ratios are rounded by the browser and can land just under the threshold that fired.
const RATIO_EPSILON: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Visible,
}

impl RevealState {
    /// Returns the next state and whether this observation is the one that revealed the element.
    pub fn on_intersection(self, intersecting: bool, ratio: f64, threshold: f64) -> (Self, bool) {
        match self {
            Self::Visible => (Self::Visible, false),
            Self::Hidden if intersecting && ratio + RATIO_EPSILON >= threshold => {
                (Self::Visible, true)
            }
            Self::Hidden => (Self::Hidden, false),
        }
    }
}

fn state_of(el: &Element) -> RevealState {
    if el.class_list().contains(VISIBLE_CLASS) {
        RevealState::Visible
    } else {
        RevealState::Hidden
    }
}

fn handle_entry(entry: &IntersectionObserverEntry, observer: &IntersectionObserver, threshold: f64) {
    let target = entry.target();
    let (next, fired) = state_of(&target).on_intersection(
        entry.is_intersecting(),
        entry.intersection_ratio(),
        threshold,
    );
    if fired {
        let _ = target.class_list().add_1(VISIBLE_CLASS);
    }
    if next == RevealState::Visible {
        observer.unobserve(&target);
    }
}

/// Observes every `.reveal` element. Returns how many are being watched.
pub fn observe(window: &Window, document: &Document, threshold: f64) -> Result<usize, JsValue> {
    let items = query_all(document, ".reveal");
    if items.is_empty() {
        return Ok(0);
    }

    let supported = Reflect::has(window, &JsValue::from_str("IntersectionObserver"))?;
    if !supported {
        log::warn("reveal_unsupported", "IntersectionObserver missing");
        return Ok(0);
    }

    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                handle_entry(&entry, &observer, threshold);
            }
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    for item in &items {
        if state_of(item) == RevealState::Hidden {
            observer.observe(item);
        }
    }
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_past_threshold() {
        let mut state = RevealState::Hidden;
        let mut fired = 0;
        let sightings = [
            (true, 0.05),
            (true, 0.2),
            (false, 0.0),
            (true, 0.9),
            (false, 0.0),
            (true, 0.5),
        ];
        for (intersecting, ratio) in sightings {
            let (next, did_fire) = state.on_intersection(intersecting, ratio, 0.2);
            state = next;
            fired += did_fire as u32;
        }
        assert_eq!(state, RevealState::Visible);
        assert_eq!(fired, 1);
    }

    #[test]
    fn below_threshold_stays_hidden() {
        let (state, fired) = RevealState::Hidden.on_intersection(true, 0.1, 0.2);
        assert_eq!(state, RevealState::Hidden);
        assert!(!fired);
    }

    #[test]
    fn rounded_ratio_at_threshold_counts() {
        let (state, fired) = RevealState::Hidden.on_intersection(true, 0.1999, 0.2);
        assert_eq!(state, RevealState::Visible);
        assert!(fired);
    }
}
