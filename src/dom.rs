//! Small helpers over `web-sys` shared by the page features.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget};

use crate::error::PageError;

/// Attach `handler` to `target` for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), PageError>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(PageError::js)?;
    closure.forget();
    Ok(())
}

/// All elements matching `selector`, in document order. An invalid selector yields none.
pub fn query_all(doc: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = doc.query_selector_all(selector) else {
        log::warn!("Invalid selector: {}", selector);
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Set a `"true"`/`"false"` ARIA-style attribute.
pub fn set_bool_attr(el: &Element, name: &str, value: bool) {
    let _ = el.set_attribute(name, if value { "true" } else { "false" });
}

/// Add or remove `class` so that its presence equals `on`.
pub fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}
