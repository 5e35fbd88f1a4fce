use leptos::ev;
use leptos::prelude::window_event_listener;
use web_sys::{Element, ScrollBehavior, ScrollToOptions, Window};

use crate::dom;
use crate::error::PageError;

const SHOW_CLASS: &str = "show";

/// Visible strictly above the threshold; exactly at it the control stays hidden.
pub fn is_visible(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}

#[derive(Clone)]
pub struct BackToTop {
    control: Element,
    threshold: f64,
}

impl BackToTop {
    pub fn new(control: Element, threshold: f64) -> Self {
        Self { control, threshold }
    }

    /// Recompute from the absolute position so bursts of scroll events stay consistent.
    pub fn sync(&self, window: &Window) {
        let y = window.scroll_y().unwrap_or(0.0);
        dom::set_class(&self.control, SHOW_CLASS, is_visible(y, self.threshold));
    }

    pub fn bind(&self, window: &Window) -> Result<(), PageError> {
        self.sync(window);

        let on_scroll = self.clone();
        let win = window.clone();
        let _ = window_event_listener(ev::scroll, move |_| on_scroll.sync(&win));

        let win = window.clone();
        dom::listen(&self.control, "click", move |_| scroll_to_top(&win))
    }
}

fn scroll_to_top(window: &Window) {
    let opts = ScrollToOptions::new();
    opts.set_top(0.0);
    opts.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&opts);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_past_threshold() {
        assert!(is_visible(500.0, 400.0));
        assert!(!is_visible(100.0, 400.0));
    }

    #[test]
    fn test_threshold_boundary_is_hidden() {
        assert!(!is_visible(400.0, 400.0));
        assert!(is_visible(400.5, 400.0));
    }

    #[test]
    fn test_order_of_events_does_not_matter() {
        // Same position always yields the same answer, whatever came before.
        let positions = [900.0, 0.0, 401.0, 399.0, 401.0];
        let answers: Vec<bool> = positions.iter().map(|&y| is_visible(y, 400.0)).collect();
        assert_eq!(answers, vec![true, false, true, false, true]);
    }
}
