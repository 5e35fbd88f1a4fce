use web_sys::Element;

use crate::dom;
use crate::error::PageError;

const OPEN_CLASS: &str = "open";
const EXPANDED_ATTR: &str = "aria-expanded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Toggle,
    LinkClicked,
}

/// Next open state. A link click can only close the menu.
pub fn nav_transition(open: bool, event: NavEvent) -> bool {
    match event {
        NavEvent::Toggle => !open,
        NavEvent::LinkClicked => false,
    }
}

/// Mobile navigation: the toggle button, the collapsible menu and its links.
#[derive(Clone)]
pub struct NavToggle {
    toggle: Option<Element>,
    menu: Element,
}

impl NavToggle {
    pub fn new(toggle: Option<Element>, menu: Element) -> Self {
        Self { toggle, menu }
    }

    pub fn is_open(&self) -> bool {
        self.menu.class_list().contains(OPEN_CLASS)
    }

    pub fn handle(&self, event: NavEvent) {
        let open = self.is_open();
        let next = nav_transition(open, event);
        if next == open {
            return;
        }
        dom::set_class(&self.menu, OPEN_CLASS, next);
        if let Some(toggle) = &self.toggle {
            dom::set_bool_attr(toggle, EXPANDED_ATTR, next);
        }
    }

    pub fn bind_toggle(&self) -> Result<(), PageError> {
        let Some(toggle) = &self.toggle else {
            return Ok(());
        };
        let nav = self.clone();
        dom::listen(toggle, "click", move |_| nav.handle(NavEvent::Toggle))
    }

    pub fn bind_links(&self, links: &[Element]) -> Result<(), PageError> {
        for link in links {
            let nav = self.clone();
            dom::listen(link, "click", move |_| nav.handle(NavEvent::LinkClicked))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips() {
        assert!(nav_transition(false, NavEvent::Toggle));
        assert!(!nav_transition(true, NavEvent::Toggle));
    }

    #[test]
    fn test_link_closes_open_menu() {
        assert!(!nav_transition(true, NavEvent::LinkClicked));
    }

    #[test]
    fn test_link_never_opens() {
        assert!(
            !nav_transition(false, NavEvent::LinkClicked),
            "Clicking a link on a closed menu must leave it closed"
        );
    }
}
