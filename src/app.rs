use chrono::{DateTime, Datelike, Local, TimeZone};
use leptos::ev;
use leptos::prelude::window_event_listener;
use web_sys::{Document, Element, Window};

use crate::components::back_to_top::BackToTop;
use crate::components::contact_form::ContactForm;
use crate::components::nav_toggle::NavToggle;
use crate::components::skill_bars::{self, SkillBars};
use crate::config::PageConfig;
use crate::dom;
use crate::error::PageError;
use crate::theme::{self, ThemeManager};

const NO_FOCUS_OUTLINE_CLASS: &str = "no-focus-outline";

/// How skill bars get filled on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealMode {
    #[default]
    Off,
    /// Fill each bar when it scrolls into view.
    Lazy,
    /// Fill everything at startup.
    Immediate,
}

/// Which collaborators the page actually provides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presence {
    pub root: bool,
    pub body: bool,
    pub theme_toggle: bool,
    pub nav_toggle: bool,
    pub nav_menu: bool,
    pub nav_links: usize,
    pub back_to_top: bool,
    pub skill_bars: usize,
    pub observer_supported: bool,
    pub contact_form: bool,
    pub year: bool,
}

/// Features the controller will wire up, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub theme: bool,
    pub theme_toggle: bool,
    pub nav_toggle: bool,
    pub nav_link_close: bool,
    pub back_to_top: bool,
    pub skill_reveal: RevealMode,
    pub contact_form: bool,
    pub year: bool,
    pub focus_outline: bool,
}

impl From<Presence> for Capabilities {
    fn from(p: Presence) -> Self {
        let skill_reveal = match (p.skill_bars, p.observer_supported) {
            (0, _) => RevealMode::Off,
            (_, true) => RevealMode::Lazy,
            (_, false) => RevealMode::Immediate,
        };
        Self {
            theme: p.root,
            theme_toggle: p.root && p.theme_toggle,
            nav_toggle: p.nav_toggle && p.nav_menu,
            nav_link_close: p.nav_menu && p.nav_links > 0,
            back_to_top: p.back_to_top,
            skill_reveal,
            contact_form: p.contact_form,
            year: p.year,
            focus_outline: p.body,
        }
    }
}

/// Every element the controller may touch, looked up once.
pub struct Collaborators {
    pub root: Option<Element>,
    pub body: Option<Element>,
    pub theme_toggle: Option<Element>,
    pub nav_toggle: Option<Element>,
    pub nav_menu: Option<Element>,
    pub nav_links: Vec<Element>,
    pub back_to_top: Option<Element>,
    pub skill_bars: Vec<Element>,
    pub contact_form: Option<Element>,
    pub year: Option<Element>,
}

impl Collaborators {
    pub fn lookup(doc: &Document, config: &PageConfig) -> Self {
        let s = &config.selectors;
        Self {
            root: doc.document_element(),
            body: doc.body().map(Element::from),
            theme_toggle: doc.get_element_by_id(&s.theme_toggle_id),
            nav_toggle: doc.get_element_by_id(&s.nav_toggle_id),
            nav_menu: doc.get_element_by_id(&s.nav_menu_id),
            nav_links: dom::query_all(doc, &s.nav_link),
            back_to_top: doc.get_element_by_id(&s.back_to_top_id),
            skill_bars: dom::query_all(doc, &s.skill_bar),
            contact_form: doc.get_element_by_id(&s.contact_form_id),
            year: doc.get_element_by_id(&s.year_id),
        }
    }

    pub fn presence(&self, observer_supported: bool) -> Presence {
        Presence {
            root: self.root.is_some(),
            body: self.body.is_some(),
            theme_toggle: self.theme_toggle.is_some(),
            nav_toggle: self.nav_toggle.is_some(),
            nav_menu: self.nav_menu.is_some(),
            nav_links: self.nav_links.len(),
            back_to_top: self.back_to_top.is_some(),
            skill_bars: self.skill_bars.len(),
            observer_supported,
            contact_form: self.contact_form.is_some(),
            year: self.year.is_some(),
        }
    }
}

/// Wires the page's interactive bits to its static markup.
pub struct PageController {
    window: Window,
    config: PageConfig,
    parts: Collaborators,
    caps: Capabilities,
}

impl PageController {
    pub fn new(window: Window, config: PageConfig) -> Result<Self, PageError> {
        let doc = window.document().ok_or(PageError::NoDocument)?;
        let parts = Collaborators::lookup(&doc, &config);
        let caps = Capabilities::from(parts.presence(skill_bars::observer_supported(&window)));
        Ok(Self {
            window,
            config,
            parts,
            caps,
        })
    }

    /// Register every available feature. A feature that fails to bind is logged and skipped.
    pub fn start(self) {
        log::debug!("Page capabilities: {:?}", self.caps);
        let steps: [(&str, fn(&Self) -> Result<(), PageError>); 7] = [
            ("theme", Self::start_theme),
            ("navigation", Self::start_nav),
            ("back to top", Self::start_back_to_top),
            ("skill bars", Self::start_skill_bars),
            ("contact form", Self::start_contact_form),
            ("year", Self::start_year),
            ("focus outline", Self::start_focus_outline),
        ];
        for (name, step) in steps {
            if let Err(e) = step(&self) {
                log::error!("Failed to start {}: {}", name, e);
            }
        }
    }

    fn start_theme(&self) -> Result<(), PageError> {
        let Some(root) = self.parts.root.clone().filter(|_| self.caps.theme) else {
            return Ok(());
        };
        let manager = ThemeManager::new(
            &self.window,
            root,
            self.parts.theme_toggle.clone(),
            self.parts.body.clone(),
            self.config.theme.clone(),
        );
        let initial = theme::initial_theme(
            manager.stored().as_deref(),
            theme::prefers_dark(&self.window),
        );
        log::debug!("Initial theme: {}", initial);
        manager.apply(initial);

        if !self.caps.theme_toggle {
            log::debug!("No theme toggle on this page");
            return Ok(());
        }
        let Some(toggle) = manager.toggle_control().cloned() else {
            return Ok(());
        };
        dom::listen(&toggle, "click", move |_| {
            let next = manager.toggle();
            log::debug!("Theme switched to {}", next);
        })
    }

    fn start_nav(&self) -> Result<(), PageError> {
        let Some(menu) = self.parts.nav_menu.clone() else {
            return Ok(());
        };
        let nav = NavToggle::new(self.parts.nav_toggle.clone(), menu);
        if self.caps.nav_toggle {
            nav.bind_toggle()?;
        }
        if self.caps.nav_link_close {
            nav.bind_links(&self.parts.nav_links)?;
        }
        Ok(())
    }

    fn start_back_to_top(&self) -> Result<(), PageError> {
        let Some(control) = self.parts.back_to_top.clone().filter(|_| self.caps.back_to_top) else {
            return Ok(());
        };
        BackToTop::new(control, self.config.back_to_top_threshold).bind(&self.window)
    }

    fn start_skill_bars(&self) -> Result<(), PageError> {
        let bars = SkillBars::new(
            self.parts.skill_bars.clone(),
            self.config.selectors.skill_fill.as_str(),
        );
        match self.caps.skill_reveal {
            RevealMode::Off => Ok(()),
            RevealMode::Immediate => {
                log::debug!("IntersectionObserver unavailable, filling {} bars now", bars.len());
                bars.reveal_all();
                Ok(())
            }
            RevealMode::Lazy => {
                if let Err(e) = bars.observe(self.config.skill_reveal_threshold) {
                    log::warn!("Observer setup failed ({}), filling bars now", e);
                    bars.reveal_all();
                }
                Ok(())
            }
        }
    }

    fn start_contact_form(&self) -> Result<(), PageError> {
        let Some(el) = self.parts.contact_form.clone().filter(|_| self.caps.contact_form) else {
            return Ok(());
        };
        let Some(form) = ContactForm::new(
            self.window.clone(),
            el,
            self.config.contact.clone(),
            self.config.selectors.submit_control.as_str(),
        ) else {
            log::warn!("#{} is not a form", self.config.selectors.contact_form_id);
            return Ok(());
        };
        log::debug!("Contact form mode: {:?}", self.config.contact.mode);
        form.bind()
    }

    fn start_year(&self) -> Result<(), PageError> {
        if let Some(el) = self.parts.year.as_ref().filter(|_| self.caps.year) {
            el.set_text_content(Some(&year_text(&Local::now())));
        }
        Ok(())
    }

    fn start_focus_outline(&self) -> Result<(), PageError> {
        let Some(body) = self.parts.body.clone().filter(|_| self.caps.focus_outline) else {
            return Ok(());
        };
        let _ = window_event_listener(ev::keydown, move |e| {
            if is_tab(&e.key()) {
                let _ = body.class_list().remove_1(NO_FOCUS_OUTLINE_CLASS);
            }
        });
        Ok(())
    }
}

/// Calendar year of `now` in its own time zone, as shown in the footer.
fn year_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.year().to_string()
}

fn is_tab(key: &str) -> bool {
    key == "Tab"
}

/// Entry point: read config, set up logging, then start the controller.
pub fn run() -> Result<(), PageError> {
    let window = web_sys::window().ok_or(PageError::NoWindow)?;

    let (config, config_err) = match PageConfig::load(&window) {
        Ok(Some(config)) => (config, None),
        Ok(None) => (PageConfig::default(), None),
        Err(e) => (PageConfig::default(), Some(e)),
    };

    // A second init (e.g. hot reload) fails harmlessly.
    let _ = console_log::init_with_level(config.level());
    if let Some(e) = config_err {
        log::warn!("Ignoring page config: {}", e);
    }

    let controller = PageController::new(window, config)?;
    log::info!("Page controller ready");
    controller.start();
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn full_page() -> Presence {
        Presence {
            root: true,
            body: true,
            theme_toggle: true,
            nav_toggle: true,
            nav_menu: true,
            nav_links: 4,
            back_to_top: true,
            skill_bars: 3,
            observer_supported: true,
            contact_form: true,
            year: true,
        }
    }

    #[test]
    fn test_full_page_enables_everything() {
        let caps = Capabilities::from(full_page());
        assert!(caps.theme && caps.theme_toggle);
        assert!(caps.nav_toggle && caps.nav_link_close);
        assert!(caps.back_to_top && caps.contact_form && caps.year && caps.focus_outline);
        assert_eq!(caps.skill_reveal, RevealMode::Lazy);
    }

    #[test]
    fn test_empty_page_enables_nothing() {
        let caps = Capabilities::from(Presence::default());
        assert_eq!(caps, Capabilities::default());
        assert_eq!(caps.skill_reveal, RevealMode::Off);
    }

    #[test]
    fn test_theme_applies_without_toggle() {
        let caps = Capabilities::from(Presence {
            theme_toggle: false,
            ..full_page()
        });
        assert!(caps.theme, "initial theme is still applied");
        assert!(!caps.theme_toggle);
    }

    #[test]
    fn test_nav_needs_menu() {
        let caps = Capabilities::from(Presence {
            nav_menu: false,
            ..full_page()
        });
        assert!(!caps.nav_toggle);
        assert!(!caps.nav_link_close);

        let caps = Capabilities::from(Presence {
            nav_toggle: false,
            ..full_page()
        });
        assert!(!caps.nav_toggle);
        assert!(caps.nav_link_close, "links still close the menu");
    }

    #[test]
    fn test_skill_reveal_falls_back_without_observer() {
        let caps = Capabilities::from(Presence {
            observer_supported: false,
            ..full_page()
        });
        assert_eq!(caps.skill_reveal, RevealMode::Immediate);

        let caps = Capabilities::from(Presence {
            skill_bars: 0,
            ..full_page()
        });
        assert_eq!(caps.skill_reveal, RevealMode::Off);
    }

    #[test]
    fn test_year_text_is_calendar_year() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        assert_eq!(year_text(&now), "2026");
    }

    #[test]
    fn test_year_text_uses_local_offset() {
        // 23:30 UTC on New Year's Eve is already the next year one hour east.
        let utc = Utc.with_ymd_and_hms(2026, 12, 31, 23, 30, 0).unwrap();
        let east = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(year_text(&utc), "2026");
        assert_eq!(year_text(&east), "2027");
    }

    #[test]
    fn test_year_text_matches_clock() {
        let now = Local::now();
        assert_eq!(year_text(&now), now.year().to_string());
    }

    #[test]
    fn test_only_tab_restores_focus_outline() {
        assert!(is_tab("Tab"));
        assert!(!is_tab("Enter"));
        assert!(!is_tab("tab"));
    }
}
