use std::fmt;

use web_sys::{Element, Storage, Window};

use crate::config::ThemeConfig;
use crate::dom;
use crate::error::PageError;

const THEME_ATTR: &str = "data-theme";
const PRESSED_ATTR: &str = "aria-pressed";
const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Read a theme back from the root's `data-theme` value. Only `dark` is dark.
    pub fn from_attr(value: Option<&str>) -> Theme {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the page shows for a theme: the root's `data-theme` value (`None` means
/// removed), the toggle's `aria-pressed` value and whether the mirror class is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeMarks {
    pub data_theme: Option<&'static str>,
    pub pressed: &'static str,
    pub mirror: bool,
}

impl ThemeMarks {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                data_theme: Some("dark"),
                pressed: "true",
                mirror: true,
            },
            Theme::Light => Self {
                data_theme: None,
                pressed: "false",
                mirror: false,
            },
        }
    }

    /// Theme these marks stand for, read the same way the toggle reads the root.
    pub fn theme(&self) -> Theme {
        Theme::from_attr(self.data_theme)
    }
}

/// Resolve the theme to start with.
/// - a stored preference wins ("dark" is dark, any other non-empty value is light)
/// - otherwise the OS dark-scheme preference
/// - otherwise light
pub fn initial_theme(stored: Option<&str>, prefers_dark: bool) -> Theme {
    match stored {
        Some(value) if !value.is_empty() => Theme::from_attr(Some(value)),
        _ if prefers_dark => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Owns the theme collaborators: `<html>`, the optional toggle button and `<body>`.
#[derive(Clone)]
pub struct ThemeManager {
    root: Element,
    toggle: Option<Element>,
    body: Option<Element>,
    storage: Option<Storage>,
    config: ThemeConfig,
}

impl ThemeManager {
    pub fn new(
        window: &Window,
        root: Element,
        toggle: Option<Element>,
        body: Option<Element>,
        config: ThemeConfig,
    ) -> Self {
        // Throws when storage is disabled; the theme then just won't persist.
        let storage = window.local_storage().ok().flatten();
        Self {
            root,
            toggle,
            body,
            storage,
            config,
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|s| s.get_item(&self.config.storage_key).ok().flatten())
    }

    /// Current theme as the DOM shows it, not as last applied by us.
    pub fn current(&self) -> Theme {
        Theme::from_attr(self.root.get_attribute(THEME_ATTR).as_deref())
    }

    /// Apply the theme by setting or removing `data-theme` on `<html>`.
    /// Keeps `aria-pressed` on the toggle in step with it.
    pub fn apply(&self, theme: Theme) {
        let marks = ThemeMarks::for_theme(theme);
        match marks.data_theme {
            Some(value) => {
                let _ = self.root.set_attribute(THEME_ATTR, value);
            }
            None => {
                let _ = self.root.remove_attribute(THEME_ATTR);
            }
        }
        if let Some(toggle) = &self.toggle {
            let _ = toggle.set_attribute(PRESSED_ATTR, marks.pressed);
        }
        if let (Some(body), Some(class)) = (&self.body, &self.config.mirror_class) {
            dom::set_class(body, class, marks.mirror);
        }
    }

    /// Flip the theme shown on the page and remember it. Storage failures only cost persistence.
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.apply(next);
        if let Err(e) = self.persist(next) {
            log::warn!("Theme not persisted: {}", e);
        }
        next
    }

    fn persist(&self, theme: Theme) -> Result<(), PageError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| PageError::Storage("localStorage unavailable".to_string()))?;
        storage
            .set_item(&self.config.storage_key, theme.as_str())
            .map_err(|e| PageError::Storage(crate::error::describe(&e)))
    }

    pub fn toggle_control(&self) -> Option<&Element> {
        self.toggle.as_ref()
    }
}

pub fn prefers_dark(window: &Window) -> bool {
    window
        .match_media(DARK_QUERY)
        .ok()
        .flatten()
        .map_or(false, |mq| mq.matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_theme_without_stored_follows_os() {
        assert_eq!(initial_theme(None, true), Theme::Dark);
        assert_eq!(initial_theme(None, false), Theme::Light);
    }

    #[test]
    fn test_initial_theme_stored_wins() {
        assert_eq!(initial_theme(Some("light"), true), Theme::Light);
        assert_eq!(initial_theme(Some("dark"), false), Theme::Dark);
    }

    #[test]
    fn test_initial_theme_empty_stored_is_absent() {
        assert_eq!(initial_theme(Some(""), true), Theme::Dark);
        assert_eq!(initial_theme(Some(""), false), Theme::Light);
    }

    #[test]
    fn test_initial_theme_unknown_stored_is_light() {
        assert_eq!(
            initial_theme(Some("solarized"), true),
            Theme::Light,
            "A stored value other than dark should not fall back to the OS"
        );
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_ne!(theme.toggled(), theme);
            assert_eq!(theme.toggled().toggled(), theme);
        }
    }

    #[test]
    fn test_double_toggle_restores_root_and_pressed() {
        for start in [Theme::Light, Theme::Dark] {
            let before = ThemeMarks::for_theme(start);
            // The toggle reads the theme back from the root attribute each time.
            let once = ThemeMarks::for_theme(before.theme().toggled());
            let twice = ThemeMarks::for_theme(once.theme().toggled());

            assert_ne!(once, before);
            assert_eq!(twice, before, "two toggles from {} must restore the page", start);
        }
    }

    #[test]
    fn test_root_and_pressed_always_agree() {
        for theme in [Theme::Light, Theme::Dark] {
            let marks = ThemeMarks::for_theme(theme);
            assert_eq!(marks.theme(), theme);
            assert_eq!(marks.pressed == "true", marks.data_theme == Some("dark"));
            assert_eq!(marks.mirror, theme == Theme::Dark);
        }
    }

    #[test]
    fn test_attr_round_trip() {
        assert_eq!(Theme::from_attr(None), Theme::Light);
        assert_eq!(Theme::from_attr(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_attr(Some("light")), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::Light.as_str(), "light");
    }
}
