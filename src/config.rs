//! Page configuration.
//!
//! Every field has a default matching the stock portfolio markup, so a page
//! without any configuration just works. Overrides come from an inline
//! `<script type="application/json" id="page-config">` block, or failing that
//! from a `window.pageConfig` object.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::PageError;

const CONFIG_SCRIPT_ID: &str = "page-config";
const CONFIG_GLOBAL: &str = "pageConfig";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    /// `log` level name for the console logger.
    pub log_level: String,
    pub selectors: Selectors,
    pub theme: ThemeConfig,
    /// Scroll offset in px above which the back-to-top control is shown.
    pub back_to_top_threshold: f64,
    /// Fraction of a skill bar that must be visible before it fills.
    pub skill_reveal_threshold: f64,
    pub contact: ContactConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            selectors: Selectors::default(),
            theme: ThemeConfig::default(),
            back_to_top_threshold: 400.0,
            skill_reveal_threshold: 0.25,
            contact: ContactConfig::default(),
        }
    }
}

/// Where the controller finds its collaborators in the page markup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub theme_toggle_id: String,
    pub nav_toggle_id: String,
    pub nav_menu_id: String,
    pub nav_link: String,
    pub back_to_top_id: String,
    pub skill_bar: String,
    pub skill_fill: String,
    pub contact_form_id: String,
    pub submit_control: String,
    pub year_id: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            theme_toggle_id: "themeToggle".to_string(),
            nav_toggle_id: "navToggle".to_string(),
            nav_menu_id: "navMenu".to_string(),
            nav_link: ".nav-link".to_string(),
            back_to_top_id: "backToTop".to_string(),
            skill_bar: ".skill-bar".to_string(),
            skill_fill: ".skill-fill".to_string(),
            contact_form_id: "contactForm".to_string(),
            submit_control: "button:not([type]), [type=submit]".to_string(),
            year_id: "year".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    /// localStorage key holding `light` or `dark`.
    pub storage_key: String,
    /// Optional `<body>` class mirroring the dark theme for older stylesheets.
    pub mirror_class: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "prefers-theme".to_string(),
            mirror_class: None,
        }
    }
}

/// How the contact form handles a valid submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMode {
    /// Open the visitor's mail client with a prefilled message.
    #[default]
    Mailto,
    /// Pretend to send, with a short busy state and a thank-you alert.
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactConfig {
    pub mode: ContactMode,
    pub recipient: String,
    pub subject_prefix: String,
    /// Used in the subject when the name is somehow blank.
    pub fallback_name: String,
    pub incomplete_message: String,
    pub sending_label: String,
    /// `{name}` is replaced with the submitter's name.
    pub success_message: String,
    pub submit_delay_ms: u32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            mode: ContactMode::Mailto,
            recipient: "youremail@example.com".to_string(),
            subject_prefix: "Pesan dari Portofolio: ".to_string(),
            fallback_name: "Pengunjung".to_string(),
            incomplete_message: "Mohon lengkapi semua field sebelum mengirim.".to_string(),
            sending_label: "Mengirim...".to_string(),
            success_message: "Terima kasih, {name}! Pesan kamu sudah terkirim.".to_string(),
            submit_delay_ms: 900,
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, PageError> {
        serde_json::from_str(raw).map_err(|e| PageError::Config(e.to_string()))
    }

    pub fn from_js(value: JsValue) -> Result<Self, PageError> {
        serde_wasm_bindgen::from_value(value).map_err(|e| PageError::Config(e.to_string()))
    }

    /// Parsed log level, falling back to `Info` for unknown names.
    pub fn level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    /// Read overrides from the page. `Ok(None)` means the page has none.
    pub fn load(window: &web_sys::Window) -> Result<Option<Self>, PageError> {
        if let Some(doc) = window.document() {
            if let Some(script) = doc.get_element_by_id(CONFIG_SCRIPT_ID) {
                let raw = script.text_content().unwrap_or_default();
                if !raw.trim().is_empty() {
                    return Self::from_json(&raw).map(Some);
                }
            }
        }

        let global = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))
            .map_err(PageError::js)?;
        if global.is_undefined() || global.is_null() {
            return Ok(None);
        }
        Self::from_js(global).map(Some)
    }
}
