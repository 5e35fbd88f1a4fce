use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("No browser window available")]
    NoWindow,

    #[error("No document attached to the window")]
    NoDocument,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JavaScript error: {0}")]
    Js(String),
}

impl PageError {
    /// Wrap a thrown JavaScript value, keeping its message when it has one.
    pub fn js(value: JsValue) -> Self {
        PageError::Js(describe(&value))
    }
}

/// Best-effort text for a thrown value: plain strings, `Error.message`, or the debug form.
pub fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PageError::Config("bad json".to_string()).to_string(),
            "Config error: bad json"
        );
        assert_eq!(
            PageError::Storage("quota".to_string()).to_string(),
            "Storage error: quota"
        );
    }

    #[test]
    fn test_startup_errors_read_plainly() {
        assert_eq!(PageError::NoDocument.to_string(), "No document attached to the window");
        assert_eq!(PageError::NoWindow.to_string(), "No browser window available");
    }
}
