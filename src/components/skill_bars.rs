//! Skill bars that fill up once they scroll into view.
//!
//! Each `.skill-bar` carries its target in `data-value` and wraps a
//! `.skill-fill`. With `IntersectionObserver` the fill happens the first time
//! enough of the bar is visible; without it every bar fills at startup. Both
//! paths go through [`SkillBars::reveal_once`], so the end state is the same
//! and no bar is filled twice.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::error::PageError;

const VALUE_ATTR: &str = "data-value";
const VALUENOW_ATTR: &str = "aria-valuenow";

/// Parse a `data-value` the way `Number(v) || 0` would, clamped to 0..=100.
pub fn parse_target(raw: Option<&str>) -> f64 {
    let value = raw
        .map(js_number)
        .filter(|v| !v.is_nan())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    // -0 would print as "-0"
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// JavaScript's string-to-number conversion. Anything it rejects is NaN.
fn js_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        // Only overflow is left as a failure; it is a huge number either way.
        return u64::from_str_radix(digits, radix).map_or(f64::INFINITY, |v| v as f64);
    }

    if is_decimal_literal(s) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `[+-] digits [. digits] [e [+-] digits]`, with at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    let mantissa_ok = (!int.is_empty() || !frac.is_empty()) && all_digits(int) && all_digits(frac);
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && all_digits(e)
    });
    mantissa_ok && exponent_ok
}

/// Text form of a percentage; whole numbers have no decimal point.
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

/// Browsers may report a crossing ratio a hair under the threshold.
const RATIO_TOLERANCE: f64 = 1e-3;

/// Whether an observer entry should fill its bar.
pub fn should_reveal(is_intersecting: bool, ratio: f64, threshold: f64) -> bool {
    is_intersecting && ratio + RATIO_TOLERANCE >= threshold
}

/// Remembers which bars (by position) have already been filled.
#[derive(Debug, Clone, Default)]
pub struct RevealLedger {
    revealed: Rc<RefCell<Vec<bool>>>,
}

impl RevealLedger {
    pub fn new(len: usize) -> Self {
        Self {
            revealed: Rc::new(RefCell::new(vec![false; len])),
        }
    }

    /// Mark bar `index` as filled. `false` if it already was, or is out of range.
    pub fn claim(&self, index: usize) -> bool {
        match self.revealed.borrow_mut().get_mut(index) {
            Some(done) if !*done => {
                *done = true;
                true
            }
            _ => false,
        }
    }
}

pub fn observer_supported(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

#[derive(Clone)]
pub struct SkillBars {
    bars: Vec<Element>,
    fill_selector: String,
    ledger: RevealLedger,
}

impl SkillBars {
    pub fn new(bars: Vec<Element>, fill_selector: impl Into<String>) -> Self {
        let ledger = RevealLedger::new(bars.len());
        Self {
            bars,
            fill_selector: fill_selector.into(),
            ledger,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Fill the bar at `index` unless it has been filled already.
    pub fn reveal_once(&self, index: usize) {
        if let Some(bar) = self.bars.get(index) {
            if self.ledger.claim(index) {
                self.reveal(bar);
            }
        }
    }

    /// Fill one bar to its target and expose the value to assistive tech.
    fn reveal(&self, bar: &Element) {
        let value = parse_target(bar.get_attribute(VALUE_ATTR).as_deref());
        let text = format_value(value);

        let fill = bar
            .query_selector(&self.fill_selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        match fill {
            Some(fill) => {
                let _ = fill.style().set_property("width", &format!("{}%", text));
            }
            None => log::debug!("Skill bar without fill element"),
        }
        let _ = bar.set_attribute(VALUENOW_ATTR, &text);
    }

    pub fn reveal_all(&self) {
        for index in 0..self.bars.len() {
            self.reveal_once(index);
        }
    }

    /// Observe every bar and fill each one once, the first time it is visible enough.
    pub fn observe(&self, threshold: f64) -> Result<(), PageError> {
        let bars = self.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !should_reveal(entry.is_intersecting(), entry.intersection_ratio(), threshold) {
                        continue;
                    }
                    let bar = entry.target();
                    observer.unobserve(&bar);
                    if let Some(index) = bars.bars.iter().position(|b| *b == bar) {
                        bars.reveal_once(index);
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(PageError::js)?;
        callback.forget();

        for bar in &self.bars {
            observer.observe(bar);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_plain_values() {
        assert_eq!(parse_target(Some("75")), 75.0);
        assert_eq!(parse_target(Some("0")), 0.0);
        assert_eq!(parse_target(Some("100")), 100.0);
        assert_eq!(parse_target(Some(" 42.5 ")), 42.5);
    }

    #[test]
    fn test_parse_target_missing_or_garbage_is_zero() {
        assert_eq!(parse_target(None), 0.0);
        assert_eq!(parse_target(Some("")), 0.0);
        assert_eq!(parse_target(Some("   ")), 0.0);
        assert_eq!(parse_target(Some("abc")), 0.0);
        assert_eq!(parse_target(Some("NaN")), 0.0);
        assert_eq!(parse_target(Some("80%")), 0.0, "Number('80%') is NaN");
        assert_eq!(parse_target(Some("inf")), 0.0);
        assert_eq!(parse_target(Some("infinity")), 0.0);
        assert_eq!(parse_target(Some("+inf")), 0.0);
        assert_eq!(parse_target(Some("1e")), 0.0);
        assert_eq!(parse_target(Some(".")), 0.0);
        assert_eq!(parse_target(Some("0x")), 0.0);
        assert_eq!(parse_target(Some("-0x10")), 0.0);
        assert_eq!(parse_target(Some("0b12")), 0.0);
    }

    #[test]
    fn test_parse_target_js_literals() {
        assert_eq!(parse_target(Some("0x32")), 50.0);
        assert_eq!(parse_target(Some("0X1f")), 31.0);
        assert_eq!(parse_target(Some("0o7")), 7.0);
        assert_eq!(parse_target(Some("0b11")), 3.0);
        assert_eq!(parse_target(Some("5e1")), 50.0);
        assert_eq!(parse_target(Some(".5")), 0.5);
        assert_eq!(parse_target(Some("12.")), 12.0);
        assert_eq!(parse_target(Some("Infinity")), 100.0, "Number('Infinity') is a number");
        assert_eq!(parse_target(Some("0xffffffffffffffffff")), 100.0);
    }

    #[test]
    fn test_parse_target_is_clamped() {
        assert_eq!(parse_target(Some("150")), 100.0);
        assert_eq!(parse_target(Some("-20")), 0.0);
        assert_eq!(parse_target(Some("-0")), 0.0);
        assert_eq!(format_value(parse_target(Some("-0"))), "0");
    }

    #[test]
    fn test_every_whole_percentage_renders_as_is() {
        for v in 0..=100u32 {
            let parsed = parse_target(Some(&v.to_string()));
            assert_eq!(parsed, f64::from(v));
            assert_eq!(format_value(parsed), v.to_string());
        }
    }

    #[test]
    fn test_format_keeps_fractions() {
        assert_eq!(format_value(62.5), "62.5");
    }

    #[test]
    fn test_should_reveal_needs_quarter_visible() {
        assert!(should_reveal(true, 0.25, 0.25));
        assert!(should_reveal(true, 1.0, 0.25));
        assert!(!should_reveal(true, 0.1, 0.25));
        assert!(!should_reveal(false, 0.0, 0.25));
    }

    #[test]
    fn test_should_reveal_tolerates_crossing_rounding() {
        assert!(should_reveal(true, 0.9995, 1.0));
        assert!(should_reveal(true, 0.2495, 0.25));
        assert!(!should_reveal(true, 0.2, 0.25));
    }

    #[test]
    fn test_ledger_claims_each_bar_once() {
        let ledger = RevealLedger::new(3);
        assert!(ledger.claim(1));
        assert!(!ledger.claim(1), "a bar must not be filled twice");
        assert!(ledger.claim(0));
        assert!(ledger.claim(2));
        assert!(!ledger.claim(3), "out of range");

        let shared = ledger.clone();
        assert!(!shared.claim(0), "clones share the same record");
    }
}
