//! Demo contact form. Nothing is sent to a server: the `mailto` mode hands the
//! message to the visitor's mail client, the `simulated` mode fakes a short
//! submission round-trip.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, HtmlButtonElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    SubmitEvent, Window,
};

use crate::config::{ContactConfig, ContactMode};
use crate::dom;
use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Missing required fields: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

/// Trimmed field values of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            message: message.trim().to_string(),
        }
    }

    /// `mailto` needs all three fields; `simulated` only name and email.
    pub fn validate(&self, mode: ContactMode) -> Result<(), ContactError> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if mode == ContactMode::Mailto && self.message.is_empty() {
            missing.push("message");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContactError::Incomplete(missing))
        }
    }
}

/// Build the prefilled `mailto:` link for a validated submission.
pub fn mailto_href(config: &ContactConfig, submission: &ContactSubmission) -> String {
    let name = if submission.name.is_empty() {
        config.fallback_name.as_str()
    } else {
        submission.name.as_str()
    };
    let subject = format!("{}{}", config.subject_prefix, name);
    let body = format!(
        "Nama: {}\nEmail: {}\n\n{}",
        submission.name, submission.email, submission.message
    );
    format!(
        "mailto:{}?subject={}&body={}",
        config.recipient,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

pub fn success_message(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

/// At most one simulated submission in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmitGate {
    pending: Rc<Cell<bool>>,
}

impl SubmitGate {
    /// Claim the gate. Returns `false` if a submission is already pending.
    pub fn try_begin(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn finish(&self) {
        self.pending.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

/// Whether an element with this tag and `type` attribute submits its form.
/// A `<button>` without `type` (or with an unknown one) is a submit button.
pub fn submits_form(tag: &str, type_attr: Option<&str>) -> bool {
    let kind = type_attr.map(|t| t.trim().to_ascii_lowercase());
    match tag.to_ascii_lowercase().as_str() {
        "button" => !matches!(kind.as_deref(), Some("button") | Some("reset")),
        "input" => matches!(kind.as_deref(), Some("submit") | Some("image")),
        _ => false,
    }
}

/// A control whose label can be swapped for a busy text and put back later.
pub trait SubmitLabel {
    /// Everything needed to restore the label, nested markup included.
    fn saved_label(&self) -> String;
    fn restore_label(&self, saved: &str);
    fn show_busy(&self, text: &str);
    fn set_disabled(&self, disabled: bool);
}

/// Busy state of a submit control: disabled with the busy text until [`BusyControl::release`].
pub struct BusyControl<C: SubmitLabel> {
    control: C,
    saved: String,
}

impl<C: SubmitLabel> BusyControl<C> {
    pub fn enter(control: C, busy_text: &str) -> Self {
        let saved = control.saved_label();
        control.set_disabled(true);
        control.show_busy(busy_text);
        Self { control, saved }
    }

    pub fn release(self) {
        self.control.set_disabled(false);
        self.control.restore_label(&self.saved);
    }
}

/// The form's submit control, either a `<button>` or an `<input type=submit>`.
enum SubmitControl {
    Button(HtmlButtonElement),
    Input(HtmlInputElement),
}

impl SubmitControl {
    fn from_element(el: Element) -> Option<Self> {
        if !submits_form(&el.tag_name(), el.get_attribute("type").as_deref()) {
            return None;
        }
        match el.dyn_into::<HtmlButtonElement>() {
            Ok(button) => Some(SubmitControl::Button(button)),
            Err(el) => el.dyn_into::<HtmlInputElement>().ok().map(SubmitControl::Input),
        }
    }

    /// The button that triggered `ev`, else the first match of `selector` in the form.
    fn for_submit(ev: &Event, form: &HtmlFormElement, selector: &str) -> Option<Self> {
        let submitter = ev
            .dyn_ref::<SubmitEvent>()
            .and_then(SubmitEvent::submitter)
            .map(Element::from)
            .and_then(Self::from_element);
        submitter.or_else(|| {
            form.query_selector(selector)
                .ok()
                .flatten()
                .and_then(Self::from_element)
        })
    }
}

impl SubmitLabel for SubmitControl {
    fn saved_label(&self) -> String {
        match self {
            SubmitControl::Button(b) => b.inner_html(),
            SubmitControl::Input(i) => i.value(),
        }
    }

    fn restore_label(&self, saved: &str) {
        match self {
            SubmitControl::Button(b) => b.set_inner_html(saved),
            SubmitControl::Input(i) => i.set_value(saved),
        }
    }

    fn show_busy(&self, text: &str) {
        match self {
            SubmitControl::Button(b) => b.set_text_content(Some(text)),
            SubmitControl::Input(i) => i.set_value(text),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        match self {
            SubmitControl::Button(b) => b.set_disabled(disabled),
            SubmitControl::Input(i) => i.set_disabled(disabled),
        }
    }
}

#[derive(Clone)]
pub struct ContactForm {
    window: Window,
    form: HtmlFormElement,
    config: ContactConfig,
    submit_selector: String,
    gate: SubmitGate,
}

impl ContactForm {
    /// `None` if the element is not a `<form>`.
    pub fn new(
        window: Window,
        form: Element,
        config: ContactConfig,
        submit_selector: impl Into<String>,
    ) -> Option<Self> {
        let form = form.dyn_into::<HtmlFormElement>().ok()?;
        Some(Self {
            window,
            form,
            config,
            submit_selector: submit_selector.into(),
            gate: SubmitGate::default(),
        })
    }

    pub fn bind(&self) -> Result<(), PageError> {
        let this = self.clone();
        dom::listen(&self.form, "submit", move |ev| {
            ev.prevent_default();
            this.submit(&ev);
        })
    }

    fn field(&self, name: &str) -> String {
        let Some(el) = self
            .form
            .query_selector(&format!("[name=\"{}\"]", name))
            .ok()
            .flatten()
        else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn read(&self) -> ContactSubmission {
        ContactSubmission::new(&self.field("name"), &self.field("email"), &self.field("message"))
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn submit(&self, ev: &Event) {
        if self.gate.is_pending() {
            log::debug!("Contact form already submitting, ignoring");
            return;
        }
        let submission = self.read();
        if let Err(e) = submission.validate(self.config.mode) {
            log::debug!("Contact form rejected: {}", e);
            self.alert(&self.config.incomplete_message);
            return;
        }
        match self.config.mode {
            ContactMode::Mailto => self.open_mail_client(&submission),
            ContactMode::Simulated => {
                let control = SubmitControl::for_submit(ev, &self.form, &self.submit_selector);
                if control.is_none() {
                    log::debug!("No submit control found for busy state");
                }
                self.simulate(submission, control);
            }
        }
    }

    fn open_mail_client(&self, submission: &ContactSubmission) {
        let href = mailto_href(&self.config, submission);
        if let Err(e) = self.window.location().set_href(&href) {
            log::warn!("Could not open mail link: {}", crate::error::describe(&e));
            return;
        }
        self.form.reset();
    }

    fn simulate(&self, submission: ContactSubmission, control: Option<SubmitControl>) {
        if !self.gate.try_begin() {
            return;
        }
        let busy = control.map(|c| BusyControl::enter(c, &self.config.sending_label));

        let this = self.clone();
        let delay = Duration::from_millis(u64::from(self.config.submit_delay_ms));
        spawn_local(async move {
            gloo_timers::future::sleep(delay).await;
            if let Some(busy) = busy {
                busy.release();
            }
            this.alert(&success_message(&this.config.success_message, &submission.name));
            this.form.reset();
            this.gate.finish();
        });
    }
}
