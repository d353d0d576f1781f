#![forbid(unsafe_code)]

//! In-memory controls.
//!
//! Each [`FakeControl`] stores what it currently displays and lets a test
//! play the user: [`FakeControl::type_text`], [`FakeControl::toggle`] and
//! [`FakeControl::choose`] change the display and report the edit to the
//! subscribed handler, returning what the engine did with it.
//!
//! Selects behave like their browser counterpart: a pushed value that is not
//! one of the options leaves the placeholder (empty) option selected.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tether_core::{BindResult, ControlKind, ControlValue};
use tether_runtime::{ChangeHandler, Control, Notifier, Subscription, WriteOutcome};

/// Attribute name the session reads by default.
pub const MAPPING: &str = "mapping";

/// Scriptable control for tests.
pub struct FakeControl {
    kind: ControlKind,
    attributes: BTreeMap<String, String>,
    options: Vec<String>,
    shown: RefCell<ControlValue>,
    edits: Notifier<ControlValue, BindResult<WriteOutcome>>,
    pushes: Cell<usize>,
}

impl FakeControl {
    fn new(kind: ControlKind, mapping: Option<&str>) -> Self {
        let shown = match kind {
            ControlKind::Checkbox => ControlValue::Checked(false),
            _ => ControlValue::Text(String::new()),
        };
        let mut attributes = BTreeMap::new();
        if let Some(mapping) = mapping {
            attributes.insert(MAPPING.to_owned(), mapping.to_owned());
        }
        Self {
            kind,
            attributes,
            options: Vec::new(),
            shown: RefCell::new(shown),
            edits: Notifier::new(),
            pushes: Cell::new(0),
        }
    }

    /// Single-line text input.
    #[must_use]
    pub fn text(mapping: &str) -> Self {
        Self::new(ControlKind::Text, Some(mapping))
    }

    /// Multi-line text area.
    #[must_use]
    pub fn textarea(mapping: &str) -> Self {
        Self::new(ControlKind::TextArea, Some(mapping))
    }

    /// Single-choice select with an empty placeholder option first.
    #[must_use]
    pub fn select(mapping: &str, options: &[&str]) -> Self {
        let mut control = Self::new(ControlKind::Select, Some(mapping));
        control.options = std::iter::once(String::new())
            .chain(options.iter().map(|o| (*o).to_owned()))
            .collect();
        control
    }

    #[must_use]
    pub fn checkbox(mapping: &str) -> Self {
        Self::new(ControlKind::Checkbox, Some(mapping))
    }

    /// Read-only display.
    #[must_use]
    pub fn span(mapping: &str) -> Self {
        Self::new(ControlKind::Display, Some(mapping))
    }

    /// Control of `kind` with no mapping attribute.
    #[must_use]
    pub fn unmapped(kind: ControlKind) -> Self {
        Self::new(kind, None)
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Displayed text; checkboxes render `"true"`/`"false"`.
    #[must_use]
    pub fn value(&self) -> String {
        match &*self.shown.borrow() {
            ControlValue::Text(text) => text.clone(),
            ControlValue::Checked(on) => on.to_string(),
        }
    }

    /// Checked state; text controls are never checked.
    #[must_use]
    pub fn checked(&self) -> bool {
        self.shown.borrow().as_checked().unwrap_or(false)
    }

    /// Number of programmatic pushes received.
    #[must_use]
    pub fn push_count(&self) -> usize {
        self.pushes.get()
    }

    /// Whether the engine currently listens to this control.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.edits.subscriber_count() > 0
    }

    /// Replace the text as a user would and report it.
    pub fn type_text(&self, text: impl Into<String>) -> Vec<BindResult<WriteOutcome>> {
        self.edit(ControlValue::Text(text.into()))
    }

    /// Set the checked state as a user would and report it.
    pub fn toggle(&self, on: bool) -> Vec<BindResult<WriteOutcome>> {
        self.edit(ControlValue::Checked(on))
    }

    /// Pick an option as a user would and report it.
    ///
    /// Unknown options select the placeholder, which reports `""`.
    pub fn choose(&self, option: &str) -> Vec<BindResult<WriteOutcome>> {
        let option = self.option_or_placeholder(option);
        self.edit(ControlValue::Text(option))
    }

    /// Report an arbitrary user edit.
    pub fn edit(&self, value: impl Into<ControlValue>) -> Vec<BindResult<WriteOutcome>> {
        let value = value.into();
        *self.shown.borrow_mut() = value.clone();
        self.edits.notify(&value)
    }

    fn option_or_placeholder(&self, option: &str) -> String {
        if self.options.iter().any(|o| o == option) {
            option.to_owned()
        } else {
            String::new()
        }
    }
}

impl Control for FakeControl {
    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn push(&self, value: ControlValue) {
        self.pushes.set(self.pushes.get() + 1);
        let value = match (self.kind, value) {
            (ControlKind::Select, ControlValue::Text(text)) => {
                ControlValue::Text(self.option_or_placeholder(&text))
            }
            (_, value) => value,
        };
        *self.shown.borrow_mut() = value;
    }

    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        self.edits.subscribe(move |value| handler(value.clone()))
    }

    fn describe(&self) -> String {
        match self.attributes.get(MAPPING) {
            Some(mapping) => format!("{}[{mapping}]", self.kind),
            None => self.kind.to_string(),
        }
    }
}

impl fmt::Debug for FakeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeControl")
            .field("kind", &self.kind)
            .field("mapping", &self.attributes.get(MAPPING))
            .field("shown", &*self.shown.borrow())
            .finish()
    }
}

/// The result of an edit that must have reached exactly one handler.
///
/// # Panics
///
/// If the edit reached no handler or several.
#[must_use]
pub fn single(results: Vec<BindResult<WriteOutcome>>) -> BindResult<WriteOutcome> {
    let mut results = results.into_iter();
    let first = results.next().expect("edit reached no handler");
    assert!(results.next().is_none(), "edit reached more than one handler");
    first
}

/// Upcast helper for building control sets.
#[must_use]
pub fn erase(control: &Rc<FakeControl>) -> Rc<dyn Control> {
    Rc::clone(control) as Rc<dyn Control>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_falls_back_to_placeholder() {
        let select = FakeControl::select("race", &["Human", "Klingon"]);
        select.push(ControlValue::from("Klingon"));
        assert_eq!(select.value(), "Klingon");
        select.push(ControlValue::from("Romulan"));
        assert_eq!(select.value(), "");
        assert_eq!(select.push_count(), 2);
    }

    #[test]
    fn edits_without_subscribers_reach_nobody() {
        let input = FakeControl::text("name");
        assert!(input.type_text("Steve").is_empty());
        assert_eq!(input.value(), "Steve");
    }

    #[test]
    fn attributes_and_describe() {
        let input = FakeControl::text("name").with_attribute("bind", "alias");
        assert_eq!(input.attribute("mapping").as_deref(), Some("name"));
        assert_eq!(input.attribute("bind").as_deref(), Some("alias"));
        assert_eq!(input.describe(), "text[name]");
        assert_eq!(FakeControl::unmapped(ControlKind::Display).attribute("mapping"), None);
    }

    #[test]
    fn checkbox_display() {
        let check = FakeControl::checkbox("undead");
        assert!(!check.checked());
        check.push(ControlValue::Checked(true));
        assert!(check.checked());
        assert_eq!(check.value(), "true");
    }
}
