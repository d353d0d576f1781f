//! Minimal in-crate control for unit tests.

use std::cell::{Cell, RefCell};

use tether_core::{BindResult, ControlKind, ControlValue};

use crate::control::{ChangeHandler, Control};
use crate::outcome::{WriteOutcome, WriteStatus};
use crate::reactive::{Notifier, Subscription};

pub(crate) struct Probe {
    kind: ControlKind,
    mapping: Option<String>,
    shown: RefCell<Option<ControlValue>>,
    edits: Notifier<ControlValue, BindResult<WriteOutcome>>,
    handler: RefCell<Option<ChangeHandler>>,
    echo: Cell<bool>,
    last_report: Cell<Option<WriteStatus>>,
}

impl Probe {
    pub(crate) fn new(kind: ControlKind, mapping: Option<&str>) -> Self {
        Self {
            kind,
            mapping: mapping.map(str::to_owned),
            shown: RefCell::new(None),
            edits: Notifier::new(),
            handler: RefCell::new(None),
            echo: Cell::new(false),
            last_report: Cell::new(None),
        }
    }

    pub(crate) fn shown(&self) -> Option<ControlValue> {
        self.shown.borrow().clone()
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.edits.subscriber_count() > 0
    }

    /// Report every push back as if the user had typed it.
    pub(crate) fn set_echo(&self, echo: bool) {
        self.echo.set(echo);
    }

    pub(crate) fn last_report_status(&self) -> Option<WriteStatus> {
        self.last_report.get()
    }

    /// The most recent handler, kept alive past unsubscription.
    pub(crate) fn handler(&self) -> Option<ChangeHandler> {
        self.handler.borrow().clone()
    }

    pub(crate) fn edit(&self, value: impl Into<ControlValue>) -> Vec<BindResult<WriteOutcome>> {
        let value = value.into();
        *self.shown.borrow_mut() = Some(value.clone());
        let results = self.edits.notify(&value);
        self.record(&results);
        results
    }

    fn record(&self, results: &[BindResult<WriteOutcome>]) {
        if let Some(Ok(outcome)) = results.last() {
            self.last_report.set(Some(outcome.status));
        }
    }
}

impl Control for Probe {
    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn attribute(&self, name: &str) -> Option<String> {
        (name == "mapping").then(|| self.mapping.clone()).flatten()
    }

    fn push(&self, value: ControlValue) {
        *self.shown.borrow_mut() = Some(value.clone());
        if self.echo.get() {
            let results = self.edits.notify(&value);
            self.record(&results);
        }
    }

    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        *self.handler.borrow_mut() = Some(handler.clone());
        self.edits.subscribe(move |value| handler(value.clone()))
    }
}
