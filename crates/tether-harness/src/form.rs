#![forbid(unsafe_code)]

//! Builder for a control set plus the session over it.

use std::rc::Rc;

use tether_runtime::{BindingSession, ControlSet, SessionConfig};

use crate::controls::{FakeControl, erase};

/// A group of fake controls, in document order.
#[derive(Debug, Default)]
pub struct Form {
    controls: ControlSet,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `control` and return a handle to drive it.
    pub fn add(&self, control: FakeControl) -> Rc<FakeControl> {
        let control = Rc::new(control);
        self.controls.add(erase(&control));
        control
    }

    pub fn text(&self, mapping: &str) -> Rc<FakeControl> {
        self.add(FakeControl::text(mapping))
    }

    pub fn textarea(&self, mapping: &str) -> Rc<FakeControl> {
        self.add(FakeControl::textarea(mapping))
    }

    pub fn select(&self, mapping: &str, options: &[&str]) -> Rc<FakeControl> {
        self.add(FakeControl::select(mapping, options))
    }

    pub fn checkbox(&self, mapping: &str) -> Rc<FakeControl> {
        self.add(FakeControl::checkbox(mapping))
    }

    pub fn span(&self, mapping: &str) -> Rc<FakeControl> {
        self.add(FakeControl::span(mapping))
    }

    /// Handle to the underlying control set.
    #[must_use]
    pub fn controls(&self) -> ControlSet {
        self.controls.clone()
    }

    /// Session over this form with default configuration.
    #[must_use]
    pub fn session(&self) -> BindingSession {
        BindingSession::new(self.controls())
    }

    #[must_use]
    pub fn session_with(&self, config: SessionConfig) -> BindingSession {
        BindingSession::with_config(self.controls(), config)
    }
}
