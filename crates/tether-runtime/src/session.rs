#![forbid(unsafe_code)]

//! The binding session: lifecycle plus the write pipeline.
//!
//! A [`BindingSession`] owns at most one bound model. `bind` discovers
//! controls, pushes initial values and subscribes to user edits; `unbind`
//! releases everything and hands the model back.
//!
//! Every write, whether it comes from a [`Node`] or a control, runs the same
//! pipeline:
//!
//! ```text
//! write(path, value, origin)
//!   ├─ depth guard ............ RecursionLimit past the configured depth
//!   ├─ conflict pre-check ..... PathConflict, nothing else runs
//!   ├─ equality check ......... Unchanged, nothing else runs
//!   ├─ validators ............. veto → re-push controls at path → Vetoed
//!   ├─ commit ................. graph updated
//!   ├─ listeners .............. failures recorded, never propagated
//!   └─ control sync ........... every control overlapping path, minus origin
//! ```
//!
//! # Invariants
//!
//! 1. No `RefCell` borrow is held while user code runs (validators,
//!    listeners, control pushes), so callbacks may read, write, listen,
//!    validate, or even unbind.
//! 2. Each `bind` starts a new epoch. Nodes and control handlers remember the
//!    epoch they were created in and fail with `NotBound` once it is over.
//! 3. While the engine pushes to controls, user-change reports are ignored.
//!
//! # Failure Modes
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Malformed mapping at bind | `bind` fails, session stays unbound |
//! | Validator veto | graph untouched, controls at the path restored |
//! | Callback panic/error | recorded on the [`WriteOutcome`], logged |
//! | Runaway re-entrancy | innermost write fails with `RecursionLimit` |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tether_core::value::{from_control, same_value, to_control};
use tether_core::{
    BindError, BindResult, ChangeEvent, ChangeOrigin, ControlId, ControlKind, ControlValue, Path,
    Pattern, PatternMatch, Value, error::type_name, resolve,
};

use crate::binder::{ControlBinder, ControlBinding, CountGuard, Reach};
use crate::config::SessionConfig;
use crate::control::{ChangeHandler, Control, ControlSet};
use crate::node::Node;
use crate::outcome::{WriteOutcome, WriteStatus};
use crate::registry::{
    IntoListenerResult, IntoVerdict, ListenerRegistry, RegistrationId, ValidatorRegistry,
};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unbound,
    Bound,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub(crate) struct Shared {
    config: SessionConfig,
    controls: ControlSet,
    root: RefCell<Option<Value>>,
    epoch: Cell<u64>,
    listeners: RefCell<ListenerRegistry>,
    validators: RefCell<ValidatorRegistry>,
    binder: RefCell<ControlBinder>,
    next_registration: Cell<u64>,
    depth: Cell<usize>,
    pushing: Cell<usize>,
}

impl Shared {
    fn is_bound(&self) -> bool {
        self.root.borrow().is_some()
    }

    /// Fail unless the session is bound in `epoch`.
    pub(crate) fn ensure_epoch(&self, epoch: u64) -> BindResult<()> {
        if self.epoch.get() == epoch && self.is_bound() {
            Ok(())
        } else {
            Err(BindError::NotBound)
        }
    }

    /// Run `f` on the value at `path`, if any.
    pub(crate) fn inspect<T>(
        &self,
        epoch: u64,
        path: &Path,
        f: impl FnOnce(Option<&Value>) -> T,
    ) -> BindResult<T> {
        self.ensure_epoch(epoch)?;
        let root = self.root.borrow();
        let root = root.as_ref().ok_or(BindError::NotBound)?;
        Ok(f(resolve::get(root, path)))
    }

    /// Run one write through the pipeline.
    pub(crate) fn submit(
        &self,
        path: &Path,
        value: Value,
        origin: ChangeOrigin,
        epoch: u64,
    ) -> BindResult<WriteOutcome> {
        self.ensure_epoch(epoch)?;

        let depth = self.depth.get() + 1;
        if depth > self.config.max_dispatch_depth {
            tracing::warn!(path = %path, depth, "dispatch depth exceeded");
            return Err(BindError::RecursionLimit { depth });
        }
        let _depth = CountGuard::enter(&self.depth);
        let _span = tracing::debug_span!(
            "tether.dispatch",
            path = %path,
            origin = ?origin,
            depth
        )
        .entered();

        if path.is_root() && !(value.is_object() || value.is_array()) {
            return Err(BindError::InvalidRoot {
                found: type_name(&value),
            });
        }

        let old = {
            let root = self.root.borrow();
            let root = root.as_ref().ok_or(BindError::NotBound)?;
            resolve::check(root, path)?;
            resolve::get(root, path).cloned()
        };
        if same_value(old.as_ref(), &value) {
            tracing::trace!("unchanged");
            return Ok(WriteOutcome::new(WriteStatus::Unchanged));
        }

        let event = ChangeEvent::new(path.clone(), old, value, origin);
        let canonical = path.to_string();

        let validators = self.validators.borrow().snapshot(&canonical);
        let verdict = validators.check(&event);
        if !verdict.accepted {
            tracing::debug!(consulted = verdict.consulted, "vetoed");
            self.sync_controls(path, Reach::Exact, None);
            return Ok(WriteOutcome::new(WriteStatus::Vetoed).with_failures(verdict.failures));
        }

        // A validator may have unbound or rebound the session.
        self.ensure_epoch(epoch)?;
        {
            let mut root = self.root.borrow_mut();
            let root = root.as_mut().ok_or(BindError::NotBound)?;
            resolve::set(root, path, event.new_value().clone())?;
        }
        tracing::debug!(validators = verdict.consulted, "committed");

        let listeners = self.listeners.borrow().snapshot(&canonical);
        let failures = listeners.notify(&event);

        self.sync_controls(path, Reach::Overlapping, origin.control());
        Ok(WriteOutcome::new(WriteStatus::Committed).with_failures(failures))
    }

    /// Push current graph values to the controls a change at `path` reaches.
    fn sync_controls(&self, path: &Path, reach: Reach, skip: Option<ControlId>) {
        let pushes: Vec<(Rc<dyn Control>, ControlValue)> = {
            let root = self.root.borrow();
            let Some(root) = root.as_ref() else {
                return;
            };
            self.binder
                .borrow()
                .targets(path, reach, skip)
                .map(|binding| {
                    let value = to_control(binding.kind, resolve::get(root, &binding.path));
                    (Rc::clone(&binding.control), value)
                })
                .collect()
        };
        self.push_all(pushes);
    }

    fn push_all(&self, pushes: Vec<(Rc<dyn Control>, ControlValue)>) {
        let _pushing = CountGuard::enter(&self.pushing);
        for (control, value) in pushes {
            tracing::trace!(control = %control.describe(), ?value, "push");
            control.push(value);
        }
    }

    fn next_id(&self) -> RegistrationId {
        let id = self.next_registration.get();
        self.next_registration.set(id + 1);
        RegistrationId(id)
    }
}

/// Handler a control calls on user edit.
fn change_handler(shared: Weak<Shared>, epoch: u64, binding: &ControlBinding) -> ChangeHandler {
    let id = binding.id;
    let path = binding.path.clone();
    Rc::new(move |reported: ControlValue| {
        let shared = shared.upgrade().ok_or(BindError::NotBound)?;
        shared.ensure_epoch(epoch)?;
        if shared.pushing.get() > 0 {
            tracing::warn!(control = %id, "report during push ignored");
            return Ok(WriteOutcome::new(WriteStatus::Ignored));
        }
        let current = shared.inspect(epoch, &path, |v| v.cloned())?;
        let value = from_control(reported, current.as_ref());
        shared.submit(&path, value, ChangeOrigin::Control(id), epoch)
    })
}

fn subscribes(kind: ControlKind, config: &SessionConfig) -> bool {
    kind.is_editable() || (kind == ControlKind::Display && config.editable_display)
}

// ---------------------------------------------------------------------------
// BindingSession
// ---------------------------------------------------------------------------

/// Two-way binding between one model and a set of controls.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct BindingSession {
    shared: Rc<Shared>,
}

impl BindingSession {
    /// Session over `controls` with default configuration.
    #[must_use]
    pub fn new(controls: ControlSet) -> Self {
        Self::with_config(controls, SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(controls: ControlSet, config: SessionConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                controls,
                root: RefCell::new(None),
                epoch: Cell::new(0),
                listeners: RefCell::new(ListenerRegistry::new()),
                validators: RefCell::new(ValidatorRegistry::new()),
                binder: RefCell::new(ControlBinder::new()),
                next_registration: Cell::new(1),
                depth: Cell::new(0),
                pushing: Cell::new(0),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// The controls scanned at each `bind`.
    #[must_use]
    pub fn controls(&self) -> &ControlSet {
        &self.shared.controls
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.shared.is_bound() {
            SessionState::Bound
        } else {
            SessionState::Unbound
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.shared.is_bound()
    }

    /// Bind `model` and return a node for its root.
    ///
    /// Discovers every control declaring the mapping attribute, pushes the
    /// model's values to them and starts listening for user edits. No
    /// listener or validator runs for the initial push.
    ///
    /// # Errors
    ///
    /// - [`BindError::DoubleBind`] if already bound.
    /// - [`BindError::InvalidRoot`] for a scalar model.
    /// - [`BindError::MalformedPath`] for a bad control declaration; the
    ///   session stays unbound.
    pub fn bind(&self, model: Value) -> BindResult<Node> {
        let shared = &self.shared;
        let _span = tracing::debug_span!("tether.bind").entered();

        if shared.is_bound() {
            return Err(BindError::DoubleBind);
        }
        if !(model.is_object() || model.is_array()) {
            return Err(BindError::InvalidRoot {
                found: type_name(&model),
            });
        }

        let controls = shared.controls.snapshot();
        let bindings = ControlBinder::discover(&controls, &shared.config.mapping_attribute)?;

        let epoch = shared.epoch.get() + 1;
        shared.epoch.set(epoch);
        let pushes: Vec<(Rc<dyn Control>, ControlValue)> = bindings
            .iter()
            .map(|binding| {
                let value = to_control(binding.kind, resolve::get(&model, &binding.path));
                (Rc::clone(&binding.control), value)
            })
            .collect();
        *shared.root.borrow_mut() = Some(model);
        shared.binder.borrow_mut().install(bindings.clone());

        shared.push_all(pushes);

        let weak = Rc::downgrade(shared);
        let subscriptions: Vec<_> = bindings
            .iter()
            .filter(|binding| subscribes(binding.kind, &shared.config))
            .map(|binding| {
                let handler = change_handler(weak.clone(), epoch, binding);
                binding.control.subscribe(handler)
            })
            .collect();
        {
            let mut binder = shared.binder.borrow_mut();
            for sub in subscriptions {
                binder.hold(sub);
            }
        }

        tracing::debug!(epoch, controls = bindings.len(), "bound");
        Ok(Node::new(weak, epoch, Path::root()))
    }

    /// Release controls, listeners and validators and return the model.
    ///
    /// Nodes and handlers from this bind cycle fail with `NotBound`
    /// afterwards.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] if nothing is bound.
    pub fn unbind(&self) -> BindResult<Value> {
        let shared = &self.shared;
        let _span = tracing::debug_span!("tether.unbind").entered();

        let model = shared
            .root
            .borrow_mut()
            .take()
            .ok_or(BindError::NotBound)?;
        shared.epoch.set(shared.epoch.get() + 1);

        // Dropping subscriptions and callbacks may run user drop code.
        let binder = std::mem::take(&mut *shared.binder.borrow_mut());
        let listeners = std::mem::take(&mut *shared.listeners.borrow_mut());
        let validators = std::mem::take(&mut *shared.validators.borrow_mut());
        tracing::debug!(
            controls = binder.len(),
            listeners = listeners.len(),
            validators = validators.len(),
            "unbound"
        );
        drop((binder, listeners, validators));
        Ok(model)
    }

    /// Node for the current root.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] if nothing is bound.
    pub fn root(&self) -> BindResult<Node> {
        if !self.shared.is_bound() {
            return Err(BindError::NotBound);
        }
        Ok(Node::new(
            Rc::downgrade(&self.shared),
            self.shared.epoch.get(),
            Path::root(),
        ))
    }

    /// Register a listener for committed changes whose path matches
    /// `pattern`.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`], or pattern compilation errors.
    pub fn listen<R: IntoListenerResult + 'static>(
        &self,
        pattern: impl Into<Pattern>,
        callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> R + 'static,
    ) -> BindResult<RegistrationId> {
        if !self.shared.is_bound() {
            return Err(BindError::NotBound);
        }
        let id = self.shared.next_id();
        let id = self
            .shared
            .listeners
            .borrow_mut()
            .listen(id, pattern, callback)?;
        tracing::trace!(registration = id.0, "listener registered");
        Ok(id)
    }

    /// Register a validator consulted before changes whose path matches
    /// `pattern` are committed.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`], or pattern compilation errors.
    pub fn validate<V: IntoVerdict + 'static>(
        &self,
        pattern: impl Into<Pattern>,
        callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> V + 'static,
    ) -> BindResult<RegistrationId> {
        if !self.shared.is_bound() {
            return Err(BindError::NotBound);
        }
        let id = self.shared.next_id();
        let id = self
            .shared
            .validators
            .borrow_mut()
            .validate(id, pattern, callback)?;
        tracing::trace!(registration = id.0, "validator registered");
        Ok(id)
    }

    /// Remove a listener or validator. Returns whether anything was removed.
    pub fn remove(&self, id: RegistrationId) -> bool {
        // Dispatches in flight keep their own snapshot.
        let listener = self.shared.listeners.borrow_mut().remove(id);
        let validator = self.shared.validators.borrow_mut().remove(id);
        listener || validator
    }

    /// Number of controls bound in the current cycle.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.shared.binder.borrow().len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.shared.validators.borrow().len()
    }

    /// Copy of the bound model.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] if nothing is bound.
    pub fn snapshot(&self) -> BindResult<Value> {
        self.shared
            .root
            .borrow()
            .clone()
            .ok_or(BindError::NotBound)
    }
}

impl Default for BindingSession {
    fn default() -> Self {
        Self::new(ControlSet::new())
    }
}

impl std::fmt::Debug for BindingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSession")
            .field("state", &self.state())
            .field("epoch", &self.shared.epoch.get())
            .field("bindings", &self.binding_count())
            .field("listeners", &self.listener_count())
            .field("validators", &self.validator_count())
            .finish()
    }
}
