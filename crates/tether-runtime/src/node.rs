#![forbid(unsafe_code)]

//! Observed handles into the bound graph.
//!
//! A [`Node`] is a path plus a weak reference to its session. It holds no
//! data: every read resolves against the live graph and every write runs the
//! session's full pipeline. Child nodes are created on demand, so wrapping
//! is lazy and a node for a location that does not exist yet is valid; the
//! first write creates the missing intermediates.
//!
//! Nodes from an earlier bind cycle fail with
//! [`BindError::NotBound`](tether_core::BindError::NotBound).

use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{BindError, BindResult, ChangeOrigin, Path, Segment, Value};

use crate::outcome::WriteOutcome;
use crate::session::Shared;

/// Handle for one location in the bound graph.
#[derive(Clone)]
pub struct Node {
    shared: Weak<Shared>,
    epoch: u64,
    path: Path,
}

impl Node {
    pub(crate) fn new(shared: Weak<Shared>, epoch: u64, path: Path) -> Self {
        Self {
            shared,
            epoch,
            path,
        }
    }

    /// Absolute path of this node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the bind cycle this node belongs to is still current.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.session()
            .is_ok_and(|shared| shared.ensure_epoch(self.epoch).is_ok())
    }

    /// Node for a child. Never fails; the child need not exist.
    ///
    /// The segment is normalized like any path segment: `"a.b"` descends
    /// two levels and `"3"` is index 3.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Node {
        Node::new(self.shared.clone(), self.epoch, self.path.child(segment))
    }

    /// Node for a dotted path relative to this one.
    ///
    /// # Errors
    ///
    /// [`BindError::MalformedPath`] for an unparseable `relative`.
    pub fn at(&self, relative: &str) -> BindResult<Node> {
        Ok(self.join(&Path::parse(relative)?))
    }

    /// Node for an already-parsed path relative to this one.
    #[must_use]
    pub fn join(&self, relative: &Path) -> Node {
        Node::new(self.shared.clone(), self.epoch, self.path.join(relative))
    }

    /// Current value here, or `None` if the location does not exist.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn get(&self) -> BindResult<Option<Value>> {
        self.inspect(|value| value.cloned())
    }

    /// Current value of a direct child.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn read(&self, segment: impl Into<Segment>) -> BindResult<Option<Value>> {
        self.child(segment).get()
    }

    /// Replace the value at this node's own path.
    ///
    /// # Errors
    ///
    /// - [`BindError::NotBound`] for a detached node.
    /// - [`BindError::PathConflict`] when an intermediate is a scalar.
    /// - [`BindError::RecursionLimit`] when nested too deeply inside callbacks.
    /// - [`BindError::InvalidRoot`] when assigning a scalar to the root.
    pub fn assign(&self, value: impl Into<Value>) -> BindResult<WriteOutcome> {
        let shared = self.session()?;
        shared.submit(&self.path, value.into(), ChangeOrigin::Model, self.epoch)
    }

    /// Write a direct child.
    ///
    /// # Errors
    ///
    /// As for [`Node::assign`].
    pub fn set(
        &self,
        segment: impl Into<Segment>,
        value: impl Into<Value>,
    ) -> BindResult<WriteOutcome> {
        self.child(segment).assign(value)
    }

    /// Write a dotted path relative to this node.
    ///
    /// # Errors
    ///
    /// [`BindError::MalformedPath`], or as for [`Node::assign`].
    pub fn set_path(&self, relative: &str, value: impl Into<Value>) -> BindResult<WriteOutcome> {
        self.at(relative)?.assign(value)
    }

    /// Whether the value here is an object.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn is_object(&self) -> BindResult<bool> {
        self.inspect(|value| value.is_some_and(Value::is_object))
    }

    /// Whether the value here is an array.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn is_array(&self) -> BindResult<bool> {
        self.inspect(|value| value.is_some_and(Value::is_array))
    }

    /// Element or entry count of a container; `None` for anything else.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn len(&self) -> BindResult<Option<usize>> {
        self.inspect(|value| match value {
            Some(Value::Array(items)) => Some(items.len()),
            Some(Value::Object(map)) => Some(map.len()),
            _ => None,
        })
    }

    /// Keys of an object (in key order) or indices of an array.
    ///
    /// Object keys are always fields, so `"007"` keeps its spelling.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn keys(&self) -> BindResult<Vec<Segment>> {
        self.inspect(|value| match value {
            Some(Value::Object(map)) => map
                .keys()
                .map(|key| Segment::Field(key.clone()))
                .collect(),
            Some(Value::Array(items)) => (0..items.len()).map(Segment::Index).collect(),
            _ => Vec::new(),
        })
    }

    /// Child nodes for every key or index, see [`Node::keys`].
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] for a detached node.
    pub fn children(&self) -> BindResult<Vec<Node>> {
        Ok(self
            .keys()?
            .into_iter()
            .map(|segment| self.child(segment))
            .collect())
    }

    fn session(&self) -> BindResult<Rc<Shared>> {
        self.shared.upgrade().ok_or(BindError::NotBound)
    }

    fn inspect<T>(&self, f: impl FnOnce(Option<&Value>) -> T) -> BindResult<T> {
        self.session()?.inspect(self.epoch, &self.path, f)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path.to_string())
            .field("epoch", &self.epoch)
            .field("attached", &self.is_attached())
            .finish()
    }
}
