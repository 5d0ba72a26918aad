//! History integration for `stack-router`.
//!
//! The router never talks to a browser or any other history store directly. It relies on a
//! [`RouterDriver`], which persists navigation records and reports every committed change back
//! as a [`DriverEvent`]. To integrate the router with any kind of history, implement
//! [`RouterDriver`]. This crate ships a [`MemoryDriver`] that keeps everything in memory.
//!
//! Records are identified by [`RouteId`]s handed out by an [`IdGenerator`]. Ids are monotonic,
//! so comparing two of them tells whether an external jump went forward or backward.
#![deny(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

mod emitter;
pub use emitter::*;

mod id;
pub use id::*;

mod memory;
pub use memory::*;

/// The kind of navigation a driver committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// A new record was appended.
    Push,
    /// The history moved back to an older record.
    Pop,
    /// The current record was swapped for a new one.
    Replace,
    /// No navigation happened; the driver is resynchronising the current record.
    None,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::Push => "push",
            ActionType::Pop => "pop",
            ActionType::Replace => "replace",
            ActionType::None => "none",
        };
        f.write_str(name)
    }
}

/// A single entry of a driver's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// The id the driver assigned to this entry.
    pub id: RouteId,
    /// The path, including query and hash, as the router handed it over.
    pub path: String,
    /// Caller state attached to the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

impl RouteRecord {
    /// Create a record without state.
    pub fn new(id: RouteId, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            state: None,
        }
    }
}

/// Data the router sends through the driver and gets back with the matching change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverPayload {
    /// The transition hint of the navigation.
    pub transition: Option<String>,
}

impl DriverPayload {
    /// A payload carrying `transition`.
    pub fn transition(transition: Option<String>) -> Self {
        Self { transition }
    }
}

/// A navigation a driver has committed.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverChange {
    /// What kind of navigation happened.
    pub action: ActionType,
    /// The record that is now current.
    pub record: RouteRecord,
    /// The payload of the navigation call that caused this change, if any.
    pub payload: Option<DriverPayload>,
}

/// Events emitted by a [`RouterDriver`].
#[derive(Clone, Debug, PartialEq)]
pub enum DriverEvent {
    /// The current record changed.
    Change(DriverChange),
}

/// The kinds of [`DriverEvent`]s, used to subscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverEventKind {
    /// See [`DriverEvent::Change`].
    Change,
}

impl Event for DriverEvent {
    type Kind = DriverEventKind;

    fn kind(&self) -> DriverEventKind {
        match self {
            DriverEvent::Change(_) => DriverEventKind::Change,
        }
    }
}

/// An integration with some kind of navigation history.
///
/// A driver owns the history records. The router only asks it to navigate and then waits for a
/// [`DriverEvent::Change`]; it never assumes a call took effect until that event arrives. The
/// event may be emitted synchronously from within the call or on a later turn of the event loop.
///
/// A driver that cannot complete a navigation must not emit a change for it.
pub trait RouterDriver {
    /// Subscribe to driver events of `kind`.
    fn on(&self, kind: DriverEventKind, listener: Box<dyn Fn(&DriverEvent)>) -> ListenerId;

    /// Remove a listener. Returns `false` if it was not registered.
    fn off(&self, id: ListenerId) -> bool;

    /// Append a new record for `path`.
    ///
    /// If an id was reserved with [`RouterDriver::generate_next_id`], the new record must use it.
    fn push(&self, path: String, state: Option<serde_json::Value>, payload: DriverPayload);

    /// Go back `n` records. Values below `1` are treated as `1`.
    fn pop(&self, n: usize, payload: DriverPayload);

    /// Swap the current record for a new one for `path`.
    ///
    /// If an id was reserved with [`RouterDriver::generate_next_id`], the new record must use it.
    fn replace(&self, path: String, state: Option<serde_json::Value>, payload: DriverPayload);

    /// Rewrite the visible path of the current record without creating a new one.
    fn change_path(&self, path: &str);

    /// Reserve the id the next pushed or replaced record will get.
    fn generate_next_id(&self) -> RouteId;

    /// Release a reservation made with [`RouterDriver::generate_next_id`].
    fn deprecate_next_id(&self);

    /// The record that is current right now, if the history has one.
    fn current_route_record(&self) -> Option<RouteRecord>;
}
