//! Types relating to navigation.

use crate::helpers::{Params, Query};

/// Where a [`Location`] points to.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationTarget {
    /// A complete path, possibly with a query and hash. It is normalized but not looked up.
    Path(String),
    /// A pathname. Any query comes from [`Location::query`].
    Pathname(String),
    /// A registered route, identified by its name.
    Named {
        /// The name of the target route.
        name: String,
        /// Values for the `:param` segments of the route's pattern.
        params: Params,
    },
}

/// A target for the router to navigate to.
///
/// Plain strings convert into path locations:
/// ```rust
/// # use stack_router::prelude::*;
/// let location: Location = "/user/1?tab=posts".into();
/// assert_eq!(location, Location::path("/user/1?tab=posts"));
/// ```
///
/// Named locations are built up with their parameters:
/// ```rust
/// # use stack_router::prelude::*;
/// let location = Location::named("user")
///     .param("id", "1")
///     .query("tab", "posts")
///     .transition("slide");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    /// Where to navigate to.
    pub target: LocationTarget,
    /// Query values appended to the resolved path.
    pub query: Query,
    /// Caller state stored with the history record.
    pub state: Option<serde_json::Value>,
    /// A transition hint passed on to the view layer.
    pub transition: Option<String>,
}

impl Location {
    fn new(target: LocationTarget) -> Self {
        Self {
            target,
            query: Query::new(),
            state: None,
            transition: None,
        }
    }

    /// Navigate to a complete path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::new(LocationTarget::Path(path.into()))
    }

    /// Navigate to a pathname.
    pub fn pathname(pathname: impl Into<String>) -> Self {
        Self::new(LocationTarget::Pathname(pathname.into()))
    }

    /// Navigate to the route registered as `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(LocationTarget::Named {
            name: name.into(),
            params: Params::new(),
        })
    }

    /// Set a route parameter. This only has an effect on named locations.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let LocationTarget::Named { params, .. } = &mut self.target {
            params.insert(name.into(), value.into());
        }
        self
    }

    /// Add a query value.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Attach state to the history record.
    pub fn state(self, state: serde_json::Value) -> Self {
        Self {
            state: Some(state),
            ..self
        }
    }

    /// Hint which transition the view layer should play.
    pub fn transition(self, transition: impl Into<String>) -> Self {
        Self {
            transition: Some(transition.into()),
            ..self
        }
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Self::path(path)
    }
}

/// How far to go back, and how to show it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopOptions {
    /// The number of routes to remove from the top of the stack. Clamped to the routes that can
    /// be removed.
    pub n: usize,
    /// A transition hint passed on to the view layer.
    pub transition: Option<String>,
}

impl Default for PopOptions {
    fn default() -> Self {
        Self {
            n: 1,
            transition: None,
        }
    }
}

impl PopOptions {
    /// Pop `n` routes.
    pub fn n(n: usize) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    /// Hint which transition the view layer should play.
    pub fn transition(self, transition: impl Into<String>) -> Self {
        Self {
            transition: Some(transition.into()),
            ..self
        }
    }
}
