use std::{fmt, rc::Rc};

use crate::{
    helpers::{Params, Query},
    navigation::Location,
};

/// What a redirect function gets to see about the route it redirects away from.
#[derive(Clone, Copy, Debug)]
pub struct RedirectContext<'a> {
    /// The matched pathname, normalized and without a leading slash.
    pub pathname: &'a str,
    /// The query of the matched path.
    pub query: &'a Query,
    /// The decoded parameters of the matched path.
    pub params: &'a Params,
}

/// Where a route sends navigations that reach it.
#[derive(Clone)]
pub enum Redirect {
    /// Always the same location.
    To(Location),
    /// A location computed from the route that was reached.
    With(Rc<dyn Fn(&RedirectContext<'_>) -> Location>),
}

impl Redirect {
    pub(crate) fn resolve(&self, context: &RedirectContext<'_>) -> Location {
        match self {
            Redirect::To(location) => location.clone(),
            Redirect::With(redirect) => redirect(context),
        }
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::To(location) => f.debug_tuple("To").field(location).finish(),
            Self::With(_) => f.debug_tuple("With").finish_non_exhaustive(),
        }
    }
}

/// A route as the application registers it.
///
/// `C` is whatever the view layer renders for the route. The router never looks at it.
///
/// ```rust
/// # use stack_router::prelude::*;
/// let user = RouteConfig::new("/user/:id", "UserPage")
///     .name("user")
///     .meta(serde_json::json!({ "auth": true }))
///     .transition("slide");
///
/// let legacy = RouteConfig::new("/profile/:id", "unused").redirect_with(|ctx| {
///     Location::named("user").param("id", ctx.params["id"].as_str())
/// });
/// ```
#[derive(Clone, Debug)]
pub struct RouteConfig<C> {
    /// The pattern, made of literal, `:param` and `*` segments.
    pub path: String,
    /// A name to navigate to the route by.
    pub name: Option<String>,
    /// The view-layer payload.
    pub component: C,
    /// Free-form data for the application.
    pub meta: Option<serde_json::Value>,
    /// Where to send navigations that reach this route.
    pub redirect: Option<Redirect>,
    /// The default transition hint for this route.
    pub transition: Option<String>,
}

impl<C> RouteConfig<C> {
    /// A route rendering `component` at `path`.
    pub fn new(path: impl Into<String>, component: C) -> Self {
        Self {
            path: path.into(),
            name: None,
            component,
            meta: None,
            redirect: None,
            transition: None,
        }
    }

    /// Register the route under `name`.
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Attach application data.
    pub fn meta(self, meta: serde_json::Value) -> Self {
        Self {
            meta: Some(meta),
            ..self
        }
    }

    /// Redirect every navigation reaching this route to `location`.
    pub fn redirect(self, location: impl Into<Location>) -> Self {
        Self {
            redirect: Some(Redirect::To(location.into())),
            ..self
        }
    }

    /// Redirect every navigation reaching this route to a location computed by `redirect`.
    pub fn redirect_with(self, redirect: impl Fn(&RedirectContext<'_>) -> Location + 'static) -> Self {
        Self {
            redirect: Some(Redirect::With(Rc::new(redirect))),
            ..self
        }
    }

    /// Set the default transition hint.
    pub fn transition(self, transition: impl Into<String>) -> Self {
        Self {
            transition: Some(transition.into()),
            ..self
        }
    }
}

/// A registered route that matched a path.
#[derive(Debug)]
pub struct MatchedRoute<C> {
    /// The route that matched.
    pub config: Rc<RouteConfig<C>>,
    /// The decoded values of the pattern's parameters.
    pub params: Params,
    /// The decoded query of the path.
    pub query: Query,
    /// The normalized pathname, without a leading slash.
    pub pathname: String,
    /// The hash of the path, without `#`.
    pub hash: String,
}

impl<C> Clone for MatchedRoute<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            params: self.params.clone(),
            query: self.query.clone(),
            pathname: self.pathname.clone(),
            hash: self.hash.clone(),
        }
    }
}

impl<C> MatchedRoute<C> {
    pub(crate) fn redirect_context(&self) -> RedirectContext<'_> {
        RedirectContext {
            pathname: &self.pathname,
            query: &self.query,
            params: &self.params,
        }
    }
}
