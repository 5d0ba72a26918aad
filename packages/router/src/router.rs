use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    fmt,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use stack_router_history::{
    ActionType, DriverChange, DriverEvent, DriverEventKind, DriverPayload, Event, EventEmitter,
    ListenerId, RouteId, RouteRecord, RouterDriver,
};

use crate::{
    error::{RouteError, RouterError},
    helpers::{normalize_path, to_search_string, with_query, Params, Query},
    navigation::{Location, LocationTarget, PopOptions},
    pending::{Dispatch, PendingNavigation},
    route_definition::{MatchedRoute, RouteConfig},
    route_manager::RouteManager,
    router_cfg::RouterConfig,
};

/// A history record resolved against the registered routes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// The id of the history record.
    pub id: RouteId,
    /// The name of the matched route, or an empty string if it has none.
    pub name: String,
    /// The canonical path, e.g. `/user/1?tab=posts#top`.
    pub path: String,
    /// The normalized pathname, without a leading slash.
    pub pathname: String,
    /// The decoded query.
    pub query: Query,
    /// The decoded parameters.
    pub params: Params,
    /// The hash, without `#`.
    pub hash: String,
    /// Caller state stored with the history record.
    pub state: Option<serde_json::Value>,
    /// Whether the route was reached through at least one redirect.
    pub redirected: bool,
}

/// A route on the navigation stack, together with its configuration and position.
#[derive(Debug)]
pub struct RouteInfo<C> {
    /// The resolved route.
    pub route: Rc<Route>,
    /// The configuration the route matched.
    pub config: Rc<RouteConfig<C>>,
    /// The position on the stack, counted from the bottom. For a pending navigation, this is the
    /// position the route will take.
    pub index: usize,
}

impl<C> Clone for RouteInfo<C> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.clone(),
            config: self.config.clone(),
            index: self.index,
        }
    }
}

/// Events the router emits for the view layer.
#[derive(Debug)]
pub enum RouterEvent<C> {
    /// A confirmable navigation was prepared and waits for a decision.
    WillChange {
        /// The prepared action.
        action: ActionType,
        /// The route that will be shown.
        route_info: RouteInfo<C>,
        /// The transition hint of the navigation.
        transition: Option<String>,
    },
    /// The stack changed and `route_info` is the top.
    Change {
        /// What happened to the stack.
        action: ActionType,
        /// The new top of the stack.
        route_info: RouteInfo<C>,
        /// The transition hint of the navigation.
        transition: Option<String>,
    },
    /// A prepared navigation was abandoned.
    CancelChange {
        /// The route that would have been shown.
        route_info: RouteInfo<C>,
    },
    /// Routes left the stack. Always follows the [`RouterEvent::Change`] that removed them.
    Destroy {
        /// The ids of the removed routes.
        ids: Vec<RouteId>,
    },
}

impl<C> Clone for RouterEvent<C> {
    fn clone(&self) -> Self {
        match self {
            Self::WillChange {
                action,
                route_info,
                transition,
            } => Self::WillChange {
                action: *action,
                route_info: route_info.clone(),
                transition: transition.clone(),
            },
            Self::Change {
                action,
                route_info,
                transition,
            } => Self::Change {
                action: *action,
                route_info: route_info.clone(),
                transition: transition.clone(),
            },
            Self::CancelChange { route_info } => Self::CancelChange {
                route_info: route_info.clone(),
            },
            Self::Destroy { ids } => Self::Destroy { ids: ids.clone() },
        }
    }
}

impl<C> RouterEvent<C> {
    /// The route the event is about, if it is about a single one.
    pub fn route_info(&self) -> Option<&RouteInfo<C>> {
        match self {
            Self::WillChange { route_info, .. }
            | Self::Change { route_info, .. }
            | Self::CancelChange { route_info } => Some(route_info),
            Self::Destroy { .. } => None,
        }
    }
}

/// The kinds of [`RouterEvent`]s, used to subscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouterEventKind {
    /// See [`RouterEvent::WillChange`].
    WillChange,
    /// See [`RouterEvent::Change`].
    Change,
    /// See [`RouterEvent::CancelChange`].
    CancelChange,
    /// See [`RouterEvent::Destroy`].
    Destroy,
}

impl<C> Event for RouterEvent<C> {
    type Kind = RouterEventKind;

    fn kind(&self) -> RouterEventKind {
        match self {
            Self::WillChange { .. } => RouterEventKind::WillChange,
            Self::Change { .. } => RouterEventKind::Change,
            Self::CancelChange { .. } => RouterEventKind::CancelChange,
            Self::Destroy { .. } => RouterEventKind::Destroy,
        }
    }
}

struct StackEntry<C> {
    route: Rc<Route>,
    config: Rc<RouteConfig<C>>,
}

impl<C> Clone for StackEntry<C> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C> StackEntry<C> {
    fn info(&self, index: usize) -> RouteInfo<C> {
        RouteInfo {
            route: self.route.clone(),
            config: self.config.clone(),
            index,
        }
    }
}

pub(crate) struct RouterInner<C> {
    driver: Rc<dyn RouterDriver>,
    routes: RefCell<RouteManager<C>>,
    stack: RefCell<Vec<StackEntry<C>>>,
    events: EventEmitter<RouterEvent<C>>,
    config: RouterConfig,
    pending: Cell<Option<ActionType>>,
    driver_listener: Cell<Option<ListenerId>>,
}

impl<C> RouterInner<C> {
    fn resolve_location(&self, location: &Location) -> Result<String, RouteError> {
        let path = match &location.target {
            LocationTarget::Path(path) => normalize_path(path),
            LocationTarget::Pathname(pathname) => normalize_path(pathname),
            LocationTarget::Named { name, params } => {
                self.routes.borrow().pathname_by_route_name(name, params)?
            }
        };
        Ok(with_query(&path, &location.query))
    }

    /// Match `path` and follow the redirects of the routes it reaches.
    ///
    /// Returns the final path, its match and whether any redirect was followed.
    fn match_route(&self, path: &str) -> Option<(String, MatchedRoute<C>, bool)> {
        let mut path = normalize_path(path);
        let mut matched = self.routes.borrow().match_path(&path)?;
        let mut visited = HashSet::from([path.clone()]);
        let mut redirected = false;

        while let Some(redirect) = matched.config.redirect.clone() {
            if visited.len() > self.config.max_redirects {
                tracing::warn!(
                    "stopped following redirects at {path} after {} hops",
                    self.config.max_redirects
                );
                break;
            }

            let location = redirect.resolve(&matched.redirect_context());
            let target = match self.resolve_location(&location) {
                Ok(target) => target,
                Err(err) => {
                    tracing::warn!("cannot follow the redirect of {path}: {err}");
                    return None;
                }
            };
            if !visited.insert(target.clone()) {
                tracing::warn!("redirect cycle detected at {path}, staying there");
                break;
            }

            matched = self.routes.borrow().match_path(&target)?;
            path = target;
            redirected = true;
        }

        Some((path, matched, redirected))
    }

    fn resolve_record(&self, record: &RouteRecord) -> Option<StackEntry<C>> {
        let (path, matched, redirected) = self.match_route(&record.path)?;
        let path = if redirected {
            canonical_path(&matched)
        } else {
            path
        };

        let route = Route {
            id: record.id.clone(),
            name: matched.config.name.clone().unwrap_or_default(),
            path,
            pathname: matched.pathname,
            query: matched.query,
            params: matched.params,
            hash: matched.hash,
            state: record.state.clone(),
            redirected,
        };
        Some(StackEntry {
            route: Rc::new(route),
            config: matched.config,
        })
    }

    fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    fn route_info(&self, index: usize) -> Option<RouteInfo<C>> {
        self.stack.borrow().get(index).map(|entry| entry.info(index))
    }

    fn ensure_idle(&self) -> Result<(), RouterError> {
        match self.pending.get() {
            Some(action) => {
                tracing::warn!("rejected navigation while a {action} navigation is pending");
                Err(RouterError::NavigationPending { action })
            }
            None => Ok(()),
        }
    }

    fn handle_route_change(&self, change: &DriverChange) {
        let Some(entry) = self.resolve_record(&change.record) else {
            tracing::debug!(
                "no route matches {}, ignoring {} change",
                change.record.path,
                change.action
            );
            return;
        };

        let on_top = self
            .stack
            .borrow()
            .last()
            .is_some_and(|top| top.route.id == entry.route.id);
        if on_top {
            tracing::debug!("route {} is already on top", entry.route.id);
            return;
        }

        if entry.route.redirected && self.config.rewrite_redirected_path {
            tracing::trace!("rewriting redirected path to {}", entry.route.path);
            self.driver.change_path(&entry.route.path);
        }

        let transition = change
            .payload
            .as_ref()
            .and_then(|payload| payload.transition.clone());
        self.update_route_stack(change.action, entry, transition);
    }

    fn update_route_stack(
        &self,
        action: ActionType,
        entry: StackEntry<C>,
        transition: Option<String>,
    ) {
        let (action, route_info, destroyed) = {
            let mut stack = self.stack.borrow_mut();
            let existing = stack
                .iter()
                .position(|current| current.route.id == entry.route.id);
            // a record that is already on the stack can only be reached by going back
            let action = match existing {
                Some(_) => ActionType::Pop,
                None => action,
            };

            let destroyed: Vec<RouteId> = match (action, existing) {
                (ActionType::Push, _) => {
                    stack.push(entry);
                    Vec::new()
                }
                (ActionType::Pop, Some(index)) => stack
                    .drain(index + 1..)
                    .map(|removed| removed.route.id.clone())
                    .collect(),
                (ActionType::Pop, None) => {
                    tracing::debug!(
                        "route {} is not on the stack, starting a new stack",
                        entry.route.id
                    );
                    let discarded: Vec<RouteId> = stack
                        .drain(..)
                        .map(|removed| removed.route.id.clone())
                        .collect();
                    stack.push(entry);
                    discarded
                }
                (ActionType::Replace | ActionType::None, _) => {
                    let replaced = stack.pop();
                    stack.push(entry);
                    replaced
                        .map(|removed| vec![removed.route.id.clone()])
                        .unwrap_or_default()
                }
            };

            let index = stack.len() - 1;
            let route_info = stack[index].info(index);
            tracing::debug!(
                "{action}: {} is on top of {} routes",
                route_info.route.path,
                stack.len()
            );
            (action, route_info, destroyed)
        };

        self.events.emit(&RouterEvent::Change {
            action,
            route_info,
            transition,
        });
        if !destroyed.is_empty() {
            self.events.emit(&RouterEvent::Destroy { ids: destroyed });
        }
    }

    /// How many routes to pop to get back to `id`, if it is below the top.
    fn pops_to(&self, id: &RouteId) -> Option<usize> {
        let stack = self.stack.borrow();
        let index = stack.iter().position(|entry| &entry.route.id == id)?;
        (index + 1 < stack.len()).then(|| stack.len() - 1 - index)
    }

    /// Hand `dispatch` to the driver. Returns `false` if there was nothing left to do.
    pub(crate) fn dispatch(&self, dispatch: Dispatch) -> bool {
        match dispatch {
            Dispatch::Push {
                path,
                state,
                transition,
            } => {
                tracing::trace!("driver push {path}");
                self.driver
                    .push(path, state, DriverPayload::transition(transition));
            }
            Dispatch::Replace {
                path,
                state,
                transition,
            } => {
                tracing::trace!("driver replace {path}");
                self.driver
                    .replace(path, state, DriverPayload::transition(transition));
            }
            Dispatch::Pop { n, transition } => {
                tracing::trace!("driver pop {n}");
                self.driver.pop(n, DriverPayload::transition(transition));
            }
            Dispatch::PopTo { id, transition } => {
                let Some(n) = self.pops_to(&id) else {
                    tracing::debug!("route {id} is no longer below the top");
                    return false;
                };
                tracing::trace!("driver pop {n} back to {id}");
                self.driver.pop(n, DriverPayload::transition(transition));
            }
        }
        true
    }

    pub(crate) fn commit_pending(
        &self,
        action: ActionType,
        route_info: RouteInfo<C>,
        dispatch: Dispatch,
    ) {
        self.pending.set(None);
        if !self.dispatch(dispatch) {
            self.cancel_pending(action, route_info);
        }
    }

    pub(crate) fn cancel_pending(&self, action: ActionType, route_info: RouteInfo<C>) {
        self.pending.set(None);
        if matches!(action, ActionType::Push | ActionType::Replace) {
            tracing::trace!("releasing reserved id {}", route_info.route.id);
            self.driver.deprecate_next_id();
        }
        self.events.emit(&RouterEvent::CancelChange { route_info });
    }
}

impl<C> Drop for RouterInner<C> {
    fn drop(&mut self) {
        if let Some(listener) = self.driver_listener.take() {
            self.driver.off(listener);
        }
    }
}

fn canonical_path<C>(matched: &MatchedRoute<C>) -> String {
    let mut path = format!("/{}{}", matched.pathname, to_search_string(&matched.query));
    if !matched.hash.is_empty() {
        path.push('#');
        path.push_str(&matched.hash);
    }
    path
}

/// A navigation stack on top of a [`RouterDriver`].
///
/// Navigation calls only ask the driver to navigate. The stack changes once the driver reports the
/// committed change, which also covers navigations the driver starts on its own, like the back
/// button of a browser.
///
/// ```rust
/// # use std::rc::Rc;
/// # use stack_router::prelude::*;
/// let driver = Rc::new(MemoryDriver::new());
/// let router = Router::new(
///     driver.clone(),
///     [
///         RouteConfig::new("/", "home"),
///         RouteConfig::new("/user/:id", "user").name("user"),
///     ],
/// );
///
/// router.push(Location::named("user").param("id", "1")).unwrap();
/// assert_eq!(router.depth(), 2);
/// assert_eq!(router.current_route_info().unwrap().route.path, "/user/1");
///
/// router.pop(PopOptions::default());
/// assert_eq!(router.current_route_info().unwrap().config.component, "home");
/// ```
pub struct Router<C> {
    pub(crate) inner: Rc<RouterInner<C>>,
}

impl<C> Clone for Router<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: 'static> Router<C> {
    /// Create a router on top of `driver`, using the default [`RouterConfig`].
    ///
    /// The driver's current record becomes the bottom of the stack if it matches a route.
    pub fn new(
        driver: Rc<dyn RouterDriver>,
        routes: impl IntoIterator<Item = RouteConfig<C>>,
    ) -> Self {
        Self::with_config(driver, routes, RouterConfig::default())
    }

    /// Create a router on top of `driver` with a custom configuration.
    pub fn with_config(
        driver: Rc<dyn RouterDriver>,
        routes: impl IntoIterator<Item = RouteConfig<C>>,
        config: RouterConfig,
    ) -> Self {
        Self::with_route_manager(driver, RouteManager::with_routes(routes), config)
    }

    /// Create a router on top of `driver` that matches against an existing [`RouteManager`].
    pub fn with_route_manager(
        driver: Rc<dyn RouterDriver>,
        routes: RouteManager<C>,
        config: RouterConfig,
    ) -> Self {
        let inner = Rc::new(RouterInner {
            driver,
            routes: RefCell::new(routes),
            stack: RefCell::new(Vec::new()),
            events: EventEmitter::new(),
            config,
            pending: Cell::new(None),
            driver_listener: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let listener = inner.driver.on(
            DriverEventKind::Change,
            Box::new(move |event: &DriverEvent| {
                let DriverEvent::Change(change) = event;
                if let Some(inner) = weak.upgrade() {
                    inner.handle_route_change(change);
                }
            }),
        );
        inner.driver_listener.set(Some(listener));

        match inner.driver.current_route_record() {
            Some(record) => inner.handle_route_change(&DriverChange {
                action: ActionType::None,
                record,
                payload: None,
            }),
            None => tracing::debug!("driver has no current record, starting with an empty stack"),
        }

        Self { inner }
    }
}

impl<C> Router<C> {
    /// Navigate to `location` on top of the current route.
    pub fn push(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        self.navigate(ActionType::Push, location.into())
    }

    /// Navigate to `location` in place of the current route.
    pub fn replace(&self, location: impl Into<Location>) -> Result<(), RouterError> {
        self.navigate(ActionType::Replace, location.into())
    }

    fn navigate(&self, action: ActionType, location: Location) -> Result<(), RouterError> {
        self.inner.ensure_idle()?;
        let path = self.inner.resolve_location(&location)?;
        let dispatch = match action {
            ActionType::Replace => Dispatch::Replace {
                path,
                state: location.state,
                transition: location.transition,
            },
            _ => Dispatch::Push {
                path,
                state: location.state,
                transition: location.transition,
            },
        };
        self.inner.dispatch(dispatch);
        Ok(())
    }

    /// Go back `options.n` routes. Does nothing if there is no route to go back to.
    pub fn pop(&self, options: PopOptions) {
        let Some(n) = self.pop_count(options.n) else {
            tracing::debug!("nothing to pop");
            return;
        };
        self.inner.dispatch(Dispatch::Pop {
            n,
            transition: options.transition,
        });
    }

    /// Go back to the bottom of the stack.
    pub fn pop_to_bottom(&self, transition: Option<String>) {
        self.pop(PopOptions {
            n: self.depth().saturating_sub(1),
            transition,
        });
    }

    fn pop_count(&self, n: usize) -> Option<usize> {
        let depth = self.depth();
        (depth > 1).then(|| n.clamp(1, depth - 1))
    }

    /// Prepare a push that only happens once the returned handle is committed.
    ///
    /// [`RouterEvent::WillChange`] is emitted before this returns, so the view layer can start
    /// rendering the next route. If `location` does not match any route, the returned handle is
    /// inert and nothing is emitted.
    pub fn prepush(
        &self,
        location: impl Into<Location>,
    ) -> Result<PendingNavigation<C>, RouterError> {
        self.prenavigate(ActionType::Push, location.into())
    }

    /// Prepare a replace that only happens once the returned handle is committed.
    pub fn prereplace(
        &self,
        location: impl Into<Location>,
    ) -> Result<PendingNavigation<C>, RouterError> {
        self.prenavigate(ActionType::Replace, location.into())
    }

    fn prenavigate(
        &self,
        action: ActionType,
        location: Location,
    ) -> Result<PendingNavigation<C>, RouterError> {
        self.inner.ensure_idle()?;
        let path = self.inner.resolve_location(&location)?;

        let id = self.inner.driver.generate_next_id();
        tracing::trace!("reserved id {id} for {action} to {path}");
        let record = RouteRecord {
            id,
            path: path.clone(),
            state: location.state.clone(),
        };
        let Some(entry) = self.inner.resolve_record(&record) else {
            tracing::debug!("no route matches {path}, releasing the reserved id");
            self.inner.driver.deprecate_next_id();
            return Ok(PendingNavigation::inert());
        };

        let depth = self.depth();
        let index = match action {
            ActionType::Push => depth,
            _ => depth.saturating_sub(1),
        };
        let dispatch = match action {
            ActionType::Replace => Dispatch::Replace {
                path,
                state: location.state,
                transition: location.transition.clone(),
            },
            _ => Dispatch::Push {
                path,
                state: location.state,
                transition: location.transition.clone(),
            },
        };
        Ok(self.announce(action, entry.info(index), location.transition, dispatch))
    }

    /// Prepare a pop that only happens once the returned handle is committed.
    ///
    /// If there is no route to go back to, the returned handle is inert and nothing is emitted.
    pub fn prepop(&self, options: PopOptions) -> Result<PendingNavigation<C>, RouterError> {
        self.inner.ensure_idle()?;
        let Some(n) = self.pop_count(options.n) else {
            tracing::debug!("nothing to pop");
            return Ok(PendingNavigation::inert());
        };
        let Some(route_info) = self.inner.route_info(self.depth() - 1 - n) else {
            return Ok(PendingNavigation::inert());
        };

        let dispatch = Dispatch::PopTo {
            id: route_info.route.id.clone(),
            transition: options.transition.clone(),
        };
        Ok(self.announce(ActionType::Pop, route_info, options.transition, dispatch))
    }

    fn announce(
        &self,
        action: ActionType,
        route_info: RouteInfo<C>,
        transition: Option<String>,
        dispatch: Dispatch,
    ) -> PendingNavigation<C> {
        self.inner.pending.set(Some(action));
        self.inner.events.emit(&RouterEvent::WillChange {
            action,
            route_info: route_info.clone(),
            transition,
        });
        PendingNavigation::new(self.clone(), action, route_info, dispatch)
    }

    /// Register more routes. Routes already on the stack are not resolved again.
    pub fn register_routes(&self, routes: impl IntoIterator<Item = RouteConfig<C>>) {
        let mut manager = self.inner.routes.borrow_mut();
        for route in routes {
            manager.register(route);
        }
    }

    /// The route on top of the stack.
    pub fn current_route_info(&self) -> Option<RouteInfo<C>> {
        let depth = self.depth();
        depth
            .checked_sub(1)
            .and_then(|index| self.inner.route_info(index))
    }

    /// Every route on the stack, from the bottom up.
    pub fn stack(&self) -> Vec<RouteInfo<C>> {
        self.inner
            .stack
            .borrow()
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.info(index))
            .collect()
    }

    /// The number of routes on the stack.
    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    /// The action of the confirmable navigation that is waiting for a decision.
    pub fn pending_action(&self) -> Option<ActionType> {
        self.inner.pending.get()
    }

    /// The options this router was created with.
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// The driver this router navigates with.
    pub fn driver(&self) -> &Rc<dyn RouterDriver> {
        &self.inner.driver
    }

    /// Call `listener` for every router event of `kind`.
    pub fn on(
        &self,
        kind: RouterEventKind,
        listener: impl Fn(&RouterEvent<C>) + 'static,
    ) -> ListenerId {
        self.inner.events.on(kind, listener)
    }

    /// Remove a listener added with [`Router::on`].
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }
}

impl<C> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.inner.stack.borrow();
        f.debug_struct("Router")
            .field(
                "stack",
                &stack
                    .iter()
                    .map(|entry| (&entry.route.id, &entry.route.path))
                    .collect::<Vec<_>>(),
            )
            .field("pending", &self.inner.pending.get())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
