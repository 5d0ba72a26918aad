use std::fmt;

use stack_router_history::{ActionType, RouteId};

use crate::router::{RouteInfo, Router};

/// The driver call a confirmable navigation makes once it is committed.
#[derive(Debug)]
pub(crate) enum Dispatch {
    Push {
        path: String,
        state: Option<serde_json::Value>,
        transition: Option<String>,
    },
    Replace {
        path: String,
        state: Option<serde_json::Value>,
        transition: Option<String>,
    },
    Pop {
        n: usize,
        transition: Option<String>,
    },
    /// Pop back to an announced route, however far below the top it is by then.
    PopTo {
        id: RouteId,
        transition: Option<String>,
    },
}

struct Pending<C> {
    router: Router<C>,
    action: ActionType,
    route_info: RouteInfo<C>,
    dispatch: Dispatch,
}

/// A navigation that was announced with [`RouterEvent::WillChange`](crate::RouterEvent)
/// but has not happened yet.
///
/// The handle has to be resolved exactly once: [`PendingNavigation::commit`] performs the
/// navigation, [`PendingNavigation::cancel`] abandons it. Dropping an unresolved handle cancels
/// it. While a handle is unresolved, its router refuses to start other navigations except pops.
///
/// An inert handle is returned when there was nothing to navigate to. Resolving it does nothing.
#[must_use = "dropping a pending navigation cancels it"]
pub struct PendingNavigation<C> {
    pending: Option<Pending<C>>,
}

impl<C> PendingNavigation<C> {
    pub(crate) fn new(
        router: Router<C>,
        action: ActionType,
        route_info: RouteInfo<C>,
        dispatch: Dispatch,
    ) -> Self {
        Self {
            pending: Some(Pending {
                router,
                action,
                route_info,
                dispatch,
            }),
        }
    }

    pub(crate) fn inert() -> Self {
        Self { pending: None }
    }

    /// The route the navigation leads to.
    pub fn route_info(&self) -> Option<&RouteInfo<C>> {
        self.pending.as_ref().map(|pending| &pending.route_info)
    }

    /// The action the navigation will perform.
    pub fn action(&self) -> Option<ActionType> {
        self.pending.as_ref().map(|pending| pending.action)
    }

    /// Whether resolving this handle does nothing.
    pub fn is_inert(&self) -> bool {
        self.pending.is_none()
    }

    /// Perform the navigation. Pushes and replaces reuse the id announced in
    /// [`RouterEvent::WillChange`](crate::RouterEvent). A pop goes back to the announced route; if
    /// that route is no longer below the top, the navigation is cancelled instead.
    pub fn commit(mut self) {
        if let Some(pending) = self.pending.take() {
            pending
                .router
                .inner
                .commit_pending(pending.action, pending.route_info, pending.dispatch);
        }
    }

    /// Abandon the navigation and emit [`RouterEvent::CancelChange`](crate::RouterEvent).
    pub fn cancel(mut self) {
        if let Some(pending) = self.pending.take() {
            pending
                .router
                .inner
                .cancel_pending(pending.action, pending.route_info);
        }
    }

    /// Cancel if `cancel` is set, commit otherwise.
    pub fn resolve(self, cancel: bool) {
        if cancel {
            self.cancel();
        } else {
            self.commit();
        }
    }
}

impl<C> Drop for PendingNavigation<C> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("pending {} navigation dropped, cancelling", pending.action);
            pending
                .router
                .inner
                .cancel_pending(pending.action, pending.route_info);
        }
    }
}

impl<C> fmt::Debug for PendingNavigation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pending {
            Some(pending) => f
                .debug_struct("PendingNavigation")
                .field("action", &pending.action)
                .field("route", &pending.route_info.route)
                .field("dispatch", &pending.dispatch)
                .finish(),
            None => f.write_str("PendingNavigation(inert)"),
        }
    }
}
