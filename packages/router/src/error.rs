use stack_router_history::ActionType;

/// A route lookup that could not be completed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route is registered under the requested name.
    #[error("no route is named \"{name}\"")]
    UnknownName {
        /// The requested name.
        name: String,
    },

    /// The named route has a `:param` segment, but no value was given for it.
    #[error("route \"{name}\" requires the parameter \"{param}\"")]
    MissingParam {
        /// The name of the route.
        name: String,
        /// The parameter without a value.
        param: String,
    },
}

/// A navigation the router refused to start.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The target location could not be turned into a path.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A confirmable navigation is still waiting to be committed or cancelled.
    #[error("a pending {action} navigation has to be committed or cancelled first")]
    NavigationPending {
        /// The action of the outstanding navigation.
        action: ActionType,
    },
}
