#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod helpers;
pub mod navigation;
pub mod path_tree;

mod error;
mod pending;
mod route_definition;
mod route_manager;
mod router;
mod router_cfg;

pub use error::*;
pub use pending::PendingNavigation;
pub use route_definition::*;
pub use route_manager::*;
pub use router::*;
pub use router_cfg::RouterConfig;

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::error::*;
    pub use crate::helpers::{Params, Query};
    pub use crate::navigation::*;
    pub use crate::path_tree::PathTree;
    pub use crate::pending::PendingNavigation;
    pub use crate::route_definition::*;
    pub use crate::route_manager::*;
    pub use crate::router::*;
    pub use crate::router_cfg::RouterConfig;
    pub use stack_router_history::{
        ActionType, IdGenerator, ListenerId, MemoryDriver, RouteId, RouteRecord, RouterDriver,
    };
}

#[doc(hidden)]
pub mod exports {
    pub use stack_router_history as history;
}
