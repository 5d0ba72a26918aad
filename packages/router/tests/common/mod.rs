#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use stack_router::prelude::*;

/// A router on a memory history whose ids are deterministic: `rs`, `rt`, `ru`, ...
pub fn memory_router(
    initial: &str,
    routes: Vec<RouteConfig<&'static str>>,
) -> (Rc<MemoryDriver>, Router<&'static str>) {
    let ids = Rc::new(IdGenerator::with_clock(|| 1));
    let driver = Rc::new(MemoryDriver::with_id_generator(initial, ids));
    let router = Router::new(driver.clone(), routes);
    (driver, router)
}

pub fn routes() -> Vec<RouteConfig<&'static str>> {
    vec![
        RouteConfig::new("/a", "A"),
        RouteConfig::new("/b", "B"),
        RouteConfig::new("/c", "C"),
        RouteConfig::new("/user/:id", "User").name("user"),
        RouteConfig::new("/old", "Old").redirect("/new"),
        RouteConfig::new("/new", "New"),
    ]
}

/// Log every router event as a short line.
pub fn record(router: &Router<&'static str>) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        RouterEventKind::WillChange,
        RouterEventKind::Change,
        RouterEventKind::CancelChange,
        RouterEventKind::Destroy,
    ] {
        let sink = log.clone();
        router.on(kind, move |event: &RouterEvent<&'static str>| {
            sink.borrow_mut().push(describe(event))
        });
    }
    log
}

pub fn describe(event: &RouterEvent<&'static str>) -> String {
    match event {
        RouterEvent::WillChange {
            action, route_info, ..
        } => format!(
            "will_change {action} {} @{}",
            route_info.route.path, route_info.index
        ),
        RouterEvent::Change {
            action, route_info, ..
        } => format!("change {action} {}", route_info.route.path),
        RouterEvent::CancelChange { route_info } => format!("cancel {}", route_info.route.path),
        RouterEvent::Destroy { ids } => format!(
            "destroy {}",
            ids.iter().map(RouteId::as_str).collect::<Vec<_>>().join(",")
        ),
    }
}

/// The ids on the stack, bottom first.
pub fn ids(router: &Router<&'static str>) -> Vec<String> {
    router
        .stack()
        .iter()
        .map(|info| info.route.id.to_string())
        .collect()
}
