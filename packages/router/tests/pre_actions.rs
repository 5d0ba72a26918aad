mod common;

use common::*;
use pretty_assertions::assert_eq;
use stack_router::prelude::*;

#[test]
fn prepush_then_cancel() {
    let (driver, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prepush("/b").unwrap();
    assert_eq!(driver.reserved_id(), Some(RouteId::new("rt")));
    assert_eq!(router.pending_action(), Some(ActionType::Push));

    let info = pending.route_info().unwrap();
    assert_eq!(info.route.id.as_str(), "rt");
    assert_eq!(info.index, 1);

    pending.cancel();

    assert_eq!(driver.reserved_id(), None);
    assert_eq!(router.pending_action(), None);
    assert_eq!(router.depth(), 1);
    assert_eq!(driver.len(), 1);
    assert_eq!(*log.borrow(), ["will_change push /b @1", "cancel /b"]);
}

#[test]
fn prepush_then_commit_keeps_the_announced_id() {
    let (_, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prepush(Location::path("/b").transition("slide")).unwrap();
    let announced = pending.route_info().unwrap().route.id.clone();
    pending.commit();

    assert_eq!(router.current_route_info().unwrap().route.id, announced);
    assert_eq!(router.pending_action(), None);
    assert_eq!(*log.borrow(), ["will_change push /b @1", "change push /b"]);
}

#[test]
fn prereplace_announces_the_top_position() {
    let (_, router) = memory_router("/a", routes());
    router.push("/b").unwrap();
    let log = record(&router);

    let pending = router.prereplace("/c").unwrap();
    assert_eq!(pending.action(), Some(ActionType::Replace));
    pending.commit();

    assert_eq!(ids(&router), ["rs", "ru"]);
    assert_eq!(
        *log.borrow(),
        [
            "will_change replace /c @1",
            "change replace /c",
            "destroy rt"
        ]
    );
}

#[test]
fn prepop_clamps_and_commits() {
    let (driver, router) = memory_router("/a", routes());
    router.push("/b").unwrap();
    router.push("/c").unwrap();
    let log = record(&router);

    let pending = router.prepop(PopOptions::n(5)).unwrap();
    assert_eq!(driver.reserved_id(), None);
    pending.resolve(false);

    assert_eq!(ids(&router), ["rs"]);
    assert_eq!(
        *log.borrow(),
        ["will_change pop /a @0", "change pop /a", "destroy rt,ru"]
    );
}

#[test]
fn prepop_on_a_single_route_is_inert() {
    let (driver, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prepop(PopOptions::default()).unwrap();
    assert!(pending.is_inert());
    assert_eq!(router.pending_action(), None);
    pending.commit();

    assert_eq!(router.depth(), 1);
    assert_eq!(driver.len(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn unmatched_prepush_is_inert() {
    let (driver, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prepush("/nowhere").unwrap();

    assert!(pending.is_inert());
    assert!(pending.route_info().is_none());
    assert_eq!(driver.reserved_id(), None);
    assert!(log.borrow().is_empty());
}

#[test]
fn overlapping_pre_actions_are_rejected() {
    let (driver, router) = memory_router("/a", routes());

    let first = router.prepush("/b").unwrap();
    let busy = Some(RouterError::NavigationPending {
        action: ActionType::Push,
    });
    assert_eq!(router.prepush("/c").err(), busy);
    assert_eq!(router.prepop(PopOptions::default()).err(), busy);
    assert_eq!(router.push("/c").err(), busy);
    assert_eq!(driver.reserved_id(), Some(RouteId::new("rt")));

    first.commit();
    assert_eq!(ids(&router), ["rs", "rt"]);

    router.push("/c").unwrap();
    assert_eq!(router.depth(), 3);
}

#[test]
fn dropping_a_handle_cancels_it() {
    let (driver, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prepush("/b").unwrap();
    drop(pending);

    assert_eq!(driver.reserved_id(), None);
    assert_eq!(router.pending_action(), None);
    assert_eq!(*log.borrow(), ["will_change push /b @1", "cancel /b"]);

    router.prepush("/c").unwrap().resolve(true);
    assert_eq!(router.depth(), 1);
}

#[test]
fn unknown_name_is_rejected_before_reserving() {
    let (driver, router) = memory_router("/a", routes());

    assert_eq!(
        router.prepush(Location::named("ghost")).err(),
        Some(RouterError::Route(RouteError::UnknownName {
            name: String::from("ghost")
        }))
    );
    assert_eq!(driver.reserved_id(), None);
    assert_eq!(router.pending_action(), None);
}

#[test]
fn external_jump_drops_the_reservation() {
    let (driver, router) = memory_router("/a", routes());
    router.push("/b").unwrap();

    let pending = router.prepush("/c").unwrap();
    driver.go_back();
    assert_eq!(driver.reserved_id(), None);

    // committing still navigates, with a fresh id
    pending.commit();
    assert_eq!(ids(&router), ["rs", "rv"]);
}

#[test]
fn cancelled_id_is_not_reused() {
    let (driver, router) = memory_router("/a", routes());

    let pending = router.prepush("/b").unwrap();
    let cancelled = pending.route_info().unwrap().route.id.clone();
    pending.cancel();
    router.push("/b").unwrap();

    let committed = router.current_route_info().unwrap().route.id.clone();
    assert_ne!(committed, cancelled);
    assert_eq!(driver.entries().len(), 2);
}

#[test]
fn unmatched_prereplace_is_inert() {
    let (driver, router) = memory_router("/a", routes());
    let log = record(&router);

    let pending = router.prereplace("/nowhere").unwrap();

    assert!(pending.is_inert());
    assert_eq!(pending.action(), None);
    assert_eq!(driver.reserved_id(), None);
    assert_eq!(router.pending_action(), None);
    pending.commit();
    assert_eq!(ids(&router), ["rs"]);
    assert!(log.borrow().is_empty());
}

#[test]
fn prepop_cancels_when_the_announced_route_is_on_top() {
    let (driver, router) = memory_router("/a", routes());
    router.push("/b").unwrap();
    router.push("/c").unwrap();
    let log = record(&router);

    let pending = router.prepop(PopOptions::default()).unwrap();
    driver.go_back();
    pending.commit();

    assert_eq!(ids(&router), ["rs", "rt"]);
    assert_eq!(driver.current_route_record().unwrap().path, "/b");
    assert_eq!(router.pending_action(), None);
    assert_eq!(
        *log.borrow(),
        [
            "will_change pop /b @1",
            "change pop /b",
            "destroy ru",
            "cancel /b"
        ]
    );
}

#[test]
fn prepop_commits_to_the_announced_route() {
    let (_, router) = memory_router("/a", routes());
    router.push("/b").unwrap();
    router.push("/c").unwrap();
    router.push("/user/1").unwrap();
    let log = record(&router);

    let pending = router.prepop(PopOptions::n(2)).unwrap();
    router.pop(PopOptions::default());
    pending.commit();

    assert_eq!(ids(&router), ["rs", "rt"]);
    assert_eq!(
        *log.borrow(),
        [
            "will_change pop /b @1",
            "change pop /c",
            "destroy rv",
            "change pop /b",
            "destroy ru"
        ]
    );
}
