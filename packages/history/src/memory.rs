use std::{cell::RefCell, cmp::Ordering, rc::Rc};

use crate::{
    ActionType, DriverChange, DriverEvent, DriverEventKind, DriverPayload, EventEmitter,
    IdGenerator, ListenerId, RouteId, RouteRecord, RouterDriver,
};

struct MemoryDriverState {
    entries: Vec<RouteRecord>,
    cursor: usize,
    next_id: Option<RouteId>,
}

impl MemoryDriverState {
    fn take_id(&mut self, ids: &IdGenerator) -> RouteId {
        self.next_id.take().unwrap_or_else(|| ids.generate_id())
    }
}

/// A [`RouterDriver`] that stores all navigation information in memory.
///
/// Changes are emitted synchronously from within the navigation call. Popping keeps the records
/// above the new cursor around, so [`MemoryDriver::go_forward`] can return to them the way a
/// browser's forward button would; pushing discards them.
pub struct MemoryDriver {
    state: RefCell<MemoryDriverState>,
    ids: Rc<IdGenerator>,
    events: EventEmitter<DriverEvent>,
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::with_initial_path("/")
    }
}

impl MemoryDriver {
    /// Create a [`MemoryDriver`] starting at `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`MemoryDriver`] starting at `path`.
    ///
    /// ```rust
    /// # use stack_router_history::{MemoryDriver, RouterDriver};
    /// let driver = MemoryDriver::with_initial_path("/inbox");
    /// assert_eq!(driver.current_route_record().unwrap().path, "/inbox");
    /// assert_eq!(driver.can_go_back(), false);
    /// ```
    pub fn with_initial_path(path: impl Into<String>) -> Self {
        Self::with_id_generator(path, Rc::new(IdGenerator::new()))
    }

    /// Create a [`MemoryDriver`] starting at `path` that takes its ids from `ids`.
    pub fn with_id_generator(path: impl Into<String>, ids: Rc<IdGenerator>) -> Self {
        let initial = RouteRecord::new(ids.generate_id(), path);
        Self {
            state: RefCell::new(MemoryDriverState {
                entries: vec![initial],
                cursor: 0,
                next_id: None,
            }),
            ids,
            events: EventEmitter::new(),
        }
    }

    /// The number of records, including the ones ahead of the cursor.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Whether there are no records. A memory history starts with one, so this is `false`.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// The records from oldest to newest, including the ones ahead of the cursor.
    pub fn entries(&self) -> Vec<RouteRecord> {
        self.state.borrow().entries.clone()
    }

    /// The id currently reserved for the next push or replace.
    pub fn reserved_id(&self) -> Option<RouteId> {
        self.state.borrow().next_id.clone()
    }

    /// Check whether there is an older record to go back to.
    pub fn can_go_back(&self) -> bool {
        self.state.borrow().cursor > 0
    }

    /// Check whether there is a newer record to go forward to.
    pub fn can_go_forward(&self) -> bool {
        let state = self.state.borrow();
        state.cursor + 1 < state.entries.len()
    }

    /// Move through the history as if the user pressed the back button.
    pub fn go_back(&self) {
        self.go(-1);
    }

    /// Move through the history as if the user pressed the forward button.
    pub fn go_forward(&self) {
        self.go(1);
    }

    /// Jump `delta` records from outside the router, like `history.go(delta)` in a browser.
    ///
    /// A backward jump is reported as one [`ActionType::Pop`] to the target record. A forward
    /// jump is reported one record at a time, oldest first, each as [`ActionType::Push`] when the
    /// record is newer than the one before it and as [`ActionType::Pop`] otherwise, so a listener
    /// sees every record it stepped over. Jumps outside the history, or of zero records, are
    /// ignored. A pending id reservation is dropped.
    pub fn go(&self, delta: isize) {
        let target = {
            let mut state = self.state.borrow_mut();
            let Some(target) = state.cursor.checked_add_signed(delta) else {
                return;
            };
            if delta == 0 || target >= state.entries.len() {
                return;
            }
            state.next_id = None;
            target
        };
        tracing::trace!("memory history jumping {delta} records");

        if delta < 0 {
            let record = {
                let mut state = self.state.borrow_mut();
                state.cursor = target;
                state.entries[target].clone()
            };
            self.emit_change(ActionType::Pop, record, None);
            return;
        }

        loop {
            let (action, record) = {
                let mut state = self.state.borrow_mut();
                // a listener may have navigated in between and dropped the records ahead
                if state.cursor >= target || state.cursor + 1 >= state.entries.len() {
                    return;
                }
                let previous = state.entries[state.cursor].id.clone();
                state.cursor += 1;
                let record = state.entries[state.cursor].clone();
                let action = match self.ids.compare(&record.id, &previous) {
                    Ordering::Greater => ActionType::Push,
                    _ => ActionType::Pop,
                };
                (action, record)
            };
            self.emit_change(action, record, None);
        }
    }

    fn emit_change(&self, action: ActionType, record: RouteRecord, payload: Option<DriverPayload>) {
        self.events.emit(&DriverEvent::Change(DriverChange {
            action,
            record,
            payload,
        }));
    }
}

impl RouterDriver for MemoryDriver {
    fn on(&self, kind: DriverEventKind, listener: Box<dyn Fn(&DriverEvent)>) -> ListenerId {
        self.events.on(kind, listener)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    fn push(&self, path: String, state: Option<serde_json::Value>, payload: DriverPayload) {
        let record = {
            let mut write = self.state.borrow_mut();
            let id = write.take_id(&self.ids);
            let record = RouteRecord { id, path, state };
            let cursor = write.cursor;
            write.entries.truncate(cursor + 1);
            write.entries.push(record.clone());
            write.cursor = cursor + 1;
            record
        };

        self.emit_change(ActionType::Push, record, Some(payload));
    }

    fn pop(&self, n: usize, payload: DriverPayload) {
        let record = {
            let mut write = self.state.borrow_mut();
            if write.cursor == 0 {
                tracing::debug!("memory history is at its oldest record, ignoring pop");
                return;
            }
            write.cursor = write.cursor.saturating_sub(n.max(1));
            write.entries[write.cursor].clone()
        };

        self.emit_change(ActionType::Pop, record, Some(payload));
    }

    fn replace(&self, path: String, state: Option<serde_json::Value>, payload: DriverPayload) {
        let record = {
            let mut write = self.state.borrow_mut();
            let id = write.take_id(&self.ids);
            let record = RouteRecord { id, path, state };
            let cursor = write.cursor;
            write.entries[cursor] = record.clone();
            record
        };

        self.emit_change(ActionType::Replace, record, Some(payload));
    }

    fn change_path(&self, path: &str) {
        let mut write = self.state.borrow_mut();
        let cursor = write.cursor;
        write.entries[cursor].path = path.to_string();
    }

    fn generate_next_id(&self) -> RouteId {
        let id = self.ids.generate_id();
        self.state.borrow_mut().next_id = Some(id.clone());
        id
    }

    fn deprecate_next_id(&self) {
        self.state.borrow_mut().next_id = None;
    }

    fn current_route_record(&self) -> Option<RouteRecord> {
        let state = self.state.borrow();
        state.entries.get(state.cursor).cloned()
    }
}

impl std::fmt::Debug for MemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryDriver")
            .field("entries", &state.entries)
            .field("cursor", &state.cursor)
            .field("next_id", &state.next_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_changes(driver: &MemoryDriver) -> Rc<RefCell<Vec<DriverChange>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        driver.on(
            DriverEventKind::Change,
            Box::new(move |event: &DriverEvent| {
                let DriverEvent::Change(change) = event;
                sink.borrow_mut().push(change.clone());
            }),
        );
        changes
    }

    #[test]
    fn starts_at_initial_path() {
        let driver = MemoryDriver::default();
        let record = driver.current_route_record().unwrap();

        assert_eq!(record.path, "/");
        assert_eq!(record.state, None);
        assert!(!driver.can_go_back());
        assert!(!driver.can_go_forward());
    }

    #[test]
    fn push_emits_change_with_payload() {
        let driver = MemoryDriver::default();
        let changes = record_changes(&driver);

        driver.push(
            String::from("/a"),
            Some(serde_json::json!({ "from": "test" })),
            DriverPayload::transition(Some(String::from("slide"))),
        );

        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ActionType::Push);
        assert_eq!(changes[0].record.path, "/a");
        assert_eq!(
            changes[0].record.state,
            Some(serde_json::json!({ "from": "test" }))
        );
        assert_eq!(
            changes[0].payload.as_ref().and_then(|p| p.transition.as_deref()),
            Some("slide")
        );
        assert!(driver.can_go_back());
    }

    #[test]
    fn push_uses_reserved_id_once() {
        let driver = MemoryDriver::default();
        let reserved = driver.generate_next_id();

        driver.push(String::from("/a"), None, DriverPayload::default());
        assert_eq!(driver.current_route_record().unwrap().id, reserved);
        assert_eq!(driver.reserved_id(), None);

        driver.push(String::from("/b"), None, DriverPayload::default());
        assert_ne!(driver.current_route_record().unwrap().id, reserved);
    }

    #[test]
    fn deprecated_reservation_is_not_used() {
        let driver = MemoryDriver::default();
        let reserved = driver.generate_next_id();
        driver.deprecate_next_id();

        driver.replace(String::from("/a"), None, DriverPayload::default());
        assert_ne!(driver.current_route_record().unwrap().id, reserved);
    }

    #[test]
    fn pop_clamps_and_keeps_forward_records() {
        let driver = MemoryDriver::default();
        driver.push(String::from("/a"), None, DriverPayload::default());
        driver.push(String::from("/b"), None, DriverPayload::default());
        let changes = record_changes(&driver);

        driver.pop(0, DriverPayload::default());
        assert_eq!(driver.current_route_record().unwrap().path, "/a");

        driver.pop(10, DriverPayload::default());
        assert_eq!(driver.current_route_record().unwrap().path, "/");
        assert!(driver.can_go_forward());
        assert_eq!(driver.len(), 3);

        // nothing older than the first record
        driver.pop(1, DriverPayload::default());
        assert_eq!(changes.borrow().len(), 2);
        assert!(changes.borrow().iter().all(|c| c.action == ActionType::Pop));
    }

    #[test]
    fn push_discards_forward_records() {
        let driver = MemoryDriver::default();
        driver.push(String::from("/a"), None, DriverPayload::default());
        driver.pop(1, DriverPayload::default());
        driver.push(String::from("/b"), None, DriverPayload::default());

        let paths: Vec<_> = driver.entries().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/", "/b"]);
        assert!(!driver.can_go_forward());
    }

    #[test]
    fn replace_swaps_current_record() {
        let driver = MemoryDriver::default();
        let original = driver.current_route_record().unwrap();
        driver.replace(String::from("/r"), None, DriverPayload::default());

        let current = driver.current_route_record().unwrap();
        assert_eq!(current.path, "/r");
        assert_ne!(current.id, original.id);
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn change_path_does_not_create_records() {
        let driver = MemoryDriver::default();
        let changes = record_changes(&driver);
        driver.change_path("/rewritten");

        assert_eq!(driver.current_route_record().unwrap().path, "/rewritten");
        assert_eq!(driver.len(), 1);
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn external_jumps_are_classified_by_id() {
        let driver = MemoryDriver::default();
        driver.push(String::from("/a"), None, DriverPayload::default());
        let changes = record_changes(&driver);

        driver.go_back();
        driver.go_forward();
        driver.go(5);
        driver.go(-5);

        let changes = changes.borrow();
        let summary: Vec<_> = changes
            .iter()
            .map(|c| (c.action, c.record.path.as_str(), c.payload.is_none()))
            .collect();
        assert_eq!(
            summary,
            vec![(ActionType::Pop, "/", true), (ActionType::Push, "/a", true)]
        );
    }

    #[test]
    fn forward_jumps_report_every_record() {
        let driver = MemoryDriver::default();
        driver.push(String::from("/a"), None, DriverPayload::default());
        driver.push(String::from("/b"), None, DriverPayload::default());
        driver.go(-2);
        let changes = record_changes(&driver);

        driver.go(2);

        let paths: Vec<_> = changes
            .borrow()
            .iter()
            .map(|c| (c.action, c.record.path.clone()))
            .collect();
        assert_eq!(
            paths,
            vec![
                (ActionType::Push, String::from("/a")),
                (ActionType::Push, String::from("/b"))
            ]
        );
        assert_eq!(driver.current_route_record().unwrap().path, "/b");
        assert!(driver.can_go_back());
    }

    #[test]
    fn external_jump_drops_reservation() {
        let driver = MemoryDriver::default();
        driver.push(String::from("/a"), None, DriverPayload::default());
        driver.generate_next_id();
        driver.go_back();

        assert_eq!(driver.reserved_id(), None);
    }

    #[test]
    fn listeners_can_be_removed() {
        let driver = MemoryDriver::default();
        let id = driver.on(
            DriverEventKind::Change,
            Box::new(|_: &DriverEvent| panic!("removed")),
        );
        assert!(driver.off(id));

        driver.push(String::from("/a"), None, DriverPayload::default());
    }
}
