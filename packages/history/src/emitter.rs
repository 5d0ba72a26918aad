use std::{
    cell::{Cell, RefCell},
    fmt::{self, Debug},
    rc::Rc,
};

/// An event that can be sent through an [`EventEmitter`].
///
/// Events form a closed set, usually an enum. Each event reports its [`Event::Kind`], which is
/// what listeners subscribe to.
pub trait Event {
    /// The discriminant listeners subscribe to.
    type Kind: Copy + Eq + Debug;

    /// The kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Identifies a listener registered with an [`EventEmitter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Registration<E: Event> {
    id: ListenerId,
    kind: E::Kind,
    listener: Rc<dyn Fn(&E)>,
}

/// A typed publish/subscribe registry.
///
/// Emitting takes a snapshot of the listeners for the event's kind before delivering: listeners
/// registered while an event is being delivered only see later events, and listeners removed
/// while an event is being delivered are skipped if they have not been called yet. Listeners may
/// emit again or (un)subscribe from inside their callback.
pub struct EventEmitter<E: Event> {
    listeners: RefCell<Vec<Registration<E>>>,
    next_id: Cell<u64>,
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E: Event> EventEmitter<E> {
    /// Create an emitter without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` for every event of `kind` emitted from now on.
    pub fn on(&self, kind: E::Kind, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Registration {
            id,
            kind,
            listener: Rc::new(listener),
        });
        id
    }

    /// Remove a listener. Removing an unknown or already removed listener is a no-op that
    /// returns `false`.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }

    /// Deliver `event` to the listeners of its kind, in registration order.
    ///
    /// Returns the number of listeners that were called.
    pub fn emit(&self, event: &E) -> usize {
        let kind = event.kind();
        let snapshot: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| (registration.id, registration.listener.clone()))
            .collect();

        let mut delivered = 0;
        for (id, listener) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            listener(event);
            delivered += 1;
        }
        delivered
    }

    /// The number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    /// Remove every listener.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|registration| registration.id == id)
    }
}

impl<E: Event> Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("EventEmitter")
            .field(
                "listeners",
                &listeners
                    .iter()
                    .map(|registration| (registration.id, registration.kind))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
