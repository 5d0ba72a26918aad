use std::{
    cell::Cell,
    cmp::Ordering,
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

const RADIX: u32 = 36;

/// Ids handed out within one millisecond before the generator borrows the next one.
const IDS_PER_MILLISECOND: u64 = 999;

/// The id of a history record.
///
/// Generated ids are the base-36 encoding of `milliseconds * 1000 + counter`, so ids produced by
/// the same [`IdGenerator`] order by creation time. Use [`IdGenerator::compare`] (or
/// [`RouteId::cmp_sequence`]) to order them; string order is not numeric order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Wrap an existing id, e.g. one restored from persisted history state.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value of the id, if it is valid base 36.
    pub fn sequence(&self) -> Option<u64> {
        u64::from_str_radix(&self.0, RADIX).ok()
    }

    /// Order two ids by their numeric value. Ids that aren't valid base 36 sort first.
    pub fn cmp_sequence(&self, other: &RouteId) -> Ordering {
        match (self.sequence(), other.sequence()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RouteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Produces monotonic [`RouteId`]s.
///
/// Each driver (or group of drivers that should share an ordering) owns its own generator; there
/// is no process-wide sequence.
pub struct IdGenerator {
    clock: Box<dyn Fn() -> u64>,
    current_time: Cell<u64>,
    count: Cell<u64>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_clock(system_millis)
    }
}

impl IdGenerator {
    /// A generator driven by the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator driven by `clock`, which returns milliseconds.
    ///
    /// ```rust
    /// # use stack_router_history::IdGenerator;
    /// let ids = IdGenerator::with_clock(|| 1);
    /// assert_eq!(ids.generate_id().as_str(), "rs");
    /// assert_eq!(ids.generate_id().as_str(), "rt");
    /// ```
    pub fn with_clock(clock: impl Fn() -> u64 + 'static) -> Self {
        let now = clock();
        Self {
            clock: Box::new(clock),
            current_time: Cell::new(now),
            count: Cell::new(0),
        }
    }

    /// Create the next id. Every id compares greater than all ids generated before it.
    pub fn generate_id(&self) -> RouteId {
        let now = (self.clock)();
        if now > self.current_time.get() {
            self.current_time.set(now);
            self.count.set(0);
        }
        if self.count.get() >= IDS_PER_MILLISECOND {
            self.current_time.set(self.current_time.get() + 1);
            self.count.set(0);
        }

        let sequence = self
            .current_time
            .get()
            .saturating_mul(1000)
            .saturating_add(self.count.get());
        self.count.set(self.count.get() + 1);
        RouteId(to_radix(sequence))
    }

    /// Order two ids by creation. A positive navigation (forward in history) goes from a smaller
    /// to a greater id.
    pub fn compare(&self, a: &RouteId, b: &RouteId) -> Ordering {
        a.cmp_sequence(b)
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("current_time", &self.current_time.get())
            .field("count", &self.count.get())
            .finish_non_exhaustive()
    }
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn to_radix(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return String::from("0");
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % u64::from(RADIX)) as usize]);
        value /= u64::from(RADIX);
    }
    digits.iter().rev().map(|&digit| digit as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids = IdGenerator::new();
        let first = ids.generate_id();
        let second = ids.generate_id();

        assert_ne!(first, second);
        assert_eq!(ids.compare(&first, &second), Ordering::Less);
        assert_eq!(ids.compare(&second, &first), Ordering::Greater);
    }

    #[test]
    fn encodes_time_and_counter_in_base_36() {
        let ids = IdGenerator::with_clock(|| 1);
        assert_eq!(ids.generate_id().sequence(), Some(1000));
        assert_eq!(ids.generate_id().sequence(), Some(1001));
    }

    #[test]
    fn counter_resets_when_time_advances() {
        let now = Rc::new(Cell::new(5));
        let clock = now.clone();
        let ids = IdGenerator::with_clock(move || clock.get());

        ids.generate_id();
        ids.generate_id();
        now.set(6);

        assert_eq!(ids.generate_id().sequence(), Some(6000));
    }

    #[test]
    fn borrows_next_millisecond_when_counter_overflows() {
        let ids = IdGenerator::with_clock(|| 2);
        let mut last = None;
        for _ in 0..IDS_PER_MILLISECOND {
            last = Some(ids.generate_id());
        }
        assert_eq!(last.and_then(|id| id.sequence()), Some(2998));

        let borrowed = ids.generate_id();
        assert_eq!(borrowed.sequence(), Some(3000));

        // the real clock catching up does not reuse borrowed values
        let next = ids.generate_id();
        assert_eq!(next.sequence(), Some(3001));
    }

    #[test]
    fn compare_is_numeric_not_lexical() {
        let ids = IdGenerator::new();
        let small = RouteId::new("z");
        let large = RouteId::new("10");

        assert_eq!(ids.compare(&small, &large), Ordering::Less);
        assert_eq!(ids.compare(&RouteId::new("not an id!"), &small), Ordering::Less);
    }

    #[test]
    fn to_radix_round_trips() {
        for value in [0, 1, 35, 36, 1_000, 1_700_000_000_000_000] {
            let encoded = to_radix(value);
            assert_eq!(u64::from_str_radix(&encoded, RADIX), Ok(value));
        }
    }
}
