//! Snapshot history storage keyed by tick.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use crate::error::HistoryError;
use crate::{Baselines, GhostRef, NetworkTick, Snapshot};

/// A fixed-capacity ring buffer of values keyed by tick.
///
/// Ticks must be strictly newer (modular) than the latest entry.
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    entries: Vec<Option<Entry<T>>>,
    head: usize,
    len: usize,
    last_tick: Option<NetworkTick>,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    tick: NetworkTick,
    value: T,
}

/// Two entries bracketing an interpolation target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationPair<'a, T> {
    pub before: (NetworkTick, &'a T),
    pub after: (NetworkTick, &'a T),
    /// Position of the target between `before` (0.0) and `after` (1.0).
    pub factor: f32,
}

impl<T> SnapshotHistory<T> {
    /// Creates a new history with the given capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        let cap = capacity.get();
        let mut entries = Vec::with_capacity(cap);
        entries.resize_with(cap, || None);
        Self {
            entries,
            head: 0,
            len: 0,
            last_tick: None,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a value at the given tick.
    ///
    /// When the history is full, this overwrites the oldest entry.
    pub fn insert(&mut self, tick: NetworkTick, value: T) -> Result<(), HistoryError> {
        if let Some(last) = self.last_tick {
            if !tick.is_newer_than(last) {
                return Err(HistoryError::OutOfOrder {
                    last_tick: last,
                    new_tick: tick,
                });
            }
        }

        let cap = self.entries.len();
        if self.len < cap {
            let idx = (self.head + self.len) % cap;
            self.entries[idx] = Some(Entry { tick, value });
            self.len += 1;
        } else {
            self.entries[self.head] = Some(Entry { tick, value });
            self.head = (self.head + 1) % cap;
        }

        self.last_tick = Some(tick);
        Ok(())
    }

    /// Returns the value for an exact tick, if present.
    #[must_use]
    pub fn get(&self, tick: NetworkTick) -> Option<&T> {
        self.iter().find(|(t, _)| *t == tick).map(|(_, v)| v)
    }

    /// Returns the newest entry at or before the given tick.
    #[must_use]
    pub fn latest_at_or_before(&self, tick: NetworkTick) -> Option<(NetworkTick, &T)> {
        self.iter().rev().find(|(t, _)| !t.is_newer_than(tick))
    }

    /// Returns the newest entry.
    #[must_use]
    pub fn latest(&self) -> Option<(NetworkTick, &T)> {
        self.iter().next_back()
    }

    /// Returns an iterator from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NetworkTick, &T)> {
        let cap = self.entries.len();
        (0..self.len).filter_map(move |i| {
            let idx = (self.head + i) % cap;
            self.entries[idx]
                .as_ref()
                .map(|entry| (entry.tick, &entry.value))
        })
    }

    /// Finds the entries bracketing `target` for presentation smoothing.
    ///
    /// Past the newest entry both sides are the newest entry (no
    /// extrapolation). Returns `None` if `target` precedes every entry.
    #[must_use]
    pub fn interpolation_pair(&self, target: NetworkTick) -> Option<InterpolationPair<'_, T>> {
        let mut after: Option<(NetworkTick, &T)> = None;
        for entry in self.iter().rev() {
            if entry.0.is_newer_than(target) {
                after = Some(entry);
                continue;
            }
            let before = entry;
            let Some(after) = after else {
                return Some(InterpolationPair {
                    before,
                    after: before,
                    factor: 0.0,
                });
            };
            let span = after.0.ticks_since(before.0) as f32;
            let offset = target.ticks_since(before.0) as f32;
            return Some(InterpolationPair {
                before,
                after,
                factor: offset / span,
            });
        }
        None
    }
}

impl SnapshotHistory<Snapshot> {
    /// Picks the two newest acknowledged snapshots as baselines.
    #[must_use]
    pub fn baselines_for(&self, acked: &[NetworkTick]) -> Baselines<'_> {
        let mut found = self
            .iter()
            .rev()
            .filter(|(tick, _)| acked.contains(tick))
            .map(|(_, snapshot)| snapshot);
        Baselines {
            baseline1: found.next(),
            baseline2: found.next(),
        }
    }
}

/// Looks up received snapshots to decode deltas against.
///
/// Keyed by the full [`GhostRef`] so a recycled ghost id never resolves to
/// a snapshot of the ghost that held it before.
pub trait BaselineSource {
    fn baseline(&self, ghost: GhostRef, tick: NetworkTick) -> Option<&Snapshot>;
}

/// Receive-side snapshot histories, one per ghost.
#[derive(Debug, Clone)]
pub struct ClientGhostHistory {
    capacity: NonZeroUsize,
    ghosts: HashMap<GhostRef, SnapshotHistory<Snapshot>>,
}

impl ClientGhostHistory {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            ghosts: HashMap::new(),
        }
    }

    /// Stores a decoded snapshot for a ghost.
    pub fn insert(&mut self, ghost: GhostRef, snapshot: Snapshot) -> Result<(), HistoryError> {
        let capacity = self.capacity;
        self.ghosts
            .entry(ghost)
            .or_insert_with(|| SnapshotHistory::new(capacity))
            .insert(snapshot.tick, snapshot)
    }

    #[must_use]
    pub fn history(&self, ghost: GhostRef) -> Option<&SnapshotHistory<Snapshot>> {
        self.ghosts.get(&ghost)
    }

    /// Drops all history for a despawned ghost.
    pub fn remove(&mut self, ghost: GhostRef) -> Option<SnapshotHistory<Snapshot>> {
        self.ghosts.remove(&ghost)
    }

    /// Number of ghosts with history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }
}

impl BaselineSource for ClientGhostHistory {
    fn baseline(&self, ghost: GhostRef, tick: NetworkTick) -> Option<&Snapshot> {
        self.ghosts.get(&ghost)?.get(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SnapshotValue;

    fn tick(value: u32) -> NetworkTick {
        NetworkTick::new(value)
    }

    fn history(cap: usize) -> SnapshotHistory<u32> {
        SnapshotHistory::new(NonZeroUsize::new(cap).unwrap())
    }

    fn snap(t: u32) -> Snapshot {
        Snapshot::new(tick(t), vec![SnapshotValue::UInt(t)])
    }

    #[test]
    fn insert_and_get() {
        let mut store = history(3);
        store.insert(tick(1), 10).unwrap();
        store.insert(tick(2), 20).unwrap();

        assert_eq!(store.get(tick(1)), Some(&10));
        assert_eq!(store.get(tick(2)), Some(&20));
        assert_eq!(store.get(tick(3)), None);
        assert_eq!(store.latest(), Some((tick(2), &20)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.capacity(), 3);
    }

    #[test]
    fn latest_at_or_before() {
        let mut store = history(3);
        store.insert(tick(10), 1).unwrap();
        store.insert(tick(20), 2).unwrap();
        store.insert(tick(30), 3).unwrap();

        assert_eq!(store.latest_at_or_before(tick(25)).map(|(t, _)| t), Some(tick(20)));
        assert_eq!(store.latest_at_or_before(tick(30)).map(|(t, _)| t), Some(tick(30)));
        assert_eq!(store.latest_at_or_before(tick(5)), None);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut store = history(2);
        store.insert(tick(1), 1).unwrap();
        store.insert(tick(2), 2).unwrap();
        store.insert(tick(3), 3).unwrap();

        assert_eq!(store.get(tick(1)), None);
        assert_eq!(store.get(tick(2)), Some(&2));
        assert_eq!(store.get(tick(3)), Some(&3));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn rejects_out_of_order_and_duplicate_ticks() {
        let mut store = history(2);
        store.insert(tick(10), 1).unwrap();
        let err = store.insert(tick(9), 2).unwrap_err();
        assert!(matches!(err, HistoryError::OutOfOrder { .. }));
        assert!(store.insert(tick(10), 2).is_err());
    }

    #[test]
    fn ordering_across_tick_wraparound() {
        let mut store = history(4);
        store.insert(tick(u32::MAX - 1), 1).unwrap();
        store.insert(tick(u32::MAX), 2).unwrap();
        store.insert(tick(0), 3).unwrap();
        store.insert(tick(1), 4).unwrap();

        assert_eq!(store.latest(), Some((tick(1), &4)));
        assert_eq!(store.latest_at_or_before(tick(0)), Some((tick(0), &3)));
        assert_eq!(
            store.latest_at_or_before(tick(u32::MAX)),
            Some((tick(u32::MAX), &2))
        );
        assert!(store.insert(tick(u32::MAX), 5).is_err());
    }

    #[test]
    fn iter_is_oldest_first() {
        let mut store = history(3);
        for t in 1..=5 {
            store.insert(tick(t), t).unwrap();
        }
        let ticks: Vec<u32> = store.iter().map(|(t, _)| t.raw()).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn interpolation_pair_brackets_target() {
        let mut store = history(4);
        store.insert(tick(10), 100).unwrap();
        store.insert(tick(14), 140).unwrap();

        let pair = store.interpolation_pair(tick(11)).unwrap();
        assert_eq!(pair.before, (tick(10), &100));
        assert_eq!(pair.after, (tick(14), &140));
        assert!((pair.factor - 0.25).abs() < f32::EPSILON);

        let pair = store.interpolation_pair(tick(10)).unwrap();
        assert_eq!(pair.factor, 0.0);
    }

    #[test]
    fn interpolation_pair_does_not_extrapolate() {
        let mut store = history(4);
        store.insert(tick(10), 100).unwrap();
        store.insert(tick(14), 140).unwrap();

        let pair = store.interpolation_pair(tick(20)).unwrap();
        assert_eq!(pair.before, (tick(14), &140));
        assert_eq!(pair.after, (tick(14), &140));
        assert_eq!(pair.factor, 0.0);

        assert!(store.interpolation_pair(tick(9)).is_none());
        assert!(history(1).interpolation_pair(tick(0)).is_none());
    }

    #[test]
    fn baselines_for_picks_newest_acked() {
        let mut store = SnapshotHistory::new(NonZeroUsize::new(8).unwrap());
        for t in [2, 4, 6, 8] {
            store.insert(tick(t), snap(t)).unwrap();
        }

        let baselines = store.baselines_for(&[tick(4), tick(8), tick(2)]);
        assert_eq!(baselines.baseline1.map(|s| s.tick), Some(tick(8)));
        assert_eq!(baselines.baseline2.map(|s| s.tick), Some(tick(4)));

        let baselines = store.baselines_for(&[tick(6)]);
        assert_eq!(baselines.baseline1.map(|s| s.tick), Some(tick(6)));
        assert!(baselines.baseline2.is_none());

        let baselines = store.baselines_for(&[tick(7)]);
        assert!(baselines.baseline1.is_none());
    }

    #[test]
    fn client_history_serves_baselines() {
        let five = GhostRef::new(5, tick(1));
        let six = GhostRef::new(6, tick(1));
        let mut client = ClientGhostHistory::new(NonZeroUsize::new(2).unwrap());
        client.insert(five, snap(10)).unwrap();
        client.insert(five, snap(11)).unwrap();
        client.insert(six, snap(11)).unwrap();

        assert_eq!(client.len(), 2);
        assert_eq!(client.baseline(five, tick(10)).map(|s| s.tick), Some(tick(10)));
        assert!(client.baseline(five, tick(9)).is_none());
        assert!(client.baseline(GhostRef::new(7, tick(1)), tick(10)).is_none());
        assert!(client.insert(five, snap(11)).is_err());

        assert!(client.remove(five).is_some());
        assert!(client.history(five).is_none());
        assert!(!client.is_empty());
    }

    #[test]
    fn recycled_ghost_id_has_no_baselines() {
        let old = GhostRef::new(5, tick(1));
        let recycled = GhostRef::new(5, tick(9));
        let mut client = ClientGhostHistory::new(NonZeroUsize::new(4).unwrap());
        client.insert(old, snap(10)).unwrap();

        assert!(client.baseline(old, tick(10)).is_some());
        assert!(client.baseline(recycled, tick(10)).is_none());
        assert!(client.history(recycled).is_none());
    }
}
