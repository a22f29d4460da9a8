//! Snapshot records and baseline selection.

use crate::field::SnapshotValue;
use crate::{DeltaPredictor, NetworkTick};

/// All replicated field values of one ghost at one tick, in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: NetworkTick,
    pub values: Vec<SnapshotValue>,
}

impl Snapshot {
    #[must_use]
    pub fn new(tick: NetworkTick, values: Vec<SnapshotValue>) -> Self {
        Self { tick, values }
    }
}

/// Reference snapshots for one send or receive.
///
/// `baseline1` is the most recent acknowledged snapshot, `baseline2` the one
/// before it. `baseline2` is ignored without `baseline1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baselines<'a> {
    pub baseline1: Option<&'a Snapshot>,
    pub baseline2: Option<&'a Snapshot>,
}

impl<'a> Baselines<'a> {
    /// No baselines; values are encoded against zero.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            baseline1: None,
            baseline2: None,
        }
    }

    #[must_use]
    pub const fn one(baseline1: &'a Snapshot) -> Self {
        Self {
            baseline1: Some(baseline1),
            baseline2: None,
        }
    }

    #[must_use]
    pub const fn two(baseline1: &'a Snapshot, baseline2: &'a Snapshot) -> Self {
        Self {
            baseline1: Some(baseline1),
            baseline2: Some(baseline2),
        }
    }

    /// Predictor for a snapshot at `tick`.
    #[must_use]
    pub fn predictor(&self, tick: NetworkTick) -> DeltaPredictor {
        match self.baseline1 {
            Some(b1) => DeltaPredictor::new(tick, Some(b1.tick), self.baseline2.map(|b2| b2.tick)),
            None => DeltaPredictor::disabled(),
        }
    }
}
