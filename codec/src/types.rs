//! Core types for the codec.

use std::fmt;

/// A simulation tick number.
///
/// Ticks wrap at 32 bits. Ordering is modular: a tick is newer than another
/// when it is ahead by less than half the tick range, so `NetworkTick` does
/// not implement `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetworkTick(u32);

impl NetworkTick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(tick: u32) -> Self {
        Self(tick)
    }

    /// Returns the raw tick value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Signed distance from `other` to `self`, modulo 2^32.
    #[must_use]
    pub const fn ticks_since(self, other: Self) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }

    /// Returns `true` if `self` is strictly after `other`.
    #[must_use]
    pub const fn is_newer_than(self, other: Self) -> bool {
        self.ticks_since(other) > 0
    }

    /// Returns the tick `ticks` steps later, wrapping.
    #[must_use]
    pub const fn wrapping_add(self, ticks: u32) -> Self {
        Self(self.0.wrapping_add(ticks))
    }

    /// Returns the tick `ticks` steps earlier, wrapping.
    #[must_use]
    pub const fn wrapping_sub(self, ticks: u32) -> Self {
        Self(self.0.wrapping_sub(ticks))
    }
}

impl From<u32> for NetworkTick {
    fn from(tick: u32) -> Self {
        Self(tick)
    }
}

impl From<NetworkTick> for u32 {
    fn from(tick: NetworkTick) -> Self {
        tick.0
    }
}

impl fmt::Display for NetworkTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network identity of a ghost.
///
/// Ghost ids are recycled after despawn, so the spawn tick is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GhostRef {
    pub ghost_id: i32,
    pub spawn_tick: NetworkTick,
}

impl GhostRef {
    /// The absent reference.
    pub const NULL: Self = Self {
        ghost_id: 0,
        spawn_tick: NetworkTick::new(0),
    };

    /// Creates a new ghost reference.
    #[must_use]
    pub const fn new(ghost_id: i32, spawn_tick: NetworkTick) -> Self {
        Self {
            ghost_id,
            spawn_tick,
        }
    }

    /// Returns `true` for [`GhostRef::NULL`].
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.ghost_id == 0 && self.spawn_tick.raw() == 0
    }
}

impl fmt::Display for GhostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ghost {}@{}", self.ghost_id, self.spawn_tick)
    }
}

/// A local entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Entity {
    pub index: u32,
    pub generation: u32,
}

impl Entity {
    /// Creates a new entity handle.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}
