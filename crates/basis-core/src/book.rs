//! Five-level depth snapshots and the current/previous book pair.
//!
//! Snapshots are replaced wholesale on every venue update, never mutated in
//! place. Keeping the previous snapshot alongside the current one supports
//! rate-of-change measures such as the mid-price drift used for hedge sizing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Lot, Price};

/// Number of price levels reported per side.
pub const DEPTH_LEVELS: usize = 5;

/// Immutable view of one instrument's book at one sequence number.
///
/// Index 0 is the best level. A price of zero means the level is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Monotonic per-instrument sequence number from the venue.
    pub sequence: u64,
    pub ask_prices: [Price; DEPTH_LEVELS],
    pub ask_volumes: [Lot; DEPTH_LEVELS],
    pub bid_prices: [Price; DEPTH_LEVELS],
    pub bid_volumes: [Lot; DEPTH_LEVELS],
    /// Arrival timestamp, for staleness diagnostics only.
    pub received_at: DateTime<Utc>,
}

impl DepthSnapshot {
    #[must_use]
    pub fn new(
        sequence: u64,
        ask_prices: [Price; DEPTH_LEVELS],
        ask_volumes: [Lot; DEPTH_LEVELS],
        bid_prices: [Price; DEPTH_LEVELS],
        bid_volumes: [Lot; DEPTH_LEVELS],
    ) -> Self {
        Self {
            sequence,
            ask_prices,
            ask_volumes,
            bid_prices,
            bid_volumes,
            received_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn best_ask(&self) -> Price {
        self.ask_prices[0]
    }

    #[inline]
    #[must_use]
    pub fn best_bid(&self) -> Price {
        self.bid_prices[0]
    }

    /// True when both sides have a best level.
    #[must_use]
    pub fn has_both_sides(&self) -> bool {
        !self.best_ask().is_zero() && !self.best_bid().is_zero()
    }

    /// Mid price between best bid and best ask.
    ///
    /// Returns `None` when either side is empty.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        if !self.has_both_sides() {
            return None;
        }
        Some((self.best_ask().as_f64() + self.best_bid().as_f64()) / 2.0)
    }

    /// Age of this snapshot in milliseconds.
    #[must_use]
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds()
    }
}

/// Current and previous snapshot for one instrument.
#[derive(Debug, Clone, Default)]
pub struct InstrumentBook {
    pub current: Option<DepthSnapshot>,
    pub previous: Option<DepthSnapshot>,
}

impl InstrumentBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot, rotating the old current into `previous`.
    ///
    /// Updates whose sequence number does not advance are dropped; the venue
    /// retransmits on reconnect and those replays must not clobber newer state.
    /// Returns whether the snapshot was accepted.
    pub fn apply(&mut self, snapshot: DepthSnapshot) -> bool {
        if let Some(current) = &self.current {
            if snapshot.sequence <= current.sequence {
                return false;
            }
        }
        self.previous = self.current.take();
        self.current = Some(snapshot);
        true
    }

    /// Ready for rate-of-change measures: both snapshots present and both
    /// two-sided.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(
            (&self.current, &self.previous),
            (Some(cur), Some(prev)) if cur.has_both_sides() && prev.has_both_sides()
        )
    }

    /// Mid-price move from the previous snapshot to the current one.
    ///
    /// Returns `None` unless the book `is_ready()`.
    #[must_use]
    pub fn mid_drift(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        let cur = self.current.as_ref()?.mid()?;
        let prev = self.previous.as_ref()?.mid()?;
        Some(cur - prev)
    }
}
