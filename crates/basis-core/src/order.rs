//! Order identity and open-order records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Lot, Price, Side};

/// Process-unique order identifier.
///
/// Every order this bot sends, quote or hedge, draws its id from the same
/// monotonic counter so a venue event can always be attributed to exactly one
/// owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic order-id generator, owned by the trading session.
#[derive(Debug)]
pub struct OrderIdGen {
    next: u64,
}

impl OrderIdGen {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next += 1;
        id
    }
}

impl Default for OrderIdGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Time-in-force for inserted orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifespan {
    /// Rest in the book until cancelled.
    #[default]
    GoodForDay,
    /// Execute immediately, cancel the remainder.
    FillAndKill,
}

impl fmt::Display for Lifespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodForDay => write!(f, "good_for_day"),
            Self::FillAndKill => write!(f, "fill_and_kill"),
        }
    }
}

/// An order this bot has submitted and not yet seen removed.
///
/// `lot` is the remaining open quantity; partial fills decrement it. The
/// record stays alive after a cancel request (cancellation is advisory and the
/// order may still fill) until the venue reports zero remaining volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub lot: Lot,
}

impl RestingOrder {
    #[must_use]
    pub fn new(id: OrderId, side: Side, price: Price, lot: Lot) -> Self {
        Self {
            id,
            side,
            price,
            lot,
        }
    }
}
