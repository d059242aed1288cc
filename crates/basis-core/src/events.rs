//! The session-layer contract: inbound events and outbound commands.
//!
//! The external session layer delivers `ExchangeEvent`s one at a time, in
//! arrival order, and accepts fire-and-forget `ExchangeCommand`s. Both enums
//! serialize to JSON so recorded sessions can be replayed offline.

use serde::{Deserialize, Serialize};

use crate::book::DEPTH_LEVELS;
use crate::order::{Lifespan, OrderId};
use crate::types::{Instrument, Lot, Price, Side};

/// Inbound notification from the venue session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// Periodic book refresh for one instrument.
    BookUpdate {
        instrument: Instrument,
        sequence: u64,
        ask_prices: [Price; DEPTH_LEVELS],
        ask_volumes: [Lot; DEPTH_LEVELS],
        bid_prices: [Price; DEPTH_LEVELS],
        bid_volumes: [Lot; DEPTH_LEVELS],
    },
    /// Partial or full fill of one of our resting orders.
    OrderFilled {
        id: OrderId,
        price: Price,
        volume: Lot,
    },
    /// Authoritative order-state update. Zero remaining means the order is gone.
    OrderStatus {
        id: OrderId,
        filled: Lot,
        remaining: Lot,
        fees: i64,
    },
    /// Fill confirmation for one of our hedge orders.
    HedgeFilled {
        id: OrderId,
        price: Price,
        volume: Lot,
    },
    /// Aggregated market trade prints. Informational only.
    TradeTicks {
        instrument: Instrument,
        sequence: u64,
    },
    /// Venue-reported error. A non-zero id refers to one of our orders.
    Error { id: OrderId, message: String },
}

/// Outbound command to the venue session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeCommand {
    /// Insert a new limit order on the quoted instrument.
    Insert {
        id: OrderId,
        side: Side,
        price: Price,
        lot: Lot,
        lifespan: Lifespan,
    },
    /// Cancel a resting order. Advisory: the order may still fill until the
    /// venue confirms zero remaining volume.
    Cancel { id: OrderId },
    /// Shrink a resting order. The venue only accepts reductions.
    Amend { id: OrderId, new_lot: Lot },
    /// Submit a hedge order on the hedge instrument.
    Hedge {
        id: OrderId,
        side: Side,
        price: Price,
        lot: Lot,
    },
}
