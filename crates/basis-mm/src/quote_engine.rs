//! Quote price and size calculation.
//!
//! Sizing reads the quoted instrument's liquidity and current inventory;
//! pricing selects a level from the hedge instrument's book, skewed by
//! liquidity and inventory. Both functions are pure so every decision is
//! reproducible from its inputs.

use basis_core::{DepthSnapshot, InstrumentBook, Lot, Price, Side, DEPTH_LEVELS};
use tracing::debug;

use crate::config::QuoterConfig;
use crate::liquidity::side_liquidity;

/// Per-tick quoting target, recomputed on every hedge-book update.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTarget {
    pub bid_price: Price,
    pub bid_lot: Lot,
    pub ask_price: Price,
    pub ask_lot: Lot,
    pub bid_liquidity: f64,
    pub ask_liquidity: f64,
}

impl QuoteTarget {
    /// A target that quotes nothing on either side.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bid_price: Price::ZERO,
            bid_lot: Lot::ZERO,
            ask_price: Price::ZERO,
            ask_lot: Lot::ZERO,
            bid_liquidity: 0.0,
            ask_liquidity: 0.0,
        }
    }
}

/// Quote size for one side.
///
/// Liquidity is capped at the configured ceiling; inventory is signed so that
/// the quote side increases risk. The size scales with the square roots of
/// remaining position headroom and relative liquidity, reaching zero exactly
/// when inventory hits the cap on the risk-increasing side. An inventory
/// already beyond the cap forces size zero instead of a domain error.
#[must_use]
pub fn calc_lot_size(liquidity: f64, position: i64, side: Side, cfg: &QuoterConfig) -> Lot {
    if cfg.position_limit <= 0 || cfg.liquidity_ceiling <= 0.0 {
        return Lot::ZERO;
    }
    let limit = cfg.position_limit as f64;
    let pos = match side {
        Side::Buy => position as f64,
        Side::Sell => -(position as f64),
    };

    let headroom = 1.0 - (pos + limit) / (2.0 * limit);
    if !(0.0..=1.0).contains(&headroom) {
        return Lot::ZERO;
    }

    let capped = liquidity.min(cfg.liquidity_ceiling).max(0.0);
    let p = headroom.sqrt();
    let l = (capped / cfg.liquidity_ceiling).sqrt();

    Lot((cfg.size_factor as f64 * p * l).floor() as i64)
}

/// Quote price for one side, selected from the hedge book's levels.
///
/// Returns the selected price and the final spread index. Starting from the
/// base spread index, each liquidity threshold exceeded moves the quote one
/// level closer to the top of the book. The inventory adjustment walks the
/// configured breakpoints from `-len/2` to `+len/2` (negated for the ask
/// side) and the sum is clamped to the valid level range. When the
/// adjustment saturates on the risk-reducing side, the price gets an extra
/// fixed tick offset on top of the selected level. A zero level price yields
/// a zero target price, meaning "do not quote this side".
#[must_use]
pub fn calc_price(
    prices: &[Price; DEPTH_LEVELS],
    liquidity: f64,
    position: i64,
    side: Side,
    cfg: &QuoterConfig,
) -> (Price, usize) {
    let mut index = cfg.base_spread_index.min(DEPTH_LEVELS - 1) as i32;
    for threshold in &cfg.liquidity_thresholds {
        if liquidity > *threshold {
            index -= 1;
        }
    }

    let half = (cfg.position_thresholds.len() / 2) as i32;
    let mut adj = -half;
    for threshold in &cfg.position_thresholds {
        if position > *threshold {
            adj += 1;
        }
    }
    let signed_adj = match side {
        Side::Buy => adj,
        Side::Sell => -adj,
    };

    let index = (index + signed_adj).clamp(0, (DEPTH_LEVELS - 1) as i32) as usize;
    let level = prices[index];
    if level.is_zero() {
        return (Price::ZERO, index);
    }

    // Saturated on the risk-reducing side: inventory is at the dangerous
    // extreme, push past the selected level for faster reduction.
    let price = if half > 0 && signed_adj == -half {
        level.offset_ticks(side.sign() * cfg.emergency_offset_ticks, cfg.tick_size)
    } else {
        level
    };

    (price, index)
}

/// Assemble the per-tick quote target.
///
/// Sizes come from the primary book's liquidity (scored against its own mid)
/// and current inventory; prices come from the hedge snapshot's levels. A
/// primary book with no usable mid contributes zero liquidity, which drives
/// both sizes to zero.
#[must_use]
pub fn compute_target(
    primary: &InstrumentBook,
    hedge: &DepthSnapshot,
    position: i64,
    cfg: &QuoterConfig,
) -> QuoteTarget {
    let (bid_liquidity, ask_liquidity) = match primary.current.as_ref().and_then(|snap| {
        snap.mid().map(|mid| {
            (
                side_liquidity(mid, &snap.bid_prices, &snap.bid_volumes),
                side_liquidity(mid, &snap.ask_prices, &snap.ask_volumes),
            )
        })
    }) {
        Some(scores) => scores,
        None => (0.0, 0.0),
    };

    let bid_lot = calc_lot_size(bid_liquidity, position, Side::Buy, cfg);
    let ask_lot = calc_lot_size(ask_liquidity, position, Side::Sell, cfg);
    let (bid_price, bid_index) = calc_price(&hedge.bid_prices, bid_liquidity, position, Side::Buy, cfg);
    let (ask_price, ask_index) = calc_price(&hedge.ask_prices, ask_liquidity, position, Side::Sell, cfg);

    debug!(
        bid_liquidity,
        ask_liquidity,
        bid_index,
        ask_index,
        %bid_price,
        %ask_price,
        %bid_lot,
        %ask_lot,
        position,
        "quote target"
    );

    QuoteTarget {
        bid_price,
        bid_lot,
        ask_price,
        ask_lot,
        bid_liquidity,
        ask_liquidity,
    }
}
