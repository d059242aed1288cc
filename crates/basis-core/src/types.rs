//! Instrument/side enums and integer price/lot newtypes.
//!
//! The venue quotes prices in whole cents and sizes in whole lots, so both
//! newtypes wrap `i64` rather than a decimal type. Wrapping prevents mixing
//! prices with lots in calculations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest price the venue accepts, in cents.
pub const MINIMUM_BID: i64 = 1;

/// Largest price the venue accepts, in cents.
pub const MAXIMUM_ASK: i64 = i32::MAX as i64;

/// Venue tick size in cents.
pub const TICK_SIZE: i64 = 100;

/// Lowest valid on-tick price, used as the marketable price for sell hedges.
#[must_use]
pub fn min_bid_nearest_tick(tick: i64) -> Price {
    Price((MINIMUM_BID + tick) / tick * tick)
}

/// Highest valid on-tick price, used as the marketable price for buy hedges.
#[must_use]
pub fn max_ask_nearest_tick(tick: i64) -> Price {
    Price(MAXIMUM_ASK / tick * tick)
}

/// The two instruments this bot trades on the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// The primary (quoted) instrument.
    Etf,
    /// The correlated hedge instrument.
    Future,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Etf => write!(f, "etf"),
            Self::Future => write!(f, "future"),
        }
    }
}

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns +1 for buy, -1 for sell (for position arithmetic).
    #[must_use]
    pub fn sign(&self) -> i64 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Price in cents. Zero means "no price" (empty book level / do not quote).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn inner(&self) -> i64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion for log-space arithmetic.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Shift by a whole number of ticks. Saturates at zero rather than
    /// producing a negative price.
    #[must_use]
    pub fn offset_ticks(&self, ticks: i64, tick_size: i64) -> Self {
        Self((self.0 + ticks * tick_size).max(0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order quantity in whole lots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lot(pub i64);

impl Lot {
    pub const ZERO: Self = Self(0);

    #[inline]
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn inner(&self) -> i64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Quantity signed by side: positive for buys, negative for sells.
    #[inline]
    #[must_use]
    pub fn signed(&self, side: Side) -> i64 {
        side.sign() * self.0
    }

    #[must_use]
    pub fn saturating_sub(&self, rhs: Lot) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
