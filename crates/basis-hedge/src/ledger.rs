//! The position ledger: net inventory per instrument, mutated only by
//! confirmed fills.
//!
//! Alongside the signed position each instrument carries integer cost-basis
//! accounting: the open notional of the current position and the realized
//! PnL from reductions, all in cents, so there is no floating-point drift in
//! the money numbers.

use basis_core::{Instrument, Lot, Price, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Ledger errors.
///
/// A limit breach here is fatal: the venue already accepted the trade, so
/// the session must halt rather than keep trading on a corrupted book.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("position limit breached on {instrument}: position {position}, limit {limit}")]
    LimitBreached {
        instrument: Instrument,
        position: i64,
        limit: i64,
    },
}

/// Net position and cost basis for one instrument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentPosition {
    /// Signed net position in lots. Positive = long.
    pub qty: i64,
    /// Notional cost of the open position, in cents.
    open_notional: i64,
    /// Realized PnL in cents.
    pub realized_pnl: i64,
    /// Fills processed.
    pub fill_count: u64,
}

impl InstrumentPosition {
    /// Apply a confirmed fill.
    fn apply(&mut self, side: Side, price: Price, volume: Lot) {
        let signed = volume.signed(side);
        let old = self.qty;
        let new = old + signed;

        if old == 0 || old.signum() == signed.signum() {
            // Opening or adding: accumulate cost.
            self.open_notional += price.inner() * signed.abs();
        } else {
            // Reducing (possibly through zero): realize PnL on the closed
            // lots at the position's average cost, pro-rated in integer
            // arithmetic.
            let closed = signed.abs().min(old.abs());
            let removed_notional = self.open_notional * closed / old.abs();
            let traded_notional = price.inner() * closed;
            let pnl = if old > 0 {
                traded_notional - removed_notional
            } else {
                removed_notional - traded_notional
            };
            self.realized_pnl += pnl;
            self.open_notional -= removed_notional;

            let leftover = signed.abs() - closed;
            if leftover > 0 {
                // Flipped through zero: the remainder opens a new position
                // at the fill price.
                self.open_notional = price.inner() * leftover;
            }
        }

        self.qty = new;
        if self.qty == 0 {
            self.open_notional = 0;
        }
        self.fill_count += 1;
    }

    /// Average entry price of the open position, in cents.
    #[must_use]
    pub fn avg_entry(&self) -> Option<i64> {
        if self.qty == 0 {
            None
        } else {
            Some(self.open_notional / self.qty.abs())
        }
    }
}

/// Single source of truth for inventory in both instruments.
#[derive(Debug)]
pub struct PositionLedger {
    etf: InstrumentPosition,
    future: InstrumentPosition,
    position_limit: i64,
    hedge_limit: i64,
}

impl PositionLedger {
    #[must_use]
    pub fn new(position_limit: i64, hedge_limit: i64) -> Self {
        Self {
            etf: InstrumentPosition::default(),
            future: InstrumentPosition::default(),
            position_limit,
            hedge_limit,
        }
    }

    /// Apply a confirmed fill on the quoted instrument.
    pub fn apply_etf_fill(&mut self, side: Side, price: Price, volume: Lot) -> Result<(), LedgerError> {
        self.etf.apply(side, price, volume);
        debug!(%side, %price, %volume, position = self.etf.qty, "etf fill applied");
        if self.etf.qty.abs() > self.position_limit {
            return Err(LedgerError::LimitBreached {
                instrument: Instrument::Etf,
                position: self.etf.qty,
                limit: self.position_limit,
            });
        }
        Ok(())
    }

    /// Apply a confirmed fill on the hedge instrument.
    pub fn apply_future_fill(
        &mut self,
        side: Side,
        price: Price,
        volume: Lot,
    ) -> Result<(), LedgerError> {
        self.future.apply(side, price, volume);
        debug!(%side, %price, %volume, position = self.future.qty, "future fill applied");
        if self.future.qty.abs() > self.hedge_limit {
            return Err(LedgerError::LimitBreached {
                instrument: Instrument::Future,
                position: self.future.qty,
                limit: self.hedge_limit,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn etf_position(&self) -> i64 {
        self.etf.qty
    }

    #[must_use]
    pub fn future_position(&self) -> i64 {
        self.future.qty
    }

    /// Unhedged exposure: a fully hedged book nets to zero.
    #[must_use]
    pub fn net_exposure(&self) -> i64 {
        self.etf.qty + self.future.qty
    }

    #[must_use]
    pub fn etf(&self) -> &InstrumentPosition {
        &self.etf
    }

    #[must_use]
    pub fn future(&self) -> &InstrumentPosition {
        &self.future
    }

    /// Realized PnL across both instruments, in cents.
    #[must_use]
    pub fn total_realized_pnl(&self) -> i64 {
        self.etf.realized_pnl + self.future.realized_pnl
    }
}
