//! Hedge order control: normal post-fill hedging and the emergency machine.
//!
//! Every confirmed fill on the quoted instrument triggers an offsetting
//! order on the hedge instrument. Separately, a two-state machine watches
//! how long net exposure has been above the unhedged threshold; past the
//! configured limit it suspends quoting and forces exposure back toward
//! zero. That machine is the circuit breaker for the case where fills
//! accumulate inventory faster than requoting corrects it.
//!
//! Hedge orders live in their own id set, disjoint from quote orders, and
//! never compete with them for the quoted instrument's position limit.

use std::collections::HashMap;

use basis_core::{
    max_ask_nearest_tick, min_bid_nearest_tick, ExchangeCommand, InstrumentBook, Lot, OrderId,
    OrderIdGen, Price, RestingOrder, Side,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{HedgeConfig, HedgeRatio};
use crate::ledger::{LedgerError, PositionLedger};

/// Hedge-path errors. An unknown order id means the id mapping is corrupt
/// and the session must halt.
#[derive(Debug, Error)]
pub enum HedgeError {
    #[error("unknown hedge order id {0}")]
    UnknownOrder(OrderId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Emergency machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeState {
    /// Normal quoting and hedging.
    Normal,
    /// Emergency hedge in flight; quoting is suspended until it fills.
    Hedging { order_id: OrderId },
}

/// What the quote pipeline should do on this hedge-book tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HedgeDirective {
    /// Proceed with the normal requote.
    Quote,
    /// Emergency hedge still in flight: skip the requote entirely.
    Suspend,
    /// Emergency entered now: cancel all quotes and submit these commands.
    Trigger(Vec<ExchangeCommand>),
}

/// Owns hedge orders and drives the emergency state machine.
#[derive(Debug)]
pub struct HedgeController {
    cfg: HedgeConfig,
    orders: HashMap<OrderId, RestingOrder>,
    state: HedgeState,
    /// When net exposure first exceeded the unhedged threshold.
    unhedged_since: Option<u64>,
}

impl HedgeController {
    #[must_use]
    pub fn new(cfg: HedgeConfig) -> Self {
        Self {
            cfg,
            orders: HashMap::new(),
            state: HedgeState::Normal,
            unhedged_since: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> HedgeState {
        self.state
    }

    #[must_use]
    pub fn unhedged_since(&self) -> Option<u64> {
        self.unhedged_since
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    #[must_use]
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    /// Hedge a confirmed fill on the quoted instrument.
    ///
    /// `quote_side` is the side of our filled quote: a filled bid bought the
    /// ETF, so the hedge sells the future, and vice versa. The hedge is
    /// suppressed, not clamped, if it would push the hedge position past its
    /// limit; the next fill re-attempts from a consistent state.
    pub fn on_primary_fill(
        &mut self,
        quote_side: Side,
        volume: Lot,
        primary: &InstrumentBook,
        hedge_book: &InstrumentBook,
        future_position: i64,
        ids: &mut OrderIdGen,
    ) -> Vec<ExchangeCommand> {
        let side = quote_side.opposite();
        let lot = self.hedge_volume(volume, primary, hedge_book);
        if !lot.is_positive() {
            return Vec::new();
        }

        let projected = future_position + self.in_flight_signed() + lot.signed(side);
        if projected.abs() > self.cfg.hedge_limit {
            warn!(
                %side,
                %lot,
                future_position,
                projected,
                limit = self.cfg.hedge_limit,
                "hedge suppressed: would breach hedge position limit"
            );
            return Vec::new();
        }

        let (_, command) = self.submit(side, lot, ids);
        vec![command]
    }

    /// Re-evaluate the unhedged timer on a hedge-book tick and decide what
    /// the quoting pipeline may do.
    pub fn on_hedge_tick(
        &mut self,
        net_exposure: i64,
        future_position: i64,
        now_ms: u64,
        ids: &mut OrderIdGen,
    ) -> HedgeDirective {
        if net_exposure.abs() <= self.cfg.unhedged_threshold {
            self.unhedged_since = None;
        } else if self.unhedged_since.is_none() {
            self.unhedged_since = Some(now_ms);
        }

        if let HedgeState::Hedging { .. } = self.state {
            return HedgeDirective::Suspend;
        }

        let Some(since) = self.unhedged_since else {
            return HedgeDirective::Quote;
        };
        if now_ms.saturating_sub(since) <= self.cfg.unhedged_limit_ms {
            return HedgeDirective::Quote;
        }

        // Size the forced hedge to flatten net exposure, bounded by the
        // hedge instrument's own limit.
        let side = if net_exposure > 0 { Side::Sell } else { Side::Buy };
        let base = future_position + self.in_flight_signed();
        let cap = match side {
            Side::Sell => self.cfg.hedge_limit + base,
            Side::Buy => self.cfg.hedge_limit - base,
        }
        .max(0);
        let lot = Lot(net_exposure.abs().min(cap));
        if !lot.is_positive() {
            warn!(
                net_exposure,
                future_position, "emergency hedge wanted but hedge limit leaves no headroom"
            );
            return HedgeDirective::Quote;
        }

        let (order_id, command) = self.submit(side, lot, ids);
        info!(
            net_exposure,
            unhedged_ms = now_ms.saturating_sub(since),
            %side,
            %lot,
            %order_id,
            "emergency hedge triggered, suspending quoting"
        );
        self.state = HedgeState::Hedging { order_id };
        HedgeDirective::Trigger(vec![command])
    }

    /// Apply a hedge fill confirmation.
    ///
    /// Updates the ledger, and on completion of the emergency order decides
    /// whether the fill overshot zero far enough to need a corrective
    /// counter-hedge before quoting resumes.
    pub fn on_hedge_fill(
        &mut self,
        id: OrderId,
        price: Price,
        volume: Lot,
        ledger: &mut PositionLedger,
        ids: &mut OrderIdGen,
    ) -> Result<Vec<ExchangeCommand>, HedgeError> {
        let side = {
            let order = self.orders.get_mut(&id).ok_or(HedgeError::UnknownOrder(id))?;
            order.lot = order.lot.saturating_sub(volume);
            order.side
        };
        ledger.apply_future_fill(side, price, volume)?;

        let done = self
            .orders
            .get(&id)
            .map(|order| order.lot.is_zero())
            .unwrap_or(true);
        if done {
            self.orders.remove(&id);
        }

        let mut commands = Vec::new();
        if self.state == (HedgeState::Hedging { order_id: id }) && done {
            let residual = ledger.net_exposure();
            if residual.abs() > self.cfg.flatten_buffer {
                // Overshot past zero: push back with a small counter-hedge.
                let side = if residual > 0 { Side::Sell } else { Side::Buy };
                let lot = Lot(residual.abs());
                info!(residual, %side, %lot, "emergency hedge overshot, counter-hedging");
                let (_, command) = self.submit(side, lot, ids);
                commands.push(command);
            }
            self.state = HedgeState::Normal;
            debug!("emergency hedge complete, quoting resumes on next tick");
        }

        Ok(commands)
    }

    /// Drop a hedge order reported gone by the venue (cancel or rejection).
    ///
    /// If it was the in-flight emergency order the machine returns to
    /// `Normal`; the timer will re-trigger on a later tick if exposure is
    /// still out of line.
    pub fn remove(&mut self, id: OrderId) -> Option<RestingOrder> {
        let order = self.orders.remove(&id)?;
        if self.state == (HedgeState::Hedging { order_id: id }) {
            warn!(%id, "emergency hedge order removed without filling, resuming");
            self.state = HedgeState::Normal;
        }
        Some(order)
    }

    fn submit(&mut self, side: Side, lot: Lot, ids: &mut OrderIdGen) -> (OrderId, ExchangeCommand) {
        // Marketable extreme-tick price: cross the book for immediate execution.
        let price = match side {
            Side::Sell => min_bid_nearest_tick(self.cfg.tick_size),
            Side::Buy => max_ask_nearest_tick(self.cfg.tick_size),
        };
        let id = ids.next_id();
        self.orders
            .insert(id, RestingOrder::new(id, side, price, lot));
        debug!(%id, %side, %price, %lot, "hedge order submitted");
        (
            id,
            ExchangeCommand::Hedge {
                id,
                side,
                price,
                lot,
            },
        )
    }

    /// Sum of in-flight hedge lots, signed by side.
    fn in_flight_signed(&self) -> i64 {
        self.orders
            .values()
            .map(|order| order.lot.signed(order.side))
            .sum()
    }

    /// Hedge volume for a primary fill of `volume` lots.
    ///
    /// Under the delta policy the fill is scaled by the ratio of the two
    /// books' recent mid drift, never exceeding the half-volume baseline; a
    /// ratio with the books moving in opposite directions hedges nothing.
    /// Half the volume is the fallback whenever either book lacks the
    /// history to measure drift.
    fn hedge_volume(&self, volume: Lot, primary: &InstrumentBook, hedge: &InstrumentBook) -> Lot {
        let half = Lot(volume.inner() / 2);
        if self.cfg.ratio == HedgeRatio::FixedHalf {
            return half;
        }
        let (Some(primary_drift), Some(hedge_drift)) = (primary.mid_drift(), hedge.mid_drift())
        else {
            return half;
        };
        if primary_drift == 0.0 || hedge_drift == 0.0 {
            return half;
        }
        let ratio = primary_drift / hedge_drift;
        if ratio > 0.0 {
            Lot(((ratio * volume.inner() as f64).floor() as i64).min(half.inner()))
        } else {
            Lot::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis_core::{DepthSnapshot, DEPTH_LEVELS};

    fn controller() -> (HedgeController, OrderIdGen) {
        (HedgeController::new(HedgeConfig::default()), OrderIdGen::new())
    }

    fn snap(sequence: u64, best_bid: i64, best_ask: i64) -> DepthSnapshot {
        let mut ask_prices = [Price::ZERO; DEPTH_LEVELS];
        let mut bid_prices = [Price::ZERO; DEPTH_LEVELS];
        ask_prices[0] = Price(best_ask);
        bid_prices[0] = Price(best_bid);
        DepthSnapshot::new(
            sequence,
            ask_prices,
            [Lot(10); DEPTH_LEVELS],
            bid_prices,
            [Lot(10); DEPTH_LEVELS],
        )
    }

    fn book_with_drift(from_mid: i64, to_mid: i64) -> InstrumentBook {
        let mut book = InstrumentBook::new();
        book.apply(snap(1, from_mid - 100, from_mid + 100));
        book.apply(snap(2, to_mid - 100, to_mid + 100));
        book
    }

    #[test]
    fn test_half_volume_hedge_when_books_not_ready() {
        let (mut hedge, mut ids) = controller();
        let commands = hedge.on_primary_fill(
            Side::Buy,
            Lot(20),
            &InstrumentBook::new(),
            &InstrumentBook::new(),
            0,
            &mut ids,
        );
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            ExchangeCommand::Hedge { side, price, lot, .. } => {
                assert_eq!(*side, Side::Sell);
                assert_eq!(*lot, Lot(10));
                assert_eq!(*price, min_bid_nearest_tick(100));
            }
            other => panic!("expected hedge command, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_fill_hedges_with_buy_at_max_tick() {
        let (mut hedge, mut ids) = controller();
        let commands = hedge.on_primary_fill(
            Side::Sell,
            Lot(20),
            &InstrumentBook::new(),
            &InstrumentBook::new(),
            0,
            &mut ids,
        );
        match &commands[0] {
            ExchangeCommand::Hedge { side, price, .. } => {
                assert_eq!(*side, Side::Buy);
                assert_eq!(*price, max_ask_nearest_tick(100));
            }
            other => panic!("expected hedge command, got {other:?}"),
        }
    }

    #[test]
    fn test_delta_ratio_scales_hedge() {
        let (mut hedge, mut ids) = controller();
        // Primary drifted +30, hedge book +100: ratio 0.3.
        let primary = book_with_drift(10_000, 10_030);
        let hedge_book = book_with_drift(10_000, 10_100);
        let commands =
            hedge.on_primary_fill(Side::Buy, Lot(20), &primary, &hedge_book, 0, &mut ids);
        match &commands[0] {
            ExchangeCommand::Hedge { lot, .. } => assert_eq!(*lot, Lot(6)),
            other => panic!("expected hedge command, got {other:?}"),
        }
    }

    #[test]
    fn test_opposite_drift_hedges_nothing() {
        let (mut hedge, mut ids) = controller();
        let primary = book_with_drift(10_000, 9_950);
        let hedge_book = book_with_drift(10_000, 10_100);
        let commands =
            hedge.on_primary_fill(Side::Buy, Lot(20), &primary, &hedge_book, 0, &mut ids);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_hedge_suppressed_at_limit() {
        let (mut hedge, mut ids) = controller();
        // Future already short 95: selling 10 more would breach 100.
        let commands = hedge.on_primary_fill(
            Side::Buy,
            Lot(20),
            &InstrumentBook::new(),
            &InstrumentBook::new(),
            -95,
            &mut ids,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn test_unhedged_timer_resets_within_threshold() {
        let (mut hedge, mut ids) = controller();
        assert_eq!(hedge.on_hedge_tick(20, 0, 1_000, &mut ids), HedgeDirective::Quote);
        assert_eq!(hedge.unhedged_since(), Some(1_000));
        // Exposure back under the threshold: timer clears.
        assert_eq!(hedge.on_hedge_tick(5, 0, 30_000, &mut ids), HedgeDirective::Quote);
        assert_eq!(hedge.unhedged_since(), None);
        // Re-crossing starts a fresh window.
        assert_eq!(hedge.on_hedge_tick(20, 0, 40_000, &mut ids), HedgeDirective::Quote);
        assert_eq!(hedge.unhedged_since(), Some(40_000));
    }

    #[test]
    fn test_emergency_triggers_after_limit() {
        let (mut hedge, mut ids) = controller();
        assert_eq!(hedge.on_hedge_tick(20, 0, 0, &mut ids), HedgeDirective::Quote);
        // Exactly at the limit: not yet.
        assert_eq!(hedge.on_hedge_tick(20, 0, 60_000, &mut ids), HedgeDirective::Quote);

        let directive = hedge.on_hedge_tick(20, 0, 60_001, &mut ids);
        let HedgeDirective::Trigger(commands) = directive else {
            panic!("expected trigger, got {directive:?}");
        };
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            ExchangeCommand::Hedge { side, lot, .. } => {
                assert_eq!(*side, Side::Sell);
                assert_eq!(*lot, Lot(20));
            }
            other => panic!("expected hedge command, got {other:?}"),
        }
        assert!(matches!(hedge.state(), HedgeState::Hedging { .. }));

        // While hedging, every tick suspends quoting.
        assert_eq!(
            hedge.on_hedge_tick(20, 0, 61_000, &mut ids),
            HedgeDirective::Suspend
        );
    }

    #[test]
    fn test_emergency_completion_resumes_quoting() {
        let (mut hedge, mut ids) = controller();
        let mut ledger = PositionLedger::new(100, 100);
        ledger
            .apply_etf_fill(Side::Buy, Price(10_000), Lot(20))
            .unwrap();

        hedge.on_hedge_tick(20, 0, 0, &mut ids);
        let directive = hedge.on_hedge_tick(20, 0, 70_000, &mut ids);
        let HedgeDirective::Trigger(commands) = directive else {
            panic!("expected trigger");
        };
        let id = match &commands[0] {
            ExchangeCommand::Hedge { id, .. } => *id,
            other => panic!("expected hedge command, got {other:?}"),
        };

        let follow_up = hedge
            .on_hedge_fill(id, Price(9_900), Lot(20), &mut ledger, &mut ids)
            .unwrap();
        // Landed exactly flat: no corrective needed.
        assert!(follow_up.is_empty());
        assert_eq!(hedge.state(), HedgeState::Normal);
        assert_eq!(ledger.net_exposure(), 0);
    }

    #[test]
    fn test_emergency_overshoot_counter_hedges() {
        let (mut hedge, mut ids) = controller();
        let mut ledger = PositionLedger::new(100, 100);
        ledger
            .apply_etf_fill(Side::Buy, Price(10_000), Lot(20))
            .unwrap();

        hedge.on_hedge_tick(20, 0, 0, &mut ids);
        let HedgeDirective::Trigger(commands) = hedge.on_hedge_tick(20, 0, 70_000, &mut ids)
        else {
            panic!("expected trigger");
        };
        let id = match &commands[0] {
            ExchangeCommand::Hedge { id, .. } => *id,
            other => panic!("expected hedge command, got {other:?}"),
        };

        // Our quotes kept filling while the emergency order was in flight:
        // the ETF leg shrank, so the full 20-lot hedge now overshoots.
        ledger
            .apply_etf_fill(Side::Sell, Price(10_100), Lot(15))
            .unwrap();

        let follow_up = hedge
            .on_hedge_fill(id, Price(9_900), Lot(20), &mut ledger, &mut ids)
            .unwrap();
        assert_eq!(ledger.net_exposure(), -15);
        assert_eq!(follow_up.len(), 1);
        match &follow_up[0] {
            ExchangeCommand::Hedge { side, lot, .. } => {
                assert_eq!(*side, Side::Buy);
                assert_eq!(*lot, Lot(15));
            }
            other => panic!("expected hedge command, got {other:?}"),
        }
        assert_eq!(hedge.state(), HedgeState::Normal);
    }

    #[test]
    fn test_removed_emergency_order_resumes_normal() {
        let (mut hedge, mut ids) = controller();
        hedge.on_hedge_tick(20, 0, 0, &mut ids);
        let HedgeDirective::Trigger(commands) = hedge.on_hedge_tick(20, 0, 70_000, &mut ids)
        else {
            panic!("expected trigger");
        };
        let id = match &commands[0] {
            ExchangeCommand::Hedge { id, .. } => *id,
            other => panic!("expected hedge command, got {other:?}"),
        };

        assert!(hedge.remove(id).is_some());
        assert_eq!(hedge.state(), HedgeState::Normal);
    }

    #[test]
    fn test_unknown_hedge_fill_is_fatal() {
        let (mut hedge, mut ids) = controller();
        let mut ledger = PositionLedger::new(100, 100);
        let err = hedge
            .on_hedge_fill(OrderId(99), Price(10_000), Lot(5), &mut ledger, &mut ids)
            .unwrap_err();
        assert!(matches!(err, HedgeError::UnknownOrder(OrderId(99))));
    }

    #[test]
    fn test_partial_emergency_fill_keeps_hedging() {
        let (mut hedge, mut ids) = controller();
        let mut ledger = PositionLedger::new(100, 100);
        ledger
            .apply_etf_fill(Side::Buy, Price(10_000), Lot(20))
            .unwrap();

        hedge.on_hedge_tick(20, 0, 0, &mut ids);
        let HedgeDirective::Trigger(commands) = hedge.on_hedge_tick(20, 0, 70_000, &mut ids)
        else {
            panic!("expected trigger");
        };
        let id = match &commands[0] {
            ExchangeCommand::Hedge { id, .. } => *id,
            other => panic!("expected hedge command, got {other:?}"),
        };

        hedge
            .on_hedge_fill(id, Price(9_900), Lot(8), &mut ledger, &mut ids)
            .unwrap();
        assert!(matches!(hedge.state(), HedgeState::Hedging { .. }));

        hedge
            .on_hedge_fill(id, Price(9_900), Lot(12), &mut ledger, &mut ids)
            .unwrap();
        assert_eq!(hedge.state(), HedgeState::Normal);
    }
}
