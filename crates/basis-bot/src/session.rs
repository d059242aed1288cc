//! The trading session: one owned object, one event at a time.
//!
//! `TraderSession` owns every piece of mutable trading state (books, resting
//! order sets, position ledger, emergency machine, id counter) and processes
//! inbound events to completion, in arrival order. Handlers never block;
//! each returns the outbound commands to hand to the session layer.
//!
//! An event naming an order id this session does not know is a fatal
//! consistency violation: it means a lost or duplicated event upstream, and
//! trading on a corrupted id mapping risks breaching the position limit.

use basis_core::{
    DepthSnapshot, ExchangeCommand, ExchangeEvent, Instrument, InstrumentBook, Lot, OrderId,
    OrderIdGen, Price,
};
use basis_hedge::{
    HedgeConfig, HedgeController, HedgeDirective, HedgeError, LedgerError, PositionLedger,
};
use basis_mm::{compute_target, OrderLifecycleManager, QuoteTarget, QuoterConfig};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal session errors. The application halts on any of these.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown order id {0}: order event stream is inconsistent")]
    UnknownOrder(OrderId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<HedgeError> for SessionError {
    fn from(err: HedgeError) -> Self {
        match err {
            HedgeError::UnknownOrder(id) => Self::UnknownOrder(id),
            HedgeError::Ledger(err) => Self::Ledger(err),
        }
    }
}

/// All trading state, owned by the single event-processing task.
pub struct TraderSession {
    quoter_cfg: QuoterConfig,
    etf_book: InstrumentBook,
    future_book: InstrumentBook,
    lifecycle: OrderLifecycleManager,
    hedge: HedgeController,
    ledger: PositionLedger,
    ids: OrderIdGen,
}

impl TraderSession {
    #[must_use]
    pub fn new(quoter_cfg: QuoterConfig, hedge_cfg: HedgeConfig) -> Self {
        let lifecycle = OrderLifecycleManager::new(quoter_cfg.position_limit, quoter_cfg.lifespan);
        let ledger = PositionLedger::new(quoter_cfg.position_limit, hedge_cfg.hedge_limit);
        Self {
            lifecycle,
            ledger,
            hedge: HedgeController::new(hedge_cfg),
            quoter_cfg,
            etf_book: InstrumentBook::new(),
            future_book: InstrumentBook::new(),
            ids: OrderIdGen::new(),
        }
    }

    /// Process one inbound event, returning the commands to send out.
    ///
    /// `now_ms` is a monotonic milliseconds reading supplied by the caller;
    /// the unhedged-duration check is the only consumer.
    pub fn handle(
        &mut self,
        event: ExchangeEvent,
        now_ms: u64,
    ) -> Result<Vec<ExchangeCommand>, SessionError> {
        match event {
            ExchangeEvent::BookUpdate {
                instrument,
                sequence,
                ask_prices,
                ask_volumes,
                bid_prices,
                bid_volumes,
            } => {
                let snapshot =
                    DepthSnapshot::new(sequence, ask_prices, ask_volumes, bid_prices, bid_volumes);
                Ok(self.on_book_update(instrument, snapshot, now_ms))
            }
            ExchangeEvent::OrderFilled { id, price, volume } => {
                self.on_order_filled(id, price, volume)
            }
            ExchangeEvent::OrderStatus {
                id,
                filled,
                remaining,
                fees,
            } => self.on_order_status(id, filled, remaining, fees),
            ExchangeEvent::HedgeFilled { id, price, volume } => Ok(self
                .hedge
                .on_hedge_fill(id, price, volume, &mut self.ledger, &mut self.ids)?),
            ExchangeEvent::TradeTicks {
                instrument,
                sequence,
            } => {
                debug!(%instrument, sequence, "trade ticks");
                Ok(Vec::new())
            }
            ExchangeEvent::Error { id, message } => self.on_error(id, &message, now_ms),
        }
    }

    fn on_book_update(
        &mut self,
        instrument: Instrument,
        snapshot: DepthSnapshot,
        now_ms: u64,
    ) -> Vec<ExchangeCommand> {
        match instrument {
            Instrument::Etf => {
                // Primary book only refreshes the liquidity/size inputs; the
                // hedge book drives requoting.
                if !self.etf_book.apply(snapshot) {
                    debug!("stale etf book update dropped");
                }
                Vec::new()
            }
            Instrument::Future => {
                if !self.future_book.apply(snapshot) {
                    debug!("stale future book update dropped");
                    return Vec::new();
                }

                let directive = self.hedge.on_hedge_tick(
                    self.ledger.net_exposure(),
                    self.ledger.future_position(),
                    now_ms,
                    &mut self.ids,
                );
                match directive {
                    HedgeDirective::Suspend => Vec::new(),
                    HedgeDirective::Trigger(hedge_commands) => {
                        let mut commands = self.lifecycle.cancel_all();
                        commands.extend(hedge_commands);
                        commands
                    }
                    HedgeDirective::Quote => self.requote(),
                }
            }
        }
    }

    fn requote(&mut self) -> Vec<ExchangeCommand> {
        let position = self.ledger.etf_position();
        let target = match self.future_book.current.as_ref() {
            Some(snapshot) if snapshot.has_both_sides() => {
                compute_target(&self.etf_book, snapshot, position, &self.quoter_cfg)
            }
            // A one-sided hedge book quotes nothing; the requote below still
            // pulls any stale orders.
            _ => QuoteTarget::empty(),
        };
        self.lifecycle.requote(&target, position, &mut self.ids)
    }

    fn on_order_filled(
        &mut self,
        id: OrderId,
        price: Price,
        volume: Lot,
    ) -> Result<Vec<ExchangeCommand>, SessionError> {
        if let Some(side) = self.lifecycle.apply_fill(id, volume) {
            self.ledger.apply_etf_fill(side, price, volume)?;
            info!(
                %id,
                %side,
                %price,
                %volume,
                position = self.ledger.etf_position(),
                "quote filled"
            );
            return Ok(self.hedge.on_primary_fill(
                side,
                volume,
                &self.etf_book,
                &self.future_book,
                self.ledger.future_position(),
                &mut self.ids,
            ));
        }
        if self.hedge.contains(id) {
            // Some venues report hedge fills on the generic fill channel.
            return Ok(self
                .hedge
                .on_hedge_fill(id, price, volume, &mut self.ledger, &mut self.ids)?);
        }
        Err(SessionError::UnknownOrder(id))
    }

    fn on_order_status(
        &mut self,
        id: OrderId,
        filled: Lot,
        remaining: Lot,
        fees: i64,
    ) -> Result<Vec<ExchangeCommand>, SessionError> {
        debug!(%id, %filled, %remaining, fees, "order status");
        if remaining.is_zero() {
            if self.lifecycle.remove(id).is_some() || self.hedge.remove(id).is_some() {
                Ok(Vec::new())
            } else {
                Err(SessionError::UnknownOrder(id))
            }
        } else if self.lifecycle.set_remaining(id, remaining) || self.hedge.contains(id) {
            Ok(Vec::new())
        } else {
            Err(SessionError::UnknownOrder(id))
        }
    }

    fn on_error(
        &mut self,
        id: OrderId,
        message: &str,
        now_ms: u64,
    ) -> Result<Vec<ExchangeCommand>, SessionError> {
        warn!(%id, message, "venue error");
        if id != OrderId(0) && (self.lifecycle.contains(id) || self.hedge.contains(id)) {
            // A rejection for a known order is an implicit removal.
            return self.handle(
                ExchangeEvent::OrderStatus {
                    id,
                    filled: Lot::ZERO,
                    remaining: Lot::ZERO,
                    fees: 0,
                },
                now_ms,
            );
        }
        Ok(Vec::new())
    }

    // --- Introspection, used by the application loop and tests ---

    #[must_use]
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    #[must_use]
    pub fn hedge_state(&self) -> basis_hedge::HedgeState {
        self.hedge.state()
    }

    /// Whether either order set still tracks this id.
    #[must_use]
    pub fn owns_order(&self, id: OrderId) -> bool {
        self.lifecycle.contains(id) || self.hedge.contains(id)
    }

    /// Tracked quote orders, cancelled-but-unconfirmed included.
    #[must_use]
    pub fn open_quotes(&self) -> usize {
        self.lifecycle.open_orders()
    }

    /// In-flight hedge orders.
    #[must_use]
    pub fn open_hedges(&self) -> usize {
        self.hedge.open_orders()
    }
}
