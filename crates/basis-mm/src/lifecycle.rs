//! Resting-quote lifecycle management.
//!
//! Reconciles the venue's resting quote set with each tick's target using a
//! full cancel-and-requote: cancel whatever rests, then insert one fresh
//! order per quotable side. One narrow exception cuts churn: when a side's
//! target keeps the resting price and only shrinks the size, the order is
//! amended in place (the venue accepts shrink-only amends).
//!
//! Cancellation is advisory. A cancelled order stays tracked, and fillable,
//! until the venue reports zero remaining volume, so fills racing a cancel
//! are still attributed correctly.

use std::collections::HashMap;

use basis_core::{
    ExchangeCommand, Lifespan, Lot, OrderId, OrderIdGen, Price, RestingOrder, Side,
};
use tracing::{debug, info};

use crate::quote_engine::QuoteTarget;

/// A tracked quote order and whether its cancel has been requested.
#[derive(Debug, Clone)]
struct TrackedQuote {
    order: RestingOrder,
    cancel_requested: bool,
}

/// Owns the resting quote orders and keeps them in sync with quote targets.
#[derive(Debug)]
pub struct OrderLifecycleManager {
    bids: HashMap<OrderId, TrackedQuote>,
    asks: HashMap<OrderId, TrackedQuote>,
    /// The one live (not cancel-requested) quote per side.
    active_bid: Option<OrderId>,
    active_ask: Option<OrderId>,
    position_limit: i64,
    lifespan: Lifespan,
}

impl OrderLifecycleManager {
    #[must_use]
    pub fn new(position_limit: i64, lifespan: Lifespan) -> Self {
        Self {
            bids: HashMap::new(),
            asks: HashMap::new(),
            active_bid: None,
            active_ask: None,
            position_limit,
            lifespan,
        }
    }

    /// Reconcile both sides against the tick's target.
    pub fn requote(
        &mut self,
        target: &QuoteTarget,
        position: i64,
        ids: &mut OrderIdGen,
    ) -> Vec<ExchangeCommand> {
        let mut commands = Vec::new();
        self.requote_side(
            Side::Buy,
            target.bid_price,
            target.bid_lot,
            position,
            ids,
            &mut commands,
        );
        self.requote_side(
            Side::Sell,
            target.ask_price,
            target.ask_lot,
            position,
            ids,
            &mut commands,
        );
        commands
    }

    fn requote_side(
        &mut self,
        side: Side,
        price: Price,
        lot: Lot,
        position: i64,
        ids: &mut OrderIdGen,
        commands: &mut Vec<ExchangeCommand>,
    ) {
        let quotable = lot.is_positive()
            && !price.is_zero()
            && (position + lot.signed(side)).abs() < self.position_limit;

        // Shrink-in-place: same price, strictly smaller size, side quotable.
        if quotable {
            let active = match side {
                Side::Buy => self.active_bid,
                Side::Sell => self.active_ask,
            };
            if let Some(id) = active {
                if let Some(tracked) = self.side_orders_mut(side).get_mut(&id) {
                    if !tracked.cancel_requested
                        && tracked.order.price == price
                        && lot < tracked.order.lot
                    {
                        tracked.order.lot = lot;
                        debug!(%id, %side, %price, new_lot = %lot, "amending quote down");
                        commands.push(ExchangeCommand::Amend { id, new_lot: lot });
                        return;
                    }
                }
            }
        }

        // Cancel everything still live on this side.
        let orders = self.side_orders_mut(side);
        for tracked in orders.values_mut() {
            if !tracked.cancel_requested {
                tracked.cancel_requested = true;
                commands.push(ExchangeCommand::Cancel {
                    id: tracked.order.id,
                });
            }
        }
        match side {
            Side::Buy => self.active_bid = None,
            Side::Sell => self.active_ask = None,
        }

        if !quotable {
            return;
        }

        let id = ids.next_id();
        debug!(%id, %side, %price, %lot, "inserting quote");
        commands.push(ExchangeCommand::Insert {
            id,
            side,
            price,
            lot,
            lifespan: self.lifespan,
        });
        self.side_orders_mut(side).insert(
            id,
            TrackedQuote {
                order: RestingOrder::new(id, side, price, lot),
                cancel_requested: false,
            },
        );
        match side {
            Side::Buy => self.active_bid = Some(id),
            Side::Sell => self.active_ask = Some(id),
        }
    }

    /// Cancel every resting quote on both sides (quoting is being suspended).
    pub fn cancel_all(&mut self) -> Vec<ExchangeCommand> {
        let mut commands = Vec::new();
        for orders in [&mut self.bids, &mut self.asks] {
            for tracked in orders.values_mut() {
                if !tracked.cancel_requested {
                    tracked.cancel_requested = true;
                    commands.push(ExchangeCommand::Cancel {
                        id: tracked.order.id,
                    });
                }
            }
        }
        self.active_bid = None;
        self.active_ask = None;
        if !commands.is_empty() {
            info!(cancelled = commands.len(), "suspending quoting");
        }
        commands
    }

    /// Apply a partial or full fill, returning the order's side.
    pub fn apply_fill(&mut self, id: OrderId, volume: Lot) -> Option<Side> {
        let tracked = match self.bids.get_mut(&id) {
            Some(tracked) => tracked,
            None => self.asks.get_mut(&id)?,
        };
        tracked.order.lot = tracked.order.lot.saturating_sub(volume);
        Some(tracked.order.side)
    }

    /// Apply an authoritative remaining volume from an order-status update.
    pub fn set_remaining(&mut self, id: OrderId, remaining: Lot) -> bool {
        let tracked = match self.bids.get_mut(&id) {
            Some(tracked) => Some(tracked),
            None => self.asks.get_mut(&id),
        };
        match tracked {
            Some(tracked) => {
                tracked.order.lot = remaining;
                true
            }
            None => false,
        }
    }

    /// Drop a finished order (zero remaining volume) from whichever side holds it.
    pub fn remove(&mut self, id: OrderId) -> Option<RestingOrder> {
        let tracked = self
            .bids
            .remove(&id)
            .or_else(|| self.asks.remove(&id))?;
        if self.active_bid == Some(id) {
            self.active_bid = None;
        }
        if self.active_ask == Some(id) {
            self.active_ask = None;
        }
        Some(tracked.order)
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.bids.contains_key(&id) || self.asks.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&RestingOrder> {
        self.bids
            .get(&id)
            .or_else(|| self.asks.get(&id))
            .map(|tracked| &tracked.order)
    }

    /// Number of tracked orders, cancelled-but-unconfirmed included.
    #[must_use]
    pub fn open_orders(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    fn side_orders_mut(&mut self, side: Side) -> &mut HashMap<OrderId, TrackedQuote> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(bid_price: i64, bid_lot: i64, ask_price: i64, ask_lot: i64) -> QuoteTarget {
        QuoteTarget {
            bid_price: Price(bid_price),
            bid_lot: Lot(bid_lot),
            ask_price: Price(ask_price),
            ask_lot: Lot(ask_lot),
            bid_liquidity: 0.0,
            ask_liquidity: 0.0,
        }
    }

    fn manager() -> (OrderLifecycleManager, OrderIdGen) {
        (
            OrderLifecycleManager::new(100, Lifespan::GoodForDay),
            OrderIdGen::new(),
        )
    }

    fn inserted_ids(commands: &[ExchangeCommand]) -> Vec<OrderId> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                ExchangeCommand::Insert { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_requote_inserts_both_sides() {
        let (mut mgr, mut ids) = manager();
        let commands = mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        assert_eq!(inserted_ids(&commands).len(), 2);
        assert_eq!(mgr.open_orders(), 2);
    }

    #[test]
    fn test_requote_cancels_before_reinserting() {
        let (mut mgr, mut ids) = manager();
        mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let commands = mgr.requote(&target(9_800, 12, 10_200, 12), 0, &mut ids);

        let cancels = commands
            .iter()
            .filter(|cmd| matches!(cmd, ExchangeCommand::Cancel { .. }))
            .count();
        assert_eq!(cancels, 2);
        assert_eq!(inserted_ids(&commands).len(), 2);
        // Old orders stay tracked until the venue confirms zero remaining.
        assert_eq!(mgr.open_orders(), 4);
    }

    #[test]
    fn test_unquotable_side_only_cancels() {
        let (mut mgr, mut ids) = manager();
        mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let commands = mgr.requote(&target(0, 0, 10_200, 12), 0, &mut ids);
        // Bid side: cancel only. Ask side: cancel + insert.
        assert_eq!(inserted_ids(&commands).len(), 1);
    }

    #[test]
    fn test_insert_suppressed_when_limit_would_be_reached() {
        let (mut mgr, mut ids) = manager();
        // 95 + 10 would reach 105 > 100; even 95 + 5 = 100 is not strictly
        // under the limit.
        let commands = mgr.requote(&target(9_900, 10, 10_100, 10), 95, &mut ids);
        let inserted: Vec<_> = commands
            .iter()
            .filter_map(|cmd| match cmd {
                ExchangeCommand::Insert { side, .. } => Some(*side),
                _ => None,
            })
            .collect();
        assert_eq!(inserted, vec![Side::Sell]);

        let commands = mgr.requote(&target(9_900, 5, 10_100, 10), 95, &mut ids);
        let bid_inserts = commands
            .iter()
            .filter(|cmd| matches!(cmd, ExchangeCommand::Insert { side: Side::Buy, .. }))
            .count();
        assert_eq!(bid_inserts, 0);
    }

    #[test]
    fn test_amend_when_price_unchanged_and_size_shrinks() {
        let (mut mgr, mut ids) = manager();
        mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let commands = mgr.requote(&target(9_900, 6, 10_100, 6), 0, &mut ids);
        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|cmd| matches!(cmd, ExchangeCommand::Amend { new_lot: Lot(6), .. })));
        assert_eq!(mgr.open_orders(), 2);
    }

    #[test]
    fn test_size_growth_requires_requote() {
        let (mut mgr, mut ids) = manager();
        mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        // Amend can only shrink; a larger size forces cancel + insert.
        let commands = mgr.requote(&target(9_900, 15, 10_100, 10), 0, &mut ids);
        let bid_cancels = commands
            .iter()
            .filter(|cmd| matches!(cmd, ExchangeCommand::Cancel { .. }))
            .count();
        assert!(bid_cancels >= 1);
        assert!(!inserted_ids(&commands).is_empty());
    }

    #[test]
    fn test_fill_then_zero_status_removes_order() {
        let (mut mgr, mut ids) = manager();
        let commands = mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let bid_id = inserted_ids(&commands)[0];

        assert_eq!(mgr.apply_fill(bid_id, Lot(4)), Some(Side::Buy));
        assert_eq!(mgr.get(bid_id).unwrap().lot, Lot(6));

        mgr.remove(bid_id);
        assert!(!mgr.contains(bid_id));
        assert_eq!(mgr.open_orders(), 1);
    }

    #[test]
    fn test_cancel_all_empties_active_quotes() {
        let (mut mgr, mut ids) = manager();
        mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let commands = mgr.cancel_all();
        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|cmd| matches!(cmd, ExchangeCommand::Cancel { .. })));
        // Cancel is idempotent: a second pass issues nothing new.
        assert!(mgr.cancel_all().is_empty());
    }

    #[test]
    fn test_cancelled_order_still_accepts_fill() {
        let (mut mgr, mut ids) = manager();
        let commands = mgr.requote(&target(9_900, 10, 10_100, 10), 0, &mut ids);
        let bid_id = inserted_ids(&commands)[0];
        mgr.cancel_all();
        // The venue matched us before processing the cancel.
        assert_eq!(mgr.apply_fill(bid_id, Lot(10)), Some(Side::Buy));
    }
}
