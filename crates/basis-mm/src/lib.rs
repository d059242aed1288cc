//! Market-making side of the basis bot.
//!
//! Turns book snapshots into a per-tick quote target and keeps the venue's
//! resting quote set in sync with it:
//! - `liquidity`: proximity-weighted depth score per book side
//! - `quote_engine`: inventory-aware price and size selection
//! - `lifecycle`: cancel/amend/insert reconciliation of resting quotes

pub mod config;
pub mod lifecycle;
pub mod liquidity;
pub mod quote_engine;

pub use config::QuoterConfig;
pub use lifecycle::OrderLifecycleManager;
pub use liquidity::side_liquidity;
pub use quote_engine::{calc_lot_size, calc_price, compute_target, QuoteTarget};
