//! Inventory accounting and hedge control for the basis bot.
//!
//! - `ledger`: the single source of truth for net inventory per instrument
//! - `controller`: normal post-fill hedging plus the emergency state machine
//!   that suspends quoting when inventory stays unhedged too long

pub mod config;
pub mod controller;
pub mod ledger;

pub use config::{HedgeConfig, HedgeRatio};
pub use controller::{HedgeController, HedgeDirective, HedgeError, HedgeState};
pub use ledger::{InstrumentPosition, LedgerError, PositionLedger};
