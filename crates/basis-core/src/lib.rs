//! Core domain types for the basis quoting bot.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Instrument`, `Side`: trading enums for the quoted ETF and its hedge future
//! - `Price`, `Lot`: integer tick/lot newtypes matching the venue wire format
//! - `DepthSnapshot`, `InstrumentBook`: five-level book views (current + previous)
//! - `ExchangeEvent`, `ExchangeCommand`: the inbound/outbound session contract
//! - `OrderId`, `OrderIdGen`, `RestingOrder`: order identity and open-order records

pub mod book;
pub mod events;
pub mod order;
pub mod types;

pub use book::{DepthSnapshot, InstrumentBook, DEPTH_LEVELS};
pub use events::{ExchangeCommand, ExchangeEvent};
pub use order::{Lifespan, OrderId, OrderIdGen, RestingOrder};
pub use types::{
    max_ask_nearest_tick, min_bid_nearest_tick, Instrument, Lot, Price, Side, MAXIMUM_ASK,
    MINIMUM_BID, TICK_SIZE,
};
