//! Hedging configuration.

use basis_core::TICK_SIZE;
use serde::{Deserialize, Serialize};

/// How the hedge volume for a primary fill is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeRatio {
    /// Scale by the ratio of the two books' short-term mid drift, falling
    /// back to half the fill volume while either book lacks history.
    #[default]
    Delta,
    /// Always hedge half the fill volume.
    FixedHalf,
}

/// Hedging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeConfig {
    /// Hard cap on the hedge instrument's net position, in lots.
    #[serde(default = "default_hedge_limit")]
    pub hedge_limit: i64,

    /// Net exposure (primary + hedge position) magnitude above which the
    /// unhedged timer runs.
    #[serde(default = "default_unhedged_threshold")]
    pub unhedged_threshold: i64,

    /// How long net exposure may stay above the threshold before the
    /// emergency hedge fires.
    #[serde(default = "default_unhedged_limit_ms")]
    pub unhedged_limit_ms: u64,

    /// Residual net exposure tolerated after an emergency hedge; anything
    /// larger triggers a corrective counter-hedge.
    #[serde(default = "default_flatten_buffer")]
    pub flatten_buffer: i64,

    /// Hedge volume policy.
    #[serde(default)]
    pub ratio: HedgeRatio,

    /// Venue tick size in cents, for marketable hedge prices.
    #[serde(default = "default_tick_size")]
    pub tick_size: i64,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            hedge_limit: default_hedge_limit(),
            unhedged_threshold: default_unhedged_threshold(),
            unhedged_limit_ms: default_unhedged_limit_ms(),
            flatten_buffer: default_flatten_buffer(),
            ratio: HedgeRatio::default(),
            tick_size: default_tick_size(),
        }
    }
}

fn default_hedge_limit() -> i64 {
    100
}
fn default_unhedged_threshold() -> i64 {
    10
}
fn default_unhedged_limit_ms() -> u64 {
    60_000
}
fn default_flatten_buffer() -> i64 {
    2
}
fn default_tick_size() -> i64 {
    TICK_SIZE
}
