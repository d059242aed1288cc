//! Quoting configuration.

use basis_core::{Lifespan, TICK_SIZE};
use serde::{Deserialize, Serialize};

/// Quoting configuration.
///
/// `position_thresholds` must be an even-length list of signed inventory
/// breakpoints, symmetric around zero and sorted ascending; the price
/// adjustment walks from `-len/2` to `+len/2` as inventory crosses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoterConfig {
    /// Hard cap on the quoted instrument's net position, in lots.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    /// Lot-size tuning constant: the largest quote either side can reach.
    #[serde(default = "default_size_factor")]
    pub size_factor: i64,

    /// Liquidity score ceiling for sizing; deeper books saturate here.
    #[serde(default = "default_liquidity_ceiling")]
    pub liquidity_ceiling: f64,

    /// Ascending liquidity thresholds; each one exceeded tightens the quote
    /// by one book level.
    #[serde(default = "default_liquidity_thresholds")]
    pub liquidity_thresholds: Vec<f64>,

    /// Signed inventory breakpoints for the price skew, symmetric around zero.
    #[serde(default = "default_position_thresholds")]
    pub position_thresholds: Vec<i64>,

    /// Book level quoted when liquidity exceeds no threshold (0 = best).
    #[serde(default = "default_base_spread_index")]
    pub base_spread_index: usize,

    /// Extra ticks of price improvement applied when inventory sits at the
    /// dangerous extreme.
    #[serde(default = "default_emergency_offset_ticks")]
    pub emergency_offset_ticks: i64,

    /// Venue tick size in cents.
    #[serde(default = "default_tick_size")]
    pub tick_size: i64,

    /// Time-in-force for quote orders.
    #[serde(default)]
    pub lifespan: Lifespan,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            position_limit: default_position_limit(),
            size_factor: default_size_factor(),
            liquidity_ceiling: default_liquidity_ceiling(),
            liquidity_thresholds: default_liquidity_thresholds(),
            position_thresholds: default_position_thresholds(),
            base_spread_index: default_base_spread_index(),
            emergency_offset_ticks: default_emergency_offset_ticks(),
            tick_size: default_tick_size(),
            lifespan: Lifespan::default(),
        }
    }
}

fn default_position_limit() -> i64 {
    100
}
fn default_size_factor() -> i64 {
    30
}
fn default_liquidity_ceiling() -> f64 {
    2.0e7
}
fn default_liquidity_thresholds() -> Vec<f64> {
    vec![2.0e7, 4.0e7]
}
fn default_position_thresholds() -> Vec<i64> {
    vec![-75, -45, -15, 15, 45, 75]
}
fn default_base_spread_index() -> usize {
    4
}
fn default_emergency_offset_ticks() -> i64 {
    2
}
fn default_tick_size() -> i64 {
    TICK_SIZE
}
