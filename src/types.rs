//! Data types flowing through the rollup pipeline.

use serde::Serialize;
use std::collections::BTreeMap;

/// One survey row: the requested indicator values for a fine-grained area
/// in a single year, keyed by human-readable indicator name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub area: i64,
    pub year: i32,
    pub values: BTreeMap<String, f64>,
}

/// Population figure for a fine-grained area, always drawn from the single
/// most recent vintage in the requested year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationWeight {
    pub area: i64,
    pub population: u64,
}

/// Population-weighted indicator sums at (district, year) granularity.
/// Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    pub district: i64,
    pub year: i32,
    pub values: BTreeMap<String, f64>,
}
