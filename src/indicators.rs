//! The configuration surface for supported survey indicators.
//!
//! Extending the supported set means adding one entry here; callers are
//! validated against this table before any network access.

use crate::error::RollupError;

/// Supported ACS variables, code to output column name.
///
/// Every entry is rate-like (a median or per-capita figure), which is what
/// the population-weighted sum in the aggregator assumes. Count-like
/// variables need a different scaling rule and must not be added here
/// without one.
pub static SUPPORTED_INDICATORS: &[(&str, &str)] = &[
    ("B01002_001E", "median_age"),
    ("B01003_001E", "total_population"),
    ("B19013_001E", "median_household_income"),
    ("B19301_001E", "per_capita_income"),
    ("B25064_001E", "median_gross_rent"),
];

/// Variable used as the weighting basis. Resolved through the same table
/// as caller-requested indicators.
pub const POPULATION_CODE: &str = "B01003_001E";

/// A validated indicator: survey variable code plus output column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    pub code: &'static str,
    pub name: &'static str,
}

/// Resolves caller-supplied codes against the supported table, preserving
/// request order. Fails with [`RollupError::UnknownIndicator`] on the
/// first code outside the table.
pub fn resolve(codes: &[&str]) -> Result<Vec<Indicator>, RollupError> {
    codes
        .iter()
        .map(|requested| {
            SUPPORTED_INDICATORS
                .iter()
                .find(|(code, _)| code == requested)
                .map(|&(code, name)| Indicator { code, name })
                .ok_or_else(|| RollupError::UnknownIndicator((*requested).to_string()))
        })
        .collect()
}
