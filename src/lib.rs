//! Cross-geography rollup of American Community Survey indicators.
//!
//! ZCTA-level survey rows are joined against the NYC ZCTA-to-UHF
//! crosswalk and population-weighted into one row per (district, year).
//! [`DistrictRollup`] is the entry point: it loads the crosswalk once and
//! serves query and aggregation calls against that cached area universe.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod indicators;
pub mod lookup;
pub mod population;
pub mod survey;
pub mod types;

pub use aggregate::{DistrictRollup, weighted_rollup};
pub use config::RollupConfig;
pub use error::RollupError;
