//! Population weight resolution.
//!
//! Weighting reflects the most current demographic snapshot: only
//! `max(years)` is queried, never a blend of vintages. This is a
//! deliberate asymmetry from the indicator fetch, which spans all years.

use crate::error::RollupError;
use crate::fetch::HttpClient;
use crate::indicators::{self, POPULATION_CODE};
use crate::lookup::Crosswalk;
use crate::survey::SurveyClient;
use crate::types::PopulationWeight;
use tracing::debug;

/// Fetches one population figure per fine-grained area from the most
/// recent year in `years`. Empty `years` yields an empty result without
/// issuing a query.
#[tracing::instrument(skip(survey, crosswalk))]
pub fn fetch_weights<C: HttpClient>(
    survey: &SurveyClient<C>,
    crosswalk: &Crosswalk,
    years: &[i32],
) -> Result<Vec<PopulationWeight>, RollupError> {
    let Some(vintage) = years.iter().copied().max() else {
        return Ok(Vec::new());
    };
    debug!(vintage, "Resolving population weights");

    let indicators = indicators::resolve(&[POPULATION_CODE])?;
    let rows = survey.fetch_table(crosswalk, &indicators, vintage)?;

    rows.into_iter()
        .map(|(area, values)| {
            let value = values.values().next().copied().ok_or_else(|| {
                RollupError::MalformedArea(format!("missing population value for area {area}"))
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(RollupError::MalformedArea(format!(
                    "invalid population {value} for area {area}"
                )));
            }
            Ok(PopulationWeight {
                area,
                population: value as u64,
            })
        })
        .collect()
}
