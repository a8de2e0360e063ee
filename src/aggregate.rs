//! Population-weighted aggregation of survey indicators to districts.
//!
//! [`DistrictRollup`] is the session entry point: it loads the crosswalk
//! once at construction and reuses it across every query and aggregate
//! call. The join-and-weight core is the free function
//! [`weighted_rollup`], which has no I/O and no hidden state.

use crate::config::RollupConfig;
use crate::error::RollupError;
use crate::fetch::HttpClient;
use crate::lookup::Crosswalk;
use crate::population;
use crate::survey::SurveyClient;
use crate::types::{AggregatedRecord, IndicatorRecord, PopulationWeight};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One aggregation session. Concurrent sessions must each own their own
/// instance; nothing here is shared mutably.
#[derive(Debug)]
pub struct DistrictRollup<C: HttpClient> {
    survey: SurveyClient<C>,
    crosswalk: Crosswalk,
}

impl<C: HttpClient> DistrictRollup<C> {
    /// Opens a session by loading the area-to-district crosswalk.
    pub fn new(http: C, config: RollupConfig) -> Result<Self, RollupError> {
        let crosswalk = Crosswalk::load(&http, &config)?;
        Ok(Self {
            survey: SurveyClient::new(http, config),
            crosswalk,
        })
    }

    /// The cached mapping and area universe for this session.
    pub fn crosswalk(&self) -> &Crosswalk {
        &self.crosswalk
    }

    /// Fetches indicator rows for every requested year, scoped to the
    /// session's area universe.
    pub fn fetch_indicators(
        &self,
        codes: &[&str],
        years: &[i32],
    ) -> Result<Vec<IndicatorRecord>, RollupError> {
        self.survey.fetch_indicators(&self.crosswalk, codes, years)
    }

    /// Population-weighted sums at (district, year) granularity.
    ///
    /// Weights are resolved on demand from the most recent year present
    /// in `records`. All-or-nothing: any fetch or join failure surfaces
    /// without partial results.
    #[tracing::instrument(skip(self, records), fields(records = records.len()))]
    pub fn aggregate(
        &self,
        records: &[IndicatorRecord],
    ) -> Result<Vec<AggregatedRecord>, RollupError> {
        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();

        let weights = population::fetch_weights(&self.survey, &self.crosswalk, &years)?;
        let aggregated = weighted_rollup(&self.crosswalk, records, &weights)?;
        info!(rows = aggregated.len(), "Aggregation complete");
        Ok(aggregated)
    }
}

/// Joins indicator rows with the crosswalk and population weights, then
/// sums each area's population-share-scaled values per (district, year).
///
/// Both joins are inner joins: rows whose area has no district or no
/// population weight drop out rather than being assigned a default.
/// Output is sorted by district then year and is deterministic for
/// identical input.
pub fn weighted_rollup(
    crosswalk: &Crosswalk,
    records: &[IndicatorRecord],
    weights: &[PopulationWeight],
) -> Result<Vec<AggregatedRecord>, RollupError> {
    let population: BTreeMap<i64, u64> = weights.iter().map(|w| (w.area, w.population)).collect();

    let mut groups: BTreeMap<(i64, i32), Vec<(&IndicatorRecord, u64)>> = BTreeMap::new();
    let mut unmapped = 0usize;
    let mut unweighted = 0usize;

    for record in records {
        let Some(district) = crosswalk.district_of(record.area) else {
            unmapped += 1;
            continue;
        };
        let Some(&pop) = population.get(&record.area) else {
            unweighted += 1;
            continue;
        };
        groups
            .entry((district, record.year))
            .or_default()
            .push((record, pop));
    }

    if unmapped > 0 || unweighted > 0 {
        debug!(unmapped, unweighted, "Rows dropped by inner joins");
    }

    let mut out = Vec::with_capacity(groups.len());
    for ((district, year), rows) in groups {
        // (area, year) is unique per query, so each area appears once here.
        let total: u64 = rows.iter().map(|(_, pop)| pop).sum();
        if total == 0 {
            return Err(RollupError::DivisionUndefined { district });
        }

        let mut values: BTreeMap<String, f64> = BTreeMap::new();
        for (record, pop) in rows {
            let weight = pop as f64 / total as f64;
            for (name, value) in &record.values {
                *values.entry(name.clone()).or_insert(0.0) += value * weight;
            }
        }

        out.push(AggregatedRecord {
            district,
            year,
            values,
        });
    }

    Ok(out)
}
