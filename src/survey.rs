//! Query client for the tabular survey API.
//!
//! The ACS endpoint answers with a JSON array of arrays: a header row
//! naming one column per requested variable plus the geography column,
//! followed by one data row per area. All cells arrive as strings (or
//! null), so values are coerced here at the boundary.

use crate::config::RollupConfig;
use crate::error::RollupError;
use crate::fetch::HttpClient;
use crate::indicators::{self, Indicator};
use crate::lookup::Crosswalk;
use crate::types::IndicatorRecord;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug)]
pub struct SurveyClient<C: HttpClient> {
    http: C,
    config: RollupConfig,
}

impl<C: HttpClient> SurveyClient<C> {
    pub fn new(http: C, config: RollupConfig) -> Self {
        Self { http, config }
    }

    /// One record per (area, year) with the requested indicator values,
    /// keyed by their human-readable names.
    ///
    /// Unresolvable codes fail with [`RollupError::UnknownIndicator`]
    /// before any network access. Each year is one query, scoped to
    /// exactly the crosswalk's area universe. Results across years are
    /// concatenated; (area, year) is unique per query so no deduplication
    /// is needed.
    #[tracing::instrument(skip(self, crosswalk), fields(codes = codes.len(), years = years.len()))]
    pub fn fetch_indicators(
        &self,
        crosswalk: &Crosswalk,
        codes: &[&str],
        years: &[i32],
    ) -> Result<Vec<IndicatorRecord>, RollupError> {
        let indicators = indicators::resolve(codes)?;

        let mut records = Vec::new();
        for &year in years {
            let rows = self.fetch_table(crosswalk, &indicators, year)?;
            records.extend(
                rows.into_iter()
                    .map(|(area, values)| IndicatorRecord { area, year, values }),
            );
        }

        debug!(records = records.len(), "Indicator fetch complete");
        Ok(records)
    }

    /// Issues one query for `year` and returns the cleaned rows.
    pub(crate) fn fetch_table(
        &self,
        crosswalk: &Crosswalk,
        indicators: &[Indicator],
        year: i32,
    ) -> Result<Vec<(i64, BTreeMap<String, f64>)>, RollupError> {
        let url = self.query_url(crosswalk, indicators, year);
        debug!(year, "Querying survey table");
        let body = self.http.get(&url)?;
        parse_table(&body, indicators, &self.config.area_column)
    }

    fn query_url(&self, crosswalk: &Crosswalk, indicators: &[Indicator], year: i32) -> String {
        let codes = indicators
            .iter()
            .map(|i| i.code)
            .collect::<Vec<_>>()
            .join(",");
        let areas = crosswalk
            .areas()
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let geography = self.config.area_column.replace(' ', "%20");

        let mut url = format!(
            "{}/{}/{}?get={}&for={}:{}",
            self.config.census_base_url, year, self.config.dataset, codes, geography, areas
        );
        if let Some(key) = &self.config.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

fn parse_table(
    body: &str,
    indicators: &[Indicator],
    area_column: &str,
) -> Result<Vec<(i64, BTreeMap<String, f64>)>, RollupError> {
    let table: Vec<Vec<serde_json::Value>> = serde_json::from_str(body)
        .map_err(|e| RollupError::DataUnavailable(format!("survey response is not a JSON table: {e}")))?;

    let mut rows = table.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| RollupError::DataUnavailable("survey response is empty".to_string()))?;
    let header: Vec<String> = header.iter().map(|h| cell(h).unwrap_or_default()).collect();

    let area_idx = header
        .iter()
        .position(|h| h.eq_ignore_ascii_case(area_column))
        .ok_or_else(|| {
            RollupError::DataUnavailable(format!("survey response lacks the {area_column:?} column"))
        })?;

    let mut value_idx = Vec::with_capacity(indicators.len());
    for indicator in indicators {
        let idx = header.iter().position(|h| h == indicator.code).ok_or_else(|| {
            RollupError::DataUnavailable(format!("survey response lacks the {} column", indicator.code))
        })?;
        value_idx.push(idx);
    }

    let mut out = Vec::new();
    for row in rows {
        let raw_area = row.get(area_idx).and_then(cell).ok_or_else(|| {
            RollupError::MalformedArea("null area identifier in survey response".to_string())
        })?;
        let area = clean_area_id(&raw_area)?;

        let mut values = BTreeMap::new();
        for (indicator, &idx) in indicators.iter().zip(&value_idx) {
            let raw = row.get(idx).and_then(cell).ok_or_else(|| {
                RollupError::MalformedArea(format!(
                    "null {} value for area {area}",
                    indicator.code
                ))
            })?;
            let value: f64 = raw.trim().parse().map_err(|_| {
                RollupError::MalformedArea(format!(
                    "unparseable {} value {raw:?} for area {area}",
                    indicator.code
                ))
            })?;
            values.insert(indicator.name.to_string(), value);
        }
        out.push((area, values));
    }

    Ok(out)
}

fn cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Strips the source's formatting artifacts (trailing bracket characters)
/// from a raw area identifier and coerces it to an integer.
pub(crate) fn clean_area_id(raw: &str) -> Result<i64, RollupError> {
    let cleaned = raw.trim().trim_end_matches(']').trim();
    cleaned
        .parse::<i64>()
        .map_err(|_| RollupError::MalformedArea(raw.to_string()))
}
