//! Area-to-district reference mapping.
//!
//! Loads the ZCTA-to-UHF crosswalk once per session. The filtered set of
//! fine-grained area ids is the authoritative universe for every survey
//! query issued afterwards.

use crate::config::RollupConfig;
use crate::error::RollupError;
use crate::fetch::HttpClient;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// District codes at or above this value are placeholders in the source
/// crosswalk (citywide rows, unknown-address rows), not real geographies.
const PLACEHOLDER_DISTRICT_MIN: i64 = 1000;

/// Accepted header spellings for the fine-grained area column.
const AREA_HEADERS: &[&str] = &["zcta", "zcta5", "zipcode", "zip", "modzcta"];

/// Accepted header spellings for the district column.
const DISTRICT_HEADERS: &[&str] = &["uhf", "uhf42", "uhf_42", "uhf_code", "district"];

/// Immutable many-to-one mapping from fine-grained areas to districts,
/// loaded once and reused for the lifetime of a session.
#[derive(Debug)]
pub struct Crosswalk {
    districts: BTreeMap<i64, i64>,
    areas: Vec<i64>,
    loaded_at: DateTime<Utc>,
}

impl Crosswalk {
    /// Fetches the reference CSV and builds the filtered mapping.
    ///
    /// Fails with [`RollupError::DataUnavailable`] if the source is
    /// unreachable or the table is empty after placeholder filtering.
    #[tracing::instrument(skip(client, config), fields(url = %config.crosswalk_url))]
    pub fn load<C: HttpClient>(client: &C, config: &RollupConfig) -> Result<Self, RollupError> {
        let body = client.get(&config.crosswalk_url)?;
        let crosswalk = Self::from_csv(&body)?;
        info!(
            areas = crosswalk.areas.len(),
            loaded_at = %crosswalk.loaded_at,
            "Crosswalk loaded"
        );
        Ok(crosswalk)
    }

    pub(crate) fn from_csv(body: &str) -> Result<Self, RollupError> {
        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| RollupError::DataUnavailable(format!("crosswalk header: {e}")))?
            .clone();

        let area_idx = find_column(&headers, AREA_HEADERS).ok_or_else(|| {
            RollupError::DataUnavailable(format!("crosswalk has no area column in {headers:?}"))
        })?;
        let district_idx = find_column(&headers, DISTRICT_HEADERS).ok_or_else(|| {
            RollupError::DataUnavailable(format!("crosswalk has no district column in {headers:?}"))
        })?;

        let mut districts = BTreeMap::new();
        let mut placeholders = 0usize;

        for row in reader.records() {
            let row = row.map_err(|e| RollupError::DataUnavailable(format!("crosswalk row: {e}")))?;
            let area = parse_id(row.get(area_idx).unwrap_or(""))?;
            let district = parse_id(row.get(district_idx).unwrap_or(""))?;

            if district >= PLACEHOLDER_DISTRICT_MIN {
                placeholders += 1;
                continue;
            }

            if let Some(previous) = districts.insert(area, district) {
                if previous != district {
                    return Err(RollupError::DataUnavailable(format!(
                        "area {area} maps to both district {previous} and district {district}"
                    )));
                }
            }
        }

        if districts.is_empty() {
            return Err(RollupError::DataUnavailable(
                "crosswalk is empty after placeholder filtering".to_string(),
            ));
        }

        debug!(placeholders, kept = districts.len(), "Placeholder rows filtered");

        let areas = districts.keys().copied().collect();
        Ok(Self {
            districts,
            areas,
            loaded_at: Utc::now(),
        })
    }

    /// The authoritative universe of fine-grained area ids, ascending.
    pub fn areas(&self) -> &[i64] {
        &self.areas
    }

    /// District for `area`, or `None` when the area is outside the mapping.
    pub fn district_of(&self, area: i64) -> Option<i64> {
        self.districts.get(&area).copied()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// When this mapping was fetched from the source.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let normalized = header.trim().to_ascii_lowercase();
        candidates.iter().any(|c| normalized == *c)
    })
}

fn parse_id(raw: &str) -> Result<i64, RollupError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RollupError::MalformedArea(raw.to_string()))
}
