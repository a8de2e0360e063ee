//! Endpoints and query parameters for the public data sources.

/// Configuration for one rollup session.
///
/// The defaults point at the public ACS endpoint and the NYC ZCTA-to-UHF
/// crosswalk; tests override the URLs to hit canned responses instead.
#[derive(Debug, Clone)]
pub struct RollupConfig {
    /// Base URL of the tabular survey API, without a trailing slash.
    pub census_base_url: String,
    /// Dataset path segment appended after the year, e.g. `acs/acs5`.
    pub dataset: String,
    /// Header of the geography column in survey responses. Also used as
    /// the `for=` predicate name when building queries.
    pub area_column: String,
    /// URL of the area-to-district reference CSV.
    pub crosswalk_url: String,
    /// Optional API key appended to every survey query.
    pub api_key: Option<String>,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            census_base_url: "https://api.census.gov/data".to_string(),
            dataset: "acs/acs5".to_string(),
            area_column: "zip code tabulation area".to_string(),
            crosswalk_url:
                "https://raw.githubusercontent.com/nychealth/EHDP-data/production/geography/zcta-to-uhf42.csv"
                    .to_string(),
            api_key: None,
        }
    }
}

impl RollupConfig {
    /// Default configuration with `CENSUS_API_KEY` layered on top when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("CENSUS_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        config
    }
}
