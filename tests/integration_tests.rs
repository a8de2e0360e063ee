use acs_uhf_rollup::fetch::HttpClient;
use acs_uhf_rollup::{DistrictRollup, RollupConfig, RollupError};
use std::sync::Mutex;

/// Serves canned bodies keyed by URL substring and records every request.
#[derive(Debug)]
struct CannedClient {
    routes: Vec<(&'static str, String)>,
    requests: Mutex<Vec<String>>,
}

impl CannedClient {
    fn new(routes: Vec<(&'static str, String)>) -> Self {
        Self {
            routes,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for CannedClient {
    fn get(&self, url: &str) -> Result<String, RollupError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.routes
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| RollupError::DataUnavailable(format!("no canned response for {url}")))
    }
}

// Lets a test keep hold of the client after opening a session.
impl HttpClient for &CannedClient {
    fn get(&self, url: &str) -> Result<String, RollupError> {
        HttpClient::get(*self, url)
    }
}

fn test_config() -> RollupConfig {
    RollupConfig {
        crosswalk_url: "https://example.test/crosswalk.csv".to_string(),
        ..RollupConfig::default()
    }
}

fn crosswalk_csv() -> String {
    "zcta,uhf\n10001,101\n10002,101\n10003,102\n99999,9999\n".to_string()
}

fn income_2020() -> String {
    r#"[
        ["B19013_001E", "zip code tabulation area"],
        ["40000", "10001"],
        ["60000", "10002]"]
    ]"#
    .to_string()
}

fn population_2020() -> String {
    r#"[
        ["B01003_001E", "zip code tabulation area"],
        ["100", "10001"],
        ["300", "10002"],
        ["50", "10003"]
    ]"#
    .to_string()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_full_pipeline() {
    init_tracing();

    let client = CannedClient::new(vec![
        ("crosswalk.csv", crosswalk_csv()),
        ("B19013_001E", income_2020()),
        ("B01003_001E", population_2020()),
    ]);

    let rollup = DistrictRollup::new(client, test_config()).unwrap();

    // Placeholder districts never survive the load.
    assert_eq!(rollup.crosswalk().len(), 3);
    assert_eq!(rollup.crosswalk().district_of(99999), None);

    let records = rollup.fetch_indicators(&["B19013_001E"], &[2020]).unwrap();

    // Bracket artifacts are cleaned and every area is inside the universe.
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(rollup.crosswalk().district_of(record.area).is_some());
    }

    let aggregated = rollup.aggregate(&records).unwrap();

    assert_eq!(aggregated.len(), 1);
    assert_eq!(aggregated[0].district, 101);
    assert_eq!(aggregated[0].year, 2020);
    let income = aggregated[0].values["median_household_income"];
    assert!((income - 55000.0).abs() < 1e-9);

    // District 102 has no indicator record, so it is absent.
    assert!(aggregated.iter().all(|r| r.district != 102));
}

#[test]
fn test_queries_are_scoped_to_the_area_universe() {
    let client = CannedClient::new(vec![
        ("crosswalk.csv", crosswalk_csv()),
        ("B19013_001E", income_2020()),
    ]);

    let rollup = DistrictRollup::new(&client, test_config()).unwrap();
    rollup.fetch_indicators(&["B19013_001E"], &[2020]).unwrap();

    let requests = client.requests();
    let survey_request = requests
        .iter()
        .find(|u| u.contains("B19013_001E"))
        .unwrap();

    assert!(survey_request.contains("/2020/acs/acs5?get=B19013_001E"));
    assert!(survey_request.contains("zip%20code%20tabulation%20area:10001,10002,10003"));
    // The filtered-out placeholder area is never requested.
    assert!(!survey_request.contains("99999"));
}

#[test]
fn test_weights_use_only_the_most_recent_vintage() {
    let income_year = |a: f64, b: f64| {
        format!(
            r#"[["B19013_001E", "zip code tabulation area"], ["{a}", "10001"], ["{b}", "10002"]]"#
        )
    };

    let client = CannedClient::new(vec![
        ("crosswalk.csv", crosswalk_csv()),
        ("data/2018/acs/acs5?get=B19013_001E", income_year(38000.0, 58000.0)),
        ("data/2019/acs/acs5?get=B19013_001E", income_year(39000.0, 59000.0)),
        ("data/2020/acs/acs5?get=B19013_001E", income_year(40000.0, 60000.0)),
        ("data/2020/acs/acs5?get=B01003_001E", population_2020()),
    ]);

    let rollup = DistrictRollup::new(&client, test_config()).unwrap();
    let records = rollup
        .fetch_indicators(&["B19013_001E"], &[2018, 2019, 2020])
        .unwrap();
    assert_eq!(records.len(), 6);

    let aggregated = rollup.aggregate(&records).unwrap();
    assert_eq!(aggregated.len(), 3);

    // Exactly one population query, and it names the newest year only.
    let population_requests: Vec<_> = client
        .requests()
        .into_iter()
        .filter(|u| u.contains("B01003_001E"))
        .collect();
    assert_eq!(population_requests.len(), 1);
    assert!(population_requests[0].contains("/2020/"));
}

#[test]
fn test_unknown_indicator_fails_before_any_query() {
    let client = CannedClient::new(vec![("crosswalk.csv", crosswalk_csv())]);
    let rollup = DistrictRollup::new(&client, test_config()).unwrap();

    let err = rollup
        .fetch_indicators(&["NOT_A_CODE"], &[2020])
        .unwrap_err();

    assert!(matches!(err, RollupError::UnknownIndicator(_)));
    // Only the crosswalk load hit the network.
    assert_eq!(client.requests().len(), 1);
}

#[test]
fn test_malformed_area_in_response_is_surfaced() {
    let body = r#"[
        ["B19013_001E", "zip code tabulation area"],
        ["40000", "1ooo1]"]
    ]"#;
    let client = CannedClient::new(vec![
        ("crosswalk.csv", crosswalk_csv()),
        ("B19013_001E", body.to_string()),
    ]);
    let rollup = DistrictRollup::new(client, test_config()).unwrap();

    let err = rollup
        .fetch_indicators(&["B19013_001E"], &[2020])
        .unwrap_err();

    assert!(matches!(err, RollupError::MalformedArea(_)));
}

#[test]
fn test_transport_failure_is_data_unavailable() {
    let client = CannedClient::new(vec![("crosswalk.csv", crosswalk_csv())]);
    let rollup = DistrictRollup::new(client, test_config()).unwrap();

    let err = rollup
        .fetch_indicators(&["B19013_001E"], &[2020])
        .unwrap_err();

    assert!(matches!(err, RollupError::DataUnavailable(_)));
}

#[test]
fn test_crosswalk_fetch_failure_is_data_unavailable() {
    let client = CannedClient::new(vec![]);
    let err = DistrictRollup::new(client, test_config()).unwrap_err();
    assert!(matches!(err, RollupError::DataUnavailable(_)));
}
