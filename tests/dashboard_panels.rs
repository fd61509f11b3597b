use std::sync::Arc;
use wbi_dash::cache::TtlCache;
use wbi_dash::dashboard::{CountryProfile, Dashboard, GAP_COLUMN, Panel, indicators};
use wbi_dash::transport::{HttpResponse, Transport};
use wbi_dash::{FetchError, FetcherConfig, IndicatorFetcher};

/// Serves canned records per indicator code; anything else is a 404.
struct Canned(Vec<(&'static str, &'static str)>);

impl Transport for Canned {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        for (code, records) in &self.0 {
            if url.contains(&format!("/indicator/{code}?")) {
                let total = records.matches(r#""date""#).count();
                return Ok(HttpResponse::ok(format!(
                    r#"[{{"page":1,"pages":1,"per_page":"100","total":{total}}},{records}]"#
                )));
            }
        }
        Ok(HttpResponse {
            status: 404,
            body: String::new(),
        })
    }
}

fn fetcher(routes: Vec<(&'static str, &'static str)>) -> IndicatorFetcher {
    let config = FetcherConfig::default();
    let cache = Arc::new(TtlCache::new(config.ttl()));
    IndicatorFetcher::with_parts(config, Canned(routes), cache)
}

const TOTAL: &str = r#"[{"date":"2021","value":78.0},{"date":"2017","value":80.0},{"date":"2014","value":53.0},{"date":"2011","value":35.0}]"#;
const FEMALE: &str = r#"[{"date":"2021","value":77.0},{"date":"2017","value":77.0},{"date":"2014","value":43.0}]"#;
const MALE: &str = r#"[{"date":"2021","value":79.0},{"date":"2017","value":83.0}]"#;
const CREDIT: &str = r#"[{"date":"2021","value":50.0},{"date":"2020","value":55.0},{"date":"2017","value":50.5},{"date":"2014","value":51.0},{"date":"2011","value":51.5}]"#;

#[test]
fn india_gender_gap_compares_total_with_female() {
    let f = fetcher(vec![
        (indicators::ACCOUNT_OWNERSHIP, TOTAL),
        (indicators::ACCOUNT_OWNERSHIP_FEMALE, FEMALE),
    ]);
    let dash = Dashboard::new(CountryProfile::INDIA, &f);
    let Panel::Available(table) = dash.gender_gap() else {
        panic!("gender gap should be available");
    };
    assert_eq!(table.years(), vec![2014, 2017, 2021]);
    assert_eq!(table.column(GAP_COLUMN).unwrap(), vec![10.0, 3.0, 1.0]);
}

#[test]
fn uk_gender_gap_compares_male_with_female() {
    let f = fetcher(vec![
        (indicators::ACCOUNT_OWNERSHIP_MALE, MALE),
        (indicators::ACCOUNT_OWNERSHIP_FEMALE, FEMALE),
    ]);
    let dash = Dashboard::new(CountryProfile::UNITED_KINGDOM, &f);
    let table = dash.gender_gap();
    let table = table.available().unwrap();
    assert_eq!(table.columns[0], indicators::ACCOUNT_OWNERSHIP_MALE);
    assert_eq!(table.column(GAP_COLUMN).unwrap(), vec![6.0, 2.0]);
}

#[test]
fn missing_data_turns_panels_unavailable() {
    let f = fetcher(vec![]);
    let dash = Dashboard::new(CountryProfile::INDIA, &f);
    assert_eq!(dash.credit_to_gdp(), Panel::Unavailable("Data not available."));
    assert!(!dash.account_ownership().is_available());
    assert!(!dash.interest_rate_spread().is_available());
    assert_eq!(
        dash.gender_gap(),
        Panel::Unavailable("Gender data not available.")
    );
    assert_eq!(
        dash.credit_vs_inclusion(),
        Panel::Unavailable("Insufficient data to show correlation.")
    );
}

#[test]
fn credit_panel_reports_latest_value_and_delta() {
    let f = fetcher(vec![(indicators::CREDIT_TO_PRIVATE_SECTOR, CREDIT)]);
    let dash = Dashboard::new(CountryProfile::INDIA, &f);
    let panel = dash.credit_to_gdp();
    let trend = panel.available().unwrap();
    let latest = trend.latest.unwrap();
    assert_eq!(latest.year, 2021);
    assert_eq!(latest.value, 50.0);
    assert_eq!(latest.delta, Some(-5.0));
    assert_eq!(trend.series.len(), 5);
}

#[test]
fn correlation_pairs_accounts_with_credit() {
    let f = fetcher(vec![
        (indicators::ACCOUNT_OWNERSHIP, TOTAL),
        (indicators::CREDIT_TO_PRIVATE_SECTOR, CREDIT),
    ]);
    let dash = Dashboard::new(CountryProfile::INDIA, &f);
    let panel = dash.credit_vs_inclusion();
    let corr = panel.available().unwrap();
    assert_eq!(
        corr.pairs,
        vec![(35.0, 51.5), (53.0, 51.0), (80.0, 50.5), (78.0, 50.0)]
    );
    let fit = corr.fit.unwrap();
    assert!(fit.slope < 0.0);
    assert_eq!(fit.n, 4);
}

#[test]
fn profiles_are_found_by_name_or_code() {
    assert_eq!(CountryProfile::lookup("India"), Some(CountryProfile::INDIA));
    assert_eq!(CountryProfile::lookup("gb"), Some(CountryProfile::UNITED_KINGDOM));
    assert_eq!(CountryProfile::lookup(" UK "), Some(CountryProfile::UNITED_KINGDOM));
    assert_eq!(CountryProfile::lookup("fr"), None);
}
