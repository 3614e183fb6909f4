use chrono::NaiveDate;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const SINA_DAILY: &str = "/futures/api/jsonp.php/=/InnerFuturesNewService.getDailyKLine";
    pub const SINA_MINUTE: &str = "/futures/api/jsonp.php/=/InnerFuturesNewService.getFewMinLine";

    pub async fn mount_sina(server: &MockServer, request_path: &str, symbol: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("symbol", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub fn daily_row(date: &str, close: f64) -> String {
        format!(
            r#"{{"d":"{date}","o":"{close}","h":"{close}","l":"{close}","c":"{close}","v":"100","p":"2000","s":"{close}"}}"#
        )
    }

    pub fn minute_row(datetime: &str, close: f64) -> String {
        format!(
            r#"{{"d":"{datetime}","o":"{close}","h":"{close}","l":"{close}","c":"{close}","v":"5","p":"2000"}}"#
        )
    }

    pub fn jsonp(rows: &[String]) -> String {
        format!("=([{}]);", rows.join(","))
    }

    /// Sina mock where copper and aluminium both have one published daily
    /// bar and an intraday quote for the following day.
    pub async fn create_copper_aluminium_server() -> MockServer {
        let server = MockServer::start().await;
        mount_sina(&server, SINA_DAILY, "cu0", &jsonp(&[daily_row("2024-01-01", 100.0)])).await;
        mount_sina(&server, SINA_DAILY, "al0", &jsonp(&[daily_row("2024-01-01", 50.0)])).await;
        mount_sina(
            &server,
            SINA_MINUTE,
            "cu0",
            &jsonp(&[
                minute_row("2024-01-02 14:58:00", 109.0),
                minute_row("2024-01-02 14:59:00", 110.0),
            ]),
        )
        .await;
        mount_sina(
            &server,
            SINA_MINUTE,
            "al0",
            &jsonp(&[minute_row("2024-01-02 14:59:00", 55.0)]),
        )
        .await;
        server
    }

    pub fn write_config(base_url: &str, provider: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        pairs:
          - name: "Copper / Aluminium"
            symbol_a: "cu0"
            symbol_b: "al0"
        provider: {provider}
        providers:
          sina:
            base_url: {base_url}
          yahoo:
            base_url: {base_url}
    "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_sina_pipeline_appends_intraday_day() {
    use ratiowatch::core::compute_aligned_ratio;
    use ratiowatch::providers::sina::SinaFuturesProvider;

    let mock_server = test_utils::create_copper_aluminium_server().await;
    let provider = SinaFuturesProvider::new(&mock_server.uri());

    let table = compute_aligned_ratio(&provider, "cu0", "al0")
        .await
        .expect("pipeline should succeed");
    info!(?table, "Computed aligned table");

    assert_eq!(table.len(), 2);
    let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    assert_eq!(table.rows[0].date, day(1));
    assert_eq!((table.rows[0].a_close, table.rows[0].b_close), (100.0, 50.0));
    assert_eq!(table.rows[0].ratio, 2.0);
    assert_eq!(table.rows[1].date, day(2));
    assert_eq!((table.rows[1].a_close, table.rows[1].b_close), (110.0, 55.0));
    assert_eq!(table.rows[1].ratio, 2.0);
}

#[test_log::test(tokio::test)]
async fn test_sina_pipeline_updates_same_day_close() {
    use ratiowatch::core::compute_aligned_ratio;
    use ratiowatch::providers::sina::SinaFuturesProvider;
    use test_utils::*;

    let server = wiremock::MockServer::start().await;
    mount_sina(
        &server,
        SINA_DAILY,
        "cu0",
        &jsonp(&[daily_row("2023-12-29", 98.0), daily_row("2024-01-02", 100.0)]),
    )
    .await;
    mount_sina(
        &server,
        SINA_DAILY,
        "al0",
        &jsonp(&[daily_row("2024-01-02", 50.0)]),
    )
    .await;
    mount_sina(
        &server,
        SINA_MINUTE,
        "cu0",
        &jsonp(&[minute_row("2024-01-02 10:00:00", 105.0)]),
    )
    .await;
    mount_sina(&server, SINA_MINUTE, "al0", "=([]);").await;

    let provider = SinaFuturesProvider::new(&server.uri());
    let table = compute_aligned_ratio(&provider, "cu0", "al0").await.unwrap();

    assert_eq!(table.len(), 1);
    let row = table.latest().unwrap();
    assert_eq!(row.a_close, 105.0);
    assert_eq!(row.b_close, 50.0);
    assert_eq!(row.ratio, 2.1);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_copper_aluminium_server().await;
    let config_file = test_utils::write_config(&mock_server.uri(), "sina");

    let result = ratiowatch::run_command(
        ratiowatch::AppCommand::Show,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_reports_fetch_failure() {
    // No mocks mounted: every request gets a 404.
    let mock_server = wiremock::MockServer::start().await;
    let config_file = test_utils::write_config(&mock_server.uri(), "yahoo");

    let result = ratiowatch::run_command(
        ratiowatch::AppCommand::Show,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("refresh should fail without market data");
    assert_eq!(err.to_string(), "1 of 1 pairs could not be refreshed");
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let result =
        ratiowatch::run_command(ratiowatch::AppCommand::Show, Some(missing.to_str().unwrap()))
            .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .starts_with("Failed to read config file")
    );
    assert!(!missing.exists());
}
