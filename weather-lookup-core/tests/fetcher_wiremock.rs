//! Forecast fetcher against a mock WeatherAPI.com and a mock CORS relay.

use std::sync::Arc;

use serde_json::{Value, json};
use weather_lookup_core::{
    Config, FailureKind, FetchError, ForecastSession, ForecastSource, IconKey, LocationQuery,
    NetworkError, QueryState, RacePolicy, TransportMode, ValidationError, WeatherFetcher,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn hours(date: &str, base_epoch: i64, count: usize, code: u32) -> Vec<Value> {
    (0..count)
        .map(|h| {
            json!({
                "time_epoch": base_epoch + h as i64 * 3600,
                "time": format!("{date} {h:02}:00"),
                "temp_c": 10.0 + h as f64 / 10.0,
                "condition": { "text": "Partly cloudy", "code": code }
            })
        })
        .collect()
}

fn sample_forecast(temp_c: f64, code: u32) -> Value {
    json!({
        "location": { "name": "London", "region": "City of London, Greater London", "country": "United Kingdom" },
        "current": {
            "temp_c": temp_c,
            "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png", "code": code }
        },
        "forecast": {
            "forecastday": [
                { "date": "2024-06-01", "hour": hours("2024-06-01", 1_717_196_400, 24, 1003) },
                { "date": "2024-06-02", "hour": hours("2024-06-02", 1_717_282_800, 24, 1063) }
            ]
        }
    })
}

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config { base_url: format!("{}/v1", server.uri()), timeout_secs: Some(5), ..Config::default() };
    cfg.set_api_key("TEST_KEY");
    cfg
}

#[allow(clippy::expect_used)]
fn fetcher(cfg: &Config) -> WeatherFetcher {
    WeatherFetcher::from_config(cfg).expect("fetcher should build")
}

async fn mount_forecast(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Direct transport
// ============================================================================

#[tokio::test]
async fn city_query_returns_floored_current_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", "TEST_KEY"))
        .and(query_param("q", "London"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast(15.7, 1000)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .expect("forecast should succeed");

    assert_eq!(forecast.location_name.as_deref(), Some("London"));
    assert_eq!(forecast.current.temperature_c, 15);
    assert_eq!(forecast.current.description, "Sunny");
    assert_eq!(forecast.current.icon, IconKey::Clear);

    assert_eq!(forecast.hourly.len(), 48);
    assert_eq!(forecast.hourly[0].local_time_label, "00:00");
    assert_eq!(forecast.hourly[0].icon, IconKey::Clouds);
    assert_eq!(forecast.hourly[24].icon, IconKey::Rain);
    assert_eq!(forecast.hourly[24].time_epoch, 1_717_282_800);
}

#[tokio::test]
async fn coordinate_query_sends_lat_comma_lon() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("q", "51.5,-0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast(9.2, 1009)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::coordinates(51.5, -0.1))
        .await
        .expect("forecast should succeed");

    assert_eq!(forecast.current.temperature_c, 9);
    assert_eq!(forecast.current.icon, IconKey::Clouds);
}

#[tokio::test]
async fn server_error_is_a_network_failure() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(500).set_body_string("internal error")).await;

    let err = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::Network(NetworkError::Status { status: 500, .. })),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unknown_city_400_is_a_network_failure() {
    let server = MockServer::start().await;
    mount_forecast(
        &server,
        ResponseTemplate::new(400)
            .set_body_json(json!({ "error": { "code": 1006, "message": "No matching location found." } })),
    )
    .await;

    let err = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::City("Atlantis".into()))
        .await
        .unwrap_err();

    match err {
        FetchError::Network(NetworkError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("No matching location"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_object_is_an_invalid_response() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let err = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::InvalidResponse(ValidationError::MissingSection("location"))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn html_body_is_an_invalid_response() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .await;

    let err = fetcher(&config_for(&server))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidResponse(ValidationError::NotJson(_))));
}

#[tokio::test]
async fn connection_refused_is_a_network_failure() {
    let mut cfg = Config { base_url: "http://127.0.0.1:1/v1".into(), timeout_secs: Some(2), ..Config::default() };
    cfg.set_api_key("TEST_KEY");

    let err = fetcher(&cfg)
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(NetworkError::Transport(_))), "got {err:?}");
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_api_key() {
    let mut cfg = Config { base_url: "http://127.0.0.1:1/v1".into(), timeout_secs: Some(2), ..Config::default() };
    cfg.set_api_key("SECRET_KEY_123");

    let err = fetcher(&cfg)
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(NetworkError::Transport(_))), "got {err:?}");
    assert!(!err.to_string().contains("SECRET_KEY_123"), "leaked key: {err}");
    assert!(!format!("{err:?}").contains("SECRET_KEY_123"), "leaked key: {err:?}");
}

#[tokio::test]
async fn every_call_hits_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast(1.0, 1000)))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = fetcher(&config_for(&server));
    let query = LocationQuery::City("London".into());
    for _ in 0..3 {
        fetcher.fetch_forecast(&query).await.expect("forecast should succeed");
    }
}

// ============================================================================
// Relay transport
// ============================================================================

fn relay_config(provider_base: &str, relay: &MockServer) -> Config {
    let mut cfg = Config {
        base_url: provider_base.to_string(),
        relay_url: format!("{}/get", relay.uri()),
        ..Config::default()
    };
    cfg.set_transport_mode(TransportMode::Relay);
    cfg.set_api_key("TEST_KEY");
    cfg
}

#[tokio::test]
async fn relay_envelope_is_decoded_twice() {
    let relay = MockServer::start().await;
    let contents = sample_forecast(-0.4, 1279).to_string();
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": contents,
            "status": { "url": "ignored", "content_type": "application/json", "http_code": 200 }
        })))
        .expect(1)
        .mount(&relay)
        .await;

    let cfg = relay_config("https://provider.example/v1", &relay);
    let fetcher = fetcher(&cfg);
    let query = LocationQuery::City("Reykjavík".into());
    let forecast = fetcher.fetch_forecast(&query).await.expect("relay forecast should succeed");

    assert_eq!(forecast.current.temperature_c, -1);
    assert_eq!(forecast.current.icon, IconKey::Snow);
    assert_eq!(forecast.hourly.len(), 48);

    let requests = relay.received_requests().await.unwrap_or_default();
    let target = requests[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned());
    assert_eq!(target.as_deref(), Some(fetcher.forecast_url(&query).as_str()));
}

#[tokio::test]
async fn relay_upstream_error_code_is_a_network_failure() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": "{\"error\":{\"code\":1006}}",
            "status": { "http_code": 400 }
        })))
        .mount(&relay)
        .await;

    let err = fetcher(&relay_config("https://provider.example/v1", &relay))
        .fetch_forecast(&LocationQuery::City("Atlantis".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(NetworkError::Status { status: 400, .. })));
}

#[tokio::test]
async fn relay_without_contents_is_an_invalid_response() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": {} })))
        .mount(&relay)
        .await;

    let err = fetcher(&relay_config("https://provider.example/v1", &relay))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidResponse(ValidationError::MissingRelayContents)));
}

#[tokio::test]
async fn relay_with_empty_payload_fails_validation() {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": "{}" })))
        .mount(&relay)
        .await;

    let err = fetcher(&relay_config("https://provider.example/v1", &relay))
        .fetch_forecast(&LocationQuery::City("London".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidResponse(ValidationError::MissingSection(_))));
}

// ============================================================================
// Session over the real fetcher
// ============================================================================

#[tokio::test]
async fn provider_failure_shows_no_results() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(500)).await;

    let session = ForecastSession::new(Arc::new(fetcher(&config_for(&server))), RacePolicy::default());
    let state = session.search(&LocationQuery::City("London".into())).await;

    assert!(state.has_no_results());
    assert_eq!(state, QueryState::Failed(FailureKind::Network));
}

#[tokio::test]
async fn successful_search_publishes_forecast() {
    let server = MockServer::start().await;
    mount_forecast(&server, ResponseTemplate::new(200).set_body_json(sample_forecast(15.9, 1000)))
        .await;

    let session = ForecastSession::new(Arc::new(fetcher(&config_for(&server))), RacePolicy::default());
    let state = session.search(&LocationQuery::City("London".into())).await;

    let forecast = state.forecast().expect("forecast should be published");
    assert_eq!(forecast.current.temperature_c, 15);
}
