use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    Config,
    error::{ConfigurationError, FetchError},
    model::{LocationQuery, NormalizedForecast},
    normalize::normalize,
    transport::{Transport, transport_from_config},
};

/// Anything that can answer a forecast query.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<NormalizedForecast, FetchError>;
}

/// WeatherAPI.com `forecast.json` client.
///
/// One request per call: no retries, no caching, no deduplication.
#[derive(Debug)]
pub struct WeatherFetcher {
    api_key: String,
    endpoint: Url,
    forecast_days: u8,
    http: Client,
    transport: Box<dyn Transport>,
}

impl WeatherFetcher {
    /// Build a fetcher, failing before any request when the key or URLs are unusable.
    pub fn from_config(config: &Config) -> Result<Self, ConfigurationError> {
        let api_key = config.api_key().ok_or(ConfigurationError::MissingApiKey)?.to_owned();

        let endpoint = forecast_endpoint(&config.base_url)?;
        let transport = transport_from_config(config)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ConfigurationError::HttpClient)?;

        Ok(Self { api_key, endpoint, forecast_days: config.forecast_days, http, transport })
    }

    /// Full request URL for `query`, API key included.
    pub fn forecast_url(&self, query: &LocationQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("q", &query.query_term())
            .append_pair("days", &self.forecast_days.to_string());
        url
    }
}

#[async_trait]
impl ForecastSource for WeatherFetcher {
    #[instrument(skip(self), fields(query = %query))]
    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<NormalizedForecast, FetchError> {
        let url = self.forecast_url(query);
        debug!(endpoint = %self.endpoint, "requesting forecast");

        let payload = self.transport.get_json(&self.http, &url).await.inspect_err(|err| {
            warn!(error = %err, "forecast request failed");
        })?;

        let forecast = normalize(&payload).inspect_err(|err| {
            warn!(error = %err, "forecast response rejected");
        })?;

        debug!(
            location = forecast.location_name.as_deref().unwrap_or("?"),
            hours = forecast.hourly.len(),
            "forecast normalized"
        );
        Ok(forecast)
    }
}

fn forecast_endpoint(base_url: &str) -> Result<Url, ConfigurationError> {
    let invalid = |source| ConfigurationError::InvalidUrl {
        name: "base_url",
        value: base_url.to_string(),
        source,
    };

    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(invalid)?;
    base.join("forecast.json").map_err(invalid)
}
