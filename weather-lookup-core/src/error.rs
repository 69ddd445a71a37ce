use thiserror::Error;

/// Problems detected while building a fetcher, before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "No WeatherAPI.com API key configured.\n\
         Hint: run `weather-lookup configure` or set WEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("Invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unknown transport '{0}'. Supported transports: direct, relay.")]
    UnknownTransport(String),

    #[error("Unknown race policy '{0}'. Supported policies: last_issued_wins, last_resolved_wins.")]
    UnknownRacePolicy(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// The provider payload does not have the shape the view model is built from.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response is missing the '{0}' section")]
    MissingSection(&'static str),

    #[error("response is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("response section '{section}' is malformed: {source}")]
    Malformed {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("response body is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("relay envelope has no 'contents' field")]
    MissingRelayContents,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    /// Built through `From`, which drops the request URL and with it the API key.
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Outcome of a failed forecast lookup.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("invalid response: {0}")]
    InvalidResponse(#[from] ValidationError),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        NetworkError::Transport(err.without_url())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.into())
    }
}

/// Shortens a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
