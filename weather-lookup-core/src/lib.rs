//! Core library for the `weather-lookup` CLI.
//!
//! This crate defines:
//! - The condition-code → icon table
//! - Normalization of WeatherAPI.com forecast payloads into a small view model
//! - The forecast fetcher and its transports (direct or via a CORS relay)
//! - A query session that tracks the lifecycle of the latest lookup
//! - Configuration & credentials handling
//!
//! It is used by `weather-lookup-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod icon;
pub mod model;
pub mod normalize;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{ConfigurationError, FetchError, NetworkError, ValidationError};
pub use fetcher::{ForecastSource, WeatherFetcher};
pub use icon::{IconKey, resolve_icon};
pub use model::{CurrentConditions, HourlyEntry, LocationQuery, NormalizedForecast};
pub use normalize::{normalize, normalize_str};
pub use session::{FailureKind, ForecastSession, QueryState, QueryTicket, RacePolicy};
pub use transport::{DirectTransport, RelayTransport, Transport, TransportMode};
