use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::icon::IconKey;

/// What the user asked the forecast for. The provider does the geocoding.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    /// City query; `None` for empty or whitespace-only input.
    pub fn city(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() { None } else { Some(LocationQuery::City(trimmed.to_string())) }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates { latitude, longitude }
    }

    /// Value of the provider's `q` parameter, before percent-encoding.
    pub fn query_term(&self) -> String {
        match self {
            LocationQuery::City(name) => name.clone(),
            LocationQuery::Coordinates { latitude, longitude } => format!("{latitude},{longitude}"),
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query_term())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: i32,
    pub description: String,
    pub icon: IconKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time_epoch: i64,
    /// Provider local time of day, e.g. "14:00".
    pub local_time_label: String,
    pub temperature_c: i32,
    pub icon: IconKey,
}

impl HourlyEntry {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time_epoch, 0)
    }
}

/// View model produced from one provider response. Replaced wholesale on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub location_name: Option<String>,
    pub current: CurrentConditions,
    /// Today's hours followed by tomorrow's, in provider order.
    pub hourly: Vec<HourlyEntry>,
}
