//! Turns a WeatherAPI.com `forecast.json` payload into a [`NormalizedForecast`].
//!
//! Pure: no IO, no clock, no hidden state.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::ValidationError,
    icon::resolve_icon_opt,
    model::{CurrentConditions, HourlyEntry, NormalizedForecast},
};

const REQUIRED_SECTIONS: [&str; 3] = ["location", "current", "forecast"];

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
    code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WaHourCondition {
    code: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WaHour {
    time_epoch: Option<i64>,
    time: Option<String>,
    temp_c: Option<f64>,
    condition: Option<WaHourCondition>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WaForecastDay {
    hour: Option<Vec<Option<WaHour>>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WaForecast {
    forecastday: Option<Vec<Option<WaForecastDay>>>,
}

/// Decode a response body and normalize it.
pub fn normalize_str(body: &str) -> Result<NormalizedForecast, ValidationError> {
    let payload: Value = serde_json::from_str(body).map_err(ValidationError::NotJson)?;
    normalize(&payload)
}

pub fn normalize(payload: &Value) -> Result<NormalizedForecast, ValidationError> {
    for section in REQUIRED_SECTIONS {
        if payload.get(section).is_none_or(is_falsy) {
            return Err(ValidationError::MissingSection(section));
        }
    }

    let location_name = payload["location"].get("name").and_then(Value::as_str).map(str::to_owned);

    let current = WaCurrent::deserialize(&payload["current"])
        .map_err(|source| ValidationError::Malformed { section: "current", source })?;
    let forecast = WaForecast::deserialize(&payload["forecast"])
        .map_err(|source| ValidationError::Malformed { section: "forecast", source })?;

    Ok(NormalizedForecast { location_name, current: current_conditions(current)?, hourly: hourly(forecast) })
}

fn current_conditions(current: WaCurrent) -> Result<CurrentConditions, ValidationError> {
    let temp_c = current.temp_c.ok_or(ValidationError::MissingField("current.temp_c"))?;
    let condition = current.condition.ok_or(ValidationError::MissingField("current.condition"))?;
    let description =
        condition.text.ok_or(ValidationError::MissingField("current.condition.text"))?;

    Ok(CurrentConditions {
        temperature_c: floor_celsius(temp_c),
        description,
        icon: resolve_icon_opt(condition.code),
    })
}

/// Day 0 then day 1, each in provider order. A missing day contributes nothing.
fn hourly(forecast: WaForecast) -> Vec<HourlyEntry> {
    let mut days = forecast.forecastday.unwrap_or_default().into_iter();
    let today = days.next().flatten();
    let tomorrow = days.next().flatten();

    [today, tomorrow]
        .into_iter()
        .flatten()
        .flat_map(|day| day.hour.unwrap_or_default())
        .map(|hour| hourly_entry(hour.unwrap_or_default()))
        .collect()
}

fn hourly_entry(hour: WaHour) -> HourlyEntry {
    let local_time_label = match hour.time.filter(|t| !t.is_empty()) {
        Some(time) => match time.split_once(' ') {
            Some((_, clock)) => clock.to_string(),
            None => time,
        },
        None => "N/A".to_string(),
    };

    HourlyEntry {
        time_epoch: hour.time_epoch.unwrap_or(0),
        local_time_label,
        temperature_c: floor_celsius(hour.temp_c.unwrap_or(0.0)),
        icon: resolve_icon_opt(hour.condition.and_then(|c| c.code)),
    }
}

/// `null`, `false`, `0` and `""` stand in for an absent section.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Truncates toward negative infinity; `as` saturates at the `i32` bounds.
fn floor_celsius(temp_c: f64) -> i32 {
    temp_c.floor() as i32
}
