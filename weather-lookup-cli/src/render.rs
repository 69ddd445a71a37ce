use std::fmt::Write;

use weather_lookup_core::NormalizedForecast;

pub const NO_RESULTS: &str = "Sorry, no results. Check the city name and try again.";

pub fn forecast(forecast: &NormalizedForecast) -> String {
    let mut out = String::new();
    let current = &forecast.current;

    if let Some(name) = &forecast.location_name {
        let _ = writeln!(out, "{name}");
    }
    let _ = writeln!(
        out,
        "  {}°C  {}  [{}]",
        current.temperature_c, current.description, current.icon
    );

    if !forecast.hourly.is_empty() {
        let _ = writeln!(out);
        for hour in &forecast.hourly {
            let _ = writeln!(
                out,
                "  {:>5}  {:>4}°C  [{}]",
                hour.local_time_label, hour.temperature_c, hour.icon
            );
        }
    }

    out
}
