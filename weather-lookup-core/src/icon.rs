//! Condition code to icon asset lookup.
//!
//! The groups mirror WeatherAPI.com's documented condition codes. A handful of
//! codes sit in two groups; lookup walks [`ICON_TABLE`] in order and the first
//! group containing the code wins, so the table order is part of the contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconKey {
    Clear,
    Clouds,
    Mist,
    Rain,
    ModerateHeavyRain,
    Snow,
    Thunder,
    ThunderRain,
    #[default]
    Default,
}

impl IconKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKey::Clear => "clear",
            IconKey::Clouds => "clouds",
            IconKey::Mist => "mist",
            IconKey::Rain => "rain",
            IconKey::ModerateHeavyRain => "moderate_heavy_rain",
            IconKey::Snow => "snow",
            IconKey::Thunder => "thunder",
            IconKey::ThunderRain => "thunder_rain",
            IconKey::Default => "default",
        }
    }
}

impl std::fmt::Display for IconKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ICON_TABLE: &[(IconKey, &[u32])] = &[
    (IconKey::Clear, &[1000]),
    (IconKey::Clouds, &[1003, 1006, 1009]),
    (IconKey::Mist, &[1030, 1135, 1147]),
    (
        IconKey::Rain,
        &[1063, 1150, 1153, 1168, 1171, 1180, 1183, 1198, 1201, 1240, 1243, 1246, 1273, 1276],
    ),
    (IconKey::ModerateHeavyRain, &[1186, 1189, 1192, 1195, 1243, 1246]),
    (
        IconKey::Snow,
        &[
            1066, 1069, 1072, 1114, 1117, 1204, 1207, 1210, 1213, 1216, 1219, 1222, 1225, 1237,
            1249, 1252, 1255, 1258, 1261, 1264, 1279, 1282,
        ],
    ),
    (IconKey::Thunder, &[1087, 1279, 1282]),
    (IconKey::ThunderRain, &[1273, 1276]),
];

/// Icon for a provider condition code; [`IconKey::Default`] when no group has it.
pub fn resolve_icon(code: u32) -> IconKey {
    ICON_TABLE
        .iter()
        .find(|(_, codes)| codes.contains(&code))
        .map(|(key, _)| *key)
        .unwrap_or_default()
}

pub fn resolve_icon_opt(code: Option<u32>) -> IconKey {
    code.map(resolve_icon).unwrap_or_default()
}
