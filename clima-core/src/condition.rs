use serde::{Deserialize, Serialize};

/// Symbolic icon for an OpenWeather condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionIcon {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    Clear,
    Clouds,
}

/// Inclusive `(start, end, icon)` ranges, scanned in order.
///
/// See <https://openweathermap.org/weather-conditions>.
const CONDITION_TABLE: &[(i32, i32, ConditionIcon)] = &[
    (200, 232, ConditionIcon::Thunderstorm),
    (300, 321, ConditionIcon::Drizzle),
    (500, 531, ConditionIcon::Rain),
    (600, 622, ConditionIcon::Snow),
    (701, 781, ConditionIcon::Mist),
    (800, 800, ConditionIcon::Clear),
    (801, 804, ConditionIcon::Clouds),
];

impl ConditionIcon {
    /// Icon used for codes outside every known range.
    pub const DEFAULT: ConditionIcon = ConditionIcon::Clouds;

    /// Map a condition id (`weather[0].id`) to its icon. Never fails.
    pub fn from_code(code: i32) -> Self {
        CONDITION_TABLE
            .iter()
            .find(|(start, end, _)| (*start..=*end).contains(&code))
            .map(|(_, _, icon)| *icon)
            .unwrap_or(Self::DEFAULT)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionIcon::Thunderstorm => "thunderstorm",
            ConditionIcon::Drizzle => "drizzle",
            ConditionIcon::Rain => "rain",
            ConditionIcon::Snow => "snow",
            ConditionIcon::Mist => "mist",
            ConditionIcon::Clear => "clear",
            ConditionIcon::Clouds => "clouds",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConditionIcon::Thunderstorm => "Thunderstorm",
            ConditionIcon::Drizzle => "Drizzle",
            ConditionIcon::Rain => "Rain",
            ConditionIcon::Snow => "Snow",
            ConditionIcon::Mist => "Mist",
            ConditionIcon::Clear => "Clear sky",
            ConditionIcon::Clouds => "Cloudy",
        }
    }

    /// Single glyph for terminal output.
    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionIcon::Thunderstorm => "⛈",
            ConditionIcon::Drizzle => "🌦",
            ConditionIcon::Rain => "🌧",
            ConditionIcon::Snow => "❄",
            ConditionIcon::Mist => "🌫",
            ConditionIcon::Clear => "☀",
            ConditionIcon::Clouds => "☁",
        }
    }

    pub const fn all() -> &'static [ConditionIcon] {
        &[
            ConditionIcon::Thunderstorm,
            ConditionIcon::Drizzle,
            ConditionIcon::Rain,
            ConditionIcon::Snow,
            ConditionIcon::Mist,
            ConditionIcon::Clear,
            ConditionIcon::Clouds,
        ]
    }
}

impl std::fmt::Display for ConditionIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
