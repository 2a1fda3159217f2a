use serde::{Deserialize, Serialize};

use crate::condition::ConditionIcon;

/// Normalized result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_celsius: f64,
    pub condition_code: i32,
    pub city_name: String,
}

impl WeatherReading {
    pub fn condition_icon(&self) -> ConditionIcon {
        ConditionIcon::from_code(self.condition_code)
    }

    /// Temperature rounded to a whole degree for display, e.g. `"12"`.
    pub fn temperature_string(&self) -> String {
        let rounded = self.temperature_celsius.round();
        // Avoid printing "-0" for small negative values.
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        format!("{rounded:.0}")
    }
}
