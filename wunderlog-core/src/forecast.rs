use std::convert::TryFrom;
use std::str::FromStr;

use serde_json::Value;

use crate::error::WunderlogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastKind {
    /// Ten days, one entry per day.
    Daily,
    /// Ten days, one entry per hour.
    Hourly,
}

impl ForecastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastKind::Daily => "daily",
            ForecastKind::Hourly => "hourly",
        }
    }

    pub const fn all() -> &'static [ForecastKind] {
        &[ForecastKind::Daily, ForecastKind::Hourly]
    }

    /// Subdirectory of the location directory holding the snapshots.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ForecastKind::Daily => "forecast",
            ForecastKind::Hourly => "forecast_hourly",
        }
    }

    pub fn request_key(&self) -> &'static str {
        match self {
            ForecastKind::Daily => "forecast10day",
            ForecastKind::Hourly => "hourly10day",
        }
    }

    /// JSON pointer to the forecast array inside the response.
    pub fn pointer(&self) -> &'static str {
        match self {
            ForecastKind::Daily => "/forecast/simpleforecast/forecastday",
            ForecastKind::Hourly => "/hourly_forecast",
        }
    }

    pub fn extract<'a>(&self, response: &'a Value) -> Option<&'a Value> {
        response.pointer(self.pointer())
    }
}

impl std::fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ForecastKind {
    type Error = WunderlogError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(ForecastKind::Daily),
            "hourly" => Ok(ForecastKind::Hourly),
            _ => Err(WunderlogError::InvalidForecastKind(value.to_owned())),
        }
    }
}

impl FromStr for ForecastKind {
    type Err = WunderlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForecastKind::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_as_str_roundtrip() {
        for kind in ForecastKind::all() {
            let parsed: ForecastKind = kind.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn unknown_kind_error() {
        let err = ForecastKind::try_from("weekly").unwrap_err();
        assert!(matches!(err, WunderlogError::InvalidForecastKind(ref k) if k == "weekly"));

        // no case folding
        assert!(ForecastKind::try_from("Daily").is_err());
    }

    #[test]
    fn kinds_use_distinct_directories_and_keys() {
        assert_ne!(ForecastKind::Daily.dir_name(), ForecastKind::Hourly.dir_name());
        assert_ne!(ForecastKind::Daily.request_key(), ForecastKind::Hourly.request_key());
    }

    #[test]
    fn extracts_the_forecast_array() {
        let daily = json!({
            "forecast": {
                "txt_forecast": {"forecastday": []},
                "simpleforecast": {"forecastday": [{"period": 1}, {"period": 2}]}
            }
        });
        let hourly = json!({"hourly_forecast": [{"FCTTIME": {"hour": "10"}}]});

        assert_eq!(
            ForecastKind::Daily.extract(&daily),
            Some(&json!([{"period": 1}, {"period": 2}]))
        );
        assert_eq!(
            ForecastKind::Hourly.extract(&hourly),
            Some(&json!([{"FCTTIME": {"hour": "10"}}]))
        );
        assert_eq!(ForecastKind::Hourly.extract(&daily), None);
    }
}
