use reqwest::{Method, Url};
use serde::Serialize;

/// Fully-formed outbound request produced by [`build_request`](crate::request::build_request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub url: Url,
    pub method: Method,
}

/// Current weather for one location, as decoded from the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    pub location_name: String,
    /// Celsius, as reported upstream. Not rounded here.
    pub temperature_c: f64,
    /// Description of the first condition entry, if the payload had one.
    pub condition: Option<String>,
}

/// The single source of truth the presentation layer observes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherResult),
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    /// True once a submission has ended, either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Success(_) | RequestState::Failed(_))
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match self {
            RequestState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = RequestState::default();
        assert_eq!(state, RequestState::Idle);
        assert!(!state.is_loading());
        assert!(!state.is_settled());
    }

    #[test]
    fn accessors_follow_variant() {
        let ok = RequestState::Success(WeatherResult {
            location_name: "Tokyo".into(),
            temperature_c: 21.5,
            condition: None,
        });
        assert!(ok.is_settled());
        assert_eq!(ok.result().map(|r| r.location_name.as_str()), Some("Tokyo"));
        assert_eq!(ok.error(), None);

        let failed = RequestState::Failed("boom".into());
        assert!(failed.is_settled());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.result().is_none());
    }

    #[test]
    fn result_serializes_with_null_condition() {
        let result = WeatherResult {
            location_name: "Osaka".into(),
            temperature_c: 18.0,
            condition: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "location_name": "Osaka", "temperature_c": 18.0, "condition": null })
        );
    }
}
