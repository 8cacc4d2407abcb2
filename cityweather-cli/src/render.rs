use cityweather_core::{RequestState, WeatherResult};

/// Human-readable lines for a state, or `None` when there is nothing to show.
pub fn render_text(state: &RequestState) -> Option<String> {
    match state {
        RequestState::Idle => None,
        RequestState::Loading => Some("Loading...".to_string()),
        RequestState::Success(result) => Some(render_result(result)),
        RequestState::Failed(message) => Some(format!("Error: {message}")),
    }
}

fn render_result(result: &WeatherResult) -> String {
    let mut out = format!(
        "Weather in {}\n  Temperature: {:.1}°C",
        result.location_name, result.temperature_c
    );
    if let Some(condition) = &result.condition {
        out.push_str(&format!("\n  Conditions: {condition}"));
    }
    out
}

pub fn render_json(result: &WeatherResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo() -> WeatherResult {
        WeatherResult {
            location_name: "Tokyo".into(),
            temperature_c: 21.46,
            condition: Some("clear sky".into()),
        }
    }

    #[test]
    fn idle_renders_nothing() {
        assert_eq!(render_text(&RequestState::Idle), None);
    }

    #[test]
    fn success_rounds_to_one_decimal() {
        let text = render_text(&RequestState::Success(tokyo())).unwrap();
        assert_eq!(text, "Weather in Tokyo\n  Temperature: 21.5°C\n  Conditions: clear sky");
    }

    #[test]
    fn missing_condition_line_is_omitted() {
        let result = WeatherResult { condition: None, ..tokyo() };
        let text = render_text(&RequestState::Success(result)).unwrap();

        assert!(!text.contains("Conditions"));
    }

    #[test]
    fn failure_is_prefixed() {
        let text = render_text(&RequestState::Failed("boom".into())).unwrap();
        assert_eq!(text, "Error: boom");
    }

    #[test]
    fn json_contains_fields() {
        let json = render_json(&tokyo()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["location_name"], "Tokyo");
        assert_eq!(value["condition"], "clear sky");
    }
}
