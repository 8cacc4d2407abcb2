//! Field-by-field validation of the current-weather payload.
//!
//! The body is parsed into an untyped [`Value`] first and then checked by
//! hand, so every failure names the exact field that was wrong.

use serde_json::{Map, Value};

use crate::{WeatherError, WeatherResult};

pub fn decode_weather(body: &str) -> Result<WeatherResult, WeatherError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| WeatherError::Decode(format!("body is not valid JSON: {e}")))?;
    let root = as_object(&root, "response body")?;

    let location_name = required(root, "name", "name")?
        .as_str()
        .ok_or_else(|| wrong_type("name", "a string"))?
        .to_string();

    let main = as_object(required(root, "main", "main")?, "main")?;
    let temperature_c = required(main, "temp", "main.temp")?
        .as_f64()
        .ok_or_else(|| wrong_type("main.temp", "a number"))?;

    let condition = first_condition(root.get("weather"))?;

    Ok(WeatherResult { location_name, temperature_c, condition })
}

/// `weather[0].description`, if there is one.
///
/// An absent, null or empty `weather` list is not an error.
fn first_condition(weather: Option<&Value>) -> Result<Option<String>, WeatherError> {
    let entries = match weather {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(wrong_type("weather", "an array")),
    };

    for (i, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(wrong_type(&format!("weather[{i}]"), "an object"));
        }
    }

    let Some(first) = entries.first().and_then(Value::as_object) else {
        return Ok(None);
    };

    match first.get("description") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(description)) => Ok(Some(description.clone())),
        Some(_) => Err(wrong_type("weather[0].description", "a string")),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, WeatherError> {
    value.as_object().ok_or_else(|| wrong_type(path, "an object"))
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, WeatherError> {
    obj.get(key)
        .ok_or_else(|| WeatherError::Decode(format!("missing required field `{path}`")))
}

fn wrong_type(path: &str, expected: &str) -> WeatherError {
    WeatherError::Decode(format!("field `{path}` must be {expected}"))
}
