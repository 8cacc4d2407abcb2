//! Request builder: city name in, validated `GET` request out.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Method, Url};

use crate::{Config, WeatherError, WeatherRequest};

/// Characters escaped inside a query value.
///
/// Everything outside printable ASCII is always escaped. On top of that we
/// escape what is unsafe anywhere in a URL plus the characters that would end
/// or split a query parameter (`&`, `=`, `+`, `#`, `%`).
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode a single query value.
///
/// Input is a `&str`, so it is always valid UTF-8 and encoding cannot fail;
/// there is no need for a "use the raw string" fallback.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Build the current-weather request for `city`.
///
/// Callers are expected to skip blank input; if they don't, the value is
/// encoded anyway. Fails only when the assembled string is not an absolute
/// `http(s)` URL, which in practice means a bad `base_url` in the config.
pub fn build_request(config: &Config, city: &str) -> Result<WeatherRequest, WeatherError> {
    let base = config.base_url.trim().trim_end_matches('/');
    let raw = format!(
        "{base}/weather?q={q}&appid={key}&units=metric&lang={lang}",
        q = encode_query_value(city),
        key = encode_query_value(&config.api_key),
        lang = encode_query_value(&config.lang),
    );

    let url = Url::parse(&raw)
        .map_err(|e| WeatherError::InvalidRequest(format!("{e} (base URL '{base}')")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(WeatherError::InvalidRequest(format!(
            "unsupported scheme '{}' (base URL '{base}')",
            url.scheme()
        )));
    }

    Ok(WeatherRequest { url, method: Method::GET })
}
