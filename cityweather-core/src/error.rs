use std::error::Error as StdError;

use thiserror::Error;

/// Everything that can go wrong between a city name and a decoded result.
///
/// The controller never lets these escape: each one ends up as the message of
/// [`RequestState::Failed`](crate::RequestState::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The city name could not be turned into a valid request URL.
    #[error("malformed URL: {0}")]
    InvalidRequest(String),

    /// DNS, connect, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("decode error: {0}")]
    Decode(String),
}

impl WeatherError {
    pub(crate) fn transport(err: &(dyn StdError + 'static)) -> Self {
        Self::Transport(error_chain(err))
    }
}

/// Joins an error and its sources into a single line, so the user sees the
/// underlying cause (e.g. "connection refused") and not only the outer wrapper.
pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}
