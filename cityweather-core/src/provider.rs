use crate::{Config, WeatherError, WeatherRequest, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The network boundary: performs one request and hands back the raw body.
///
/// Implementations return the body for any HTTP status; deciding whether it is
/// usable is the decoder's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, request: &WeatherRequest) -> Result<String, WeatherError>;
}

/// Construct the HTTP provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let provider = OpenWeatherProvider::with_timeout(config.timeout())?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_default_config_builds() {
        assert!(provider_from_config(&Config::default()).is_ok());
    }

    #[test]
    fn provider_from_config_accepts_timeout() {
        let cfg = Config { timeout_secs: Some(3), ..Config::default() };
        assert!(provider_from_config(&cfg).is_ok());
    }
}
