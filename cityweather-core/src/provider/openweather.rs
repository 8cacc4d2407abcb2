use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{WeatherError, WeatherRequest};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, WeatherError> {
        let Some(timeout) = timeout else {
            return Ok(Self::new());
        };

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::transport(&e.without_url()))?;

        Ok(Self { http })
    }
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, request: &WeatherRequest) -> Result<String, WeatherError> {
        // reqwest errors embed the request URL, which carries the API key; strip it.
        let res = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(|e| WeatherError::transport(&e.without_url()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::transport(&e.without_url()))?;

        if status.is_success() {
            debug!(%status, bytes = body.len(), "OpenWeather response received");
        } else {
            // Decoding still decides the outcome; the status is informational.
            warn!(%status, body = %truncate_body(&body), "OpenWeather returned an error status");
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
