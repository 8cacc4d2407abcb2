//! Fetch-decode controller: owns the observable [`RequestState`] and runs at
//! most one request at a time.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config, RequestState, WeatherError, WeatherRequest, WeatherResult,
    decode::decode_weather,
    provider::{WeatherProvider, provider_from_config},
    request::build_request,
};

#[derive(Debug)]
pub struct WeatherController {
    config: Config,
    provider: Box<dyn WeatherProvider>,
    state: watch::Sender<RequestState>,
    teardown: CancellationToken,
}

impl WeatherController {
    pub fn new(config: Config, provider: Box<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self { config, provider, state, teardown: CancellationToken::new() }
    }

    /// Controller backed by the real HTTP provider.
    pub fn from_config(config: Config) -> Result<Self, WeatherError> {
        let provider = provider_from_config(&config)?;
        Ok(Self::new(config, provider))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Read-only handle that is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_shut_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Look up the weather for `city`.
    ///
    /// Does nothing if the trimmed city is blank, a request is already in
    /// flight, or the controller has been shut down. Otherwise the state moves
    /// to `Loading` before the first suspension point and ends in `Success` or
    /// `Failed`. Errors never escape; they become the `Failed` message.
    ///
    /// Dropping the returned future mid-request puts the state back to `Idle`
    /// (unless the controller was shut down, in which case state is frozen).
    #[instrument(skip(self))]
    pub async fn submit(&self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            debug!("blank city, ignoring submit");
            return;
        }

        let started = self.state.send_if_modified(|state| {
            if self.teardown.is_cancelled() || state.is_loading() {
                return false;
            }
            *state = RequestState::Loading;
            true
        });
        if !started {
            debug!("request in flight or controller shut down, ignoring submit");
            return;
        }

        let mut in_flight = InFlight { controller: self, settled: false };

        let outcome = match build_request(&self.config, city) {
            Ok(request) => {
                tokio::select! {
                    biased;
                    _ = self.teardown.cancelled() => {
                        debug!("controller shut down, discarding in-flight request");
                        return;
                    }
                    outcome = self.fetch_and_decode(&request) => outcome,
                }
            }
            Err(err) => Err(err),
        };

        in_flight.settled = true;
        self.commit(outcome);
    }

    /// Back to `Idle`. Ignored while a request is in flight.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if self.teardown.is_cancelled() || !state.is_settled() {
                return false;
            }
            *state = RequestState::Idle;
            true
        });
    }

    /// Cancel any in-flight request and freeze the state.
    ///
    /// Call when the presentation layer goes away. Late responses are
    /// discarded and later `submit` calls are no-ops.
    pub fn shutdown(&self) {
        if !self.teardown.is_cancelled() {
            info!("weather controller shutting down");
            self.teardown.cancel();
        }
    }

    async fn fetch_and_decode(&self, request: &WeatherRequest) -> Result<WeatherResult, WeatherError> {
        debug!(url = %redacted(request), "sending weather request");
        let body = self.provider.fetch(request).await?;
        decode_weather(&body)
    }

    fn commit(&self, outcome: Result<WeatherResult, WeatherError>) {
        let next = match outcome {
            Ok(result) => {
                info!(location = %result.location_name, temp_c = result.temperature_c, "weather loaded");
                RequestState::Success(result)
            }
            Err(err) => {
                warn!(error = %err, "weather request failed");
                RequestState::Failed(failure_message(&err))
            }
        };

        self.state.send_if_modified(|state| {
            if self.teardown.is_cancelled() {
                return false;
            }
            *state = next;
            true
        });
    }
}

impl Drop for WeatherController {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}

/// Puts the state back to `Idle` if a submit future is dropped before it settles.
struct InFlight<'a> {
    controller: &'a WeatherController,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let teardown = &self.controller.teardown;
        self.controller.state.send_if_modified(|state| {
            if teardown.is_cancelled() || !state.is_loading() {
                return false;
            }
            *state = RequestState::Idle;
            true
        });
    }
}

fn failure_message(err: &WeatherError) -> String {
    format!("Failed to fetch or decode weather data: {err}")
}

/// Request URL with the `appid` value masked, for logs.
fn redacted(request: &WeatherRequest) -> String {
    let mut url = request.url.clone();
    let pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
