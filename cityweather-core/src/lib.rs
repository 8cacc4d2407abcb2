//! Core library for the `cityweather` client.
//!
//! This crate defines:
//! - Configuration handling
//! - The request builder (city name to OpenWeather URL)
//! - Field-by-field decoding of the API response
//! - The fetch-decode controller that owns the observable request state
//!
//! It is used by `cityweather-cli`, but any front end can drive a
//! [`WeatherController`] and watch its [`RequestState`].

pub mod config;
pub mod controller;
pub mod decode;
pub mod error;
pub mod model;
pub mod provider;
pub mod request;

pub use config::Config;
pub use controller::WeatherController;
pub use error::WeatherError;
pub use model::{RequestState, WeatherRequest, WeatherResult};
pub use provider::{WeatherProvider, provider_from_config};
