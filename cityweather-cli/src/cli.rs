use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use cityweather_core::{Config, RequestState, WeatherController};
use clap::{Parser, Subcommand};
use inquire::{CustomUserError, InquireError, Password, Text, validator::Validation};
use tracing::warn;

use crate::render::{render_json, render_text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save the API key and request preferences.
    ///
    /// Prompts for the API key and language when no option is given.
    Configure {
        #[arg(long)]
        api_key: Option<String>,

        /// Response-language hint, e.g. "ja" or "en".
        #[arg(long)]
        lang: Option<String>,

        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show the current weather for a city.
    Show {
        /// City name; prompts repeatedly when omitted.
        city: Option<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,

        /// Override the configured response language.
        #[arg(long)]
        lang: Option<String>,

        /// Override the configured API key.
        #[arg(long, env = "CITYWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure { api_key, lang, base_url, timeout_secs } => {
                let mut config = Config::load()?;
                let flags = ConfigureFlags { api_key, lang, base_url, timeout_secs };
                if flags.is_empty() {
                    prompt_config(&mut config)?;
                } else {
                    flags.apply(&mut config);
                }
                let path = config.save()?;
                println!("Configuration saved to {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, json, lang, api_key } => {
                let mut config = Config::load()?;
                apply_overrides(&mut config, lang, api_key);
                if config.has_placeholder_key() {
                    warn!("no API key configured; run `cityweather configure` or set CITYWEATHER_API_KEY");
                }

                let format = if json { OutputFormat::Json } else { OutputFormat::Text };
                let controller =
                    WeatherController::from_config(config).context("Failed to set up HTTP client")?;

                match city {
                    Some(city) => {
                        if city.trim().is_empty() {
                            bail!("City name must not be blank");
                        }
                        let outcome = query(&controller, &city, format).await;
                        Ok(ExitCode::from(exit_status(outcome.as_ref())))
                    }
                    None => interactive(&controller, format).await,
                }
            }
        }
    }
}

struct ConfigureFlags {
    api_key: Option<String>,
    lang: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ConfigureFlags {
    fn is_empty(&self) -> bool {
        self.api_key.is_none()
            && self.lang.is_none()
            && self.base_url.is_none()
            && self.timeout_secs.is_none()
    }

    fn apply(self, config: &mut Config) {
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        if let Some(lang) = self.lang {
            config.lang = lang;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
    }
}

fn prompt_config(config: &mut Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_validator(non_blank)
        .prompt()
        .context("Failed to read API key")?;
    let lang = Text::new("Response language:")
        .with_default(&config.lang)
        .prompt()
        .context("Failed to read language")?;

    config.api_key = api_key.trim().to_string();
    config.lang = lang.trim().to_string();
    Ok(())
}

fn apply_overrides(config: &mut Config, lang: Option<String>, api_key: Option<String>) {
    if let Some(lang) = lang {
        config.lang = lang;
    }
    if let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.api_key = api_key;
    }
}

/// Prompt for cities until the user presses Esc or Ctrl-C.
async fn interactive(controller: &WeatherController, format: OutputFormat) -> Result<ExitCode> {
    loop {
        let city = match Text::new("City:")
            .with_help_message("e.g. Tokyo; Esc to quit")
            .with_validator(non_blank)
            .prompt()
        {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        };

        if query(controller, &city, format).await.is_none() {
            return Ok(ExitCode::from(exit_status(None)));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Submit one city and print every state the controller passes through.
///
/// Returns `None` if the user interrupted the request.
async fn query(controller: &WeatherController, city: &str, format: OutputFormat) -> Option<RequestState> {
    tokio::select! {
        state = follow_submit(controller, city, |state| print_state(state, format)) => Some(state),
        _ = tokio::signal::ctrl_c() => {
            controller.shutdown();
            eprintln!("Cancelled.");
            None
        }
    }
}

/// Run one `submit`, handing each observed state to `on_state`, and return the
/// final state. Stops as soon as `submit` returns, even if it was a no-op.
async fn follow_submit(
    controller: &WeatherController,
    city: &str,
    mut on_state: impl FnMut(&RequestState),
) -> RequestState {
    let mut updates = controller.subscribe();
    let submit = controller.submit(city);
    tokio::pin!(submit);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                on_state(&updates.borrow_and_update());
            }
            () = &mut submit => {
                if updates.has_changed().unwrap_or(false) {
                    on_state(&updates.borrow_and_update());
                }
                break;
            }
        }
    }

    controller.state()
}

fn print_state(state: &RequestState, format: OutputFormat) {
    match (state, format) {
        (RequestState::Success(result), OutputFormat::Json) => match render_json(result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: failed to serialize result: {e}"),
        },
        (RequestState::Success(_), OutputFormat::Text) => {
            if let Some(text) = render_text(state) {
                println!("{text}");
            }
        }
        _ => {
            if let Some(text) = render_text(state) {
                eprintln!("{text}");
            }
        }
    }
}

fn exit_status(outcome: Option<&RequestState>) -> u8 {
    match outcome {
        Some(RequestState::Success(_)) => 0,
        Some(_) => 1,
        // 128 + SIGINT
        None => 130,
    }
}

fn non_blank(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("Please enter a value".into()))
    } else {
        Ok(Validation::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_parses_city_and_flags() {
        let cli = Cli::try_parse_from(["cityweather", "show", "São Paulo", "--json", "--lang", "en"])
            .unwrap();

        match cli.command {
            Command::Show { city, json, lang, .. } => {
                assert_eq!(city.as_deref(), Some("São Paulo"));
                assert!(json);
                assert_eq!(lang.as_deref(), Some("en"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_without_city_is_interactive() {
        let cli = Cli::try_parse_from(["cityweather", "show"]).unwrap();
        assert!(matches!(cli.command, Command::Show { city: None, json: false, .. }));
    }

    #[test]
    fn configure_flags_override_only_given_fields() {
        let mut config = Config::default();
        let flags = ConfigureFlags {
            api_key: Some("KEY".into()),
            lang: None,
            base_url: None,
            timeout_secs: Some(5),
        };
        assert!(!flags.is_empty());

        flags.apply(&mut config);

        assert_eq!(config.api_key, "KEY");
        assert_eq!(config.lang, Config::default().lang);
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn blank_api_key_override_is_ignored() {
        let mut config = Config { api_key: "SAVED".into(), ..Config::default() };
        apply_overrides(&mut config, Some("en".into()), Some("  ".into()));

        assert_eq!(config.api_key, "SAVED");
        assert_eq!(config.lang, "en");
    }

    #[test]
    fn non_blank_validator_rejects_whitespace() {
        assert!(matches!(non_blank("   "), Ok(Validation::Invalid(_))));
        assert!(matches!(non_blank("Kyoto"), Ok(Validation::Valid)));
    }

    fn controller(base_url: &str) -> WeatherController {
        let config = Config { api_key: "KEY".into(), base_url: base_url.into(), ..Config::default() };
        WeatherController::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn follow_submit_returns_when_submit_is_ignored() {
        let ctrl = controller("http://127.0.0.1:1");
        let mut seen = Vec::new();

        let state = follow_submit(&ctrl, "   ", |s| seen.push(s.clone())).await;
        assert_eq!(state, RequestState::Idle);

        ctrl.shutdown();
        let state = follow_submit(&ctrl, "Tokyo", |s| seen.push(s.clone())).await;
        assert_eq!(state, RequestState::Idle);
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn follow_submit_reports_final_state() {
        let ctrl = controller("not a url");
        let mut seen = Vec::new();

        let state = follow_submit(&ctrl, "Tokyo", |s| seen.push(s.clone())).await;

        assert!(state.error().unwrap().contains("malformed URL"));
        assert_eq!(seen.last(), Some(&state));
    }

    #[test]
    fn exit_status_follows_outcome() {
        assert_eq!(exit_status(Some(&RequestState::Failed("x".into()))), 1);
        assert_eq!(exit_status(Some(&RequestState::Idle)), 1);
        assert_eq!(exit_status(None), 130);
    }
}
