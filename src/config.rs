//! Client configuration, read from an optional TOML file and `SPINIFY_*`
//! environment variables.

use std::{path::Path, time::Duration};

use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    internals::core::{coordinator::CoordinatorSpecs, dashboard::DashboardConfig, jog::JogConfig},
    models::{
        jog::RampProfile,
        poll_spec::{OverlapPolicy, PollSpec},
    },
};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "spinify-sync.toml";

/// Environment overrides look like `SPINIFY_SERVER__BASE_URL`.
pub const ENV_PREFIX: &str = "SPINIFY";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub polling: PollingSettings,

    #[serde(default)]
    pub jog: JogSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PollingSettings {
    #[serde(default = "default_refresh")]
    pub refresh: PollerSettings,

    #[serde(default = "default_sync")]
    pub sync: PollerSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PollerSettings {
    pub active_interval_ms: u64,
    pub idle_interval_ms: u64,

    #[serde(default = "default_run_on_mount")]
    pub run_on_mount: bool,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JogSettings {
    #[serde(default = "default_discrete_steps")]
    pub discrete_steps: u32,

    #[serde(default = "default_from_settings")]
    pub from_settings: bool,
}

impl Settings {
    /// Load from `path` (or the optional default file) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = builder()?
            .add_source(file)
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let url = self.server.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SettingsError::Invalid(format!(
                "server.base_url must start with http:// or https:// (got {:?})",
                self.server.base_url
            )));
        }

        for (name, poller) in [
            ("refresh", &self.polling.refresh),
            ("sync", &self.polling.sync),
        ] {
            if poller.active_interval_ms == 0 || poller.idle_interval_ms == 0 {
                return Err(SettingsError::Invalid(format!(
                    "polling.{} intervals must be greater than zero",
                    name
                )));
            }
        }

        if self.jog.discrete_steps == 0 {
            return Err(SettingsError::Invalid(
                "jog.discrete_steps must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            specs: CoordinatorSpecs {
                refresh: self.polling.refresh.spec(),
                sync: self.polling.sync.spec(),
            },
            jog: self.jog.config(),
        }
    }
}

/// Config builder seeded with the poller intervals. Each poller has its own
/// defaults, so they are layered under the sources instead of living on the
/// shared `PollerSettings` fields.
fn builder() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
    let mut builder = config::Config::builder();
    for (name, poller) in [("refresh", default_refresh()), ("sync", default_sync())] {
        builder = builder
            .set_default(
                format!("polling.{}.active_interval_ms", name),
                poller.active_interval_ms,
            )?
            .set_default(
                format!("polling.{}.idle_interval_ms", name),
                poller.idle_interval_ms,
            )?;
    }
    Ok(builder)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl PollerSettings {
    pub fn spec(&self) -> PollSpec {
        PollSpec::new(
            Duration::from_millis(self.active_interval_ms),
            Duration::from_millis(self.idle_interval_ms),
        )
        .with_run_on_mount(self.run_on_mount)
        .with_overlap(self.overlap)
    }
}

impl JogSettings {
    pub fn config(&self) -> JogConfig {
        JogConfig {
            ramp: RampProfile::default(),
            discrete_steps: self.discrete_steps,
            from_settings: self.from_settings,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            sync: default_sync(),
        }
    }
}

impl Default for JogSettings {
    fn default() -> Self {
        Self {
            discrete_steps: default_discrete_steps(),
            from_settings: default_from_settings(),
        }
    }
}

// Default values
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_refresh() -> PollerSettings {
    PollerSettings {
        active_interval_ms: 1_000,
        idle_interval_ms: 5_000,
        run_on_mount: default_run_on_mount(),
        overlap: OverlapPolicy::Allow,
    }
}

fn default_sync() -> PollerSettings {
    PollerSettings {
        active_interval_ms: 2_000,
        idle_interval_ms: 10_000,
        run_on_mount: default_run_on_mount(),
        overlap: OverlapPolicy::Allow,
    }
}

fn default_run_on_mount() -> bool {
    true
}

fn default_discrete_steps() -> u32 {
    5
}

fn default_from_settings() -> bool {
    true
}
