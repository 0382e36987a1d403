use std::time::Duration;

use config::{Config, ConfigError, Environment as EnvSource, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub page: PageSettings,
    pub webhook: WebhookSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    pub incognito: bool,
    #[serde(default)]
    pub single_process: bool,
    #[serde(default)]
    pub ignore_certificate_errors: bool,
}

impl BrowserSettings {
    /// Chrome command line switches matching the enabled flags.
    pub fn chrome_args(&self) -> Vec<&'static str> {
        let mut args = vec![];
        if self.headless {
            args.push("--headless");
        }
        if self.incognito {
            args.push("--incognito");
        }
        if self.single_process {
            args.push("--single-process");
        }
        if self.ignore_certificate_errors {
            args.push("--ignore-certificate-errors");
        }
        args
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSettings {
    pub url: String,
    pub origin: String,
    pub readiness: ReadinessSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ReadinessSettings {
    WaitForInvisible {
        element_id: String,
        #[serde(deserialize_with = "deserialize_number_from_string")]
        timeout_secs: u64,
        #[serde(
            default = "default_poll_interval_millis",
            deserialize_with = "deserialize_number_from_string"
        )]
        poll_interval_millis: u64,
    },
    FixedDelay {
        #[serde(deserialize_with = "deserialize_number_from_string")]
        delay_secs: u64,
    },
}

fn default_poll_interval_millis() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    pub url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

impl WebhookSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which deployment the process runs as. Selects the matching
/// `configuration/{environment}.yaml` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Serverless,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Serverless => "serverless",
        }
    }

    pub fn current() -> Result<Self, ConfigError> {
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(ConfigError::Message)
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "serverless" => Ok(Self::Serverless),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `serverless`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");
    let environment = Environment::current()?;

    Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")))
        .add_source(File::from(
            configuration_directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            EnvSource::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
}
