use crate::configs::injector::InjectorConfig;
use crate::error::InjectorError;
use crate::validatable::Validatable;
use async_trait::async_trait;
use figment::{
    providers::{Env, Serialized},
    value::{Dict, Map as FigmentMap, Value as FigmentValue},
    Error, Figment, Metadata, Profile, Provider,
};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "injector_config.conf";
const ENV_PREFIX: &str = "INJECTOR_";
const STRING_KEYS: [&str; 2] = ["socket_path", "message_format"];
const VERBOSE_KEY: &str = "verbose";

#[async_trait]
pub trait ConfigProvider {
    async fn load_config(&self) -> Result<InjectorConfig, InjectorError>;
}

/// Values given on the command line, layered on top of the file and environment.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

#[derive(Debug)]
pub struct FileConfigProvider {
    path: String,
    overrides: ConfigOverrides,
}

impl FileConfigProvider {
    pub fn new(path: String) -> Self {
        Self {
            path,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Flat `key = value` file. Lines starting with `#`, blank lines and lines
/// without `=` are skipped; the last occurrence of a key wins.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    name: String,
    entries: Vec<(String, String)>,
}

impl KeyValueFile {
    pub fn parse(name: &str, contents: &str) -> Self {
        let entries = contents
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                (
                    key.trim_matches(is_blank).to_string(),
                    value.trim_matches(is_blank).to_string(),
                )
            })
            .collect();
        Self {
            name: name.to_string(),
            entries,
        }
    }

    fn to_value(key: &str, value: &str) -> FigmentValue {
        if STRING_KEYS.contains(&key) {
            return FigmentValue::from(value.to_string());
        }
        if key == VERBOSE_KEY {
            return FigmentValue::from(value == "true" || value == "1");
        }
        Self::try_parse_value(value)
    }

    fn try_parse_value(value: &str) -> FigmentValue {
        if value == "true" {
            return FigmentValue::from(true);
        }
        if value == "false" {
            return FigmentValue::from(false);
        }
        if let Ok(int_val) = value.parse::<i64>() {
            return FigmentValue::from(int_val);
        }
        if let Ok(float_val) = value.parse::<f64>() {
            return FigmentValue::from(float_val);
        }
        FigmentValue::from(value.to_string())
    }
}

impl Provider for KeyValueFile {
    fn metadata(&self) -> Metadata {
        Metadata::named(format!("config file '{}'", self.name))
    }

    fn data(&self) -> Result<FigmentMap<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (key, value) in &self.entries {
            dict.insert(key.clone(), Self::to_value(key, value));
        }
        let mut data = FigmentMap::new();
        data.insert(Profile::default(), dict);
        Ok(data)
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load_config(&self) -> Result<InjectorConfig, InjectorError> {
        info!("Loading config from path: '{}'...", self.path);

        let mut figment = Figment::from(Serialized::defaults(InjectorConfig::default()));
        if Path::new(&self.path).is_file() {
            let contents = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|error| {
                    InjectorError::CannotLoadConfiguration(format!(
                        "Cannot read configuration file '{}': {error}",
                        self.path
                    ))
                })?;
            figment = figment.merge(KeyValueFile::parse(&self.path, &contents));
        } else {
            warn!(
                "Could not open config file '{}', using defaults.",
                self.path
            );
        }

        let config = resolve(figment, &self.overrides)?;
        info!("Using config: {config}");
        Ok(config)
    }
}

/// Applies environment and command line layers, then extracts and validates.
fn resolve(figment: Figment, overrides: &ConfigOverrides) -> Result<InjectorConfig, InjectorError> {
    let config: InjectorConfig = figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
        .extract()
        .map_err(|error| {
            InjectorError::CannotLoadConfiguration(format!("Failed to load configuration: {error}"))
        })?;
    config.validate()?;
    Ok(config)
}
