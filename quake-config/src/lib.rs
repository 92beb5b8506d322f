//! Loader for `quake` configuration with YAML + environment overlays.
//!
//! Sources are merged in order: files and inline YAML first, then
//! `QUAKE__`-prefixed environment variables (`QUAKE__USE_LARGE=true`,
//! `QUAKE__LOG__FORMAT=json`). String values may reference `${VAR}` and are
//! expanded after merging. Every field has a default, so an empty source set
//! yields a usable configuration pointing at the public feeds.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub use quake_common::LogSettings;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_SMALL_URL: &str = "https://aqueous-depths-77407.herokuapp.com/earthquakes.json";
pub const DEFAULT_LARGE_URL: &str = "https://earthquake-grapher.herokuapp.com/earthquakes.json";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuakeConfig {
    pub endpoints: EndpointUrls,
    /// Start on the large feed instead of the small one.
    pub use_large: bool,
    /// Whole-request timeout for a feed fetch.
    pub timeout_secs: u64,
    pub log: LogSettings,
}

impl Default for QuakeConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointUrls::default(),
            use_large: false,
            timeout_secs: 15,
            log: LogSettings::default(),
        }
    }
}

impl QuakeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// The two fixed feed URLs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointUrls {
    pub small: String,
    pub large: String,
}

impl Default for EndpointUrls {
    fn default() -> Self {
        Self {
            small: DEFAULT_SMALL_URL.into(),
            large: DEFAULT_LARGE_URL.into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct QuakeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for QuakeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl QuakeConfigLoader {
    /// Start with no sources; `load` alone yields the defaults plus env overrides.
    ///
    /// ```
    /// use quake_config::{QuakeConfigLoader, DEFAULT_SMALL_URL};
    ///
    /// let config = QuakeConfigLoader::new()
    ///     .with_yaml_str("use_large: true")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert!(config.use_large);
    /// assert_eq!(config.endpoints.small, DEFAULT_SMALL_URL);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skips a missing file.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use quake_config::QuakeConfigLoader;
    ///
    /// temp_env::with_var("QUAKE_FEED_HOST", Some("quakes.example.com"), || {
    ///     let config = QuakeConfigLoader::new()
    ///         .with_yaml_str(r#"
    /// endpoints:
    ///   small: "https://${QUAKE_FEED_HOST}/small.json"
    /// "#)
    ///         .load()
    ///         .expect("valid configuration");
    ///
    ///     assert_eq!(config.endpoints.small, "https://quakes.example.com/small.json");
    /// });
    /// ```
    pub fn load(self) -> Result<QuakeConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("QUAKE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
