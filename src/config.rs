use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Output switches for the driver, read from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub show_tokens: bool,
    pub show_trees: bool,
    pub show_values: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debug: false,
            show_tokens: false,
            show_trees: false,
            show_values: true,
        }
    }
}

impl Config {
    /// Loads the file at `path`, or at [`Config::get_config_path`] when no
    /// path is given. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config_path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::get_config_path(), env::var_os("HORIZON_CONFIG").is_some()),
        };

        if !explicit && !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })
    }

    pub fn get_config_path() -> PathBuf {
        if let Some(custom) = env::var_os("HORIZON_CONFIG") {
            return PathBuf::from(custom);
        }

        let home = if cfg!(windows) {
            env::var("USERPROFILE")
        } else {
            env::var("HOME")
        };
        PathBuf::from(home.unwrap_or_else(|_| String::from(".")))
            .join(".horizon")
            .join("config.json")
    }

    /// Applies `HORIZON_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut bool); 4] = [
            ("HORIZON_DEBUG", &mut self.debug),
            ("HORIZON_SHOW_TOKENS", &mut self.show_tokens),
            ("HORIZON_SHOW_TREES", &mut self.show_trees),
            ("HORIZON_SHOW_VALUES", &mut self.show_values),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key).as_deref().and_then(parse_flag) {
                *field = value;
            }
        }
    }

    /// Command line switches can only turn options on.
    pub fn enable(&mut self, debug: bool, show_tokens: bool, show_trees: bool, show_values: bool) {
        self.debug |= debug;
        self.show_tokens |= show_tokens;
        self.show_trees |= show_trees;
        self.show_values |= show_values;
    }

    pub fn dump_tokens(&self) -> bool {
        self.debug || self.show_tokens
    }

    pub fn dump_trees(&self) -> bool {
        self.debug || self.show_trees
    }

    pub fn dump_values(&self) -> bool {
        self.debug || self.show_values
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
