use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the task tree is stored
    pub tree_path: PathBuf,
    pub list: ListConfig,
}

/// Settings for `list` and `recur preview` output
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ListConfig {
    /// Append "(+N hidden)" to tasks whose children were filtered out
    pub show_hidden_counts: bool,
    /// Occurrences shown by `recur preview` without `--count`
    pub preview_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_path: PathBuf::from("arbor.json"),
            list: ListConfig::default(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            show_hidden_counts: true,
            preview_count: 5,
        }
    }
}

impl Config {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("arbor.toml"))
            .merge(Env::prefixed("ARBOR_").split("__"))
    }

    /// Reads `arbor.toml` and `ARBOR_*` variables on top of the defaults.
    /// A config that cannot be read is reported and replaced by the defaults.
    pub fn load() -> Self {
        match Self::figment().extract() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable configuration, using defaults");
                Config::default()
            }
        }
    }
}
