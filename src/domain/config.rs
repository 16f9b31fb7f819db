use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{BaselineFilter, BaselineImpact, catalog::DEFAULT_CATALOG_NAME},
    source::Source,
};

/// The published location of the SP 800-53 rev. 4 control catalog.
pub const DEFAULT_SOURCE: &str =
    "http://nvd.nist.gov/static/feeds/xml/sp80053/rev4/800-53-controls.xml";

/// Configuration for a catalog conversion run.
///
/// The default configuration fetches the published catalog, names the output
/// `NIST-800-53` and applies no baseline filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Where the source document is read from.
    pub source: Source,

    /// The name written at the top of the output catalog.
    pub catalog_name: String,

    /// If set, only controls and enhancements tagged with this baseline are
    /// extracted.
    pub baseline: Option<BaselineImpact>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: default_source(),
            catalog_name: default_catalog_name(),
            baseline: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The baseline filter implied by this configuration.
    #[must_use]
    pub fn filter(&self) -> BaselineFilter {
        self.baseline.clone().into()
    }
}

/// Errors that can occur when loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file")]
    Io(#[from] io::Error),

    /// The file is not valid configuration TOML.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

fn default_source() -> Source {
    Source::from(DEFAULT_SOURCE)
}

fn default_catalog_name() -> String {
    DEFAULT_CATALOG_NAME.to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// A URL (`http://` or `https://`) or a local file path.
        #[serde(default = "default_source")]
        source: Source,

        #[serde(default = "default_catalog_name")]
        catalog_name: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        baseline: Option<BaselineImpact>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                source,
                catalog_name,
                baseline,
            } => Self {
                source,
                catalog_name,
                baseline,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            source: config.source,
            catalog_name: config.catalog_name,
            baseline: config.baseline,
        }
    }
}
