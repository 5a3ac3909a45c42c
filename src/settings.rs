//! Back-office settings

use serde::{Deserialize, Serialize};

use crate::documents::DocumentPolicy;

/// Settings for the back office
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackOfficeConfig {
    /// Bill document upload policy
    #[serde(default)]
    pub documents: DocumentPolicy,
    /// Closing entry settings
    #[serde(default)]
    pub closing: ClosingConfig,
}

/// Closing entry settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosingConfig {
    /// Reject a second closing entry for the same branch and date.
    /// Off by default: branches have been allowed to resubmit a day.
    #[serde(default)]
    pub unique_per_branch_day: bool,
}

impl BackOfficeConfig {
    /// Loads configuration from `config/backoffice.toml` and the environment.
    ///
    /// Both sources are optional; environment variables use the
    /// `BACKOFFICE__` prefix, e.g. `BACKOFFICE__DOCUMENTS__MAX_SIZE`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/backoffice").required(false))
            .add_source(
                config::Environment::with_prefix("BACKOFFICE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
