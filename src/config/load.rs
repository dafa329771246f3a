//! Configuration loading from files and the environment.
//!
//! Sources are layered: serde defaults, then `config.yaml` (optional), then
//! `LIKHO_`-prefixed environment variables (`LIKHO_SITE__TITLE` -> `site.title`).

use std::path::Path;

use config::{Environment, File, FileFormat};

use super::{Config, ConfigError};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "LIKHO";

impl Config {
    /// Load the config from the command line argument, defaulting to `config.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load the config from a file path. A missing file yields the defaults.
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let layered = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = layered.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
