pub mod create;
pub mod generate;
pub mod serve;

use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError, base_path_from_config};

/// A loaded config together with where it came from.
#[derive(Debug, Clone)]
pub struct Site {
    pub config: Config,
    /// Absolute path of the config file (which need not exist)
    pub config_path: PathBuf,
    /// Directory relative config paths resolve against
    pub base_path: PathBuf,
}

impl Site {
    pub fn load(config_file: &Path) -> Result<Self, ConfigError> {
        let config_path = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let config = Config::load_from_arg(Some(config_path.as_path()))?;
        let base_path = base_path_from_config(&config_path);

        Ok(Self {
            config,
            config_path,
            base_path,
        })
    }
}
