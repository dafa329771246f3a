//! Configuration loading and types for likho.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Layered loading and validation (`load`)

mod load;
mod types;

use std::path::{Path, PathBuf};

pub use types::{Config, MARKDOWN_EXTENSIONS, MarkdownConfig, SiteConfig, WatchConfig};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

// =============================================================================
// Path resolution
// =============================================================================

impl Config {
    /// Check the invariants the build relies on. Called once at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "'site.title' must not be empty".to_string(),
            ));
        }
        if !(self.site.base_url.starts_with("http://")
            || self.site.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "'site.base_url' must be an http(s) URL, got {:?}",
                self.site.base_url
            )));
        }
        if self.content.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "'content.posts_per_page' must be at least 1".to_string(),
            ));
        }
        if let Some(unknown) = self
            .markdown
            .extensions
            .iter()
            .find(|ext| !MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "unknown markdown extension '{unknown}' (expected one of: {})",
                MARKDOWN_EXTENSIONS.join(", ")
            )));
        }
        Ok(())
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve(&self, base_path: &Path, path: &Path) -> PathBuf {
        if path.is_relative() {
            base_path.join(path)
        } else {
            path.to_path_buf()
        }
    }

    pub fn posts_root(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.source_dir)
            .join(&self.content.posts_dir)
    }

    pub fn pages_root(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.source_dir)
            .join(&self.content.pages_dir)
    }

    pub fn images_root(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.source_dir)
            .join(&self.content.images_dir)
    }

    pub fn other_root(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.source_dir)
            .join(&self.content.other_dir)
    }

    pub fn output_dir(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.output_dir)
    }

    pub fn templates_dir(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.templates_dir)
    }

    pub fn assets_dir(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.content.assets_dir)
    }

    pub fn theme_dir(&self, base_path: &Path) -> PathBuf {
        self.resolve(base_path, &self.theme.path)
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
