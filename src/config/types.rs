//! Configuration type definitions.
//!
//! This module contains all the data structures used in `config.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// Complete site configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub theme: ThemeConfig,
    pub build: BuildConfig,
    pub server: ServerConfig,
    pub markdown: MarkdownConfig,
    /// Development-specific settings (watch mode, live reload)
    pub dev: DevConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    /// Absolute URL the site is published under, used by the sitemap and feed
    pub base_url: String,
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: "A blog about technology and programming".to_string(),
            base_url: "http://localhost:8080".to_string(),
            language: "en".to_string(),
        }
    }
}

// =============================================================================
// Content layout
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root of the authored content
    pub source_dir: PathBuf,
    /// Posts root, relative to `source_dir`. Holds `{date-folder}/{slug}.md`
    pub posts_dir: PathBuf,
    /// Pages root, relative to `source_dir`. Holds `{slug}.md`
    pub pages_dir: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    /// Holds `main.css`
    pub assets_dir: PathBuf,
    /// Image directory, relative to `source_dir`; published at `/images/`
    pub images_dir: PathBuf,
    /// Downloadable files, relative to `source_dir`; published at `/other/`
    pub other_dir: PathBuf,
    /// Number of posts shown on the home page
    pub posts_per_page: usize,
    /// Output subdirectory for single posts. Empty means the output root.
    pub post_output_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("content"),
            posts_dir: PathBuf::from("posts"),
            pages_dir: PathBuf::from("pages"),
            output_dir: PathBuf::from("public"),
            templates_dir: PathBuf::from("templates"),
            assets_dir: PathBuf::from("assets"),
            images_dir: PathBuf::from("images"),
            other_dir: PathBuf::from("other"),
            posts_per_page: 10,
            post_output_dir: "posts".to_string(),
        }
    }
}

// =============================================================================
// Theme configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    /// Theme directory; its `theme.yaml` lists static assets to publish
    pub path: PathBuf,
    /// Arbitrary settings passed to templates as `theme.*`
    pub settings: serde_json::Value,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            path: PathBuf::from("themes/default"),
            settings: serde_json::Value::Object(Default::default()),
        }
    }
}

// =============================================================================
// Build configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Publish posts marked `draft: true`
    pub drafts: bool,
    /// Publish posts dated after the build time
    pub future: bool,
    /// Shell command run after assets are copied (e.g. a Tailwind build)
    pub css_command: Option<String>,
}

// =============================================================================
// Preview server
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    pub extensions: Vec<String>,
    /// Add `target="_blank"` to links pointing at other sites
    pub external_links_new_tab: bool,
}

/// Extension names accepted in `markdown.extensions`.
pub const MARKDOWN_EXTENSIONS: &[&str] = &[
    "definition_lists",
    "footnotes",
    "gfm",
    "heading_attributes",
    "strikethrough",
    "tables",
    "tasklists",
];

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "footnotes".to_string(),
                "strikethrough".to_string(),
                "tables".to_string(),
                "tasklists".to_string(),
                "heading_attributes".to_string(),
            ],
            external_links_new_tab: true,
        }
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// File watching configuration
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: 500,
            debounce_ms: 100,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter string, e.g. `info` or `likho=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
