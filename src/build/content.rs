//! In-memory posts and pages built from content files.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use super::front_matter::{self, FrontMatterError, PageMeta, PostMeta};
use super::markdown::MarkdownRenderer;
use super::paths::normalize_asset_paths;

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
}

// =============================================================================
// Post
// =============================================================================

/// A blog post. `content` is Markdown with asset paths already normalized.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDateTime,
    /// As authored: order kept, duplicates kept.
    pub tags: Vec<String>,
    pub content: String,
    /// Name of the date folder holding the file.
    pub slug: String,
    pub featured_image: Option<String>,
    #[serde(skip)]
    pub draft: bool,
    #[serde(skip)]
    pub source: PathBuf,
}

impl Post {
    /// Build a post from an already-read file.
    pub fn from_source(path: &Path, raw: &str) -> Result<Self, ContentError> {
        let with_path = |source| ContentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        };

        let (meta, body): (PostMeta, _) = front_matter::parse(raw).map_err(with_path)?;
        let date = front_matter::parse_date(&meta.date).map_err(with_path)?;

        Ok(Self {
            title: meta.title,
            description: meta.description.unwrap_or_default(),
            date,
            tags: meta.tags,
            content: normalize_asset_paths(body),
            slug: parent_dir_name(path),
            featured_image: meta.featured_image,
            draft: meta.draft,
            source: path.to_path_buf(),
        })
    }

    /// Read and build a post file.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let raw = read_source(path)?;
        Self::from_source(path, &raw)
    }
}

// =============================================================================
// Page
// =============================================================================

/// A standalone page. `content` is HTML.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    #[serde(serialize_with = "serialize_optional_date")]
    pub date: Option<NaiveDateTime>,
    pub description: String,
    pub featured_image: Option<String>,
    pub content: String,
    /// File name without extension.
    pub slug: String,
    #[serde(skip)]
    pub source: PathBuf,
}

impl Page {
    pub fn from_source(
        path: &Path,
        raw: &str,
        markdown: &MarkdownRenderer,
    ) -> Result<Self, ContentError> {
        let with_path = |source| ContentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        };

        let (meta, body): (PageMeta, _) = front_matter::parse(raw).map_err(with_path)?;
        let date = meta
            .date
            .as_deref()
            .map(front_matter::parse_date)
            .transpose()
            .map_err(with_path)?;

        Ok(Self {
            title: meta.title,
            date,
            description: meta.description.unwrap_or_default(),
            featured_image: meta.featured_image,
            content: markdown.render(&normalize_asset_paths(body)),
            slug: file_stem(path),
            source: path.to_path_buf(),
        })
    }

    pub fn load(path: &Path, markdown: &MarkdownRenderer) -> Result<Self, ContentError> {
        let raw = read_source(path)?;
        Self::from_source(path, &raw, markdown)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn read_source(path: &Path) -> Result<String, ContentError> {
    std::fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir_name(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `YYYY-MM-DD` in templates and feeds.
pub fn display_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn serialize_date<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&display_date(date))
}

fn serialize_optional_date<S: Serializer>(
    date: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&display_date(date)),
        None => serializer.serialize_none(),
    }
}
