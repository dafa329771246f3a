use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const THEME_FILE: &str = "theme.yaml";

/// Theme description loaded from `theme.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,

    /// Static files the theme ships, relative to its `static/` directory
    pub assets: ThemeAssets,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeAssets {
    pub css: Vec<String>,
    pub js: Vec<String>,
    pub images: Vec<String>,
}

/// One theme file to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeAsset {
    /// Absolute path inside the theme's `static/` directory
    pub source: PathBuf,
    /// Path relative to the output directory
    pub target: PathBuf,
}

impl ThemeManifest {
    /// Load the manifest from a theme directory.
    /// Returns the default (no assets) if the file doesn't exist.
    pub fn load(theme_path: &Path) -> Result<Self, ThemeError> {
        let manifest_path = theme_path.join(THEME_FILE);

        if !manifest_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| ThemeError::Io(manifest_path.clone(), e))?;

        // An empty file is a valid, empty manifest
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ThemeError::Parse(manifest_path, e))
    }

    /// Resolve the listed assets. `css/site.css` is read from
    /// `{theme}/static/css/site.css` and published as `css/site.css`;
    /// nested entries are flattened to their file name.
    pub fn asset_files(&self, theme_path: &Path) -> Vec<ThemeAsset> {
        let static_dir = theme_path.join("static");
        let groups = [
            ("css", &self.assets.css),
            ("js", &self.assets.js),
            ("images", &self.assets.images),
        ];

        groups
            .into_iter()
            .flat_map(|(kind, entries)| {
                let static_dir = &static_dir;
                entries.iter().filter_map(move |entry| {
                    let entry = entry.strip_prefix("static/").unwrap_or(entry);
                    if !stays_inside(Path::new(entry)) {
                        return None;
                    }
                    let file_name = Path::new(entry).file_name()?;
                    Some(ThemeAsset {
                        source: static_dir.join(entry),
                        target: Path::new(kind).join(file_name),
                    })
                })
            })
            .collect()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ThemeError {
    #[error("failed to read theme manifest {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse theme manifest {0}: {1}")]
    Parse(PathBuf, serde_yaml::Error),
}

/// Relative and free of `..`, so joining it onto the static dir cannot
/// leave the theme.
fn stays_inside(entry: &Path) -> bool {
    entry
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_means_no_assets() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ThemeManifest::load(dir.path()).unwrap();
        assert!(manifest.name.is_none());
        assert!(manifest.asset_files(dir.path()).is_empty());
    }

    #[test]
    fn test_load_manifest_and_resolve_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(THEME_FILE),
            r#"
name: paper
version: "1.0"
assets:
  css: ["static/css/paper.css"]
  js: ["js/menu.js"]
  images: ["images/icons/logo.svg"]
"#,
        )
        .unwrap();

        let manifest = ThemeManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("paper"));
        assert_eq!(manifest.version.as_deref(), Some("1.0"));

        let static_dir = dir.path().join("static");
        assert_eq!(
            manifest.asset_files(dir.path()),
            vec![
                ThemeAsset {
                    source: static_dir.join("css/paper.css"),
                    target: PathBuf::from("css/paper.css"),
                },
                ThemeAsset {
                    source: static_dir.join("js/menu.js"),
                    target: PathBuf::from("js/menu.js"),
                },
                ThemeAsset {
                    source: static_dir.join("images/icons/logo.svg"),
                    target: PathBuf::from("images/logo.svg"),
                },
            ]
        );
    }

    #[test]
    fn test_entries_outside_the_theme_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(THEME_FILE),
            r#"
assets:
  css: ["../../secret.css", "static/../../../etc/passwd", "/etc/hosts", "css/ok.css"]
"#,
        )
        .unwrap();

        let manifest = ThemeManifest::load(dir.path()).unwrap();
        assert_eq!(
            manifest.asset_files(dir.path()),
            vec![ThemeAsset {
                source: dir.path().join("static/css/ok.css"),
                target: PathBuf::from("css/ok.css"),
            }]
        );
    }

    #[test]
    fn test_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(THEME_FILE), "assets: [not, a, map]").unwrap();
        assert!(matches!(
            ThemeManifest::load(dir.path()),
            Err(ThemeError::Parse(..))
        ));
    }
}
