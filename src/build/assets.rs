//! Static asset publishing and the optional CSS build step.
//!
//! A missing source is never fatal: it is logged and counted as skipped.
//! Any other I/O failure aborts the build.

use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use super::paths::{IMAGES_URL_DIR, OTHER_URL_DIR};
use crate::config::Config;
use crate::logger::Logger;
use crate::theme::{ThemeError, ThemeManifest};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("asset source does not exist: {0}")]
    Missing(PathBuf),

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("failed to run css command `{command}`: {source}")]
    CssCommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("css command `{command}` failed with {status}")]
    CssCommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },
}

/// What to copy, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AssetJob {
    Dir { from: PathBuf, to: PathBuf },
    File { from: PathBuf, to: PathBuf },
}

impl AssetJob {
    fn source(&self) -> &Path {
        match self {
            Self::Dir { from, .. } | Self::File { from, .. } => from,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// Files copied
    pub copied: usize,
    /// Sources that did not exist
    pub skipped: usize,
}

pub struct AssetCopier<'a> {
    config: &'a Config,
    base_path: &'a Path,
    log: Logger,
}

impl<'a> AssetCopier<'a> {
    pub fn new(config: &'a Config, base_path: &'a Path, log: Logger) -> Self {
        Self {
            config,
            base_path,
            log,
        }
    }

    /// Copy images, downloads, the site stylesheet and theme assets into `output_dir`.
    pub fn copy_all(&self, output_dir: &Path) -> Result<AssetReport, AssetError> {
        let mut report = AssetReport::default();

        for job in self.jobs(output_dir)? {
            match self.run_job(&job) {
                Ok(copied) => report.copied += copied,
                Err(AssetError::Missing(path)) => {
                    self.log
                        .warn(format_args!("skipping missing asset {}", path.display()));
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.log.info(format_args!(
            "copied {} asset files ({} missing sources skipped)",
            report.copied, report.skipped
        ));
        Ok(report)
    }

    fn jobs(&self, output_dir: &Path) -> Result<Vec<AssetJob>, AssetError> {
        let config = self.config;
        let base = self.base_path;

        let mut jobs = vec![
            AssetJob::Dir {
                from: config.images_root(base),
                to: output_dir.join(IMAGES_URL_DIR),
            },
            AssetJob::Dir {
                from: config.other_root(base),
                to: output_dir.join(OTHER_URL_DIR),
            },
            AssetJob::File {
                from: config.assets_dir(base).join("main.css"),
                to: output_dir.join("main.css"),
            },
        ];

        let theme_dir = config.theme_dir(base);
        let manifest = ThemeManifest::load(&theme_dir)?;
        jobs.extend(
            manifest
                .asset_files(&theme_dir)
                .into_iter()
                .map(|asset| AssetJob::File {
                    from: asset.source,
                    to: output_dir.join(asset.target),
                }),
        );

        Ok(jobs)
    }

    fn run_job(&self, job: &AssetJob) -> Result<usize, AssetError> {
        if !job.source().exists() {
            return Err(AssetError::Missing(job.source().to_path_buf()));
        }
        match job {
            AssetJob::File { from, to } => copy_file(from, to).map(|()| 1),
            AssetJob::Dir { from, to } => copy_dir(from, to),
        }
    }

    /// Run `build.css_command` through `sh -c` in the site directory.
    pub fn run_css_command(&self) -> Result<(), AssetError> {
        let Some(command) = self.config.build.css_command.as_deref() else {
            return Ok(());
        };

        let dir = if self.base_path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.base_path
        };

        self.log.info(format_args!("running css command: {command}"));
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(dir)
            .status()
            .map_err(|source| AssetError::CssCommandSpawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(AssetError::CssCommandFailed {
                command: command.to_string(),
                status,
            });
        }
        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), AssetError> {
    let copy_error = |source| AssetError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(copy_error)?;
    }
    std::fs::copy(from, to).map_err(copy_error)?;
    Ok(())
}

/// Recursively copy a directory, skipping hidden entries. Returns the file count.
fn copy_dir(from: &Path, to: &Path) -> Result<usize, AssetError> {
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: from.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Entries always live under `from`
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        copy_file(entry.path(), &to.join(relative))?;
        copied += 1;
    }

    Ok(copied)
}
