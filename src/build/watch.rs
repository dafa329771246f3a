//! File watching for the preview server.
//!
//! Uses `notify-debouncer-full` to watch the content tree, templates,
//! the stylesheet, the theme and the config file. Every relevant change
//! triggers a full rebuild; the classification only feeds the log line.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::{Config, WatchConfig};

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// What kind of file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Config,
    Content { path: PathBuf, deleted: bool },
    Template { path: PathBuf },
    Asset { path: PathBuf },
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

/// Directories and files that feed a build.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub content_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub theme_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config_path: PathBuf,
}

impl WatchPaths {
    pub fn from_config(config: &Config, base_path: &Path, config_path: &Path) -> Self {
        Self {
            content_dir: canonical(config.resolve(base_path, &config.content.source_dir)),
            templates_dir: canonical(config.templates_dir(base_path)),
            assets_dir: canonical(config.assets_dir(base_path)),
            theme_dir: canonical(config.theme_dir(base_path)),
            output_dir: canonical(config.output_dir(base_path)),
            config_path: canonical(config_path.to_path_buf()),
        }
    }
}

/// Event paths come back canonical, so match against canonical roots.
fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

/// Classifies file paths into change types.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    paths: WatchPaths,
}

impl PathClassifier {
    pub fn new(paths: WatchPaths) -> Self {
        Self { paths }
    }

    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        let paths = &self.paths;

        // Our own output, when it lives under a watched directory
        if path.starts_with(&paths.output_dir) {
            return None;
        }

        if path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }

        if path == paths.config_path {
            return Some(ChangeKind::Config);
        }

        if path.starts_with(&paths.templates_dir) {
            return path
                .extension()
                .is_some_and(|e| e == "html")
                .then(|| ChangeKind::Template {
                    path: path.to_path_buf(),
                });
        }

        if path.starts_with(&paths.content_dir) {
            return Some(ChangeKind::Content {
                path: path.to_path_buf(),
                deleted,
            });
        }

        if path.starts_with(&paths.assets_dir) || path.starts_with(&paths.theme_dir) {
            return Some(ChangeKind::Asset {
                path: path.to_path_buf(),
            });
        }

        None
    }
}

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    pub fn new(config: &WatchConfig, classifier: PathClassifier) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);
        let paths = classifier.paths.clone();

        let (tx, rx) = mpsc::channel();

        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let changes: Vec<ChangeKind> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .filter_map(|event| {
                        let deleted = matches!(event.kind, EventKind::Remove(_));
                        event
                            .paths
                            .first()
                            .and_then(|p| classifier.classify(p, deleted))
                    })
                    .collect();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;
            add_watch_paths(&mut debouncer, &paths)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;
            add_watch_paths(&mut debouncer, &paths)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

fn add_watch_paths<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    paths: &WatchPaths,
) -> Result<(), WatchError> {
    for dir in [
        &paths.content_dir,
        &paths.templates_dir,
        &paths.assets_dir,
        &paths.theme_dir,
    ] {
        if dir.exists() {
            debouncer.watch(dir, RecursiveMode::Recursive)?;
        }
    }

    // The config file is replaced rather than edited by some editors
    if let Some(parent) = paths.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }

    Ok(())
}

fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PathClassifier {
        let mut config = Config::default();
        config.content.output_dir = PathBuf::from("content/public");
        // Nonexistent paths are kept as given
        let base = Path::new("/nonexistent/site");
        PathClassifier::new(WatchPaths::from_config(
            &config,
            base,
            &base.join("config.yaml"),
        ))
    }

    #[test]
    fn test_classify_by_location() {
        let c = classifier();
        let base = Path::new("/nonexistent/site");

        assert_eq!(
            c.classify(&base.join("config.yaml"), false),
            Some(ChangeKind::Config)
        );
        assert_eq!(
            c.classify(&base.join("content/posts/2024/hello.md"), true),
            Some(ChangeKind::Content {
                path: base.join("content/posts/2024/hello.md"),
                deleted: true,
            })
        );
        assert_eq!(
            c.classify(&base.join("content/images/cat.png"), false),
            Some(ChangeKind::Content {
                path: base.join("content/images/cat.png"),
                deleted: false,
            })
        );
        assert_eq!(
            c.classify(&base.join("templates/post.html"), false),
            Some(ChangeKind::Template {
                path: base.join("templates/post.html"),
            })
        );
        assert_eq!(
            c.classify(&base.join("assets/main.css"), false),
            Some(ChangeKind::Asset {
                path: base.join("assets/main.css"),
            })
        );
        assert_eq!(
            c.classify(&base.join("themes/default/theme.yaml"), false),
            Some(ChangeKind::Asset {
                path: base.join("themes/default/theme.yaml"),
            })
        );
    }

    #[test]
    fn test_ignored_paths() {
        let c = classifier();
        let base = Path::new("/nonexistent/site");

        assert_eq!(c.classify(&base.join("content/public/index.html"), false), None);
        assert_eq!(c.classify(&base.join("content/posts/.hello.md.swp"), false), None);
        assert_eq!(c.classify(&base.join("templates/notes.txt"), false), None);
        assert_eq!(c.classify(&base.join("README.md"), false), None);
    }
}
