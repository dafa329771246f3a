mod assets;
mod builder;
mod content;
pub mod front_matter;
mod markdown;
pub mod paths;
mod plan;
mod render;
mod rss;
mod sitemap;
mod source;
mod tags;
mod watch;

pub use builder::{BuildResult, Builder};
pub use watch::{ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths};
