use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDateTime};
use walkdir::WalkDir;

use crate::config::Config;
use crate::logger::Logger;

use super::assets::{AssetCopier, AssetError};
use super::content::{ContentError, Page, Post};
use super::markdown::{MarkdownError, MarkdownRenderer};
use super::paths::{RSS_URL, SITEMAP_URL, url_to_output_path};
use super::plan::{PlanError, Planner, posts_by_date};
use super::render::{RenderError, Renderer, write_output};
use super::rss::{FeedError, RssFeed};
use super::sitemap::Sitemap;
use super::source::{self, ScanError};
use super::tags::TagIndex;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to clean output directory {path}: {source}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("markdown error: {0}")]
    Markdown(#[from] MarkdownError),

    #[error("plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Steps of a build, in order. A build that returns `Err` stopped after the
/// last stage it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Started,
    Clean,
    Scanned,
    Modeled,
    Rendered,
    FeedsWritten,
    AssetsCopied,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Clean => "clean",
            Self::Scanned => "scanned",
            Self::Modeled => "modeled",
            Self::Rendered => "rendered",
            Self::FeedsWritten => "feeds written",
            Self::AssetsCopied => "assets copied",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub posts: usize,
    pub pages: usize,
    pub tags: usize,
    /// HTML and XML files generated
    pub files_written: usize,
    pub assets_copied: usize,
    pub assets_skipped: usize,
}

pub struct Builder {
    config: Config,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
    log: Logger,
    live_reload: bool,
    /// Fixed build time; `None` reads the local clock
    now: Option<NaiveDateTime>,
}

impl Builder {
    pub fn new(config: Config, base_path: PathBuf, log: Logger) -> Self {
        Self {
            config,
            base_path,
            log,
            live_reload: false,
            now: None,
        }
    }

    /// Tell templates a live reload endpoint is available.
    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    /// Pin the build time used for the copyright year, the homepage
    /// `lastmod` and the future-post cutoff.
    #[cfg(test)]
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.base_path)
    }

    /// Run a full build. Stops at the first error; output written so far stays.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let mut stage = BuildStage::Started;
        let result = self.run(&mut stage);
        if let Err(e) = &result {
            self.log
                .error(format_args!("build failed after stage '{stage}': {e}"));
        }
        result
    }

    fn run(&self, stage: &mut BuildStage) -> Result<BuildResult, BuildError> {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        let output_dir = self.output_dir();

        // Clean
        let removed = clean_output_dir(&output_dir)?;
        self.log.info(format_args!(
            "cleaned {} ({} generated files removed)",
            output_dir.display(),
            removed
        ));
        self.advance(stage, BuildStage::Clean);

        // Scanned
        let post_files = source::scan_posts(&self.config.posts_root(&self.base_path))?;
        let page_files = match source::scan_pages(&self.config.pages_root(&self.base_path)) {
            Ok(files) => files,
            Err(ScanError::NotFound(path)) => {
                self.log.warn(format_args!(
                    "pages directory {} does not exist, building without pages",
                    path.display()
                ));
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        self.log.info(format_args!(
            "found {} post files and {} page files",
            post_files.len(),
            page_files.len()
        ));
        self.advance(stage, BuildStage::Scanned);

        // Modeled
        let markdown = MarkdownRenderer::new(&self.config.markdown)?;
        let mut posts = Vec::with_capacity(post_files.len());
        for path in &post_files {
            let post = Post::load(path)?;
            if self.is_published(&post, now) {
                posts.push(post);
            }
        }
        let pages = page_files
            .iter()
            .map(|path| Page::load(path, &markdown))
            .collect::<Result<Vec<_>, _>>()?;
        let tags = TagIndex::build(&posts);
        self.advance(stage, BuildStage::Modeled);

        // Rendered
        let renderer = Renderer::new(
            &self.config.templates_dir(&self.base_path),
            self.log.scoped("likho::render"),
        )?;
        let planner = Planner::new(&self.config, &markdown, now.year())
            .with_live_reload(self.live_reload);
        let outputs = planner.plan(&posts, &pages, &tags)?;
        for output in &outputs {
            let path = url_to_output_path(&output.url, &output_dir);
            renderer.render_to_file(output.template, &output.context, &path)?;
        }
        let mut files_written = outputs.len();
        self.log.info(format_args!("rendered {} pages", outputs.len()));
        self.advance(stage, BuildStage::Rendered);

        // FeedsWritten
        let by_date = posts_by_date(&posts);
        let mut sitemap = Sitemap::new(&self.config.site.base_url, now.date());
        let mut rss = RssFeed::new(&self.config.site);
        for post in &by_date {
            let url = planner.post_url(post);
            sitemap.push(&url, post.date.date());
            rss.push(&post.title, &url, &post.date, &post.content);
        }
        write_output(
            &url_to_output_path(SITEMAP_URL, &output_dir),
            sitemap.into_xml().as_bytes(),
        )?;
        write_output(
            &url_to_output_path(RSS_URL, &output_dir),
            rss.into_xml()?.as_bytes(),
        )?;
        files_written += 2;
        self.advance(stage, BuildStage::FeedsWritten);

        // AssetsCopied
        let assets = AssetCopier::new(
            &self.config,
            &self.base_path,
            self.log.scoped("likho::assets"),
        );
        let report = assets.copy_all(&output_dir)?;
        assets.run_css_command()?;
        self.advance(stage, BuildStage::AssetsCopied);

        self.advance(stage, BuildStage::Done);
        Ok(BuildResult {
            output_dir,
            posts: posts.len(),
            pages: pages.len(),
            tags: tags.len(),
            files_written,
            assets_copied: report.copied,
            assets_skipped: report.skipped,
        })
    }

    fn advance(&self, stage: &mut BuildStage, next: BuildStage) {
        self.log.debug(format_args!("build stage: {next}"));
        *stage = next;
    }

    /// Drafts and future-dated posts are left out unless the config says otherwise.
    fn is_published(&self, post: &Post, now: NaiveDateTime) -> bool {
        if post.draft && !self.config.build.drafts {
            self.log.info(format_args!(
                "skipping draft {}",
                post.source.display()
            ));
            return false;
        }
        if post.date > now && !self.config.build.future {
            self.log.info(format_args!(
                "skipping future post {} (dated {})",
                post.source.display(),
                post.date
            ));
            return false;
        }
        true
    }
}

/// Remove generated `.html` and `.xml` files under `output_dir`, or create it.
/// Returns the number of files removed.
fn clean_output_dir(output_dir: &Path) -> Result<usize, BuildError> {
    let clean_error = |source| BuildError::Clean {
        path: output_dir.to_path_buf(),
        source,
    };

    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir).map_err(clean_error)?;
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(output_dir) {
        let entry = entry.map_err(|e| clean_error(e.into()))?;
        let is_generated = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("html" | "xml")
        );
        if entry.file_type().is_file() && is_generated {
            std::fs::remove_file(entry.path()).map_err(clean_error)?;
            removed += 1;
        }
    }
    Ok(removed)
}
