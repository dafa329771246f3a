//! Decides what gets rendered: one [`PlannedOutput`] per HTML file.
//!
//! Planning is pure. It turns the content model into a list of
//! `(template, url, context)` triples in render order:
//! index, every post, every page, the all-posts listing, every tag page.

use std::collections::HashMap;

use serde::Serialize;

use super::content::{Page, Post};
use super::markdown::MarkdownRenderer;
use super::paths::{self, INDEX_URL, POSTS_URL};
use super::tags::TagIndex;
use crate::config::Config;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const PAGE_TEMPLATE: &str = "page.html";
pub const POSTS_TEMPLATE: &str = "posts.html";
pub const TAG_TEMPLATE: &str = "tag.html";

#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    #[error("{first} and {second} both render to {url}")]
    DuplicateOutput {
        url: String,
        first: String,
        second: String,
    },
}

// =============================================================================
// Render context
// =============================================================================

/// Site-wide values shared by every output.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext<'a> {
    pub site_title: &'a str,
    pub site_description: &'a str,
    pub base_url: &'a str,
    pub language: &'a str,
    pub current_year: i32,
    /// Theme settings from config, accessible as `theme.*` in templates
    pub theme: &'a serde_json::Value,
    pub live_reload: bool,
}

/// Data handed to one template execution.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    #[serde(flatten)]
    pub site: SiteContext<'a>,
    pub page_title: String,
    /// HTML body
    pub content: String,
    pub posts: Vec<PostView<'a>>,
    /// Every page, for navigation
    pub pages: Vec<PageView<'a>>,
    pub total_posts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView<'a> {
    #[serde(flatten)]
    pub post: &'a Post,
    pub url: String,
    pub tag_links: Vec<TagLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView<'a> {
    #[serde(flatten)]
    pub page: &'a Page,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

impl TagLink {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: paths::tag_url(name),
        }
    }
}

/// One HTML file to render.
#[derive(Debug, Clone)]
pub struct PlannedOutput<'a> {
    pub template: &'static str,
    /// Site-absolute URL; also decides the output file.
    pub url: String,
    /// What produced this output, for error messages.
    pub origin: String,
    pub context: RenderContext<'a>,
}

// =============================================================================
// Planner
// =============================================================================

pub struct Planner<'a> {
    config: &'a Config,
    markdown: &'a MarkdownRenderer,
    current_year: i32,
    live_reload: bool,
}

impl<'a> Planner<'a> {
    pub fn new(config: &'a Config, markdown: &'a MarkdownRenderer, current_year: i32) -> Self {
        Self {
            config,
            markdown,
            current_year,
            live_reload: false,
        }
    }

    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    /// URL of a post under the configured layout.
    pub fn post_url(&self, post: &Post) -> String {
        paths::post_url(&self.config.content.post_output_dir, &post.title, &post.slug)
    }

    /// Plan every HTML output.
    pub fn plan(
        &self,
        posts: &'a [Post],
        pages: &'a [Page],
        tags: &TagIndex<'a>,
    ) -> Result<Vec<PlannedOutput<'a>>, PlanError> {
        let by_date = posts_by_date(posts);
        let nav: Vec<PageView<'a>> = pages.iter().map(|p| self.page_view(p)).collect();
        let total_posts = posts.len();

        let mut outputs = Vec::with_capacity(2 + posts.len() + pages.len() + tags.len());

        // Index: the most recent posts
        let recent = by_date
            .iter()
            .take(self.config.content.posts_per_page)
            .map(|&p| self.post_view(p))
            .collect();
        outputs.push(PlannedOutput {
            template: INDEX_TEMPLATE,
            url: INDEX_URL.to_string(),
            origin: "index".to_string(),
            context: self.context("Latest", String::new(), recent, &nav, total_posts),
        });

        for post in posts {
            let mut context = self.context(
                &post.title,
                self.markdown.render(&post.content),
                Vec::new(),
                &nav,
                total_posts,
            );
            let view = self.post_view(post);
            let url = view.url.clone();
            context.post = Some(view);
            outputs.push(PlannedOutput {
                template: POST_TEMPLATE,
                url,
                origin: format!("post {}", post.source.display()),
                context,
            });
        }

        for page in pages {
            let mut context =
                self.context(&page.title, page.content.clone(), Vec::new(), &nav, total_posts);
            let view = self.page_view(page);
            let url = view.url.clone();
            context.page = Some(view);
            outputs.push(PlannedOutput {
                template: PAGE_TEMPLATE,
                url,
                origin: format!("page {}", page.source.display()),
                context,
            });
        }

        let all = by_date.iter().map(|&p| self.post_view(p)).collect();
        outputs.push(PlannedOutput {
            template: POSTS_TEMPLATE,
            url: POSTS_URL.to_string(),
            origin: "posts listing".to_string(),
            context: self.context("Posts", String::new(), all, &nav, total_posts),
        });

        for (tag, bucket) in tags.iter() {
            let tagged = bucket.iter().map(|&p| self.post_view(p)).collect();
            let mut context = self.context(
                &format!("Posts tagged with {tag}"),
                String::new(),
                tagged,
                &nav,
                total_posts,
            );
            let link = TagLink::new(tag);
            let url = link.url.clone();
            context.tag = Some(link);
            outputs.push(PlannedOutput {
                template: TAG_TEMPLATE,
                url,
                origin: format!("tag '{tag}'"),
                context,
            });
        }

        check_unique_urls(&outputs)?;
        Ok(outputs)
    }

    fn context(
        &self,
        page_title: &str,
        content: String,
        posts: Vec<PostView<'a>>,
        nav: &[PageView<'a>],
        total_posts: usize,
    ) -> RenderContext<'a> {
        RenderContext {
            site: self.site_context(),
            page_title: page_title.to_string(),
            content,
            posts,
            pages: nav.to_vec(),
            total_posts,
            post: None,
            page: None,
            tag: None,
        }
    }

    fn site_context(&self) -> SiteContext<'a> {
        let site = &self.config.site;
        SiteContext {
            site_title: &site.title,
            site_description: &site.description,
            base_url: &site.base_url,
            language: &site.language,
            current_year: self.current_year,
            theme: &self.config.theme.settings,
            live_reload: self.live_reload,
        }
    }

    fn post_view(&self, post: &'a Post) -> PostView<'a> {
        PostView {
            post,
            url: self.post_url(post),
            tag_links: post.tags.iter().map(|t| TagLink::new(t)).collect(),
        }
    }

    fn page_view(&self, page: &'a Page) -> PageView<'a> {
        PageView {
            page,
            url: paths::page_url(&page.slug),
        }
    }
}

/// Posts newest first. Posts sharing a date keep their scan order.
pub fn posts_by_date(posts: &[Post]) -> Vec<&Post> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

fn check_unique_urls(outputs: &[PlannedOutput<'_>]) -> Result<(), PlanError> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(outputs.len());
    for output in outputs {
        if let Some(first) = seen.insert(&output.url, &output.origin) {
            return Err(PlanError::DuplicateOutput {
                url: output.url.clone(),
                first: first.to_string(),
                second: output.origin.clone(),
            });
        }
    }
    Ok(())
}
