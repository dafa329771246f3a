//! `likho create post|page`: scaffold a content file with front matter.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use super::Site;
use crate::build::front_matter::{
    FrontMatterError, PageMeta, PostMeta, SHORT_DATE_FORMAT, format_long_date,
    render_front_matter,
};
use crate::build::paths::urlize;
use crate::config::Config;
use crate::{CreatePageArgs, CreatePostArgs};

const PLACEHOLDER_BODY: &str = "\nYour content here.\n";

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("title {0:?} has no characters usable in a file name")]
    EmptySlug(String),

    #[error("{0} already exists")]
    Exists(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render front matter: {0}")]
    FrontMatter(#[from] FrontMatterError),
}

pub fn post(site: &Site, args: &CreatePostArgs) -> Result<(), anyhow::Error> {
    let path = create_post(
        &site.config,
        &site.base_path,
        args,
        Local::now().naive_local(),
    )?;
    println!("Created post {}", path.display());
    Ok(())
}

pub fn page(site: &Site, args: &CreatePageArgs) -> Result<(), anyhow::Error> {
    let path = create_page(
        &site.config,
        &site.base_path,
        args,
        Local::now().naive_local(),
    )?;
    println!("Created page {}", path.display());
    Ok(())
}

/// Write a draft post to `{posts_root}/{YYYY-MM-DD}/{urlize(title)}.md`.
pub fn create_post(
    config: &Config,
    base_path: &Path,
    args: &CreatePostArgs,
    now: NaiveDateTime,
) -> Result<PathBuf, CreateError> {
    let slug = slug_for(&args.title)?;
    let folder = now.format(SHORT_DATE_FORMAT).to_string();
    let path = config
        .posts_root(base_path)
        .join(folder)
        .join(format!("{slug}.md"));

    let meta = PostMeta {
        title: args.title.clone(),
        description: args.description.clone(),
        date: format_long_date(&now),
        tags: split_tags(args.tags.as_deref()),
        featured_image: args.image.clone(),
        draft: true,
    };

    write_new(&path, &render_front_matter(&meta)?)?;
    Ok(path)
}

/// Write a page to `{pages_root}/{urlize(title)}.md`.
pub fn create_page(
    config: &Config,
    base_path: &Path,
    args: &CreatePageArgs,
    now: NaiveDateTime,
) -> Result<PathBuf, CreateError> {
    let slug = slug_for(&args.title)?;
    let path = config.pages_root(base_path).join(format!("{slug}.md"));

    let meta = PageMeta {
        title: args.title.clone(),
        date: Some(now.format(SHORT_DATE_FORMAT).to_string()),
        description: args.description.clone(),
        featured_image: args.image.clone(),
    };

    write_new(&path, &render_front_matter(&meta)?)?;
    Ok(path)
}

fn slug_for(title: &str) -> Result<String, CreateError> {
    let slug = urlize(title);
    if slug.trim_matches('-').is_empty() {
        return Err(CreateError::EmptySlug(title.to_string()));
    }
    Ok(slug)
}

fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn write_new(path: &Path, front_matter: &str) -> Result<(), CreateError> {
    if path.exists() {
        return Err(CreateError::Exists(path.to_path_buf()));
    }
    let write_error = |source| CreateError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, format!("{front_matter}{PLACEHOLDER_BODY}")).map_err(write_error)
}
