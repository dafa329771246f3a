//! Path and URL conversion utilities.
//!
//! This module handles conversions between:
//! - Titles, tags and slugs (the names authors write)
//! - URL paths (the URL at which content will be served)
//! - Output file paths (where files are written in the output directory)
//!
//! Every link the site emits and every file the build writes goes through the
//! same functions here, so a link to an entity always matches its file.

use std::path::{Path, PathBuf};

pub const INDEX_URL: &str = "/index.html";
pub const POSTS_URL: &str = "/posts.html";
pub const SITEMAP_URL: &str = "/sitemap.xml";
pub const RSS_URL: &str = "/rss.xml";

/// Public URL prefixes of the asset directories body text may reference.
pub const IMAGES_URL_DIR: &str = "images";
pub const OTHER_URL_DIR: &str = "other";

/// Normalize a string for use in URLs and file names.
///
/// Lowercases, turns spaces into hyphens, then drops everything that is not
/// `[a-z0-9-]`.
///
/// # Examples
/// ```ignore
/// urlize("My Test Post!") => "my-test-post"
/// urlize("C++ & Rust")    => "c--rust"
/// ```
pub fn urlize(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Keep only letters, digits, `-`, `_` and `.` in a file name.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// File name of a single post: `urlize(title)-slug.html`, sanitized.
pub fn post_file_name(title: &str, slug: &str) -> String {
    let slug = slug.to_lowercase().replace(' ', "-");
    sanitize_file_name(&format!("{}-{}.html", urlize(title), slug))
}

/// URL path of a single post.
///
/// # Examples
/// ```ignore
/// post_url("posts", "My Test Post!", "abc") => "/posts/my-test-post-abc.html"
/// post_url("", "My Test Post!", "abc")      => "/my-test-post-abc.html"
/// ```
pub fn post_url(post_output_dir: &str, title: &str, slug: &str) -> String {
    let dir = post_output_dir.trim_matches('/');
    let file = post_file_name(title, slug);
    if dir.is_empty() {
        format!("/{file}")
    } else {
        format!("/{dir}/{file}")
    }
}

pub fn page_url(slug: &str) -> String {
    format!("/pages/{}", sanitize_file_name(&format!("{slug}.html")))
}

pub fn tag_url(tag: &str) -> String {
    format!("/tags/{}.html", urlize(tag))
}

/// Join the configured base URL and a site-absolute URL path.
pub fn absolute_url(base_url: &str, url_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url_path.trim_start_matches('/')
    )
}

/// Convert a URL path to an output file path.
///
/// # Examples
/// ```ignore
/// url_to_output_path("/posts/a.html", output_dir) => output_dir/posts/a.html
/// url_to_output_path("/", output_dir)             => output_dir/index.html
/// ```
pub fn url_to_output_path(url_path: &str, output_dir: &Path) -> PathBuf {
    let url_path = url_path.trim_start_matches('/');
    if url_path.is_empty() {
        output_dir.join("index.html")
    } else {
        url_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(output_dir.to_path_buf(), |path, segment| path.join(segment))
    }
}

// =============================================================================
// Body asset references
// =============================================================================

/// Rewrite relative asset references in body text to site-absolute ones.
///
/// Handles Markdown link targets (`](images/`), inline HTML `src="` and
/// `href="` attributes, each with a bare, `./` or `../` prefix, for the
/// `images/` and `other/` directories. Image embeds whose target is a bare
/// file name (`![alt](pic.png)`) are pointed at `/images/`.
///
/// This works on raw text and does not parse Markdown.
pub fn normalize_asset_paths(body: &str) -> String {
    let mut out = body.to_string();
    for dir in [IMAGES_URL_DIR, OTHER_URL_DIR] {
        for opener in ["](", "src=\"", "href=\""] {
            for prefix in ["../", "./", ""] {
                let from = format!("{opener}{prefix}{dir}/");
                if out.contains(&from) {
                    out = out.replace(&from, &format!("{opener}/{dir}/"));
                }
            }
        }
    }
    rewrite_bare_image_embeds(&out)
}

/// `![alt](pic.png)` -> `![alt](/images/pic.png)`.
fn rewrite_bare_image_embeds(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find("![") {
        let (before, candidate) = rest.split_at(start);
        out.push_str(before);

        // The alt text ends at the first `](` on the same line
        let Some(close) = candidate.find("](").filter(|&i| !candidate[..i].contains('\n'))
        else {
            out.push_str("![");
            rest = &candidate[2..];
            continue;
        };
        let target_start = close + 2;
        let Some(target_len) = candidate[target_start..]
            .find(')')
            .filter(|&i| !candidate[target_start..target_start + i].contains('\n'))
        else {
            out.push_str("![");
            rest = &candidate[2..];
            continue;
        };
        let target = &candidate[target_start..target_start + target_len];

        out.push_str(&candidate[..target_start]);
        if is_bare_file_name(target) {
            out.push('/');
            out.push_str(IMAGES_URL_DIR);
            out.push('/');
        }
        out.push_str(target);
        out.push(')');
        rest = &candidate[target_start + target_len + 1..];
    }

    out.push_str(rest);
    out
}

fn is_bare_file_name(target: &str) -> bool {
    !target.is_empty()
        && target.contains('.')
        && !target.contains(['/', ':', '#', '?'])
        && !target.contains(char::is_whitespace)
}
