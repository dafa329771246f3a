//! Shared test utilities: throwaway sites on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_support::*;
//!
//! let site = SiteFixture::new();
//! site.post("2024-09-12", "hello", "Hello", "2024-09-12", &["rust"]);
//! site.page("about", "About");
//!
//! let builder = Builder::new(site.config.clone(), site.root().to_path_buf(), log);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::Config;

// =========================================================================
// Templates
// =========================================================================

pub const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ language }}">
<head><title>{{ page_title }} | {{ site_title }}</title></head>
<body>
<nav>{% for p in pages %}<a href="{{ p.url | safe }}">{{ p.title }}</a>{% endfor %}</nav>
<main>{% block content %}{% endblock content %}</main>
<footer>&copy; {{ current_year }} {{ site_title }}</footer>
</body>
</html>
"#;

pub const INDEX_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}{% for post in posts %}<article><a href="{{ post.url | safe }}">{{ post.title }}</a> <time>{{ post.date }}</time></article>
{% endfor %}<p>{{ total_posts }} posts</p>{% endblock content %}
"#;

pub const POST_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}<h1>{{ post.title }}</h1>
{{ content | safe }}
<ul>{% for tag in post.tag_links %}<li><a href="{{ tag.url | safe }}">{{ tag.name }}</a></li>{% endfor %}</ul>
{% endblock content %}
"#;

pub const PAGE_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}<h1>{{ page.title }}</h1>
{{ content | safe }}{% endblock content %}
"#;

pub const POSTS_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}{% for post in posts %}<a href="{{ post.url | safe }}">{{ post.title }}</a>
{% endfor %}{% endblock content %}
"#;

pub const TAG_TEMPLATE: &str = r#"{% extends "base.html" %}
{% block content %}<h1>{{ page_title }}</h1>
{% for post in posts %}<a href="{{ post.url | safe }}">{{ post.title }}</a>
{% endfor %}{% endblock content %}
"#;

// =========================================================================
// Fixture site
// =========================================================================

/// A site in a temp directory with the default layout and a full template set.
pub struct SiteFixture {
    dir: TempDir,
    pub config: Config,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.site.title = "Test Blog".to_string();
        config.site.base_url = "https://blog.example.com".to_string();

        let site = Self { dir, config };
        fs::create_dir_all(site.root().join("content/posts")).unwrap();
        fs::create_dir_all(site.root().join("content/pages")).unwrap();
        for (name, body) in [
            ("base.html", BASE_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("post.html", POST_TEMPLATE),
            ("page.html", PAGE_TEMPLATE),
            ("posts.html", POSTS_TEMPLATE),
            ("tag.html", TAG_TEMPLATE),
        ] {
            site.write(&format!("templates/{name}"), body);
        }
        site
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the site root, creating directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Add `content/posts/{folder}/{name}.md`.
    pub fn post(&self, folder: &str, name: &str, title: &str, date: &str, tags: &[&str]) -> PathBuf {
        let tags = tags
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.write(
            &format!("content/posts/{folder}/{name}.md"),
            &format!(
                "---\ntitle: \"{title}\"\ndescription: \"About {title}\"\ndate: \"{date}\"\ntags: [{tags}]\n---\n\nIntro to {title}.\n\n![cat](cat.png)\n\n[elsewhere](https://example.org)\n"
            ),
        )
    }

    /// Add `content/pages/{slug}.md`.
    pub fn page(&self, slug: &str, title: &str) -> PathBuf {
        self.write(
            &format!("content/pages/{slug}.md"),
            &format!("---\ntitle: \"{title}\"\ndate: 2024-01-01\n---\n\n# {title}\n\nPage body.\n"),
        )
    }

    pub fn image(&self, name: &str) -> PathBuf {
        self.write(&format!("content/images/{name}"), "not really an image")
    }

    pub fn stylesheet(&self) -> PathBuf {
        self.write("assets/main.css", "body { margin: 0 }\n")
    }
}

/// Every file under `dir` with its bytes, keyed by relative path.
pub fn dir_snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}
