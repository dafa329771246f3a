//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

use chrono::NaiveDate;

use super::paths::absolute_url;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub struct Sitemap<'a> {
    base_url: &'a str,
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: NaiveDate,
}

impl<'a> Sitemap<'a> {
    /// Start a sitemap whose first entry is the homepage.
    pub fn new(base_url: &'a str, homepage_lastmod: NaiveDate) -> Self {
        let mut sitemap = Self {
            base_url,
            urls: Vec::new(),
        };
        sitemap.push("/", homepage_lastmod);
        sitemap
    }

    pub fn push(&mut self, url_path: &str, lastmod: NaiveDate) {
        self.urls.push(UrlEntry {
            loc: absolute_url(self.base_url, url_path),
            lastmod,
        });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(128 + self.urls.len() * 96);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod.format("%Y-%m-%d").to_string());
            xml.push_str("</lastmod>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
