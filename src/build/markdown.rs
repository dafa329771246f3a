//! Markdown rendering with heading ids and external link targets.

use std::collections::HashSet;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Markdown to HTML conversion, configured once per build.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    external_links_new_tab: bool,
}

impl MarkdownRenderer {
    pub fn new(config: &MarkdownConfig) -> Result<Self, MarkdownError> {
        let mut options = Options::empty();
        for extension in &config.extensions {
            match extension.as_str() {
                "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "gfm" => options.insert(Options::ENABLE_GFM),
                "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
                "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tables" => options.insert(Options::ENABLE_TABLES),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                other => return Err(MarkdownError::InvalidExtension(other.to_string())),
            }
        }

        Ok(Self {
            options,
            external_links_new_tab: config.external_links_new_tab,
        })
    }

    /// Render markdown to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events: Vec<Event> = Vec::new();
        let mut used_heading_ids: HashSet<String> = HashSet::new();
        let mut heading: Option<HeadingState> = None;

        for event in parser {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    ref id,
                    ref classes,
                    ref attrs,
                }) => {
                    // An explicit `{#id}` wins
                    if let Some(existing_id) = id {
                        used_heading_ids.insert(existing_id.to_string());
                        events.push(event);
                        continue;
                    }
                    heading = Some(HeadingState {
                        level,
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        attrs: attrs
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                            .collect(),
                        text: String::new(),
                        inner: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                    if let Some(state) = heading.take() {
                        let id = unique_id(&slugify(&state.text), &mut used_heading_ids);
                        events.push(Event::Html(state.into_html(&id).into()));
                    }
                }
                Event::Start(Tag::Link {
                    ref dest_url,
                    ref title,
                    ..
                }) if self.external_links_new_tab && is_external(dest_url) => {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(" title=\"{}\"", escape_attr(title))
                    };
                    let open = format!(
                        "<a href=\"{}\"{} target=\"_blank\" rel=\"noopener\">",
                        escape_attr(dest_url),
                        title_attr
                    );
                    push_event(&mut events, &mut heading, Event::InlineHtml(open.into()));
                }
                event => {
                    if let Some(state) = heading.as_mut() {
                        if let Event::Text(text) | Event::Code(text) = &event {
                            state.text.push_str(text);
                        }
                    }
                    push_event(&mut events, &mut heading, event);
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

/// A heading being collected so its id can be derived from its text.
struct HeadingState<'a> {
    level: HeadingLevel,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    text: String,
    inner: Vec<Event<'a>>,
}

impl HeadingState<'_> {
    fn into_html(self, id: &str) -> String {
        let class_attr = if self.classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", self.classes.join(" "))
        };

        let extra_attrs = self
            .attrs
            .iter()
            .map(|(k, v)| match v {
                Some(val) => format!(" {}=\"{}\"", k, escape_attr(val)),
                None => format!(" {}", k),
            })
            .collect::<String>();

        let mut inner_html = String::new();
        html::push_html(&mut inner_html, self.inner.into_iter());

        let level = self.level as usize;
        format!("<h{level} id=\"{id}\"{class_attr}{extra_attrs}>{inner_html}</h{level}>\n")
    }
}

fn push_event<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<HeadingState<'a>>,
    event: Event<'a>,
) {
    match heading {
        Some(state) => state.inner.push(event),
        None => events.push(event),
    }
}

fn unique_id(base_id: &str, used: &mut HashSet<String>) -> String {
    let mut id = base_id.to_string();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{}-{}", base_id, suffix);
        suffix += 1;
    }
    used.insert(id.clone());
    id
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(&MarkdownConfig::default()).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("API Reference"), "api-reference");
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = renderer().render("# Hello\n\nWorld");
        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn test_duplicate_heading_ids_get_suffixes() {
        let html = renderer().render("## Setup\n\n## Setup\n\n## Setup");
        assert!(html.contains("id=\"setup\""));
        assert!(html.contains("id=\"setup-1\""));
        assert!(html.contains("id=\"setup-2\""));
    }

    #[test]
    fn test_heading_keeps_inline_markup() {
        let html = renderer().render("## Using `cargo` *fast*");
        assert!(html.contains("id=\"using-cargo-fast\""));
        assert!(html.contains("<code>cargo</code>"));
        assert!(html.contains("<em>fast</em>"));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let html = renderer().render("# Intro {#start}\n\n# Start");
        assert!(html.contains("id=\"start\""));
        assert!(html.contains("id=\"start-1\""));
    }

    #[test]
    fn test_external_links_open_in_new_tab() {
        let html = renderer().render("[site](https://example.com) and [local](/about.html)");
        assert!(html.contains(
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener\">site</a>"
        ));
        assert!(html.contains("<a href=\"/about.html\">local</a>"));
    }

    #[test]
    fn test_external_links_unchanged_when_disabled() {
        let config = MarkdownConfig {
            external_links_new_tab: false,
            ..MarkdownConfig::default()
        };
        let html = MarkdownRenderer::new(&config)
            .unwrap()
            .render("[site](https://example.com)");
        assert!(!html.contains("target="));
    }

    #[test]
    fn test_tables_extension() {
        let html = renderer().render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
            ..MarkdownConfig::default()
        };
        assert!(MarkdownRenderer::new(&config).is_err());
    }
}
