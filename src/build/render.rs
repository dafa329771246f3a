use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera, Value};

use super::paths::urlize;
use crate::logger::Logger;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error in {template}: {message}")]
    Template { template: String, message: String },

    #[error("failed to load templates from {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("templates directory not found: {0}")]
    TemplatesNotFound(PathBuf),
}

/// The template renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
    log: Logger,
}

impl Renderer {
    /// Load every `*.html` template under `templates_dir`.
    pub fn new(templates_dir: &Path, log: Logger) -> Result<Self, RenderError> {
        if !templates_dir.is_dir() {
            return Err(RenderError::TemplatesNotFound(templates_dir.to_path_buf()));
        }

        let glob = templates_dir.join("**/*.html");
        let glob_str = glob.to_string_lossy();
        let mut tera = Tera::new(&glob_str).map_err(|e| RenderError::Load {
            path: templates_dir.to_path_buf(),
            message: error_chain(&e),
        })?;
        tera.register_filter("urlize", urlize_filter);

        log.debug(format_args!(
            "loaded {} templates from {}",
            tera.get_template_names().count(),
            templates_dir.display()
        ));

        Ok(Self { tera, log })
    }

    /// Build a renderer from in-memory templates.
    #[cfg(test)]
    pub fn from_raw(templates: &[(&str, &str)], log: Logger) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|e| RenderError::Load {
                path: PathBuf::new(),
                message: error_chain(&e),
            })?;
        tera.register_filter("urlize", urlize_filter);
        Ok(Self { tera, log })
    }

    /// Execute a template with the given context.
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String, RenderError> {
        let template_error = |e: tera::Error| RenderError::Template {
            template: template.to_string(),
            message: error_chain(&e),
        };
        let context = Context::from_serialize(context).map_err(template_error)?;
        self.tera.render(template, &context).map_err(template_error)
    }

    /// Execute a template and write the result, creating or truncating the file.
    pub fn render_to_file<C: Serialize>(
        &self,
        template: &str,
        context: &C,
        output_path: &Path,
    ) -> Result<(), RenderError> {
        let html = self.render(template, context)?;
        write_output(output_path, html.as_bytes())?;
        self.log
            .debug(format_args!("wrote {} ({})", output_path.display(), template));
        Ok(())
    }
}

/// Write a generated file, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let write_error = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, contents).map_err(write_error)
}

/// Tera only shows the outermost message in `Display`; the cause is in the chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn urlize_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_str() {
        Some(s) => Ok(Value::String(urlize(s))),
        None => Err(tera::Error::msg(format!(
            "filter `urlize` expects a string, got {value}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::logger::CaptureLog;

    fn renderer(templates: &[(&str, &str)]) -> Renderer {
        let (log, _) = CaptureLog::logger();
        Renderer::from_raw(templates, log).unwrap()
    }

    #[test]
    fn test_render_with_inheritance() {
        let renderer = renderer(&[
            ("base.html", "<title>{{ site_title }}</title>{% block body %}{% endblock %}"),
            (
                "post.html",
                "{% extends \"base.html\" %}{% block body %}{{ content | safe }}{% endblock %}",
            ),
        ]);

        let html = renderer
            .render("post.html", &json!({"site_title": "Blog", "content": "<p>hi</p>"}))
            .unwrap();
        assert_eq!(html, "<title>Blog</title><p>hi</p>");
    }

    #[test]
    fn test_urlize_filter() {
        let renderer = renderer(&[(
            "tag.html",
            "<a href=\"/tags/{{ tag | urlize }}.html\">{{ tag }}</a>",
        )]);
        let html = renderer.render("tag.html", &json!({"tag": "Web Dev"})).unwrap();
        assert_eq!(html, "<a href=\"/tags/web-dev.html\">Web Dev</a>");
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let renderer = renderer(&[("base.html", "x")]);
        let err = renderer.render("index.html", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::Template { ref template, .. } if template == "index.html"));
    }

    #[test]
    fn test_execution_error_is_an_error() {
        let renderer = renderer(&[("index.html", "{{ missing.field }}")]);
        assert!(matches!(
            renderer.render("index.html", &json!({})),
            Err(RenderError::Template { .. })
        ));
    }

    #[test]
    fn test_render_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(&[("page.html", "{{ page_title }}")]);
        let out = dir.path().join("pages/about.html");

        renderer
            .render_to_file("page.html", &json!({"page_title": "About"}), &out)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "About");

        // Truncates on rewrite
        renderer
            .render_to_file("page.html", &json!({"page_title": "A"}), &out)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "A");
    }

    #[test]
    fn test_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let renderer = renderer(&[("page.html", "x")]);
        let err = renderer
            .render_to_file("page.html", &json!({}), &blocker.join("nested.html"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Write { .. }));
    }

    #[test]
    fn test_missing_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (log, _) = CaptureLog::logger();
        assert!(matches!(
            Renderer::new(&dir.path().join("templates"), log),
            Err(RenderError::TemplatesNotFound(_))
        ));
    }
}
