//! Theme engine
//!
//! Template rendering using Tera. The default templates are compiled into
//! the binary; any `.html` file under the configured theme directory
//! replaces the embedded template of the same name.
//!
//! Every render receives the standard variables `site_name` and `year`.

use chrono::Datelike;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Site name shown in the navigation bar and page titles
pub const SITE_NAME: &str = "Blogsmith";

const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("templates/base.html")),
    ("index.html", include_str!("templates/index.html")),
    ("post.html", include_str!("templates/post.html")),
    ("make-post.html", include_str!("templates/make-post.html")),
    ("about.html", include_str!("templates/about.html")),
    ("contact.html", include_str!("templates/contact.html")),
];

/// Theme engine for rendering templates
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Create an engine from the embedded templates only
    pub fn embedded() -> Result<Self, ThemeError> {
        Self::build(collect_embedded())
    }

    /// Create an engine, letting templates in `override_dir` replace the
    /// embedded ones. A missing directory is not an error.
    pub fn new(override_dir: &Path) -> Result<Self, ThemeError> {
        let mut templates = collect_embedded();

        if override_dir.is_dir() {
            let mut overrides = Vec::new();
            collect_templates_from_dir(override_dir, override_dir, &mut overrides)?;
            for (name, content) in overrides {
                tracing::info!("Template override: {}", name);
                templates.insert(name, content);
            }
        } else {
            tracing::debug!(
                "No template overrides at {:?}, using embedded templates",
                override_dir
            );
        }

        Self::build(templates)
    }

    fn build(templates: BTreeMap<String, String>) -> Result<Self, ThemeError> {
        let mut tera = Tera::default();
        // Adding all templates in one call resolves `extends` regardless of order.
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(describe_tera_error(&e)))?;
        Ok(Self { tera })
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with the standard variables added to `context`
    pub fn render(&self, name: &str, context: &TeraContext) -> Result<String, ThemeError> {
        if !self.has_template(name) {
            return Err(ThemeError::NotFound(name.to_string()));
        }

        let mut ctx = context.clone();
        ctx.insert("site_name", SITE_NAME);
        ctx.insert("year", &chrono::Local::now().year());

        self.tera
            .render(name, &ctx)
            .map_err(|e| ThemeError::TemplateError(describe_tera_error(&e)))
    }
}

fn collect_embedded() -> BTreeMap<String, String> {
    EMBEDDED_TEMPLATES
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect()
}

/// Collect `.html` files below `current_path`, named relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<(), ThemeError> {
    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            let template_name = relative_path.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(&path)?;

            templates.push((template_name, content));
        }
    }

    Ok(())
}

/// Tera hides the useful detail in the error's source chain
fn describe_tera_error(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
