//! Built-in site templates using Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{NavLink, SiteConfig};
use crate::content::{ContentMetadata, ContentRecord};
use crate::helpers::{self, display_date};

/// Stylesheet shipped with every generated site
pub const SITE_CSS: &str = include_str!("site/site.css");

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("post.html", include_str!("site/post.html")),
            ("page.html", include_str!("site/page.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_list.html",
                include_str!("site/partials/post_list.html"),
            ),
        ])?;

        // Leave `/` alone so URLs and dd/mm/yyyy dates stay readable
        tera.set_escape_fn(helpers::escape_html);
        tera.register_filter("display_date", display_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format a front-matter date string for display
fn display_date_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("display_date", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("display_date", "format", String, val),
        None => "%d/%m/%Y".to_string(),
    };
    Ok(tera::Value::String(display_date(&s, &format)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub date_format: String,
    pub nav: Vec<NavLink>,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            date_format: config.date_format.clone(),
            nav: config
                .nav
                .iter()
                .map(|link| NavLink::new(&link.name, &helpers::url_for(config, &link.url)))
                .collect(),
        }
    }
}

/// A resolved entry, ready for a page template
#[derive(Debug, Clone, Serialize)]
pub struct EntryData {
    pub identifier: String,
    pub title: String,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub path: String,
    pub html: String,
    pub scope: indexmap::IndexMap<String, serde_json::Value>,
}

impl EntryData {
    pub fn from_record(config: &SiteConfig, record: &ContentRecord) -> Self {
        let (html, scope) = match record.rendered() {
            Some(body) => (body.html.clone(), body.scope.clone()),
            None => (String::new(), indexmap::IndexMap::new()),
        };
        Self {
            identifier: record.identifier().to_string(),
            title: record.title().to_string(),
            date: record.date().map(str::to_string),
            excerpt: record.excerpt().map(str::to_string),
            path: helpers::url_for(
                config,
                &helpers::entry_path(config, record.category(), record.identifier()),
            ),
            html,
            scope,
        }
    }
}

/// One line of a post listing
#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub title: String,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub path: String,
}

impl ListItem {
    pub fn from_metadata(config: &SiteConfig, metadata: &ContentMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            date: metadata.date.clone(),
            excerpt: metadata.excerpt.clone(),
            path: helpers::url_for(
                config,
                &helpers::entry_path(config, metadata.category, &metadata.identifier),
            ),
        }
    }
}
