//! Content records produced by the resolver

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use super::{Category, ContentError, FrontMatter};

/// Validated front-matter of one content file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentMetadata {
    /// Filename without the `.md` extension
    pub identifier: String,
    pub category: Category,
    pub title: String,
    /// Publication date exactly as written in the front-matter
    pub date: Option<String>,
    pub excerpt: Option<String>,
    /// Remaining front-matter keys, exposed to templates as scope
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl ContentMetadata {
    /// Validate parsed front-matter; `title` is required and must not be blank
    pub fn from_front_matter(
        category: Category,
        identifier: &str,
        fm: FrontMatter,
        path: &Path,
    ) -> Result<Self, ContentError> {
        let title = fm
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ContentError::MissingTitle {
                path: path.to_path_buf(),
            })?;

        Ok(Self {
            identifier: identifier.to_string(),
            category,
            title,
            date: fm.date.filter(|d| !d.trim().is_empty()),
            excerpt: fm.excerpt,
            extra: fm.extra,
        })
    }
}

/// Serialized, render-ready body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBody {
    /// HTML produced from the Markdown body
    pub html: String,
    /// Front-matter values available to the page while rendering
    pub scope: IndexMap<String, serde_json::Value>,
}

/// Body of a record at a given processing stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum ContentBody {
    Raw { markdown: String },
    Rendered(RenderedBody),
}

/// A resolved content entry: metadata plus body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    metadata: ContentMetadata,
    body: ContentBody,
}

impl ContentRecord {
    pub(crate) fn new(metadata: ContentMetadata, body: ContentBody) -> Self {
        Self { metadata, body }
    }

    pub fn metadata(&self) -> &ContentMetadata {
        &self.metadata
    }

    pub fn identifier(&self) -> &str {
        &self.metadata.identifier
    }

    pub fn category(&self) -> Category {
        self.metadata.category
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn date(&self) -> Option<&str> {
        self.metadata.date.as_deref()
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.metadata.excerpt.as_deref()
    }

    pub fn body(&self) -> &ContentBody {
        &self.body
    }

    /// Raw Markdown, if the body has not been rendered yet
    pub fn raw(&self) -> Option<&str> {
        match &self.body {
            ContentBody::Raw { markdown } => Some(markdown),
            ContentBody::Rendered(_) => None,
        }
    }

    /// Rendered body, if serialization already happened
    pub fn rendered(&self) -> Option<&RenderedBody> {
        match &self.body {
            ContentBody::Rendered(body) => Some(body),
            ContentBody::Raw { .. } => None,
        }
    }

    /// Consume a raw record and produce its rendered form
    pub fn render_with<F>(self, render: F) -> Result<ContentRecord, ContentError>
    where
        F: FnOnce(&ContentMetadata, &str) -> Result<RenderedBody, ContentError>,
    {
        match self.body {
            ContentBody::Raw { markdown } => {
                let rendered = render(&self.metadata, &markdown)?;
                Ok(ContentRecord::new(
                    self.metadata,
                    ContentBody::Rendered(rendered),
                ))
            }
            ContentBody::Rendered(_) => Ok(self),
        }
    }

    pub fn into_parts(self) -> (ContentMetadata, ContentBody) {
        (self.metadata, self.body)
    }
}
