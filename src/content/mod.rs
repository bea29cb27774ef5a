//! Content module - resolves posts and pages from the flat-file store

mod category;
mod error;
mod frontmatter;
mod markdown;
mod record;
pub mod resolver;

pub use category::Category;
pub use error::ContentError;
pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, BUTTON_CLASS, HEADING_CLASS};
pub use record::{ContentBody, ContentMetadata, ContentRecord, RenderedBody};
pub use resolver::{ContentResolver, StaticParams};
