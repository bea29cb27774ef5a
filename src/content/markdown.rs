//! Markdown rendering with syntax highlighting and site components

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::escape_html;

use super::{ContentMetadata, RenderedBody};

lazy_static! {
    /// Opening tag of the `<CustomButton link="...">label</CustomButton>` component
    static ref CUSTOM_BUTTON_OPEN: Regex =
        Regex::new(r#"<CustomButton\s+link\s*=\s*"([^"]*)"\s*>"#).unwrap();
    static ref CUSTOM_BUTTON_CLOSE: Regex = Regex::new(r"</CustomButton\s*>").unwrap();
}

/// Class added to top-level headings inside content bodies
pub const HEADING_CLASS: &str = "content-title";

/// Class of the call-to-action anchor produced by `<CustomButton>`
pub const BUTTON_CLASS: &str = "custom-button";

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render a content body into its serialized form, carrying the
    /// front-matter along as scope
    pub fn serialize(&self, metadata: &ContentMetadata, markdown: &str) -> RenderedBody {
        let mut scope = indexmap::IndexMap::new();
        scope.insert(
            "title".to_string(),
            serde_json::Value::String(metadata.title.clone()),
        );
        if let Some(date) = &metadata.date {
            scope.insert("date".to_string(), serde_json::Value::String(date.clone()));
        }
        if let Some(excerpt) = &metadata.excerpt {
            scope.insert(
                "excerpt".to_string(),
                serde_json::Value::String(excerpt.clone()),
            );
        }
        for (key, value) in &metadata.extra {
            match serde_json::to_value(value) {
                Ok(json) => {
                    scope.insert(key.clone(), json);
                }
                Err(e) => tracing::warn!(
                    "Dropping front-matter key {:?} of {}/{}: {}",
                    key,
                    metadata.category,
                    metadata.identifier,
                    e
                ),
            }
        }

        RenderedBody {
            html: self.render(markdown),
            scope,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is stripped before this point, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;

        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            lang.split_whitespace().next().map(str::to_string)
                        }
                        _ => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                // Components are raw HTML; code blocks and spans never reach here
                Event::Html(raw) => events.push(Event::Html(expand_components(raw))),
                Event::InlineHtml(raw) => events.push(Event::InlineHtml(expand_components(raw))),
                Event::Start(Tag::Heading {
                    level: HeadingLevel::H1,
                    id,
                    mut classes,
                    attrs,
                }) => {
                    classes.push(CowStr::from(HEADING_CLASS));
                    events.push(Event::Start(Tag::Heading {
                        level: HeadingLevel::H1,
                        id,
                        classes,
                        attrs,
                    }));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted =
            theme.and_then(|t| highlighted_html_for_string(code, &self.syntax_set, syntax, t).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                escape_html(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace component tags in a raw HTML fragment with plain HTML.
///
/// Opening and closing tags are rewritten independently because an inline
/// component arrives as separate events around its label.
fn expand_components(raw: CowStr<'_>) -> CowStr<'_> {
    if !raw.contains("CustomButton") {
        return raw;
    }
    let opened = CUSTOM_BUTTON_OPEN.replace_all(&raw, |caps: &regex::Captures| {
        format!(r#"<a href="{}" class="{}">"#, &caps[1], BUTTON_CLASS)
    });
    let expanded = CUSTOM_BUTTON_CLOSE.replace_all(&opened, "</a>");
    CowStr::from(expanded.into_owned())
}
