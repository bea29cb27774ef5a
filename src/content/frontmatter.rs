//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Custom deserializer that accepts any YAML scalar and keeps it as a string.
///
/// Unquoted dates (`2024-01-15`) and years (`2024`) come out of YAML as
/// strings or numbers; both are stored verbatim.
fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct Scalar;

    impl<'de> Visitor<'de> for Scalar {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Scalar)
}

/// Front-matter block of a content file, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "optional_scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub excerpt: Option<String>,

    /// Additional custom fields, in file order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), serde_yaml::Error> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if !content.starts_with("---") {
            return Ok((FrontMatter::default(), content));
        }

        // Find the closing ---
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        let (yaml_content, remaining) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            let Some(end_pos) = rest.find("\n---") else {
                // No closing ---, treat as no front-matter
                return Ok((FrontMatter::default(), content));
            };
            (&rest[..end_pos], &rest[end_pos + 4..])
        };
        let remaining = remaining.trim_start_matches(['-']);
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading thematic break followed by prose is Markdown, not YAML
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)?;
        Ok((fm, remaining))
    }
}

/// At least one line must have the `key: value` shape
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        if !is_valid_key {
            return false;
        }
        let after_colon = &trimmed[colon_pos + 1..];
        after_colon.is_empty() || after_colon.starts_with(' ')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Culto de Domingo
date: 2024-01-15
excerpt: Venha adorar conosco
speaker: Pr. João
---

Conteúdo do culto.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Culto de Domingo"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.excerpt.as_deref(), Some("Venha adorar conosco"));
        assert_eq!(
            fm.extra.get("speaker").and_then(|v| v.as_str()),
            Some("Pr. João")
        );
        assert!(remaining.starts_with("Conteúdo do culto."));
    }

    #[test]
    fn test_numeric_scalars_become_strings() {
        let content = "---\ntitle: 1999\ndate: 2024\n---\nbody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("1999"));
        assert_eq!(fm.date.as_deref(), Some("2024"));
        assert_eq!(remaining, "body");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown\n").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, "# Just markdown\n");
    }

    #[test]
    fn test_unclosed_block_is_content() {
        let content = "---\ntitle: Broken\n\nNo closing fence";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert!(remaining.contains("No closing fence"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nbody";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Leitura bíblica de hoje, veja https://example.com/biblia

---
Mais conteúdo.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Leitura bíblica"));
        assert!(remaining.contains("Mais conteúdo."));
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Olá\r\n---\r\n# Corpo\r\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Olá"));
        assert!(remaining.starts_with("# Corpo"));
    }
}
