//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Top-level paths used by the site itself
const RESERVED_DIRS: [&str; 2] = ["css", "__livereload"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub blog_dir: String,
    pub pages_dir: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    pub home_page: String,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Header navigation
    pub nav: Vec<NavLink>,

    /// File used by `adefs theme` to persist the preferred mode
    pub theme_storage: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "ADEFS".to_string(),
            description: "Igreja Evangélica Assembléia de Deus em Feira de Santana - Bahia"
                .to_string(),
            author: "ADEFS".to_string(),
            language: "pt-BR".to_string(),
            timezone: "America/Bahia".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            blog_dir: "blog".to_string(),
            pages_dir: "pages".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            home_page: "home".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            highlight: HighlightConfig::default(),

            nav: vec![
                NavLink::new("Início", "/"),
                NavLink::new("Blog", "/blog/"),
                NavLink::new("Sobre", "/pages/about/"),
            ],

            theme_storage: ".adefs/preferences.json".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that `blog_dir` and `pages_dir` can both be routed
    pub fn validate(&self) -> Result<()> {
        let blog = self.blog_dir.trim_matches('/');
        let pages = self.pages_dir.trim_matches('/');

        for (key, dir) in [("blog_dir", blog), ("pages_dir", pages)] {
            if dir.is_empty() {
                anyhow::bail!("{} must not be empty", key);
            }
            if dir.contains([':', '*', '{', '}']) {
                anyhow::bail!("{} {:?} contains route syntax characters", key, dir);
            }
            if RESERVED_DIRS.iter().any(|reserved| *reserved == dir) {
                anyhow::bail!("{} {:?} is reserved for site assets", key, dir);
            }
        }
        if blog == pages {
            anyhow::bail!("blog_dir and pages_dir must differ (both are {:?})", blog);
        }
        Ok(())
    }

    /// Parsed timezone, falling back to UTC for unknown names
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            if !self.timezone.is_empty() {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            }
            chrono_tz::UTC
        })
    }
}

/// A header navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub name: String,
    pub url: String,
}

impl NavLink {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_number: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
