//! Generator module - renders resolved content into HTML pages
//!
//! The same render functions back static generation and the development
//! server, so both produce identical pages for a route.

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{Category, ContentError, ContentResolver};
use crate::helpers;
use crate::templates::{EntryData, ListItem, SiteData, TemplateRenderer, SITE_CSS};
use crate::theme::ThemeToggle;
use crate::Site;

/// Number of posts listed on the home page
pub const HOME_RECENT_POSTS: usize = 5;

/// Summary of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
}

/// Site renderer using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    resolver: ContentResolver,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new()?,
            resolver: ContentResolver::for_site(site),
        })
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Generate the entire site into the public directory
    pub fn generate(&self) -> Result<GenerateReport> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)?;

        write_file(&public_dir.join("css/site.css"), SITE_CSS)?;
        let assets = self.copy_static_assets()?;

        write_file(&public_dir.join("index.html"), &self.render_home()?)?;

        let blog_dir = helpers::section_dir(&self.site.config, Category::Posts);
        write_file(
            &public_dir.join(blog_dir).join("index.html"),
            &self.render_blog_index()?,
        )?;

        let mut report = GenerateReport {
            assets,
            ..Default::default()
        };

        for category in Category::ALL {
            let params = self.resolver.static_params(category)?;
            for param in &params {
                let html = self.render_entry(category, &param.slug)?;
                let route = helpers::entry_path(&self.site.config, category, &param.slug);
                let output_path = public_dir
                    .join(route.trim_matches('/'))
                    .join("index.html");
                write_file(&output_path, &html)?;
            }
            match category {
                Category::Posts => report.posts = params.len(),
                Category::Pages => report.pages = params.len(),
            }
        }

        write_file(&public_dir.join("404.html"), &self.render_not_found()?)?;

        Ok(report)
    }

    /// Home page: the configured page plus the most recent posts.
    ///
    /// Without a home page file only the post listing is shown.
    pub fn render_home(&self) -> Result<String> {
        let home = &self.site.config.home_page;
        let entry = match self.resolver.resolve(Category::Pages, home) {
            Ok(record) => Some(EntryData::from_record(&self.site.config, &record)),
            Err(e) if e.is_not_found() => {
                tracing::warn!("Home page {:?} not found, listing posts instead", home);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let mut context = self.base_context(Some("/"));
        context.insert("entry", &entry);
        context.insert("recent", &self.recent_posts(Some(HOME_RECENT_POSTS))?);
        self.renderer.render("home.html", &context)
    }

    /// Page for one post or page; a missing entry surfaces as [`ContentError::NotFound`]
    pub fn render_entry(&self, category: Category, identifier: &str) -> Result<String> {
        let record = self.resolver.resolve(category, identifier)?;
        let entry = EntryData::from_record(&self.site.config, &record);
        let route = helpers::entry_path(&self.site.config, category, identifier);

        let mut context = self.base_context(Some(&route));
        context.insert("entry", &entry);
        let template = match category {
            Category::Posts => "post.html",
            Category::Pages => "page.html",
        };
        self.renderer.render(template, &context)
    }

    /// Listing of every post, newest first
    pub fn render_blog_index(&self) -> Result<String> {
        let path = format!(
            "/{}/",
            helpers::section_dir(&self.site.config, Category::Posts)
        );
        let mut context = self.base_context(Some(&path));
        context.insert("recent", &self.recent_posts(None)?);
        self.renderer.render("blog.html", &context)
    }

    /// The user-facing "not found" page
    pub fn render_not_found(&self) -> Result<String> {
        let context = self.base_context(None);
        self.renderer.render("not_found.html", &context)
    }

    fn recent_posts(&self, limit: Option<usize>) -> Result<Vec<ListItem>, ContentError> {
        let metadata = self.resolver.list_metadata(Category::Posts)?;
        Ok(metadata
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|m| ListItem::from_metadata(&self.site.config, m))
            .collect())
    }

    /// Create a base context with common variables; `route` is site-relative
    fn base_context(&self, route: Option<&str>) -> Context {
        let config = &self.site.config;
        let current_path = route
            .map(|r| helpers::url_for(config, r))
            .unwrap_or_default();
        let canonical = route.map(|r| helpers::full_url_for(config, r));

        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(config));
        context.insert("root", &helpers::url_for(config, "/"));
        context.insert("current_path", &current_path);
        context.insert("canonical", &canonical);
        context.insert("year", &helpers::current_year(&config.tz()));
        // Prerendered output never knows the client's mode
        context.insert("theme_toggle", &ThemeToggle::render(None));
        context.insert("theme_script", &ThemeToggle::client_script());
        context.insert("entry", &Option::<EntryData>::None);
        context.insert("recent", &Vec::<ListItem>::new());
        context
    }

    /// Copy static assets (images, etc.) to public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?} -> {:?}", path, dest);
            copied += 1;
        }

        Ok(copied)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}
