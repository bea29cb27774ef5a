//! URL helper functions

use crate::config::SiteConfig;
use crate::content::Category;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/igreja/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }

    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/pages/about/") // -> "https://adefs.org/pages/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_external(path) {
        return path.to_string();
    }
    format!("{}{}", config.url.trim_end_matches('/'), url_for(config, path))
}

/// Site-relative route of a content entry, e.g. `/blog/hello-world/`
pub fn entry_path(config: &SiteConfig, category: Category, identifier: &str) -> String {
    format!("/{}/{}/", section_dir(config, category), identifier)
}

/// URL section a category is published under
pub fn section_dir(config: &SiteConfig, category: Category) -> &str {
    let dir = match category {
        Category::Posts => &config.blog_dir,
        Category::Pages => &config.pages_dir,
    };
    dir.trim_matches('/')
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("mailto:")
}
