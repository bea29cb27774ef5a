//! Create a new post or page

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::resolver::CONTENT_EXTENSION;
use crate::content::Category;
use crate::Site;

/// Front-matter written into a fresh entry
#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
}

/// Create a new entry and return its path.
///
/// The identifier is `path` when given, otherwise the slugified title.
pub fn create_entry(
    site: &Site,
    title: &str,
    category: Category,
    path: Option<&str>,
) -> Result<PathBuf> {
    let identifier = match path {
        Some(p) => p.trim().trim_end_matches(CONTENT_EXTENSION).to_string(),
        None => slug::slugify(title),
    };
    if identifier.is_empty() || identifier.contains(['/', '\\']) || identifier.starts_with('.') {
        anyhow::bail!("Invalid identifier for new {}: {:?}", category, identifier);
    }

    let target_dir = site.content_dir.join(category.dir_name());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}{}", identifier, CONTENT_EXTENSION));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let front_matter = serde_yaml::to_string(&Scaffold {
        title,
        date: now.format("%Y-%m-%d").to_string(),
    })?;
    fs::write(&file_path, format!("---\n{}---\n", front_matter))?;

    tracing::info!("Created {} {:?}", category, file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentResolver;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_is_resolvable() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_entry(&site, "Culto de Ação de Graças: 2024", Category::Posts, None)
            .unwrap();
        assert_eq!(
            path,
            site.content_dir.join("posts/culto-de-acao-de-gracas-2024.md")
        );

        let record = ContentResolver::for_site(&site)
            .resolve(Category::Posts, "culto-de-acao-de-gracas-2024")
            .unwrap();
        assert_eq!(record.title(), "Culto de Ação de Graças: 2024");
        assert!(record.date().is_some());
    }

    #[test]
    fn test_create_page_with_explicit_path() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_entry(&site, "Quem somos", Category::Pages, Some("about")).unwrap();
        assert_eq!(path, site.content_dir.join("pages/about.md"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        create_entry(&site, "Hello", Category::Posts, None).unwrap();
        assert!(create_entry(&site, "Hello", Category::Posts, None).is_err());
    }

    #[test]
    fn test_rejects_nested_path() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        assert!(create_entry(&site, "x", Category::Pages, Some("../fora")).is_err());
        assert!(create_entry(&site, "", Category::Posts, None).is_err());
    }
}
