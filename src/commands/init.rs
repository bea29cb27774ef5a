//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Site;

const CONFIG_TEMPLATE: &str = r#"# Site
title: ADEFS
description: Igreja Evangélica Assembléia de Deus em Feira de Santana - Bahia
author: ADEFS
language: pt-BR
timezone: America/Bahia

# URL
url: http://localhost:4000
root: /
blog_dir: blog
pages_dir: pages

# Directory
content_dir: content
public_dir: public
static_dir: static

# Writing
home_page: home
date_format: "%d/%m/%Y"
highlight:
  line_number: false
  theme: base16-ocean.dark

# Navigation
nav:
  - name: Início
    url: /
  - name: Blog
    url: /blog/
  - name: Sobre
    url: /pages/about/

# Display mode store used by `adefs theme`
theme_storage: .adefs/preferences.json
"#;

const HOME_PAGE: &str = r#"---
title: Bem-vindos à ADEFS
---

Somos a Igreja Evangélica Assembléia de Deus em Feira de Santana.

<CustomButton link="/pages/about/">Conheça nossa história</CustomButton>
"#;

const ABOUT_PAGE: &str = r#"---
title: Sobre
---

# Quem somos

Conte aqui a história da igreja.
"#;

/// Initialize a new site in the given directory.
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("content/pages"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    let now = chrono::Local::now();
    let hello_world = format!(
        r#"---
title: Olá, mundo
date: {}
excerpt: Primeira publicação do site.
---

Esta é a primeira publicação. Crie outras com:

```bash
$ adefs new "Título da publicação"
```
"#,
        now.format("%Y-%m-%d")
    );

    let files = [
        (crate::CONFIG_FILE, CONFIG_TEMPLATE.to_string()),
        ("content/posts/hello-world.md", hello_world),
        ("content/pages/home.md", HOME_PAGE.to_string()),
        ("content/pages/about.md", ABOUT_PAGE.to_string()),
    ];

    for (relative, content) in files {
        let path = target_dir.join(relative);
        if path.exists() {
            tracing::warn!("Skipping existing file {:?}", path);
            continue;
        }
        fs::write(&path, content)?;
        tracing::debug!("Created: {:?}", path);
    }

    Ok(())
}

/// Run the init command for an already opened site
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Category, ContentResolver};
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_resolvable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "ADEFS");
        assert_eq!(site.config.nav.len(), 3);

        let resolver = ContentResolver::for_site(&site);
        assert_eq!(
            resolver.enumerate_identifiers(Category::Pages).unwrap(),
            vec!["about", "home"]
        );
        let home = resolver.resolve(Category::Pages, "home").unwrap();
        assert!(home.rendered().unwrap().html.contains("custom-button"));
        assert!(resolver.resolve(Category::Posts, "hello-world").is_ok());
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(crate::CONFIG_FILE), "title: Outra\n").unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "Outra");
    }
}
