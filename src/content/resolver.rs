//! Content resolver - looks up, parses and renders content files
//!
//! Content lives in one flat directory per [`Category`] under the content
//! root, one `<identifier>.md` file per entry. Nothing is cached: every call
//! goes back to the file system.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{
    Category, ContentBody, ContentError, ContentMetadata, ContentRecord, FrontMatter,
    MarkdownRenderer,
};
use crate::Site;

/// Extension of every content file
pub const CONTENT_EXTENSION: &str = ".md";

/// Route parameters for one pre-rendered entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticParams {
    pub slug: String,
}

/// Resolves content records from the flat-file store
pub struct ContentResolver {
    content_dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl ContentResolver {
    /// Create a resolver rooted at `content_dir`
    pub fn new<P: AsRef<Path>>(content_dir: P, renderer: MarkdownRenderer) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            renderer,
        }
    }

    /// Create a resolver for a site, honouring its highlight settings
    pub fn for_site(site: &Site) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &site.config.highlight.theme,
            site.config.highlight.line_number,
        );
        Self::new(&site.content_dir, renderer)
    }

    /// Backing directory of a category
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.content_dir.join(category.dir_name())
    }

    /// Path an identifier maps to, whether or not it exists
    pub fn path_for(&self, category: Category, identifier: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}{}", identifier, CONTENT_EXTENSION))
    }

    /// Resolve an entry and render its body
    pub fn resolve(
        &self,
        category: Category,
        identifier: &str,
    ) -> Result<ContentRecord, ContentError> {
        let record = self.resolve_raw(category, identifier)?;
        let record = record.render_with(|metadata, markdown| {
            Ok(self.renderer.serialize(metadata, markdown))
        })?;
        tracing::debug!("Resolved {}/{}", category, identifier);
        Ok(record)
    }

    /// Resolve an entry, leaving the body as raw Markdown
    pub fn resolve_raw(
        &self,
        category: Category,
        identifier: &str,
    ) -> Result<ContentRecord, ContentError> {
        let path = self.path_for(category, identifier);

        // Identifiers come from URLs; anything that is not a single path
        // segment cannot name a file in the category directory
        if !is_plain_identifier(identifier) || !path.is_file() {
            return Err(ContentError::NotFound {
                category,
                identifier: identifier.to_string(),
                path,
            });
        }

        let content = read_file(&path)?;
        let (fm, body) = parse_front_matter(&content, &path)?;
        let metadata = ContentMetadata::from_front_matter(category, identifier, fm, &path)?;

        Ok(ContentRecord::new(
            metadata,
            ContentBody::Raw {
                markdown: body.to_string(),
            },
        ))
    }

    /// List every identifier in a category; a missing directory yields none
    pub fn enumerate_identifiers(&self, category: Category) -> Result<Vec<String>, ContentError> {
        Ok(self
            .content_files(category)?
            .into_iter()
            .map(|(identifier, _)| identifier)
            .collect())
    }

    /// Content files of a category as `(identifier, path)`, sorted by name.
    ///
    /// File names that are not valid UTF-8 cannot round-trip through an
    /// identifier, so they are skipped.
    fn content_files(&self, category: Category) -> Result<Vec<(String, PathBuf)>, ContentError> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            tracing::debug!("No {} directory at {:?}", category, dir);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping file with non UTF-8 name {:?}", entry.path());
                continue;
            };
            match file_name.strip_suffix(CONTENT_EXTENSION) {
                Some(identifier) if !identifier.is_empty() => {
                    files.push((identifier.to_string(), entry.path().to_path_buf()))
                }
                _ => tracing::debug!("Skipping non-content file {:?}", entry.path()),
            }
        }

        Ok(files)
    }

    /// Route parameters for static generation
    pub fn static_params(&self, category: Category) -> Result<Vec<StaticParams>, ContentError> {
        Ok(self
            .enumerate_identifiers(category)?
            .into_iter()
            .map(|slug| StaticParams { slug })
            .collect())
    }

    /// Front-matter of every entry, newest first.
    ///
    /// Dates are compared as plain strings, so only ISO-8601 style dates
    /// order chronologically. Undated entries come last.
    pub fn list_metadata(&self, category: Category) -> Result<Vec<ContentMetadata>, ContentError> {
        let mut entries = Vec::new();

        for (identifier, path) in self.content_files(category)? {
            let content = read_file(&path)?;
            let (fm, _) = parse_front_matter(&content, &path)?;
            entries.push(ContentMetadata::from_front_matter(
                category,
                &identifier,
                fm,
                &path,
            )?);
        }

        sort_by_date_desc(&mut entries);
        Ok(entries)
    }
}

/// Newest first by lexicographic date string; `None` sorts last
pub fn sort_by_date_desc(entries: &mut [ContentMetadata]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

fn is_plain_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && !identifier.contains(['/', '\\'])
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|e| ContentError::io(path, e))
}

fn parse_front_matter<'a>(
    content: &'a str,
    path: &Path,
) -> Result<(FrontMatter, &'a str), ContentError> {
    FrontMatter::parse(content).map_err(|e| ContentError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl From<walkdir::Error> for ContentError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(Path::to_path_buf).unwrap_or_default();
        let source = e
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(ErrorKind::Other, "directory walk failed"));
        ContentError::io(path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, category: &str, name: &str, content: &str) {
        let dir = dir.join(category);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn resolver(dir: &TempDir) -> ContentResolver {
        ContentResolver::new(dir.path(), MarkdownRenderer::new())
    }

    #[test]
    fn test_resolve_hello_world() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "hello-world.md", "---\ntitle: Hello\n---\n# Hi\n");

        let record = resolver(&dir).resolve(Category::Posts, "hello-world").unwrap();
        assert_eq!(record.identifier(), "hello-world");
        assert_eq!(record.title(), "Hello");
        assert_eq!(record.category(), Category::Posts);
        let body = record.rendered().expect("body should be rendered");
        assert!(!body.html.is_empty());
        assert!(body.html.contains("Hi"));
    }

    #[test]
    fn test_resolve_raw_keeps_markdown() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "pages",
            "about.md",
            "---\ntitle: Sobre\nexcerpt: Nossa história\n---\nSomos uma igreja.\n",
        );

        let record = resolver(&dir).resolve_raw(Category::Pages, "about").unwrap();
        assert_eq!(record.raw(), Some("Somos uma igreja.\n"));
        assert_eq!(record.excerpt(), Some("Nossa história"));
        assert!(record.date().is_none());
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "exists.md", "---\ntitle: Existe\n---\n");

        let err = resolver(&dir).resolve(Category::Posts, "missing").unwrap_err();
        assert!(err.is_not_found());

        // Nothing was created as a side effect
        let names: Vec<_> = fs::read_dir(dir.path().join("posts"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(!dir.path().join("posts/missing.md").exists());
    }

    #[test]
    fn test_resolve_wrong_category_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "natal.md", "---\ntitle: Natal\n---\n");

        let err = resolver(&dir).resolve(Category::Pages, "natal").unwrap_err();
        assert!(matches!(
            err,
            ContentError::NotFound {
                category: Category::Pages,
                ..
            }
        ));
    }

    #[test]
    fn test_path_traversal_is_not_found() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages", "secret.md", "---\ntitle: Secret\n---\n");

        let err = resolver(&dir)
            .resolve(Category::Posts, "../pages/secret")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_front_matter_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "posts",
            "quebrado.md",
            "---\ntitle: [sem fim\ndate: 2024-01-01\n---\ntexto",
        );

        let err = resolver(&dir).resolve(Category::Posts, "quebrado").unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn test_missing_title_is_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "anonimo.md", "---\ndate: 2024-01-01\n---\ntexto");
        write(dir.path(), "posts", "sem-front-matter.md", "# Apenas texto");

        let resolver = resolver(&dir);
        assert!(matches!(
            resolver.resolve(Category::Posts, "anonimo").unwrap_err(),
            ContentError::MissingTitle { .. }
        ));
        assert!(matches!(
            resolver.resolve(Category::Posts, "sem-front-matter").unwrap_err(),
            ContentError::MissingTitle { .. }
        ));
    }

    #[test]
    fn test_repeated_resolution_rereads_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages", "home.md", "---\ntitle: Primeiro\n---\n");
        let resolver = resolver(&dir);
        assert_eq!(resolver.resolve(Category::Pages, "home").unwrap().title(), "Primeiro");

        write(dir.path(), "pages", "home.md", "---\ntitle: Segundo\n---\n");
        assert_eq!(resolver.resolve(Category::Pages, "home").unwrap().title(), "Segundo");
    }

    #[test]
    fn test_enumerate_identifiers() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "b-post.md", "---\ntitle: B\n---\n");
        write(dir.path(), "posts", "a-post.md", "---\ntitle: A\n---\n");
        write(dir.path(), "posts", "c.post.md", "---\ntitle: C\n---\n");
        write(dir.path(), "posts", "notas.txt", "rascunho");
        write(dir.path(), "posts", "README", "---\ntitle: X\n---\n");
        fs::create_dir_all(dir.path().join("posts/imagens")).unwrap();
        fs::create_dir_all(dir.path().join("posts/pasta.md")).unwrap();

        let ids = resolver(&dir).enumerate_identifiers(Category::Posts).unwrap();
        assert_eq!(ids, vec!["a-post", "b-post", "c.post"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "ok.md", "---\ntitle: Ok\n---\n");
        let latin1 = OsStr::from_bytes(b"caf\xe9.md");
        fs::write(dir.path().join("posts").join(latin1), "---\ntitle: Cafe\n---\n").unwrap();

        let resolver = resolver(&dir);
        assert_eq!(resolver.enumerate_identifiers(Category::Posts).unwrap(), vec!["ok"]);

        let list = resolver.list_metadata(Category::Posts).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].identifier, "ok");
    }

    #[test]
    fn test_enumerate_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        assert!(resolver.enumerate_identifiers(Category::Pages).unwrap().is_empty());
        assert!(resolver.static_params(Category::Pages).unwrap().is_empty());
        assert!(resolver.list_metadata(Category::Posts).unwrap().is_empty());
    }

    #[test]
    fn test_static_params() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages", "sobre.md", "---\ntitle: Sobre\n---\n");
        write(dir.path(), "pages", "contato.md", "---\ntitle: Contato\n---\n");

        let params = resolver(&dir).static_params(Category::Pages).unwrap();
        assert_eq!(
            params,
            vec![
                StaticParams {
                    slug: "contato".to_string()
                },
                StaticParams {
                    slug: "sobre".to_string()
                },
            ]
        );
        assert_eq!(
            serde_json::to_string(&params[0]).unwrap(),
            r#"{"slug":"contato"}"#
        );
    }

    #[test]
    fn test_list_metadata_sorted_desc() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "velho.md", "---\ntitle: Velho\ndate: 2023-12-25\n---\n");
        write(dir.path(), "posts", "novo.md", "---\ntitle: Novo\ndate: 2024-06-01\n---\n");
        write(dir.path(), "posts", "sem-data.md", "---\ntitle: Sem data\n---\n");
        write(dir.path(), "posts", "meio.md", "---\ntitle: Meio\ndate: 2024-01-10\n---\n");

        let list = resolver(&dir).list_metadata(Category::Posts).unwrap();
        let ids: Vec<_> = list.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(ids, vec!["novo", "meio", "velho", "sem-data"]);

        for pair in list.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn test_list_metadata_is_lexicographic() {
        let dir = TempDir::new().unwrap();
        // Non-ISO dates order as strings, not as calendar dates
        write(dir.path(), "posts", "a.md", "---\ntitle: A\ndate: 9/1/2024\n---\n");
        write(dir.path(), "posts", "b.md", "---\ntitle: B\ndate: 10/1/2024\n---\n");

        let list = resolver(&dir).list_metadata(Category::Posts).unwrap();
        assert_eq!(list[0].identifier, "a");
        assert_eq!(list[1].identifier, "b");
    }

    #[test]
    fn test_list_metadata_propagates_parse_errors() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts", "ok.md", "---\ntitle: Ok\n---\n");
        write(dir.path(), "posts", "ruim.md", "---\ntitle: [x\nfoo: 1\n---\n");

        assert!(resolver(&dir).list_metadata(Category::Posts).is_err());
    }

    #[test]
    fn test_resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContentResolver>();
    }
}
