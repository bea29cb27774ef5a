//! Content categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of content categories, one backing directory each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Posts,
    Pages,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Posts, Category::Pages];

    /// Directory name under the content root
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Posts => "posts",
            Category::Pages => "pages",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" | "posts" => Ok(Category::Posts),
            "page" | "pages" => Ok(Category::Pages),
            _ => anyhow::bail!("Unknown content type: {}. Available: post, page", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("posts".parse::<Category>().unwrap(), Category::Posts);
        assert_eq!("page".parse::<Category>().unwrap(), Category::Pages);
        assert!("tags".parse::<Category>().is_err());
    }

    #[test]
    fn test_dir_name() {
        assert_eq!(Category::Posts.to_string(), "posts");
        assert_eq!(Category::Pages.dir_name(), "pages");
    }
}
