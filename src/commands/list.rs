//! List site content

use anyhow::Result;

use crate::content::{Category, ContentMetadata, ContentResolver};
use crate::helpers::display_date;
use crate::Site;

/// Print the metadata of one category, posts newest first
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let category: Category = content_type.parse()?;
    let entries = ContentResolver::for_site(site).list_metadata(category)?;

    println!("{} ({}):", title_for(category), entries.len());
    for entry in &entries {
        println!("  {}", format_line(entry, &site.config.date_format));
    }

    Ok(())
}

fn title_for(category: Category) -> &'static str {
    match category {
        Category::Posts => "Posts",
        Category::Pages => "Pages",
    }
}

fn format_line(entry: &ContentMetadata, date_format: &str) -> String {
    match &entry.date {
        Some(date) => format!(
            "{} - {} [{}]",
            display_date(date, date_format),
            entry.title,
            entry.identifier
        ),
        None => format!("{} [{}]", entry.title, entry.identifier),
    }
}
