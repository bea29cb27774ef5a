//! Inspect or change the persisted display mode

use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

use crate::theme::{FileStorage, RootClassList, ThemeMode, ThemeProvider};
use crate::Site;

/// What the `theme` command does with the stored mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set(ThemeMode),
}

impl FromStr for ThemeAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show" => Ok(ThemeAction::Show),
            "toggle" => Ok(ThemeAction::Toggle),
            "light" => Ok(ThemeAction::Set(ThemeMode::Light)),
            "dark" => Ok(ThemeAction::Set(ThemeMode::Dark)),
            _ => anyhow::bail!(
                "Unknown theme action: {}. Available: show, toggle, light, dark",
                s
            ),
        }
    }
}

/// Location of the preference store for a site
pub fn storage_path(site: &Site) -> PathBuf {
    site.base_dir.join(&site.config.theme_storage)
}

/// Apply an action and return the resulting mode.
///
/// `system_dark` stands in for the platform preference when nothing
/// valid has been stored yet.
pub fn run(site: &Site, action: ThemeAction, system_dark: bool) -> Result<ThemeMode> {
    let storage = FileStorage::new(storage_path(site));
    let mut provider = ThemeProvider::mount(storage, &system_dark, RootClassList::new())?;

    let mode = match action {
        ThemeAction::Show => provider.mode(),
        ThemeAction::Toggle => provider.toggle()?,
        ThemeAction::Set(mode) => provider.set(mode)?,
    };

    tracing::info!(
        "Theme is {} (root class: {:?}, stored in {:?})",
        mode,
        provider.document().to_attr(),
        provider.storage().path()
    );

    Ok(mode)
}
