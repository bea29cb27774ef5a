//! Theme module - light/dark display state and its toggle control

mod error;
mod mode;
mod provider;
mod storage;
mod toggle;

pub use error::ThemeError;
pub use mode::ThemeMode;
pub use provider::{DocumentStyle, RootClassList, SystemPreference, ThemeProvider, DARK_CLASS};
pub use storage::{FileStorage, MemoryStorage, ThemeStorage, THEME_KEY};
pub use toggle::{ThemeToggle, TOGGLE_ID};
