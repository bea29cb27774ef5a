//! Theme toggle control
//!
//! The initial mode depends on client-only state (stored preference and the
//! `prefers-color-scheme` query), so prerendered HTML cannot know which icon
//! to show. Before mount the control renders a placeholder with the same box
//! as the button; the client script swaps in the real button once mounted.

use super::{ThemeMode, DARK_CLASS, THEME_KEY};

/// Element id shared by the placeholder and the mounted button
pub const TOGGLE_ID: &str = "theme-toggle";

/// Size classes shared by placeholder and button so layout never shifts
const TOGGLE_BOX: &str = "theme-toggle h-10 w-10";

const SUN_ICON: &str = r#"<svg class="h-6 w-6" fill="none" viewBox="0 0 24 24" stroke="currentColor" aria-hidden="true"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M12 3v1m0 16v1m9-9h-1M4 12H3m15.364 6.364l-.707-.707M6.343 6.343l-.707-.707m12.728 0l-.707.707M6.343 17.657l-.707.707M16 12a4 4 0 11-8 0 4 4 0 018 0z"/></svg>"#;

const MOON_ICON: &str = r#"<svg class="h-6 w-6" fill="none" viewBox="0 0 24 24" stroke="currentColor" aria-hidden="true"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M20.354 15.354A9 9 0 018.646 3.646 9.003 9.003 0 0012 21a9.003 9.003 0 008.354-5.646z"/></svg>"#;

/// Renders the toggle button for a mounted or unmounted state
pub struct ThemeToggle;

impl ThemeToggle {
    /// `None` means not yet mounted on the client
    pub fn render(mode: Option<ThemeMode>) -> String {
        match mode {
            None => Self::placeholder(),
            Some(mode) => Self::button(mode),
        }
    }

    /// Neutral box with the button's dimensions
    pub fn placeholder() -> String {
        format!(
            r#"<span id="{}" class="{} theme-toggle-placeholder" aria-hidden="true"></span>"#,
            TOGGLE_ID, TOGGLE_BOX
        )
    }

    /// Button showing the sun in dark mode and the moon in light mode
    pub fn button(mode: ThemeMode) -> String {
        let (icon, label) = match mode {
            ThemeMode::Dark => (SUN_ICON, "Mudar para modo Claro"),
            ThemeMode::Light => (MOON_ICON, "Mudar para modo Escuro"),
        };
        format!(
            r#"<button id="{}" type="button" class="{}" data-mode="{}" aria-label="{}">{}</button>"#,
            TOGGLE_ID, TOGGLE_BOX, mode, label, icon
        )
    }

    /// Client script mirroring [`ThemeProvider`](super::ThemeProvider):
    /// stored value wins, then `prefers-color-scheme`; every change updates
    /// the root class and local storage.
    pub fn client_script() -> String {
        format!(
            r#"<script>
(function () {{
  var KEY = "{key}", DARK = "{dark}";
  var icons = {{ dark: {sun:?}, light: {moon:?} }};
  var labels = {{ dark: "Mudar para modo Claro", light: "Mudar para modo Escuro" }};
  function initial() {{
    try {{
      var saved = localStorage.getItem(KEY);
      if (saved === "light" || saved === "dark") return saved;
    }} catch (e) {{}}
    return window.matchMedia && window.matchMedia("(prefers-color-scheme: dark)").matches ? "dark" : "light";
  }}
  var mode = initial();
  function apply() {{
    document.documentElement.classList.toggle(DARK, mode === "dark");
    try {{ localStorage.setItem(KEY, mode); }} catch (e) {{}}
    var el = document.getElementById("{id}");
    if (!el) return;
    var button = document.createElement("button");
    button.id = "{id}";
    button.type = "button";
    button.className = "{toggle_box}";
    button.setAttribute("data-mode", mode);
    button.setAttribute("aria-label", labels[mode]);
    button.innerHTML = icons[mode];
    button.addEventListener("click", function () {{
      mode = mode === "light" ? "dark" : "light";
      apply();
    }});
    el.replaceWith(button);
  }}
  document.documentElement.classList.toggle(DARK, mode === "dark");
  if (document.readyState === "loading") {{
    document.addEventListener("DOMContentLoaded", apply);
  }} else {{
    apply();
  }}
}})();
</script>"#,
            key = THEME_KEY,
            dark = DARK_CLASS,
            sun = SUN_ICON,
            moon = MOON_ICON,
            id = TOGGLE_ID,
            toggle_box = TOGGLE_BOX,
        )
    }
}
