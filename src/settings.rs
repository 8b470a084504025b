use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

mod persistence;

pub use persistence::{load_settings, save_settings};

/// Smallest font size offered by the settings dialog.
pub const MIN_FONT_SIZE: u32 = 8;
/// Largest font size offered by the settings dialog.
pub const MAX_FONT_SIZE: u32 = 30;

/// Target languages offered in the settings dialog, in display order.
/// The second element is the i18n message id of the language name.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "lang-en"),
    ("tr", "lang-tr"),
    ("de", "lang-de"),
    ("fr", "lang-fr"),
    ("es", "lang-es"),
    ("ru", "lang-ru"),
    ("ja", "lang-ja"),
    ("zh-cn", "lang-zh-cn"),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences persisted in settings.json.
/// Missing or mistyped keys are filled from [`Settings::default`] one by one.
/// `font_size` is in typographic points (1/72 inch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub font_family: String,
    pub font_size: u32,
    pub target_lang: String,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 10,
            target_lang: "en".to_string(),
            theme: Theme::Dark,
        }
    }
}

/// Index of `code` in [`SUPPORTED_LANGUAGES`]; unknown codes map to the first entry.
pub fn language_index(code: &str) -> usize {
    SUPPORTED_LANGUAGES
        .iter()
        .position(|(c, _)| c.eq_ignore_ascii_case(code))
        .unwrap_or(0)
}

/// Owns the settings for the process lifetime.
///
/// Every mutation goes through [`SettingsStore::update`], which writes the
/// file immediately.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults on any failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings(&path);
        Self { path, settings }
    }

    /// Store backed by the OS-standard settings file.
    pub fn open_default() -> Self {
        Self::open(crate::utils::settings_file_path())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` and persist right away.
    /// The in-memory value is updated even when writing fails.
    pub fn update<F>(&mut self, change: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        change(&mut self.settings);
        save_settings(&self.path, &self.settings)
    }
}
