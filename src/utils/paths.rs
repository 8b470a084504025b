use directories::BaseDirs;
use std::path::PathBuf;

/// Directory name under the OS config root.
pub const APP_DIR_NAME: &str = "G-Translator";

/// Application config directory (OS standard)
/// Linux: ~/.config/G-Translator
/// macOS: ~/Library/Application Support/G-Translator
/// Windows: %APPDATA%\\G-Translator
///
/// `GTRANSLATOR_CONFIG_DIR` overrides the location.
pub fn app_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GTRANSLATOR_CONFIG_DIR") {
        let dir = dir.trim();
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(base) = BaseDirs::new() {
        return base.config_dir().join(APP_DIR_NAME);
    }
    // Fallback: current working directory
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Absolute path of the persisted settings file.
pub fn settings_file_path() -> PathBuf {
    app_config_dir().join("settings.json")
}
