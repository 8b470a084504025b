pub mod auto_translate;
pub mod debounce;
pub mod gui;
pub mod i18n;
pub mod settings;
pub mod translate;
pub mod utils;

pub use auto_translate::AutoTranslator;
pub use settings::{Settings, SettingsStore};
