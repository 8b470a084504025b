use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;

use super::Settings;

/// Read settings from `path`. Any I/O or parse error yields the defaults.
pub fn load_settings(path: &Path) -> Settings {
    match try_load(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::debug!("using default settings ({:#})", e);
            Settings::default()
        }
    }
}

fn try_load(path: &Path) -> anyhow::Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse {}", path.display()))?;
    let Value::Object(map) = value else {
        anyhow::bail!("{} is not a JSON object", path.display());
    };
    Ok(settings_from_map(&map))
}

// Each key is read on its own: a missing or mistyped value falls back to
// its default without discarding the other keys.
fn settings_from_map(map: &Map<String, Value>) -> Settings {
    let mut settings = Settings::default();
    read_key(map, "font_family", &mut settings.font_family);
    read_key(map, "font_size", &mut settings.font_size);
    read_key(map, "target_lang", &mut settings.target_lang);
    read_key(map, "theme", &mut settings.theme);
    settings
}

fn read_key<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(raw) = map.get(key) else {
        return;
    };
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(v) => *slot = v,
        Err(e) => tracing::warn!("settings key '{}' ignored ({}); using default", key, e),
    }
}

/// Write settings as indented JSON.
pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings.serialize(&mut ser)?;

    // Atomic-ish write: write to temp file then rename
    let tmp_path = path.with_extension("json.tmp");
    let mut f = std::fs::File::create(&tmp_path)
        .with_context(|| format!("create {}", tmp_path.display()))?;
    f.write_all(&buf)?;
    f.flush()?;
    drop(f);
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("rename into {}", path.display()))?;
    tracing::debug!("settings saved to {}", path.display());
    Ok(())
}
