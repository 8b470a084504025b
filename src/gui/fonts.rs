use eframe::egui;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// egui family used by the two text panes; rebound whenever the
/// configured font family changes.
pub const PANE_FAMILY: &str = "pane";

const MAX_SCAN_DEPTH: usize = 4;
const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];
const REGULAR_STYLES: [&str; 4] = ["regular", "roman", "book", "normal"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FontEntry {
    pub family: String,
    pub path: PathBuf,
}

/// Installed font families the user can pick for the text panes.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    entries: Vec<FontEntry>,
}

impl FontCatalog {
    /// Scan the platform font directories.
    pub fn scan() -> Self {
        let catalog = Self::from_dirs(&system_font_dirs());
        tracing::info!("found {} font families", catalog.entries.len());
        catalog
    }

    pub fn from_dirs(dirs: &[PathBuf]) -> Self {
        let mut files = Vec::new();
        for dir in dirs {
            collect_font_files(dir, 0, &mut files);
        }
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for path in files {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(family) = family_from_file_stem(stem) else {
                continue;
            };
            if seen.insert(family_key(&family)) {
                entries.push(FontEntry { family, path });
            }
        }
        entries.sort_by_key(|e| e.family.to_lowercase());
        Self { entries }
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.family.as_str())
    }

    pub(crate) fn find(&self, family: &str) -> Option<&FontEntry> {
        let key = family_key(family);
        self.entries.iter().find(|e| family_key(&e.family) == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
    }
    #[cfg(target_os = "windows")]
    {
        let windir = std::env::var("WINDIR").unwrap_or_else(|_| "C:\\Windows".to_string());
        dirs.push(PathBuf::from(windir).join("Fonts"));
    }
    #[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }
    if let Some(base) = directories::BaseDirs::new() {
        #[cfg(target_os = "macos")]
        dirs.push(base.home_dir().join("Library/Fonts"));
        #[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
        {
            dirs.push(base.data_dir().join("fonts"));
            dirs.push(base.home_dir().join(".fonts"));
        }
        #[cfg(target_os = "windows")]
        dirs.push(base.data_local_dir().join("Microsoft\\Windows\\Fonts"));
    }
    dirs
}

fn collect_font_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in read.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, depth + 1, out);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
        {
            out.push(path);
        }
    }
}

/// Family name for a font file stem, or `None` for non-regular styles.
/// "DejaVuSans-Bold" -> None, "LiberationSans-Regular" -> "LiberationSans",
/// "Arial" -> "Arial".
pub fn family_from_file_stem(stem: &str) -> Option<String> {
    let stem = stem.trim();
    if stem.is_empty() {
        return None;
    }
    let base = match stem.rsplit_once('-') {
        Some((base, style)) => {
            if !REGULAR_STYLES.contains(&style.to_ascii_lowercase().as_str()) {
                return None;
            }
            base
        }
        None => stem,
    };
    let family = base.replace('_', " ").trim().to_string();
    if family.is_empty() {
        None
    } else {
        Some(family)
    }
}

// Case, spaces and punctuation are ignored: "DejaVu Sans" == "DejaVuSans"
fn family_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn read_first_existing(paths: &[&str]) -> Option<Vec<u8>> {
    for p in paths {
        if let Ok(data) = std::fs::read(p) {
            return Some(data);
        }
    }
    None
}

// egui points are logical pixels; typographic points assume 96 DPI
const PIXELS_PER_POINT_SIZE: f32 = 96.0 / 72.0;

/// Font used by both text panes. `point_size` is the stored font size.
pub fn pane_font(point_size: u32) -> egui::FontId {
    egui::FontId::new(
        point_size as f32 * PIXELS_PER_POINT_SIZE,
        egui::FontFamily::Name(PANE_FAMILY.into()),
    )
}

/// Rebuild egui font definitions with `family` bound to the pane family.
/// Returns false when the family is not installed; panes then use the
/// default proportional font.
pub fn install_fonts(ctx: &egui::Context, catalog: &FontCatalog, family: &str) -> bool {
    let mut fonts = egui::FontDefinitions::default();

    // Candidate paths for CJK fonts (Japanese/Chinese targets)
    #[cfg(target_os = "macos")]
    let cjk_candidates = [
        "/System/Library/Fonts/Hiragino Sans GB.ttc",
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/opt/homebrew/share/fonts/NotoSansCJK-Regular.ttc",
        "/usr/local/share/fonts/NotoSansCJK-Regular.ttc",
    ];

    #[cfg(target_os = "windows")]
    let cjk_candidates = [
        "C:\\Windows\\Fonts\\YuGothR.ttc",
        "C:\\Windows\\Fonts\\meiryo.ttc",
        "C:\\Windows\\Fonts\\msyh.ttc",
        "C:\\Windows\\Fonts\\msgothic.ttc",
    ];

    #[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
    let cjk_candidates = [
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    ];

    if let Some(cjk) = read_first_existing(&cjk_candidates) {
        fonts.font_data.insert(
            "cjk_fallback".to_owned(),
            Arc::new(egui::FontData::from_owned(cjk)),
        );
        // Appended so Latin text keeps the primary font
        for fam in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts
                .families
                .entry(fam)
                .or_default()
                .push("cjk_fallback".to_owned());
        }
    }

    let mut found = false;
    let mut chain = Vec::new();
    if let Some(entry) = catalog.find(family) {
        match std::fs::read(&entry.path) {
            Ok(data) => {
                let key = format!("user:{}", entry.family);
                fonts
                    .font_data
                    .insert(key.clone(), Arc::new(egui::FontData::from_owned(data)));
                chain.push(key);
                found = true;
            }
            Err(e) => {
                tracing::warn!("cannot read font {}: {}", entry.path.display(), e);
            }
        }
    } else {
        tracing::debug!("font family '{}' not installed", family);
    }
    chain.extend(
        fonts
            .families
            .get(&egui::FontFamily::Proportional)
            .cloned()
            .unwrap_or_default(),
    );
    fonts
        .families
        .insert(egui::FontFamily::Name(PANE_FAMILY.into()), chain);

    ctx.set_fonts(fonts);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_family_from_stem() {
        assert_eq!(family_from_file_stem("Arial").as_deref(), Some("Arial"));
        assert_eq!(
            family_from_file_stem("LiberationSans-Regular").as_deref(),
            Some("LiberationSans")
        );
        assert_eq!(
            family_from_file_stem("Fira_Code-Book").as_deref(),
            Some("Fira Code")
        );
        assert_eq!(family_from_file_stem("DejaVuSans-Bold"), None);
        assert_eq!(family_from_file_stem("  "), None);
    }

    #[test]
    fn pane_font_converts_points_to_pixels() {
        let font = pane_font(10);
        assert!((font.size - 13.333).abs() < 0.01);
        assert_eq!(pane_font(12).size, 16.0);
        assert_eq!(font.family, egui::FontFamily::Name(PANE_FAMILY.into()));
    }

    #[test]
    fn key_ignores_case_and_spacing() {
        assert_eq!(family_key("DejaVu Sans"), family_key("dejavusans"));
        assert_ne!(family_key("DejaVu Sans"), family_key("DejaVu Serif"));
    }

    #[test]
    fn scans_directory_tree() {
        let root = std::env::temp_dir().join(format!("gtranslator_fonts_{}", std::process::id()));
        let nested = root.join("truetype").join("dejavu");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("DejaVuSans.ttf"), b"").unwrap();
        std::fs::write(nested.join("DejaVuSans-Bold.ttf"), b"").unwrap();
        std::fs::write(root.join("arial.TTF"), b"").unwrap();
        std::fs::write(root.join("readme.txt"), b"").unwrap();

        let catalog = FontCatalog::from_dirs(&[root.clone()]);
        let families: Vec<&str> = catalog.families().collect();
        assert_eq!(families, vec!["arial", "DejaVuSans"]);
        assert!(catalog.find("Arial").is_some());
        assert!(catalog.find("DejaVu Sans").is_some());
        assert!(catalog.find("Helvetica").is_none());

        let _ = std::fs::remove_dir_all(root);
    }
}
