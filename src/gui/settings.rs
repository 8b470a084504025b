use eframe::egui;

use super::fonts::FontCatalog;
use crate::i18n;
use crate::settings::{language_index, Settings, Theme, MAX_FONT_SIZE, MIN_FONT_SIZE, SUPPORTED_LANGUAGES};

pub const SETTINGS_WINDOW_SIZE: [f32; 2] = [500.0, 400.0];

/// A single control change made in the settings dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEdit {
    FontFamily(String),
    FontSize(u32),
    TargetLang(String),
    Theme(Theme),
}

#[derive(Debug, Default)]
pub struct SettingsOutcome {
    pub edits: Vec<SettingsEdit>,
    pub close_requested: bool,
}

/// "de - German"; unknown codes are shown as-is.
pub fn language_option_label(code: &str) -> String {
    match SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
    {
        Some((c, name_id)) => format!("{} - {}", c, i18n::tr(name_id)),
        None => code.to_string(),
    }
}

/// Settings dialog. Holds only view state; the settings themselves are
/// owned by the main window and changed through [`SettingsEdit`]s.
#[derive(Debug, Default)]
pub struct SettingsWindow {
    status_message: Option<String>,
}

impl SettingsWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    #[cfg(test)]
    fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &Settings, fonts: &FontCatalog) -> SettingsOutcome {
        let mut out = SettingsOutcome::default();
        ui.spacing_mut().item_spacing.y = 8.0;

        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new(i18n::tr("title-settings")).size(16.0).strong());
        });

        // Font family
        ui.label(i18n::tr("label-font-family"));
        egui::ComboBox::from_id_salt("settings_font_family")
            .width(ui.available_width())
            .selected_text(settings.font_family.as_str())
            .show_ui(ui, |ui| {
                if fonts.is_empty() {
                    let _ = ui.selectable_label(true, settings.font_family.as_str());
                }
                for family in fonts.families() {
                    let current = family.eq_ignore_ascii_case(&settings.font_family);
                    if ui.selectable_label(current, family).clicked() && !current {
                        out.edits.push(SettingsEdit::FontFamily(family.to_string()));
                    }
                }
            });

        // Font size
        let mut size = settings.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        ui.label(i18n::tr_args(
            "label-font-size",
            &[("size", settings.font_size.to_string().as_str())],
        ));
        let slider = ui.add(
            egui::Slider::new(&mut size, MIN_FONT_SIZE..=MAX_FONT_SIZE).show_value(false),
        );
        if slider.changed() && size != settings.font_size {
            out.edits.push(SettingsEdit::FontSize(size));
        }

        // Target language
        ui.label(i18n::tr("label-target-lang"));
        let current_idx = language_index(&settings.target_lang);
        egui::ComboBox::from_id_salt("settings_target_lang")
            .width(ui.available_width())
            .selected_text(language_option_label(SUPPORTED_LANGUAGES[current_idx].0))
            .show_ui(ui, |ui| {
                for (i, (code, _)) in SUPPORTED_LANGUAGES.iter().enumerate() {
                    let selected = i == current_idx;
                    if ui
                        .selectable_label(selected, language_option_label(code))
                        .clicked()
                        && !code.eq_ignore_ascii_case(&settings.target_lang)
                    {
                        out.edits.push(SettingsEdit::TargetLang(code.to_string()));
                    }
                }
            });

        // Theme
        ui.label(i18n::tr("label-theme"));
        for (theme, label_id) in [(Theme::Light, "theme-light"), (Theme::Dark, "theme-dark")] {
            if ui.radio(settings.theme == theme, i18n::tr(label_id)).clicked()
                && settings.theme != theme
            {
                out.edits.push(SettingsEdit::Theme(theme));
            }
        }

        ui.add_space(6.0);
        if ui
            .add_sized([ui.available_width(), 28.0], egui::Button::new(i18n::tr("btn-close")))
            .clicked()
        {
            out.close_requested = true;
        }

        if let Some(msg) = &self.status_message {
            ui.colored_label(egui::Color32::from_rgb(0x4c, 0xaf, 0x50), msg);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_label_includes_code() {
        assert!(language_option_label("de").starts_with("de - "));
        assert!(language_option_label("ZH-CN").starts_with("zh-cn - "));
        assert_eq!(language_option_label("xx"), "xx");
    }

    #[test]
    fn status_is_kept_until_replaced() {
        let mut w = SettingsWindow::new();
        assert_eq!(w.status(), None);
        w.set_status("first".into());
        w.set_status("second".into());
        assert_eq!(w.status(), Some("second"));
    }
}
