use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

use super::fonts::{install_fonts, pane_font, FontCatalog};
use super::settings::{language_option_label, SettingsEdit, SettingsWindow, SETTINGS_WINDOW_SIZE};
use crate::auto_translate::{AutoTranslator, TranslationStatus, DEFAULT_DEBOUNCE};
use crate::i18n;
use crate::settings::{Settings, SettingsStore, Theme, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::translate::Translator;

pub const MAIN_WINDOW_SIZE: [f32; 2] = [900.0, 500.0];

const ACCENT_GREEN: egui::Color32 = egui::Color32::from_rgb(0x2e, 0x7d, 0x32);

/// Main window: source pane, output pane, status line and language bar.
pub struct TranslatorApp {
    store: SettingsStore,
    auto: AutoTranslator,
    fonts: FontCatalog,
    input: String,
    settings_window: SettingsWindow,
    show_settings: bool,
    show_exit_confirm: bool,
    // Visuals/fonts are applied lazily because they need the egui context
    style_dirty: bool,
    fonts_dirty: bool,
    notifier_installed: bool,
}

impl TranslatorApp {
    pub fn new(store: SettingsStore, translator: Arc<dyn Translator>, fonts: FontCatalog) -> Self {
        Self::with_debounce(store, translator, fonts, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(
        store: SettingsStore,
        translator: Arc<dyn Translator>,
        fonts: FontCatalog,
        delay: Duration,
    ) -> Self {
        let auto = AutoTranslator::new(translator, &store.settings().target_lang, delay);
        tracing::info!(
            "settings: font '{}' {}pt, target '{}', theme {} ({})",
            store.settings().font_family,
            store.settings().font_size,
            store.settings().target_lang,
            store.settings().theme,
            store.path().display()
        );
        Self {
            store,
            auto,
            fonts,
            input: String::new(),
            settings_window: SettingsWindow::new(),
            show_settings: false,
            show_exit_confirm: false,
            style_dirty: true,
            fonts_dirty: false,
            notifier_installed: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    /// Bind the configured font family. Must run before the first frame
    /// because the panes reference the pane font family by name.
    pub fn install_fonts(&self, ctx: &egui::Context) {
        let family = &self.store.settings().font_family;
        if !install_fonts(ctx, &self.fonts, family) {
            tracing::info!("font '{}' unavailable, using default", family);
        }
    }

    /// Replace the source text as if the user had typed it.
    pub fn set_input(&mut self, text: &str) {
        if self.input != text {
            self.input = text.to_string();
            self.auto.input_changed(&self.input);
        }
    }

    pub fn output(&self) -> String {
        self.auto.view().output
    }

    pub fn language_label(&self) -> String {
        i18n::tr_args(
            "label-target-language",
            &[("code", self.store.settings().target_lang.as_str())],
        )
    }

    pub fn status_text(&self) -> String {
        match self.auto.view().status {
            TranslationStatus::Idle | TranslationStatus::Pending => String::new(),
            TranslationStatus::Translating => i18n::tr("status-translating"),
            TranslationStatus::Done => i18n::tr("status-done"),
            TranslationStatus::Failed(err) => i18n::tr_args("status-error", &[("error", err.as_str())]),
        }
    }

    /// Apply one settings change: persist it immediately and update the
    /// live UI. Returns the confirmation shown in the settings dialog.
    pub fn apply_edit(&mut self, edit: SettingsEdit) -> String {
        let (saved, msg) = match edit {
            SettingsEdit::FontFamily(family) => {
                let msg = i18n::tr_args("msg-font-selected", &[("family", family.as_str())]);
                self.fonts_dirty = true;
                (self.store.update(|s| s.font_family = family), msg)
            }
            SettingsEdit::FontSize(size) => {
                let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                let msg = i18n::tr_args("msg-font-size-selected", &[("size", size.to_string().as_str())]);
                (self.store.update(|s| s.font_size = size), msg)
            }
            SettingsEdit::TargetLang(code) => {
                let msg = i18n::tr_args(
                    "msg-language-selected",
                    &[("language", language_option_label(&code).as_str())],
                );
                self.auto.set_target_lang(&code);
                (self.store.update(|s| s.target_lang = code), msg)
            }
            SettingsEdit::Theme(theme) => {
                let msg = i18n::tr_args("msg-theme-selected", &[("theme", theme.as_str())]);
                self.style_dirty = true;
                (self.store.update(|s| s.theme = theme), msg)
            }
        };
        match saved {
            Ok(()) => msg,
            Err(e) => {
                tracing::warn!("failed to save settings: {:#}", e);
                i18n::tr_args("msg-save-failed", &[("error", e.to_string().as_str())])
            }
        }
    }

    pub fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.notifier_installed {
            let ctx_for_worker = ctx.clone();
            self.auto
                .set_notifier(Arc::new(move || ctx_for_worker.request_repaint()));
            self.notifier_installed = true;
        }
        if self.style_dirty {
            apply_theme(ctx, self.store.settings().theme);
            self.style_dirty = false;
        }
        if self.fonts_dirty {
            self.install_fonts(ctx);
            self.fonts_dirty = false;
        }

        let theme = self.store.settings().theme;
        let font = pane_font(self.store.settings().font_size);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            // Frameless window: the bar doubles as the drag handle
            let drag = ui.interact(
                ui.max_rect(),
                egui::Id::new("title_bar_drag"),
                egui::Sense::click_and_drag(),
            );
            if drag.drag_started() {
                ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
            }
            ui.horizontal(|ui| {
                let logo_color = match theme {
                    Theme::Dark => egui::Color32::LIGHT_GRAY,
                    Theme::Light => egui::Color32::GRAY,
                };
                ui.label(
                    egui::RichText::new(i18n::tr("app-title"))
                        .size(11.0)
                        .color(logo_color),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let close = ui
                        .add_sized([70.0, 30.0], egui::Button::new("X"))
                        .on_hover_text(i18n::tr("tooltip-close"));
                    if close.clicked() {
                        self.show_exit_confirm = true;
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("bottom_bar").show(ctx, |ui| {
            let status = self.status_text();
            let status_color = match theme {
                Theme::Dark => egui::Color32::WHITE,
                Theme::Light => ACCENT_GREEN,
            };
            ui.label(egui::RichText::new(status).strong().color(status_color));
            ui.horizontal(|ui| {
                ui.label(self.language_label());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(i18n::tr("btn-settings")).clicked() {
                        self.show_settings = true;
                    }
                });
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = self.auto.view().output;
            ui.columns(2, |cols| {
                let size = cols[0].available_size();
                let edited = cols[0]
                    .add_sized(
                        size,
                        egui::TextEdit::multiline(&mut self.input)
                            .hint_text(i18n::tr("input-placeholder"))
                            .font(font.clone()),
                    )
                    .changed();
                if edited {
                    self.auto.input_changed(&self.input);
                }

                let size = cols[1].available_size();
                // &str buffer: selectable but not editable
                cols[1].add_sized(
                    size,
                    egui::TextEdit::multiline(&mut output.as_str())
                        .hint_text(i18n::tr("output-placeholder"))
                        .font(font.clone()),
                );
            });
        });

        if self.show_settings {
            self.settings_dialog(ctx);
        }
        if self.show_exit_confirm {
            self.exit_dialog(ctx);
        }
    }

    fn settings_dialog(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut outcome = None;
        egui::Window::new(i18n::tr("title-settings"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .fixed_size(SETTINGS_WINDOW_SIZE)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                outcome = Some(
                    self.settings_window
                        .ui(ui, self.store.settings(), &self.fonts),
                );
            });

        if let Some(outcome) = outcome {
            for edit in outcome.edits {
                let msg = self.apply_edit(edit);
                self.settings_window.set_status(msg);
            }
            if outcome.close_requested {
                open = false;
            }
        }
        self.show_settings = open;
    }

    fn exit_dialog(&mut self, ctx: &egui::Context) {
        let mut choice = None;
        let modal = egui::Modal::new(egui::Id::new("exit_confirm")).show(ctx, |ui| {
            ui.set_width(260.0);
            ui.strong(i18n::tr("title-exit-confirm"));
            ui.label(i18n::tr("msg-exit-confirm"));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_sized([70.0, 24.0], egui::Button::new(i18n::tr("btn-close")))
                    .clicked()
                {
                    choice = Some(ExitChoice::Close);
                }
                let cancel = ui.add_sized([70.0, 24.0], egui::Button::new(i18n::tr("btn-cancel")));
                // Cancel is the default action
                if cancel.clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    choice = Some(ExitChoice::Cancel);
                }
            });
        });
        // Escape or a click outside the dialog
        if choice.is_none() && modal.should_close() {
            choice = Some(ExitChoice::Cancel);
        }
        if let Some(choice) = choice {
            if self.resolve_exit(choice) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    /// Close the confirmation; true when the window should close.
    fn resolve_exit(&mut self, choice: ExitChoice) -> bool {
        self.show_exit_confirm = false;
        match choice {
            ExitChoice::Close => {
                tracing::info!("exit confirmed");
                true
            }
            ExitChoice::Cancel => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitChoice {
    Close,
    Cancel,
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    let visuals = match theme {
        Theme::Dark => {
            let mut v = egui::Visuals::dark();
            v.panel_fill = egui::Color32::from_rgb(0x12, 0x12, 0x12);
            v.window_fill = egui::Color32::from_rgb(0x12, 0x12, 0x12);
            // TextEdit background
            v.extreme_bg_color = egui::Color32::from_rgb(0x22, 0x22, 0x22);
            v.widgets.inactive.weak_bg_fill = egui::Color32::from_rgb(0x33, 0x33, 0x33);
            v.widgets.hovered.weak_bg_fill = egui::Color32::from_rgb(0x44, 0x44, 0x44);
            v.override_text_color = Some(egui::Color32::WHITE);
            v
        }
        Theme::Light => {
            let mut v = egui::Visuals::light();
            v.override_text_color = Some(egui::Color32::from_rgb(0x33, 0x33, 0x33));
            v
        }
    };
    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auto_translate::tests::{wait_until, FakeTranslator};
    use crate::settings::load_settings;
    use std::path::PathBuf;

    fn temp_store(tag: &str) -> (PathBuf, SettingsStore) {
        let path = std::env::temp_dir()
            .join(format!("gtranslator_app_{}_{}", std::process::id(), tag))
            .join("settings.json");
        let _ = std::fs::remove_file(&path);
        (path.clone(), SettingsStore::open(path))
    }

    fn app(tag: &str) -> (PathBuf, Arc<FakeTranslator>, TranslatorApp) {
        let (path, store) = temp_store(tag);
        let fake = Arc::new(FakeTranslator::default());
        let app = TranslatorApp::with_debounce(
            store,
            fake.clone(),
            FontCatalog::default(),
            Duration::from_millis(100),
        );
        (path, fake, app)
    }

    #[test]
    fn target_language_change_updates_label_and_file() {
        let (path, _fake, mut app) = app("lang");
        assert!(app.language_label().ends_with(": en"));

        let msg = app.apply_edit(SettingsEdit::TargetLang("de".into()));
        assert!(msg.contains("de - "));
        assert!(app.language_label().ends_with(": de"));
        assert_eq!(load_settings(&path).target_lang, "de");
    }

    #[test]
    fn typing_translates_into_selected_language() {
        let (_path, fake, mut app) = app("typing");
        app.apply_edit(SettingsEdit::TargetLang("fr".into()));
        app.set_input("good morning");
        assert!(app.status_text().is_empty());
        assert!(wait_until(Duration::from_secs(3), || app.output() == "fr:good morning"));
        assert_eq!(app.status_text(), i18n::tr("status-done"));
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn failed_translation_is_reported_in_status() {
        let (_path, fake, mut app) = app("failure");
        *fake.fail_with.lock().unwrap() = Some("network unreachable".into());
        app.set_input("hello");
        assert!(wait_until(Duration::from_secs(3), || app
            .status_text()
            .contains("network unreachable")));
        assert!(app.output().is_empty());
    }

    #[test]
    fn exit_confirmation_cancel_keeps_window_open() {
        let (_path, _fake, mut app) = app("exit_cancel");
        app.show_exit_confirm = true;
        assert!(!app.resolve_exit(ExitChoice::Cancel));
        assert!(!app.show_exit_confirm);

        app.show_exit_confirm = true;
        assert!(app.resolve_exit(ExitChoice::Close));
        assert!(!app.show_exit_confirm);
    }

    #[test]
    fn enter_in_exit_confirmation_cancels() {
        let (_path, _fake, mut app) = app("exit_enter");
        app.show_exit_confirm = true;
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            events: vec![egui::Event::Key {
                key: egui::Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            }],
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| app.exit_dialog(ctx));
        assert!(!app.show_exit_confirm);
        let viewport = output.viewport_output.get(&egui::ViewportId::ROOT);
        assert!(viewport.map_or(true, |v| !v
            .commands
            .contains(&egui::ViewportCommand::Close)));
    }

    #[test]
    fn font_size_is_clamped_and_saved() {
        let (path, _fake, mut app) = app("size");
        app.apply_edit(SettingsEdit::FontSize(99));
        assert_eq!(app.settings().font_size, MAX_FONT_SIZE);
        assert_eq!(load_settings(&path).font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn theme_and_font_changes_are_saved() {
        let (path, _fake, mut app) = app("theme");
        app.apply_edit(SettingsEdit::Theme(Theme::Light));
        app.apply_edit(SettingsEdit::FontFamily("DejaVu Sans".into()));
        let saved = load_settings(&path);
        assert_eq!(saved.theme, Theme::Light);
        assert_eq!(saved.font_family, "DejaVu Sans");
        assert!(app.fonts_dirty);
        assert!(app.style_dirty);
    }
}
