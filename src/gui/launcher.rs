use eframe::egui;
use std::time::{Duration, Instant};

use super::app::{TranslatorApp, MAIN_WINDOW_SIZE};
use super::splash::SplashProgress;

enum RootState {
    // Splash runs while the main window is already built behind it
    Splash(SplashProgress),
    Running,
}

pub struct RootApp {
    state: RootState,
    app: TranslatorApp,
}

impl RootApp {
    pub fn new(app: TranslatorApp) -> Self {
        Self {
            state: RootState::Splash(SplashProgress::new(Instant::now())),
            app,
        }
    }
}

impl eframe::App for RootApp {
    fn persist_egui_memory(&self) -> bool {
        false
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let mut next_state: Option<RootState> = None;

        match &mut self.state {
            RootState::Splash(progress) => {
                let now = Instant::now();
                progress.advance(now);
                progress.show(ctx);
                if progress.is_finished(now) {
                    show_main_window(ctx);
                    next_state = Some(RootState::Running);
                } else {
                    ctx.request_repaint_after(Duration::from_millis(40));
                }
            }
            RootState::Running => {
                self.app.update(ctx, frame);
            }
        }

        if let Some(ns) = next_state {
            tracing::debug!("splash finished");
            self.state = ns;
            ctx.request_repaint();
        }
    }
}

fn show_main_window(ctx: &egui::Context) {
    let size = egui::vec2(MAIN_WINDOW_SIZE[0], MAIN_WINDOW_SIZE[1]);
    ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(
        egui::WindowLevel::Normal,
    ));
    ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size));
    // Center on the current monitor when its size is known
    if let Some(monitor) = ctx.input(|i| i.viewport().monitor_size) {
        let pos = egui::pos2(
            ((monitor.x - size.x) / 2.0).max(0.0),
            ((monitor.y - size.y) / 2.0).max(0.0),
        );
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(pos));
    }
    ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
}
