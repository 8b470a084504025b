use eframe::egui;
use std::time::{Duration, Instant};

use crate::i18n;

pub const SPLASH_SIZE: [f32; 2] = [400.0, 200.0];

const TICK: Duration = Duration::from_millis(40);
const STEP: u8 = 2;
// Full bar stays on screen this long before the main window appears
const HOLD: Duration = Duration::from_secs(2);
// One "..." per tick; the label is truncated to the window width
const DOT_CYCLE: usize = 50;

/// Loading animation state, driven by wall-clock time so dropped frames
/// don't slow it down.
#[derive(Debug, Clone)]
pub struct SplashProgress {
    progress: u8,
    dots: usize,
    next_tick: Instant,
    completed_at: Option<Instant>,
}

impl SplashProgress {
    pub fn new(now: Instant) -> Self {
        Self {
            progress: 0,
            dots: 0,
            next_tick: now + TICK,
            completed_at: None,
        }
    }

    /// Apply every tick that elapsed up to `now`.
    pub fn advance(&mut self, now: Instant) {
        while self.progress < 100 && now >= self.next_tick {
            let tick_at = self.next_tick;
            self.progress = (self.progress + STEP).min(100);
            self.dots = (self.dots + 1) % DOT_CYCLE;
            self.next_tick = tick_at + TICK;
            if self.progress >= 100 {
                self.completed_at = Some(tick_at);
            }
        }
    }

    /// Percent complete, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.completed_at
            .map(|at| now.duration_since(at) >= HOLD)
            .unwrap_or(false)
    }

    pub fn loading_label(&self) -> String {
        format!("{}{}", i18n::tr("loading"), "...".repeat(self.dots))
    }

    pub fn show(&self, ctx: &egui::Context) {
        let frame = egui::Frame::default()
            .fill(egui::Color32::from_rgb(0x1e, 0x1e, 0x1e))
            .corner_radius(egui::CornerRadius::same(10))
            .inner_margin(egui::Margin::symmetric(24, 20));
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new(i18n::tr("app-title"))
                        .size(24.0)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.add_space(16.0);
                ui.add(
                    egui::ProgressBar::new(self.progress as f32 / 100.0)
                        .desired_height(25.0)
                        .fill(egui::Color32::from_rgb(0x4c, 0xaf, 0x50))
                        .show_percentage(),
                );
                ui.add_space(12.0);
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(self.loading_label())
                            .size(12.0)
                            .color(egui::Color32::WHITE),
                    )
                    .truncate(),
                );
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_fifty_ticks() {
        let t0 = Instant::now();
        let mut s = SplashProgress::new(t0);
        s.advance(t0 + Duration::from_millis(39));
        assert_eq!(s.progress(), 0);
        s.advance(t0 + Duration::from_millis(400));
        assert_eq!(s.progress(), 20);
        s.advance(t0 + Duration::from_millis(2_000));
        assert_eq!(s.progress(), 100);
        s.advance(t0 + Duration::from_secs(60));
        assert_eq!(s.progress(), 100);
    }

    #[test]
    fn finishes_after_hold() {
        let t0 = Instant::now();
        let mut s = SplashProgress::new(t0);
        assert!(!s.is_finished(t0 + Duration::from_secs(10)));
        s.advance(t0 + Duration::from_millis(2_500));
        assert!(!s.is_finished(t0 + Duration::from_millis(3_999)));
        assert!(s.is_finished(t0 + Duration::from_millis(4_000)));
    }

    #[test]
    fn dots_grow_per_tick_and_wrap() {
        let t0 = Instant::now();
        let mut s = SplashProgress::new(t0);
        let loading = i18n::tr("loading");
        assert_eq!(s.loading_label(), loading);
        s.advance(t0 + Duration::from_millis(120));
        assert_eq!(s.loading_label(), format!("{}{}", loading, "...".repeat(3)));
        // 50th tick wraps back to no dots
        s.advance(t0 + Duration::from_millis(2_000));
        assert_eq!(s.progress(), 100);
        assert_eq!(s.loading_label(), loading);
    }
}
