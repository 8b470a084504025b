#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]
// On Windows hide console in release builds. Debug keeps console for diagnostics.

use anyhow::{Context, Result};
use eframe::NativeOptions;
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, OnceLock};

use gtranslator::gui::app::TranslatorApp;
use gtranslator::gui::fonts::FontCatalog;
use gtranslator::gui::splash::SPLASH_SIZE;
use gtranslator::gui::RootApp;
use gtranslator::translate::GoogleTranslator;
use gtranslator::utils::app_config_dir;
use gtranslator::SettingsStore;

const APP_NAME: &str = "G-Translator";

static INSTANCE_LOCK: OnceLock<std::fs::File> = OnceLock::new();

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    // Default filter suppresses noisy WGPU/eframe warnings (like surface timeouts)
    // Users can override fully via RUST_LOG if desired.
    let default_directives = "info,egui=error,epaint=error,eframe=error,egui_wgpu=error,wgpu=error,wgpu_core=error,wgpu_hal=error,naga=error,reqwest=warn,hyper_util=warn";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn acquire_single_instance_lock() -> Result<AcquireResult, io::Error> {
    // Use a deterministic, writable per-user dir to place the lock file.
    let dir = app_config_dir();
    std::fs::create_dir_all(&dir)?;
    let lock_path = dir.join("instance.lock");
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)?;
    tracing::debug!("[single-instance] lock file: {}", lock_path.display());

    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = INSTANCE_LOCK.set(file);
            Ok(AcquireResult::Acquired)
        }
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(AcquireResult::AlreadyRunning),
        Err(err) => Err(err),
    }
}

enum AcquireResult {
    Acquired,
    AlreadyRunning,
}

fn main() -> Result<()> {
    // macOS: always capture stdout/stderr to persistent log so Finder launches are diagnosable
    #[cfg(target_os = "macos")]
    {
        init_persistent_logging_macos();
    }
    init_logging();
    tracing::info!("{} version {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    match acquire_single_instance_lock() {
        Ok(AcquireResult::Acquired) => {}
        Ok(AcquireResult::AlreadyRunning) => {
            tracing::warn!("{} is already running.", APP_NAME);
            return Ok(());
        }
        Err(e) => {
            // On error, continue without exclusivity to avoid silent exit
            tracing::warn!("failed to initialize single instance: {} (continuing)", e);
        }
    }

    let store = SettingsStore::open_default();
    let translator = GoogleTranslator::new().context("failed to create HTTP client")?;
    let fonts = FontCatalog::scan();

    // Starts as the splash screen; the launcher resizes it into the main window
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_app_id(APP_NAME) // Wayland app_id
            .with_title(APP_NAME)
            .with_inner_size(egui::vec2(SPLASH_SIZE[0], SPLASH_SIZE[1]))
            .with_decorations(false)
            .with_resizable(false)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
            .with_transparent(false)
            .with_visible(true),
        renderer: eframe::Renderer::Wgpu,
        // Some Linux drivers/compositors time out waiting for vsync;
        // disable it there by default. Override via GTRANSLATOR_VSYNC=0/1
        vsync: {
            let env = std::env::var("GTRANSLATOR_VSYNC").ok();
            if let Some(v) = env.as_deref() {
                matches!(v, "1" | "true" | "TRUE" | "on" | "ON")
            } else {
                #[cfg(target_os = "linux")]
                {
                    false
                }
                #[cfg(not(target_os = "linux"))]
                {
                    true
                }
            }
        },
        centered: true,
        ..Default::default()
    };
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let app = TranslatorApp::new(store, Arc::new(translator), fonts);
            app.install_fonts(&cc.egui_ctx);
            Ok(Box::new(RootApp::new(app)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run UI: {}", e))?;

    tracing::info!("{} exited", APP_NAME);
    Ok(())
}

#[cfg(target_os = "macos")]
fn init_persistent_logging_macos() {
    use std::fs::create_dir_all;
    use std::io::Write;
    use std::os::fd::AsRawFd;

    let home = std::env::var("HOME").unwrap_or_default();
    if home.is_empty() {
        return;
    }
    let log_dir = format!("{}/Library/Logs/{}", home, APP_NAME);
    let _ = create_dir_all(&log_dir);
    let log_path = format!("{}/{}.log", log_dir, APP_NAME);

    // Append mode so multiple runs accumulate
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
        let _ = writeln!(
            &file,
            "\n===== Launch {} =====",
            chrono::Local::now().to_rfc3339()
        );
        // Duplicate file descriptor onto stdout(1) and stderr(2)
        unsafe {
            let fd = file.as_raw_fd();
            let _ = libc::dup2(fd, 1);
            let _ = libc::dup2(fd, 2);
        }
        eprintln!("[{}] persistent logging at: {}", APP_NAME, log_path);
    }
}
