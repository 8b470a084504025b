pub mod app;
pub mod fonts;
pub mod launcher;
pub mod settings;
pub mod splash;

pub use launcher::RootApp;
