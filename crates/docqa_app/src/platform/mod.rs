mod app;
mod commands;
mod effects;
mod logging;
mod render;
mod settings;

pub use app::run_app;
