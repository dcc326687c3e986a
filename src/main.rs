#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use canvas_paint::{EditorConfig, PaintApp};

fn main() -> eframe::Result {
    // An optional JSON config path; RUST_LOG still wins over its log level.
    let config = std::env::args()
        .nth(1)
        .and_then(|path| match EditorConfig::load(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("Ignoring config {path}: {err}");
                None
            }
        });
    let log_level = config
        .as_ref()
        .map_or_else(|| EditorConfig::default().log_level, |c| c.log_level.clone());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([400.0, 300.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "canvas_paint",
        native_options,
        Box::new(move |cc| Ok(Box::new(PaintApp::new(cc, config)))),
    )
}
