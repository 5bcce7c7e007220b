mod config;
mod conversions;
mod engine;
mod history;
mod scientific;
mod settings;
mod ui;

use gtk::prelude::*;
use gtk::{gio, glib, Application};

const APP_ID: &str = "com.culichi.calculator";

fn main() -> glib::ExitCode {
    // Load persisted preferences; any failure falls back to defaults
    let config = config::Config::load().unwrap_or_default();

    // Create application - NON_UNIQUE for reliable startup
    let app = Application::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::NON_UNIQUE)
        .build();

    app.connect_activate(move |app| {
        // Check if window already exists
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }

        ui::build_ui(app, config.clone());
    });

    // Run the application
    app.run()
}
