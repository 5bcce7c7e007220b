use crate::config::Config;
use crate::engine::{Evaluator, PercentPolicy};
use gtk::prelude::*;
use gtk::{Application, Box as GtkBox, Button, CheckButton, Entry, Label, SpinButton, Window};
use std::sync::{Arc, Mutex};

pub struct SettingsWindow;

impl SettingsWindow {
    pub fn open(app: &Application, config: Arc<Mutex<Config>>, evaluator: Arc<Mutex<Evaluator>>) {
        // Check if settings window already exists
        if let Some(existing_window) = app
            .windows()
            .iter()
            .find(|w| w.title().as_ref().map(|s| s.as_str()) == Some("Calculator Settings"))
        {
            existing_window.present();
            return;
        }

        let window = Window::builder()
            .application(app)
            .title("Calculator Settings")
            .default_width(420)
            .default_height(420)
            .resizable(true)
            .build();

        let main_box = GtkBox::builder()
            .orientation(gtk::Orientation::Vertical)
            .spacing(16)
            .margin_start(20)
            .margin_end(20)
            .margin_top(20)
            .margin_bottom(20)
            .build();

        // Theme Section
        let theme_label = Label::new(Some("<b>Theme</b>"));
        theme_label.set_use_markup(true);
        theme_label.set_halign(gtk::Align::Start);
        main_box.append(&theme_label);

        let bg_entry = labeled_entry(&main_box, "Background Color:");
        let text_entry = labeled_entry(&main_box, "Text Color:");
        let accent_entry = labeled_entry(&main_box, "Accent Color:");

        let font_box = GtkBox::builder()
            .orientation(gtk::Orientation::Horizontal)
            .spacing(10)
            .build();
        let font_label = Label::new(Some("Font Size:"));
        font_label.set_halign(gtk::Align::Start);
        let font_spin = SpinButton::with_range(8.0, 32.0, 1.0);
        font_box.append(&font_label);
        font_box.append(&font_spin);
        main_box.append(&font_box);

        // Calculator Section
        let calc_label = Label::new(Some("<b>Calculator</b>"));
        calc_label.set_use_markup(true);
        calc_label.set_halign(gtk::Align::Start);
        calc_label.set_margin_top(12);
        main_box.append(&calc_label);

        let percent_check =
            CheckButton::with_label("Percent key applies to the running total (iOS style)");
        main_box.append(&percent_check);

        {
            let config_guard = config.lock().unwrap();
            bg_entry.set_text(&config_guard.theme.background_color);
            text_entry.set_text(&config_guard.theme.text_color);
            accent_entry.set_text(&config_guard.theme.accent_color);
            font_spin.set_value(config_guard.theme.font_size as f64);
            percent_check
                .set_active(config_guard.calculator.percent_policy == PercentPolicy::PercentOfTotal);
        }

        // Buttons
        let button_box = GtkBox::builder()
            .orientation(gtk::Orientation::Horizontal)
            .spacing(10)
            .halign(gtk::Align::End)
            .margin_top(12)
            .build();

        let save_button = Button::with_label("Save");
        let cancel_button = Button::with_label("Cancel");

        let window_clone = window.clone();
        save_button.connect_clicked(move |_| {
            let mut config_guard = config.lock().unwrap();

            config_guard.theme.background_color = bg_entry.text().to_string();
            config_guard.theme.text_color = text_entry.text().to_string();
            config_guard.theme.accent_color = accent_entry.text().to_string();
            config_guard.theme.font_size = font_spin.value() as i32;

            config_guard.calculator.percent_policy = if percent_check.is_active() {
                PercentPolicy::PercentOfTotal
            } else {
                PercentPolicy::Simple
            };
            // The running evaluator picks the policy up immediately.
            evaluator
                .lock()
                .unwrap()
                .set_percent_policy(config_guard.calculator.percent_policy);

            if let Err(e) = config_guard.save() {
                eprintln!("Error saving config: {}", e);
            }

            window_clone.close();
        });

        let window_clone2 = window.clone();
        cancel_button.connect_clicked(move |_| {
            window_clone2.close();
        });

        button_box.append(&cancel_button);
        button_box.append(&save_button);
        main_box.append(&button_box);

        window.set_child(Some(&main_box));
        window.present();
    }
}

fn labeled_entry(parent: &GtkBox, text: &str) -> Entry {
    let row = GtkBox::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(10)
        .build();
    let label = Label::new(Some(text));
    label.set_halign(gtk::Align::Start);
    let entry = Entry::new();
    entry.set_hexpand(true);
    row.append(&label);
    row.append(&entry);
    parent.append(&row);
    entry
}
