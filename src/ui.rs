use crate::config::{Config, Mode};
use crate::conversions::Conversion;
use crate::engine::{Evaluator, Key, Notice, Operator};
use crate::scientific::{Constant, SciFunction};
use crate::settings::SettingsWindow;
use gtk::gdk;
use gtk::glib;
use gtk::prelude::*;
use gtk::{
    Application, Box as GtkBox, Button, EventControllerKey, Grid, Label, ListBox, ListBoxRow,
    ScrolledWindow, Separator, Stack, StackSwitcher, Window,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A second press of AC within this window clears the history too.
const CLEAR_ALL_WINDOW: Duration = Duration::from_millis(600);

const BASIC_ROWS: &[&[&str]] = &[
    &["AC", "+/−", "%", "÷"],
    &["7", "8", "9", "×"],
    &["4", "5", "6", "−"],
    &["1", "2", "3", "+"],
    &["←", "0", ".", "="],
];

const SCIENTIFIC_ROWS: &[&[&str]] = &[
    &["sin", "cos", "tan", "log"],
    &["ln", "√", "x²", "("],
    &["π", "e"],
    &["AC", "+/−", "%", "÷"],
    &["7", "8", "9", "×"],
    &["4", "5", "6", "−"],
    &["1", "2", "3", "+"],
    &["←", "0", ".", "="],
];

const CONVERSION_ROWS: &[&[&str]] = &[
    &["°C→°F", "km→mi"],
    &["kg→lb", "m→ft"],
    &["AC", "+/−", "%", "÷"],
    &["7", "8", "9", "×"],
    &["4", "5", "6", "−"],
    &["1", "2", "3", "+"],
    &["←", "0", ".", "="],
];

/// Maps a button label to its canonical token. `None` for labels the
/// evaluator does not accept (the parenthesis button is handled as a
/// notice by the click handler).
pub fn key_for_label(label: &str) -> Option<Key> {
    let mut chars = label.chars();
    if let (Some(ch @ '0'..='9'), None) = (chars.next(), chars.next()) {
        return Some(Key::Digit(ch as u8 - b'0'));
    }
    match label {
        "." => Some(Key::DecimalPoint),
        "+" => Some(Key::Operator(Operator::Add)),
        "−" => Some(Key::Operator(Operator::Subtract)),
        "×" => Some(Key::Operator(Operator::Multiply)),
        "÷" => Some(Key::Operator(Operator::Divide)),
        "=" => Some(Key::Equals),
        "AC" | "C" => Some(Key::Clear),
        "←" => Some(Key::Backspace),
        "+/−" => Some(Key::ToggleSign),
        "%" => Some(Key::Percent),
        "sin" => Some(Key::Function(SciFunction::Sin)),
        "cos" => Some(Key::Function(SciFunction::Cos)),
        "tan" => Some(Key::Function(SciFunction::Tan)),
        "log" => Some(Key::Function(SciFunction::Log)),
        "ln" => Some(Key::Function(SciFunction::Ln)),
        "√" => Some(Key::Function(SciFunction::Sqrt)),
        "x²" => Some(Key::Function(SciFunction::Square)),
        "π" => Some(Key::Constant(Constant::Pi)),
        "e" => Some(Key::Constant(Constant::E)),
        "°C→°F" => Some(Key::Convert(Conversion::CelsiusToFahrenheit)),
        "km→mi" => Some(Key::Convert(Conversion::KmToMiles)),
        "kg→lb" => Some(Key::Convert(Conversion::KgToPounds)),
        "m→ft" => Some(Key::Convert(Conversion::MetersToFeet)),
        _ => None,
    }
}

/// Keyboard mapping. The ASCII `-`, `*`, `/` arrive here and become
/// the same tokens as the `−`, `×`, `÷` buttons.
fn key_for_keyval(keyval: gdk::Key) -> Option<Key> {
    if let Some(ch) = keyval.to_unicode() {
        match ch {
            '0'..='9' => return Some(Key::Digit(ch as u8 - b'0')),
            '.' => return Some(Key::DecimalPoint),
            '+' => return Some(Key::Operator(Operator::Add)),
            '-' => return Some(Key::Operator(Operator::Subtract)),
            '*' => return Some(Key::Operator(Operator::Multiply)),
            '/' => return Some(Key::Operator(Operator::Divide)),
            '%' => return Some(Key::Percent),
            '=' => return Some(Key::Equals),
            _ => {}
        }
    }
    match keyval {
        gdk::Key::Return | gdk::Key::KP_Enter => Some(Key::Equals),
        gdk::Key::Escape => Some(Key::Clear),
        gdk::Key::BackSpace => Some(Key::Backspace),
        _ => None,
    }
}

pub fn build_ui(app: &Application, config: Config) {
    let evaluator = Arc::new(Mutex::new(Evaluator::new(config.calculator.percent_policy)));
    let config_arc = Arc::new(Mutex::new(config.clone()));
    let app_clone = app.clone();

    let window = Window::builder()
        .application(app)
        .title("Culichi Calculator")
        .default_width(config.theme.width + 240) // room for the history sidebar
        .default_height(config.theme.height)
        .resizable(false)
        .build();

    // Display screen. Doubles as the surface for transient notices.
    let screen = Label::new(Some("0"));
    screen.set_xalign(1.0);
    screen.add_css_class("screen");

    // Pending notice revert; a new notice replaces the old timeout.
    let pending_revert: Rc<RefCell<Option<glib::SourceId>>> = Rc::new(RefCell::new(None));
    // Timestamp of the last AC press, for the clear-all gesture.
    let last_clear: Rc<RefCell<Option<Instant>>> = Rc::new(RefCell::new(None));

    let history_list = ListBox::new();
    history_list.add_css_class("history-list");

    // Single dispatch point for every canonical token.
    let press_key: Rc<dyn Fn(Key)> = {
        let evaluator = evaluator.clone();
        let screen = screen.clone();
        let pending_revert = pending_revert.clone();
        let last_clear = last_clear.clone();
        let history_list = history_list.clone();
        Rc::new(move |key: Key| {
            let key = promote_clear(key, &last_clear);
            let result = evaluator.lock().unwrap().press(key);
            match result {
                Ok(update) => {
                    if let Some(id) = pending_revert.borrow_mut().take() {
                        id.remove();
                    }
                    screen.remove_css_class("notice");
                    screen.set_text(&update.display);
                    if let Some(notice) = update.notice {
                        show_notice(&screen, &evaluator, &pending_revert, &notice);
                    }
                    if matches!(key, Key::Equals | Key::ClearAll) {
                        refresh_history(&history_list, &evaluator);
                    }
                }
                Err(err) => {
                    // Blocked operation: state is untouched, the message
                    // replaces the display until the revert fires.
                    show_notice(&screen, &evaluator, &pending_revert, &Notice::new(err.to_string()));
                }
            }
        })
    };

    // Button labels go through the same dispatch; the parenthesis
    // button only ever produces a notice.
    let press_label: Rc<dyn Fn(&str)> = {
        let press_key = press_key.clone();
        let evaluator = evaluator.clone();
        let screen = screen.clone();
        let pending_revert = pending_revert.clone();
        Rc::new(move |label: &str| {
            if label == "(" {
                let notice = Notice::new("Parentheses are not supported".to_string());
                show_notice(&screen, &evaluator, &pending_revert, &notice);
                return;
            }
            if let Some(key) = key_for_label(label) {
                press_key(key);
            }
        })
    };

    // One keypad per mode, stacked.
    let stack = Stack::new();
    stack.add_titled(
        &build_keypad(BASIC_ROWS, press_label.clone()),
        Some(Mode::Basic.id()),
        Mode::Basic.title(),
    );
    stack.add_titled(
        &build_keypad(SCIENTIFIC_ROWS, press_label.clone()),
        Some(Mode::Scientific.id()),
        Mode::Scientific.title(),
    );
    stack.add_titled(
        &build_keypad(CONVERSION_ROWS, press_label.clone()),
        Some(Mode::Conversions.id()),
        Mode::Conversions.title(),
    );
    stack.set_visible_child_name(config.calculator.mode.id());

    // Persist the mode on every switch; failure is non-fatal.
    let config_clone = config_arc.clone();
    stack.connect_visible_child_name_notify(move |stack| {
        let Some(name) = stack.visible_child_name() else {
            return;
        };
        let Some(mode) = Mode::from_id(name.as_str()) else {
            return;
        };
        let mut config = config_clone.lock().unwrap();
        if config.calculator.mode != mode {
            config.calculator.mode = mode;
            if let Err(e) = config.save() {
                eprintln!("Error saving config: {}", e);
            }
        }
    });

    let switcher = StackSwitcher::new();
    switcher.set_stack(Some(&stack));
    switcher.set_halign(gtk::Align::Center);

    let settings_button = Button::with_label("⚙");
    settings_button.add_css_class("settings-button");
    let config_clone = config_arc.clone();
    let evaluator_clone = evaluator.clone();
    settings_button.connect_clicked(move |_| {
        SettingsWindow::open(&app_clone, config_clone.clone(), evaluator_clone.clone());
    });

    let top_bar = GtkBox::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(8)
        .build();
    top_bar.append(&switcher);
    switcher.set_hexpand(true);
    top_bar.append(&settings_button);

    let calc_box = GtkBox::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(10)
        .margin_start(12)
        .margin_end(12)
        .margin_top(12)
        .margin_bottom(12)
        .build();
    calc_box.append(&top_bar);
    calc_box.append(&screen);
    calc_box.append(&stack);
    stack.set_vexpand(true);

    // History sidebar: last 10 calculations, per-row delete,
    // edit-last-operand, and a bulk clear.
    let history_title = Label::new(Some("History"));
    history_title.set_xalign(0.0);
    history_title.add_css_class("history-title");

    let edit_button = Button::with_label("Edit");
    let clear_button = Button::with_label("Clear");

    let history_buttons = GtkBox::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(6)
        .build();
    history_buttons.append(&edit_button);
    history_buttons.append(&clear_button);

    let history_scroll = ScrolledWindow::builder()
        .child(&history_list)
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vexpand(true)
        .build();

    let history_box = GtkBox::builder()
        .orientation(gtk::Orientation::Vertical)
        .spacing(8)
        .margin_start(12)
        .margin_end(12)
        .margin_top(12)
        .margin_bottom(12)
        .width_request(200)
        .build();
    history_box.append(&history_title);
    history_box.append(&history_scroll);
    history_box.append(&history_buttons);

    // Edit loads the most recent right-hand operand back into the entry.
    let evaluator_clone = evaluator.clone();
    let screen_clone = screen.clone();
    let pending_clone = pending_revert.clone();
    edit_button.connect_clicked(move |_| {
        let operand = {
            let calc = evaluator_clone.lock().unwrap();
            calc.history().last_operand().map(str::to_string)
        };
        let notice = match operand {
            Some(operand) => {
                let mut calc = evaluator_clone.lock().unwrap();
                match calc.resume_operand(&operand) {
                    Ok(()) => {
                        screen_clone.set_text(&calc.display());
                        Notice::new("Last operand loaded for editing".to_string())
                    }
                    Err(err) => Notice::new(err.to_string()),
                }
            }
            None => Notice::new("No history to edit".to_string()),
        };
        show_notice(&screen_clone, &evaluator_clone, &pending_clone, &notice);
    });

    // Clear drops the history log only; the current chain survives.
    let evaluator_clone = evaluator.clone();
    let screen_clone = screen.clone();
    let pending_clone = pending_revert.clone();
    let history_list_clone = history_list.clone();
    clear_button.connect_clicked(move |_| {
        let notice = {
            let mut calc = evaluator_clone.lock().unwrap();
            if calc.history().is_empty() {
                Notice::new("No history to clear".to_string())
            } else {
                calc.history_mut().clear();
                Notice::new("History cleared".to_string())
            }
        };
        refresh_history(&history_list_clone, &evaluator_clone);
        show_notice(&screen_clone, &evaluator_clone, &pending_clone, &notice);
    });

    // Keyboard input maps onto the same token dispatch as the buttons.
    let key_controller = EventControllerKey::new();
    let press_key_clone = press_key.clone();
    key_controller.connect_key_pressed(move |_, keyval, _, _| {
        if let Some(key) = key_for_keyval(keyval) {
            press_key_clone(key);
            glib::Propagation::Stop
        } else {
            glib::Propagation::Proceed
        }
    });
    window.add_controller(key_controller);

    let css = format!(
        r#"
        window {{
            background-color: {bg};
        }}

        .screen {{
            color: {text};
            font-size: 44px;
            font-weight: 300;
            padding: 18px 6px;
        }}

        .screen.notice {{
            color: {accent};
            font-size: 20px;
        }}

        .calc-button {{
            background-color: rgba(40, 40, 40, 0.9);
            color: {text};
            border: none;
            border-radius: 8px;
            font-size: {font}pt;
            padding: 10px;
        }}

        .calc-button:hover {{
            background-color: rgba(60, 60, 60, 0.9);
        }}

        .calc-button.operator {{
            background-color: {accent};
            color: #ffffff;
        }}

        .history-title {{
            color: {text};
            font-weight: 600;
        }}

        .history-list {{
            background-color: transparent;
        }}

        .history-list row {{
            padding: 4px;
        }}

        .calc-expression {{
            color: rgba(255, 255, 255, 0.6);
            font-size: 10pt;
        }}

        .calc-result {{
            color: {text};
            font-size: 12pt;
        }}
        "#,
        bg = config.theme.background_color,
        text = config.theme.text_color,
        accent = config.theme.accent_color,
        font = config.theme.font_size,
    );

    let provider = gtk::CssProvider::new();
    provider.load_from_data(&css);
    gtk::style_context_add_provider_for_display(
        &gdk::Display::default().unwrap(),
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );

    let root = GtkBox::builder()
        .orientation(gtk::Orientation::Horizontal)
        .spacing(0)
        .build();
    root.append(&calc_box);
    calc_box.set_hexpand(true);
    root.append(&Separator::new(gtk::Orientation::Vertical));
    root.append(&history_box);

    window.set_child(Some(&root));
    window.present();
}

fn build_keypad(rows: &[&[&str]], on_press: Rc<dyn Fn(&str)>) -> Grid {
    let grid = Grid::new();
    grid.set_row_spacing(6);
    grid.set_column_spacing(6);
    grid.set_row_homogeneous(true);
    grid.set_column_homogeneous(true);
    for (r, row) in rows.iter().enumerate() {
        // Two-label rows (the conversion pairs) span double width.
        let span = (4 / row.len().max(1)).max(1) as i32;
        for (c, label) in row.iter().enumerate() {
            let button = Button::with_label(label);
            button.add_css_class("calc-button");
            if matches!(key_for_label(label), Some(Key::Operator(_) | Key::Equals)) {
                button.add_css_class("operator");
            }
            let on_press = on_press.clone();
            let label = label.to_string();
            button.connect_clicked(move |_| on_press(&label));
            grid.attach(&button, c as i32 * span, r as i32, span, 1);
        }
    }
    grid
}

// AC is one physical button but two commands: a quick second press
// becomes clear-all. The evaluator itself holds no timer state.
fn promote_clear(key: Key, last_clear: &Rc<RefCell<Option<Instant>>>) -> Key {
    if key != Key::Clear {
        return key;
    }
    let mut last = last_clear.borrow_mut();
    let now = Instant::now();
    let promoted = matches!(*last, Some(prev) if now.duration_since(prev) <= CLEAR_ALL_WINDOW);
    *last = if promoted { None } else { Some(now) };
    if promoted {
        Key::ClearAll
    } else {
        Key::Clear
    }
}

fn show_notice(
    screen: &Label,
    evaluator: &Arc<Mutex<Evaluator>>,
    pending_revert: &Rc<RefCell<Option<glib::SourceId>>>,
    notice: &Notice,
) {
    if let Some(id) = pending_revert.borrow_mut().take() {
        id.remove();
    }
    screen.add_css_class("notice");
    screen.set_text(&notice.text);

    let screen = screen.clone();
    let evaluator = evaluator.clone();
    let pending = pending_revert.clone();
    let id = glib::timeout_add_local_once(notice.duration, move || {
        pending.borrow_mut().take();
        screen.remove_css_class("notice");
        let display = evaluator.lock().unwrap().display();
        screen.set_text(&display);
    });
    *pending_revert.borrow_mut() = Some(id);
}

fn refresh_history(list: &ListBox, evaluator: &Arc<Mutex<Evaluator>>) {
    while let Some(row) = list.row_at_index(0) {
        list.remove(&row);
    }

    let (entries, offset) = {
        let calc = evaluator.lock().unwrap();
        (calc.history().recent().to_vec(), calc.history().recent_offset())
    };

    for (i, entry) in entries.iter().enumerate() {
        let row = ListBoxRow::new();
        row.set_activatable(false);

        let row_box = GtkBox::builder()
            .orientation(gtk::Orientation::Horizontal)
            .spacing(8)
            .build();

        let text_box = GtkBox::builder()
            .orientation(gtk::Orientation::Vertical)
            .spacing(1)
            .hexpand(true)
            .build();

        let expr_label = Label::new(Some(&entry.expression()));
        expr_label.set_xalign(0.0);
        expr_label.add_css_class("calc-expression");

        let result_label = Label::new(Some(&entry.result));
        result_label.set_xalign(0.0);
        result_label.add_css_class("calc-result");

        text_box.append(&expr_label);
        text_box.append(&result_label);

        let delete = Button::builder().label("✕").has_frame(false).build();
        let index = offset + i;
        let list_clone = list.clone();
        let evaluator_clone = evaluator.clone();
        delete.connect_clicked(move |_| {
            evaluator_clone.lock().unwrap().history_mut().remove(index);
            refresh_history(&list_clone, &evaluator_clone);
        });

        row_box.append(&text_box);
        row_box.append(&delete);
        row.set_child(Some(&row_box));
        list.append(&row);
    }
}
