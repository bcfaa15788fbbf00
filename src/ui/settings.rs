use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::prefs::Theme;

/// Show the modal settings window. `on_theme_change` fires on the GTK
/// main thread whenever the theme switch flips.
pub fn show_settings_window<F>(
    parent: &impl IsA<gtk4::Window>,
    current: Theme,
    on_theme_change: F,
) where
    F: Fn(Theme) + 'static,
{
    let window = libadwaita::Window::builder()
        .title("Settings")
        .default_width(380)
        .default_height(260)
        .transient_for(parent)
        .modal(true)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let back_btn = gtk4::Button::from_icon_name("go-previous-symbolic");
    back_btn.set_tooltip_text(Some("Back"));
    let win_for_back = window.clone();
    back_btn.connect_clicked(move |_| {
        win_for_back.close();
    });
    header.pack_start(&back_btn);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    let appearance_group = libadwaita::PreferencesGroup::new();
    appearance_group.set_title("Appearance");

    let theme_row = libadwaita::SwitchRow::builder()
        .title("Light Theme")
        .subtitle("Takes effect immediately and persists")
        .active(current == Theme::Light)
        .build();
    theme_row.connect_active_notify(move |row| {
        let theme = if row.is_active() {
            Theme::Light
        } else {
            Theme::Dark
        };
        on_theme_change(theme);
    });
    appearance_group.add(&theme_row);
    content.append(&appearance_group);

    toolbar_view.set_content(Some(&content));
    window.set_content(Some(&toolbar_view));

    // Escape dismisses, the desktop stand-in for click-outside-to-close.
    let key_controller = gtk4::EventControllerKey::new();
    let win_for_esc = window.clone();
    key_controller.connect_key_pressed(move |_, keyval, _, _| {
        if keyval == gtk4::gdk::Key::Escape {
            win_for_esc.close();
            return gtk4::glib::Propagation::Stop;
        }
        gtk4::glib::Propagation::Proceed
    });
    window.add_controller(key_controller);

    window.present();
}
