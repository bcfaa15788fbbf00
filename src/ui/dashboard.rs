use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppStatus;

/// Bars in the waveform visualizer.
pub const NUM_BARS: usize = 24;

const STATUS_CLASSES: &[&str] = &[
    "status-loading",
    "status-ready",
    "status-listening",
    "status-processing",
    "status-speaking",
    "status-error",
];

/// Handles returned from building the main window.
pub struct DashboardWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub status_dot: gtk4::Label,
    pub status_label: gtk4::Label,
    pub listen_button: gtk4::Button,
    pub settings_button: gtk4::Button,
    pub transcript_label: gtk4::Label,
    pub response_label: gtk4::Label,
    pub stt_label: gtk4::Label,
    pub api_label: gtk4::Label,
    pub tts_label: gtk4::Label,
    pub total_label: gtk4::Label,
    pub waveform: gtk4::DrawingArea,
    pub audio_levels: Rc<RefCell<VecDeque<f32>>>,
}

fn status_css_token(status: &AppStatus) -> &'static str {
    match status {
        AppStatus::Loading => "status-loading",
        AppStatus::Idle => "status-ready",
        AppStatus::Listening => "status-listening",
        AppStatus::Processing => "status-processing",
        AppStatus::Speaking => "status-speaking",
        AppStatus::Error => "status-error",
    }
}

/// Settle every waveform bar back to baseline, as when capture stops.
pub fn reset_levels(levels: &mut VecDeque<f32>) {
    for level in levels.iter_mut() {
        *level = 0.0;
    }
}

/// Swap the indicator dot's color class to match the status.
pub fn set_status_dot(dot: &gtk4::Label, status: &AppStatus) {
    for class in STATUS_CLASSES {
        dot.remove_css_class(class);
    }
    dot.add_css_class(status_css_token(status));
}

/// Build the main window.
pub fn build_dashboard(
    app: &libadwaita::Application,
    initial_status: &str,
) -> DashboardWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Echo Assistant")
        .default_width(460)
        .default_height(620)
        .build();

    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .status-dot {
            font-size: 15px;
        }
        .status-loading { color: #9a9996; }
        .status-ready { color: #2ec27e; }
        .status-listening { color: #00b4d8; }
        .status-processing { color: #f5c211; }
        .status-speaking { color: #c061cb; }
        .status-error { color: #ff3b30; }
        .pane-text {
            font-size: 13px;
        }
        "#,
    );
    gtk4::style_context_add_provider_for_display(
        &gtk4::gdk::Display::default().unwrap(),
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let settings_button = gtk4::Button::from_icon_name("emblem-system-symbolic");
    settings_button.set_tooltip_text(Some("Settings"));
    header.pack_end(&settings_button);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Status group ---
    let status_group = libadwaita::PreferencesGroup::new();
    status_group.set_title("Status");

    let status_row = libadwaita::ActionRow::builder().title("Assistant").build();
    let status_dot = gtk4::Label::new(Some("\u{25CF}"));
    status_dot.add_css_class("status-dot");
    status_dot.add_css_class("status-loading");
    let status_label = gtk4::Label::new(Some(initial_status));
    status_label.add_css_class("dim-label");
    status_row.add_suffix(&status_label);
    status_row.add_suffix(&status_dot);
    status_group.add(&status_row);

    content.append(&status_group);

    // --- Waveform + action button ---
    let audio_levels: Rc<RefCell<VecDeque<f32>>> =
        Rc::new(RefCell::new(VecDeque::from(vec![0.0; NUM_BARS])));
    let waveform = gtk4::DrawingArea::new();
    waveform.set_content_width(((3 + 2) * NUM_BARS) as i32);
    waveform.set_content_height(40);
    waveform.set_halign(gtk4::Align::Center);
    waveform.set_margin_top(16);

    let levels_for_draw = audio_levels.clone();
    waveform.set_draw_func(move |_area, cr, width, height| {
        draw_waveform(cr, width, height, &levels_for_draw.borrow());
    });
    content.append(&waveform);

    let listen_button = gtk4::Button::builder()
        .label("Start Listening")
        .halign(gtk4::Align::Center)
        .margin_top(12)
        .margin_bottom(4)
        .sensitive(false)
        .build();
    listen_button.add_css_class("suggested-action");
    listen_button.add_css_class("pill");
    content.append(&listen_button);

    // --- Transcript group ---
    let transcript_group = libadwaita::PreferencesGroup::new();
    transcript_group.set_title("Transcript");
    transcript_group.set_margin_top(12);
    let (transcript_row, transcript_label) = build_text_pane("Say something…");
    transcript_group.add(&transcript_row);
    content.append(&transcript_group);

    // --- Response group ---
    let response_group = libadwaita::PreferencesGroup::new();
    response_group.set_title("Response");
    response_group.set_margin_top(12);
    let (response_row, response_label) = build_text_pane("Responses appear here.");
    response_group.add(&response_row);
    content.append(&response_group);

    // --- Timing metrics group ---
    let metrics_group = libadwaita::PreferencesGroup::new();
    metrics_group.set_title("Timings");
    metrics_group.set_margin_top(12);

    let (stt_row, stt_label) = build_metric_row("Speech to Text");
    let (api_row, api_label) = build_metric_row("Response");
    let (tts_row, tts_label) = build_metric_row("Synthesis");
    let (total_row, total_label) = build_metric_row("Total");
    metrics_group.add(&stt_row);
    metrics_group.add(&api_row);
    metrics_group.add(&tts_row);
    metrics_group.add(&total_row);
    content.append(&metrics_group);

    // Assemble
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    DashboardWidgets {
        window,
        status_dot,
        status_label,
        listen_button,
        settings_button,
        transcript_label,
        response_label,
        stt_label,
        api_label,
        tts_label,
        total_label,
        waveform,
        audio_levels,
    }
}

/// A row holding a wrapped text label for the transcript/response panes.
fn build_text_pane(placeholder: &str) -> (libadwaita::ActionRow, gtk4::Label) {
    let row = libadwaita::ActionRow::new();
    let label = gtk4::Label::new(Some(placeholder));
    label.set_wrap(true);
    label.set_xalign(0.0);
    label.set_margin_top(8);
    label.set_margin_bottom(8);
    label.set_margin_start(8);
    label.set_margin_end(8);
    label.add_css_class("pane-text");
    row.set_child(Some(&label));
    (row, label)
}

/// A metric row with a dim duration suffix, initially a placeholder dash.
fn build_metric_row(title: &str) -> (libadwaita::ActionRow, gtk4::Label) {
    let row = libadwaita::ActionRow::builder().title(title).build();
    let label = gtk4::Label::new(Some("--"));
    label.add_css_class("dim-label");
    row.add_suffix(&label);
    (row, label)
}

fn draw_waveform(
    cr: &gtk4::cairo::Context,
    width: i32,
    height: i32,
    levels: &VecDeque<f32>,
) {
    let h = height as f64;
    let bar_w = 3.0;
    let gap = 2.0;
    let total_w = (bar_w + gap) * NUM_BARS as f64 - gap;
    let x_offset = (width as f64 - total_w) / 2.0;

    for (i, &level) in levels.iter().enumerate() {
        let clamped = (level as f64).clamp(0.0, 1.0);
        let bar_h = (2.0 + clamped * (h - 4.0)).max(2.0);
        let x = x_offset + i as f64 * (bar_w + gap);
        let y = (h - bar_h) / 2.0;
        let alpha = 0.35 + 0.65 * clamped;
        cr.set_source_rgba(0.0, 0.71, 0.85, alpha);
        let _ = cr.rectangle(x, y, bar_w, bar_h);
        let _ = cr.fill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_returns_every_bar_to_baseline() {
        let mut levels: VecDeque<f32> =
            (0..NUM_BARS).map(|i| i as f32 / NUM_BARS as f32).collect();
        reset_levels(&mut levels);
        assert_eq!(levels.len(), NUM_BARS);
        assert!(levels.iter().all(|&level| level == 0.0));
    }
}
