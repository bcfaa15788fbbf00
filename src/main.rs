mod app;
mod assistant;
mod playback;
mod prefs;
mod recorder;
mod timings;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent, ToggleAction};
use prefs::Theme;

fn main() {
    env_logger::init();
    log::info!("Echo Assistant starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.echo.assistant")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = Rc::new(RefCell::new(AppState::new(backend_tx)));

    apply_theme(state.borrow().prefs.theme);

    let dashboard = ui::dashboard::build_dashboard(app, "Starting...");

    // Wire up the listen/stop toggle button
    {
        let state_clone = state.clone();
        dashboard.listen_button.connect_clicked(move |_| {
            let action = state_clone.borrow().status.toggle_action();
            match action {
                ToggleAction::Start => app::start_listening(&state_clone),
                ToggleAction::Stop => app::stop_listening(&state_clone),
                ToggleAction::Ignore => {
                    log::info!(
                        "Ignoring toggle while status={:?}",
                        state_clone.borrow().status
                    );
                }
            }
        });
    }

    // Wire up the settings window and theme switch
    {
        let state_clone = state.clone();
        let dash_window = dashboard.window.clone();
        dashboard.settings_button.connect_clicked(move |_| {
            let state_inner = state_clone.clone();
            let current = state_inner.borrow().prefs.theme;
            ui::settings::show_settings_window(&dash_window, current, move |theme| {
                apply_theme(theme);
                let mut s = state_inner.borrow_mut();
                s.prefs.theme = theme;
                if let Err(e) = s.prefs.save() {
                    log::warn!("Failed to save preferences: {e}");
                }
            });
        });
    }

    // Store UI handles in state and show the window
    {
        let mut s = state.borrow_mut();
        s.dashboard = Some(dashboard);
    }
    state.borrow().dashboard.as_ref().unwrap().window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }

    // Pretend to load the models before going Ready
    app::begin_warmup(&state);
}

/// Re-theme the whole app.
fn apply_theme(theme: Theme) {
    let scheme = match theme {
        Theme::Dark => libadwaita::ColorScheme::ForceDark,
        Theme::Light => libadwaita::ColorScheme::ForceLight,
    };
    libadwaita::StyleManager::default().set_color_scheme(scheme);
}
