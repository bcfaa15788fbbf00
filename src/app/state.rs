use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gtk4::glib;

use crate::prefs::Prefs;
use crate::timings::StageTimings;
use crate::ui::dashboard::{set_status_dot, DashboardWidgets};

/// Events sent from background tasks and timers to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    WarmupComplete,
    AudioLevel(f32),
    ChunkTick,
    TranscriptReady { text: String, elapsed: Duration },
    ResponseReady { text: String, elapsed: Duration },
    SpeechReady { wav: Vec<u8>, elapsed: Duration, total: Duration },
    PlaybackFinished,
    PipelineError(String),
}

/// Application status. A single enum instead of separate listening and
/// speaking flags, so the two can never be observed true together.
#[derive(Debug, Clone, PartialEq)]
pub enum AppStatus {
    Loading,
    Idle,
    Listening,
    Processing,
    Speaking,
    Error,
}

/// What the action button should do given the current status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToggleAction {
    Start,
    Stop,
    Ignore,
}

impl AppStatus {
    pub fn toggle_action(&self) -> ToggleAction {
        match self {
            AppStatus::Idle | AppStatus::Error => ToggleAction::Start,
            AppStatus::Listening => ToggleAction::Stop,
            AppStatus::Loading | AppStatus::Processing | AppStatus::Speaking => {
                ToggleAction::Ignore
            }
        }
    }
}

/// State spanning one start-to-ready pipeline run. Built at capture
/// start, filled by the chunk timer, then moved by value into the
/// sequencer and discarded after the run.
#[derive(Debug)]
pub struct Session {
    pub started: Instant,
    pub sample_rate: u32,
    /// Ordered capture chunks, one per drain tick.
    pub chunks: Vec<Vec<f32>>,
    /// How much of the shared sample buffer has been drained already.
    pub drained: usize,
}

impl Session {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            started: Instant::now(),
            sample_rate,
            chunks: Vec::new(),
            drained: 0,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub status: AppStatus,
    pub prefs: Prefs,
    pub timings: StageTimings,
    pub sample_buffer: Arc<Mutex<Vec<f32>>>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Capture state
    pub input_stream: Option<cpal::Stream>,
    pub session: Option<Session>,
    pub chunk_source: Option<glib::SourceId>,
    pub level_source: Option<glib::SourceId>,

    // UI handles
    pub dashboard: Option<DashboardWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let prefs = Prefs::load();
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");

        Self {
            status: AppStatus::Loading,
            prefs,
            timings: StageTimings::default(),
            sample_buffer: Arc::new(Mutex::new(Vec::new())),
            tokio_rt,
            backend_sender: sender,
            input_stream: None,
            session: None,
            chunk_source: None,
            level_source: None,
            dashboard: None,
        }
    }
}

/// Helper to update status, the dashboard label, and the indicator dot.
pub fn update_status(
    state: &std::rc::Rc<std::cell::RefCell<AppState>>,
    status: AppStatus,
    label_text: &str,
) {
    let mut s = state.borrow_mut();
    s.status = status;
    if let Some(ref dash) = s.dashboard {
        dash.status_label.set_text(label_text);
        set_status_dot(&dash.status_dot, &s.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_button_starts_only_from_idle_or_error() {
        assert_eq!(AppStatus::Idle.toggle_action(), ToggleAction::Start);
        assert_eq!(AppStatus::Error.toggle_action(), ToggleAction::Start);
        assert_eq!(AppStatus::Listening.toggle_action(), ToggleAction::Stop);
        // A run in flight means the button does nothing; no second
        // pipeline can overlap the first.
        assert_eq!(AppStatus::Loading.toggle_action(), ToggleAction::Ignore);
        assert_eq!(AppStatus::Processing.toggle_action(), ToggleAction::Ignore);
        assert_eq!(AppStatus::Speaking.toggle_action(), ToggleAction::Ignore);
    }

    #[test]
    fn fresh_session_is_empty() {
        let session = Session::new(16_000);
        assert_eq!(session.sample_count(), 0);
        assert_eq!(session.drained, 0);
        assert!(session.chunks.is_empty());
    }
}
