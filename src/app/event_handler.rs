use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use super::listening::drain_chunk;
use super::state::{update_status, AppState, AppStatus, BackendEvent};
use crate::timings::format_time;

/// Handle a backend event. This is the core state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::WarmupComplete => {
            log::info!("Models ready");
            if let Some(ref dash) = state.borrow().dashboard {
                dash.listen_button.set_sensitive(true);
            }
            update_status(state, AppStatus::Idle, "Ready");
        }
        BackendEvent::AudioLevel(level) => {
            let s = state.borrow();
            if s.status != AppStatus::Listening {
                return;
            }
            if let Some(ref dash) = s.dashboard {
                let mut levels = dash.audio_levels.borrow_mut();
                if levels.len() >= crate::ui::dashboard::NUM_BARS {
                    levels.pop_front();
                }
                levels.push_back(level);
                dash.waveform.queue_draw();
            }
        }
        BackendEvent::ChunkTick => {
            let mut s = state.borrow_mut();
            if s.status != AppStatus::Listening {
                return;
            }
            let buffer = s.sample_buffer.clone();
            if let Some(ref mut session) = s.session {
                drain_chunk(&buffer, session);
            }
            if let Some(ref dash) = s.dashboard {
                dash.transcript_label
                    .set_text(crate::assistant::interim_phrase());
            }
        }
        BackendEvent::TranscriptReady { text, elapsed } => {
            log::info!("Transcript: {text}");
            let mut s = state.borrow_mut();
            s.timings.stt = elapsed;
            if let Some(ref dash) = s.dashboard {
                dash.transcript_label.set_text(&text);
                dash.stt_label.set_text(&format_time(elapsed));
            }
        }
        BackendEvent::ResponseReady { text, elapsed } => {
            log::info!("Response: {text}");
            let mut s = state.borrow_mut();
            s.timings.api = elapsed;
            if let Some(ref dash) = s.dashboard {
                dash.response_label.set_text(&text);
                dash.api_label.set_text(&format_time(elapsed));
            }
        }
        BackendEvent::SpeechReady { wav, elapsed, total } => {
            {
                let mut s = state.borrow_mut();
                s.timings.tts = elapsed;
                s.timings.total = total;
                if let Some(ref dash) = s.dashboard {
                    dash.tts_label.set_text(&format_time(elapsed));
                    dash.total_label.set_text(&format_time(total));
                }
                log::info!(
                    "Run complete: stt={} api={} tts={} total={}",
                    format_time(s.timings.stt),
                    format_time(s.timings.api),
                    format_time(s.timings.tts),
                    format_time(s.timings.total)
                );
            }
            update_status(state, AppStatus::Speaking, "Speaking...");
            let sender = state.borrow().backend_sender.clone();
            crate::playback::play_wav(wav, sender);
        }
        BackendEvent::PlaybackFinished => {
            // Only the speaking state resolves to Ready here; an error
            // arriving mid-playback stays visible.
            let speaking = state.borrow().status == AppStatus::Speaking;
            if speaking {
                update_status(state, AppStatus::Idle, "Ready");
            }
        }
        BackendEvent::PipelineError(err) => {
            log::error!("Processing error: {err}");
            state.borrow_mut().session = None;
            update_status(state, AppStatus::Error, &format!("Error: {err}"));
        }
    }
}
