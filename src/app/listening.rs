use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gtk4::glib;
use gtk4::prelude::*;

use super::pipeline::dispatch_pipeline;
use super::state::{update_status, AppState, AppStatus, BackendEvent, Session};

/// Capture chunks are drained from the sample buffer on this cadence.
const CHUNK_INTERVAL: Duration = Duration::from_millis(250);
/// Waveform refresh cadence.
const LEVEL_INTERVAL: Duration = Duration::from_millis(100);

/// Start capturing microphone audio. A device failure surfaces as the
/// Error status and nothing downstream runs.
pub fn start_listening(state: &Rc<RefCell<AppState>>) {
    log::info!("Starting capture");

    {
        let s = state.borrow();
        s.sample_buffer.lock().unwrap().clear();
    }

    let buffer = state.borrow().sample_buffer.clone();
    match crate::recorder::start_capture(buffer) {
        Ok((stream, sample_rate)) => {
            let mut s = state.borrow_mut();
            s.input_stream = Some(stream);
            s.session = Some(Session::new(sample_rate));
            if let Some(ref dash) = s.dashboard {
                dash.listen_button.set_label("Stop Listening");
            }
        }
        Err(e) => {
            log::error!("Failed to start capture: {e}");
            update_status(state, AppStatus::Error, &format!("Mic error: {e}"));
            return;
        }
    }
    update_status(state, AppStatus::Listening, "Listening...");

    // Repeating timers owned here, removed again in stop_listening.
    let sender = state.borrow().backend_sender.clone();
    let audio_buf = state.borrow().sample_buffer.clone();
    let level_source = glib::timeout_add_local(LEVEL_INTERVAL, move || {
        let rms = compute_rms(&audio_buf);
        let _ = sender.try_send(BackendEvent::AudioLevel(rms));
        glib::ControlFlow::Continue
    });

    let sender = state.borrow().backend_sender.clone();
    let chunk_source = glib::timeout_add_local(CHUNK_INTERVAL, move || {
        let _ = sender.try_send(BackendEvent::ChunkTick);
        glib::ControlFlow::Continue
    });

    let mut s = state.borrow_mut();
    s.level_source = Some(level_source);
    s.chunk_source = Some(chunk_source);
}

/// Stop capturing and hand the session to the pipeline. A no-op unless
/// currently listening, so stray calls leave state untouched.
pub fn stop_listening(state: &Rc<RefCell<AppState>>) {
    if state.borrow().status != AppStatus::Listening {
        return;
    }
    log::info!("Stopping capture");

    let session = {
        let mut s = state.borrow_mut();
        if let Some(source) = s.level_source.take() {
            source.remove();
        }
        if let Some(source) = s.chunk_source.take() {
            source.remove();
        }
        // Dropping the stream releases the microphone.
        s.input_stream = None;
        s.session.take()
    };

    let Some(mut session) = session else {
        update_status(state, AppStatus::Idle, "Ready");
        return;
    };

    {
        let buffer = state.borrow().sample_buffer.clone();
        drain_chunk(&buffer, &mut session);
    }
    log::info!(
        "Captured {} chunks ({} samples at {}Hz)",
        session.chunks.len(),
        session.sample_count(),
        session.sample_rate
    );

    if let Some(ref dash) = state.borrow().dashboard {
        dash.listen_button.set_label("Start Listening");
        crate::ui::dashboard::reset_levels(&mut dash.audio_levels.borrow_mut());
        dash.waveform.queue_draw();
    }
    update_status(state, AppStatus::Processing, "Processing...");
    dispatch_pipeline(state, session);
}

/// Move whatever the input callback buffered since the last tick into
/// the session as one ordered chunk.
pub fn drain_chunk(buffer: &Arc<Mutex<Vec<f32>>>, session: &mut Session) {
    let buf = buffer.lock().unwrap();
    if buf.len() > session.drained {
        session.chunks.push(buf[session.drained..].to_vec());
        session.drained = buf.len();
    }
}

/// RMS of the last ~1280 samples in the shared buffer.
fn compute_rms(buffer: &Arc<Mutex<Vec<f32>>>) -> f32 {
    let buf = buffer.lock().unwrap();
    let n = buf.len().min(1280);
    if n == 0 {
        return 0.0;
    }
    let start = buf.len() - n;
    let sum_sq: f32 = buf[start..].iter().map(|&s| s * s).sum();
    (sum_sq / n as f32).sqrt()
}
