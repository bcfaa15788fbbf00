use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::state::{update_status, AppState, AppStatus, BackendEvent};

/// How long the pretend model load takes at startup.
const WARMUP_DELAY: Duration = Duration::from_millis(1500);

/// Simulate loading the speech and synthesis models. The action button
/// stays inert until the completion event flips status to Idle.
pub fn begin_warmup(state: &Rc<RefCell<AppState>>) {
    log::info!("Loading models (simulated)");
    update_status(state, AppStatus::Loading, "Loading models...");

    let sender = state.borrow().backend_sender.clone();
    state.borrow().tokio_rt.spawn(async move {
        tokio::time::sleep(WARMUP_DELAY).await;
        let _ = sender.send(BackendEvent::WarmupComplete).await;
    });
}
