use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent, Session};

/// Run the simulated assistant pipeline on the tokio runtime. The
/// session is consumed; results and failures come back as events.
pub fn dispatch_pipeline(state: &Rc<RefCell<AppState>>, session: Session) {
    let s = state.borrow();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        if let Err(e) = crate::assistant::run_pipeline(session, &sender).await {
            let _ = sender
                .send(BackendEvent::PipelineError(format!("{e}")))
                .await;
        }
    });
}
