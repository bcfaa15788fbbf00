mod event_handler;
mod listening;
mod pipeline;
mod state;
mod warmup;

pub use event_handler::handle_backend_event;
pub use listening::{start_listening, stop_listening};
pub use state::{AppState, AppStatus, BackendEvent, Session, ToggleAction};
pub use warmup::begin_warmup;
