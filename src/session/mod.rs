//! Session persistence and replay: a durable single-slot record of the
//! current view intent, recording helpers that overwrite it on every user
//! action, and a one-shot engine that re-issues the recorded operations on
//! activation so the canvas reconverges without server-side session state.

mod recorder;
mod replay;
mod store;

pub use recorder::SessionRecorder;
pub use replay::{ReplayCallbacks, ReplayEngine, ReplayPhase};
pub use store::{FileSessionStore, MemorySessionStore, SessionStorage};
