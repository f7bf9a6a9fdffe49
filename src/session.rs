//! Tracker sessions, their lifecycle and the registry holding them.

mod registry;
mod state;
mod tracker_session;

pub use registry::SessionRegistry;
pub use state::SessionState;
pub use tracker_session::TrackerSession;
