//! Session lifecycle: refresh coordination and lifecycle events.

mod coordinator;
mod events;

pub use coordinator::{RefreshBackend, RefreshCoordinator, RefreshedSession};
pub use events::{SessionEvent, SessionEvents};
