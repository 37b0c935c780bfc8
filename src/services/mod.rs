//! Service layer
//!
//! [`SessionManager`] composes the session store with device parsing and
//! location resolution; it is shared by the CLI and the middleware host.

mod prune;
mod session_manager;

pub use prune::PruneReport;
pub use session_manager::{SessionManager, UserSession};
