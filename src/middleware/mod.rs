//! actix-web middleware

mod session_metadata;

pub use session_metadata::{SessionIdentity, SessionMetadata, SessionMetadataService};
