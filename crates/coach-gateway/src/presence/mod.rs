//! In-memory presence and session registry

mod registry;

pub use registry::{PresenceRegistry, PresenceTransition};
