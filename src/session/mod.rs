//! The builder session: the editing state around one workflow rule, its save lifecycle and
//! the storage seam it loads from and saves to.

mod builder;
mod store;

pub use builder::{BuilderSession, NavigationDecision, SaveTicket};
pub use store::{InMemoryStore, WorkflowStore};
