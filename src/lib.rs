//! # Flowdraft - Returns Workflow Builder Engine
//!
//! **Flowdraft** is the engine behind a visual builder for returns-automation workflows.
//! A workflow is a directed graph: a single trigger node starts it, condition nodes branch
//! it on field comparisons, and action and delay nodes do the work. The crate owns
//! everything about that graph except drawing it.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Open a [`session::BuilderSession`] over a persisted rule. Records written
//!     before the graph model existed are upgraded on the fly.
//! 2.  **Edit**: Feed pointer, wheel and keyboard input (or [`graph::GraphCommand`]s
//!     directly) into the session. Every committed change is revalidated.
//! 3.  **Lay out**: Snap, auto-arrange and fit the graph with the [`layout`] helpers.
//! 4.  **Save**: The session refuses to save a structurally invalid graph and projects a
//!     valid one back onto the persisted record shape.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowdraft::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut session = BuilderSession::new("rule-1", "Refund approved returns");
//!
//!     let trigger = session.add_node(
//!         NodeType::Trigger,
//!         Position::new(60.0, 200.0),
//!         "Return created",
//!         NodeOverrides { event_type: Some(EventType::ReturnCreated), ..Default::default() },
//!     )?;
//!     let refund = session.add_node(
//!         NodeType::Action,
//!         Position::new(340.0, 200.0),
//!         "Refund",
//!         NodeOverrides { action_type: Some(ActionType::IssueRefund), ..Default::default() },
//!     )?;
//!     session.connect(&trigger, &refund, None)?;
//!
//!     for error in validate_workflow(session.graph()) {
//!         println!("-> {}", error);
//!     }
//!
//!     let store = InMemoryStore::new();
//!     tokio_test::block_on(session.save(&store))?;
//!     println!("{}", session.export()?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod prelude;
pub mod serialization;
pub mod session;
pub mod validation;
