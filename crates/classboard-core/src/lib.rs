//! Classboard Core Library
//!
//! Domain models and board rules for the classroom project board: work
//! items, sprints, the review workflow and the drag-to-move adapter.

pub mod board;
pub mod dialog;
pub mod drag;
pub mod error;
pub mod feedback;
pub mod policy;
pub mod session;
pub mod sprint;
pub mod work_item;

#[cfg(test)]
mod testing;

pub use board::{BoardController, BoardSnapshot, Container, MoveOutcome, StatusOutcome};
pub use error::{BoardError, BoardResult, ErrorKind};
pub use policy::Actor;
pub use session::Session;
