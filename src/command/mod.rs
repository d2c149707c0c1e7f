mod commands;
mod context;

use thiserror::Error;

use crate::state::StateTransitionError;

pub use commands::Command;
pub use context::CommandContext;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Why a command left the editor unchanged
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("No shape is selected")]
    NothingSelected,
    #[error("No text entry is in progress")]
    NoPendingText,
    #[error("Text entry was empty")]
    EmptyText,
    #[error("No screenshot is loaded")]
    NoScreenshot,
    #[error("Invalid stroke width {0}")]
    InvalidStrokeWidth(f32),
    #[error(transparent)]
    StateTransition(#[from] StateTransitionError),
}
