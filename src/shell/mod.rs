//! External program execution and platform detection.

pub mod collaborator;
pub mod platform;

pub use collaborator::{ExternalCollaborator, Invocation, Outcome, ProcessCollaborator};
pub use platform::is_ci;
