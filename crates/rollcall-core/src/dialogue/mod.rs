//! The registration dialogue: validators, per-user sessions, and the state
//! machine that sequences the three collection steps.

pub mod machine;
pub mod session;
pub mod validate;

pub use machine::DialogueMachine;
pub use session::{DialogueState, Session, SessionStore};
