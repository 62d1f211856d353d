//! Service layer for session logic, kept apart from terminal presentation.

pub mod session;

pub use session::{Outcome, SessionService, parse_script};
