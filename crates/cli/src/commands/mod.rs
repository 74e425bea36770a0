//! Command implementations for the simulator.
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod inspect;
mod run;
mod validate;

pub use inspect::Inspect;
pub use run::Run;
pub use validate::Validate;
