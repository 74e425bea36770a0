//! Event broadcasting for combat sessions.
//!
//! Workers publish on a topic-based bus; observers (the CLI, network
//! adapters, tests) subscribe to the topics they care about.
mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::Event;
