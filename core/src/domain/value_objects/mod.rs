//! Value objects representing immutable domain concepts.

pub mod event;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use event::Event;
pub use state::State;
