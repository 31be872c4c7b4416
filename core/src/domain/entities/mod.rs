//! Domain entities owned by a machine instance.

pub mod context;
pub mod snapshot;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use context::Context;
pub use snapshot::Snapshot;
