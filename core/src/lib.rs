//! # Phone Verify Core
//!
//! Domain layer for OTP-gated phone updates. This crate contains the
//! verification state machine (a pure transition table plus the driver
//! that runs its effects), the gateway seam for the two remote operations,
//! the profile form session built on top of the machine, and error types.

pub mod domain;
pub mod errors;
pub mod machine;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use machine::*;
pub use services::*;
