//! Services built around the verification machine.

pub mod profile_form;
pub mod verification;

// Re-export commonly used types
pub use profile_form::{ProfileForm, Screen, SubmitOutcome};
pub use verification::{OtpGateway, Receipt, SendReceipt, VerifyReceipt};
