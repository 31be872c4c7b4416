//! Gateway seam for the two remote verification operations
//!
//! The machine only depends on the Result-shaped contract defined here:
//! - `send_otp(phone)` asks the verification API to dispatch a code
//! - `verify_otp(otp)` asks it to confirm the code the user entered
//!
//! Transports (HTTP, mocks) implement [`OtpGateway`] in the infrastructure
//! layer or in tests.

mod traits;
mod types;

pub use traits::OtpGateway;
pub use types::{Receipt, SendReceipt, VerifyReceipt};
