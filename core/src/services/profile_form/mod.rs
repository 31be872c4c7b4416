//! Profile form session
//!
//! Wraps a verification machine with the page-level bookkeeping of a
//! profile form: the last saved phone, whether the edited phone needs
//! verification, and which screen the UI should show.

mod form;

#[cfg(test)]
mod tests;

pub use form::{ProfileForm, Screen, SubmitOutcome};
