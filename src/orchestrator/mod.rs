//! Application-level orchestration.
//!
//! This module owns the submission lifecycle (form validation, the single in-flight
//! request, state transitions) so UI/CLI layers only send commands and draw events.

mod controller;
mod form;

pub use controller::SubmissionController;
pub(crate) use controller::{run_http_controller, UiCommand};
pub use form::{mime_for, SubmissionForm};
