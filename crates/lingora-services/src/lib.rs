//! Lingora Services Layer
//!
//! Orchestration above the repositories: the two-phase upload pipeline
//! (validate, push to storage, record in the ledger) and fire-and-forget
//! submission notifications. Callers get a single facade over storage and
//! database concerns.

pub mod notify;
pub mod upload;

pub use notify::{LogNotifier, Notifier, SubmissionService};
pub use upload::{BatchUploadOutcome, PendingUpload, PushedUpload, UploadRequest, UploadService};
