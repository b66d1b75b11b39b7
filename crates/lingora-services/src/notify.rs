//! Submission intake and notification fan-out.
//!
//! A visitor submission is persisted first; notification delivery runs
//! detached afterwards. Delivery failure is logged and never reaches the
//! submitter, whose success response depends only on the insert.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use lingora_core::models::{CreateQuerySubmission, Page, Pagination, QuerySubmission};
use lingora_core::AppError;
use lingora_db::QuerySubmissionRepository;

/// Delivery channel for new-submission notifications (email, chat webhook).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn submission_received(&self, submission: &QuerySubmission) -> Result<(), AppError>;
}

/// Notifier that only writes a structured log line. Default in development
/// and wherever no real channel is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn submission_received(&self, submission: &QuerySubmission) -> Result<(), AppError> {
        tracing::info!(
            submission_id = %submission.id,
            email = %submission.email,
            "New query submission received"
        );
        Ok(())
    }
}

/// Deliver a notification on a detached task. Failures are logged and
/// dropped.
pub fn notify_detached(
    notifier: Arc<dyn Notifier>,
    submission: QuerySubmission,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.submission_received(&submission).await {
            tracing::warn!(
                submission_id = %submission.id,
                error = %e,
                "Submission notification failed"
            );
        }
    })
}

/// Intake service for visitor query submissions.
#[derive(Clone)]
pub struct SubmissionService {
    submissions: QuerySubmissionRepository,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionService {
    pub fn new(submissions: QuerySubmissionRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            submissions,
            notifier,
        }
    }

    /// Persist a submission, then kick off notification delivery without
    /// waiting for it.
    #[tracing::instrument(skip(self, input))]
    pub async fn submit(&self, input: CreateQuerySubmission) -> Result<QuerySubmission, AppError> {
        let submission = self.submissions.create(input).await?;
        notify_detached(self.notifier.clone(), submission.clone());
        Ok(submission)
    }

    /// Editor listing, newest first.
    pub async fn list(&self, pagination: Pagination) -> Result<Page<QuerySubmission>, AppError> {
        self.submissions.list(pagination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use uuid::Uuid;

    struct CountingNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn submission_received(&self, _submission: &QuerySubmission) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Internal("channel down".to_string()));
            }
            Ok(())
        }
    }

    fn submission() -> QuerySubmission {
        QuerySubmission {
            id: Uuid::new_v4(),
            name: "A Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            subject: None,
            message: "Hello".to_string(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn detached_notification_is_delivered() {
        let notifier = Arc::new(CountingNotifier {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        notify_detached(notifier.clone(), submission())
            .await
            .unwrap();
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let notifier = Arc::new(CountingNotifier {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        // The task must complete normally even when the channel errors.
        notify_detached(notifier.clone(), submission())
            .await
            .unwrap();
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }
}
