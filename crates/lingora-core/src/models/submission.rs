use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A visitor query/contact submission. Persisted first; notification delivery
/// is fire-and-forget and never affects the submitter's success response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct QuerySubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuerySubmission {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 300))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_email() {
        let input = CreateQuerySubmission {
            name: "A Visitor".to_string(),
            email: "not-an-email".to_string(),
            subject: None,
            message: "Hello".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_submission() {
        let input = CreateQuerySubmission {
            name: "A Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            subject: Some("Question".to_string()),
            message: "When is the album out?".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
