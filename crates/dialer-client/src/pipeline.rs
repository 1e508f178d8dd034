//! Submission pipeline: validate → user lookup → enrollment lookup → send.
//!
//! Each stage runs only if the previous one succeeded, and every run ends in
//! exactly one [`SubmissionOutcome`]. Nothing is retried automatically.
//!
//! The pipeline does not serialize concurrent submissions. Two overlapping
//! calls run independently and may both send; callers that need one-at-a-time
//! semantics (an operator keypad) should wait for the outcome before
//! accepting more input.

use std::sync::Arc;

use dialer_core::{PhoneError, PhoneSuffix};
use dialer_store::SessionStore;
use metrics::counter;
use tracing::{info, warn};

use crate::api::{Directory, EnrollmentRecord, UserRecord};
use crate::auth;
use crate::connection::ConnectionManager;
use crate::errors::LookupError;

/// Records gathered by a successful lookup, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// The 8-digit suffix that goes on the wire.
    pub suffix: PhoneSuffix,
    /// Subscriber record.
    pub user: UserRecord,
    /// Enrollment record.
    pub enrollment: EnrollmentRecord,
}

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The suffix was written to the socket.
    Sent(Delivery),
    /// The input did not normalize to 8 digits.
    ValidationFailed(PhoneError),
    /// No usable token, or the server rejected it.
    Unauthorized,
    /// No subscriber for the number.
    UserNotFound,
    /// The subscriber has no enrollment.
    EnrollmentNotFound,
    /// Lookups succeeded but the socket was not open. The records are kept
    /// so the send can be retried with [`SubmissionPipeline::resend`].
    SocketNotOpen(Box<Delivery>),
    /// A lookup failed for transport or server reasons.
    NetworkError(String),
    /// The session could not be read or cleared.
    PersistenceError(String),
}

impl SubmissionOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent(_) => "sent",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Unauthorized => "unauthorized",
            Self::UserNotFound => "user_not_found",
            Self::EnrollmentNotFound => "enrollment_not_found",
            Self::SocketNotOpen(_) => "socket_not_open",
            Self::NetworkError(_) => "network_error",
            Self::PersistenceError(_) => "persistence_error",
        }
    }

    /// Whether the suffix reached the socket.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Coordinates lookups with the connection to deliver one number.
#[derive(Clone)]
pub struct SubmissionPipeline {
    directory: Arc<dyn Directory>,
    sessions: SessionStore,
    connection: Arc<ConnectionManager>,
}

impl SubmissionPipeline {
    /// Assemble a pipeline over its collaborators.
    pub fn new(
        directory: Arc<dyn Directory>,
        sessions: SessionStore,
        connection: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            directory,
            sessions,
            connection,
        }
    }

    /// Run the full pipeline for raw operator input.
    #[tracing::instrument(skip_all)]
    pub async fn submit(&self, raw: &str) -> SubmissionOutcome {
        let outcome = self.run(raw).await;
        record(&outcome);
        outcome
    }

    /// Retry only the send step for a previous [`SubmissionOutcome::SocketNotOpen`].
    pub fn resend(&self, delivery: Delivery) -> SubmissionOutcome {
        let outcome = self.dispatch(delivery);
        record(&outcome);
        outcome
    }

    async fn run(&self, raw: &str) -> SubmissionOutcome {
        let suffix = match PhoneSuffix::parse(raw) {
            Ok(suffix) => suffix,
            Err(e) => return SubmissionOutcome::ValidationFailed(e),
        };

        let token = match self.authorize() {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        let user = match self.directory.find_user(&token, &suffix.full_number()).await {
            Ok(user) => user,
            Err(e) => return lookup_failure(e, SubmissionOutcome::UserNotFound),
        };

        let token = match self.authorize() {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        let enrollment = match self.directory.find_enrollment(&token, &user.id).await {
            Ok(enrollment) => enrollment,
            Err(e) => return lookup_failure(e, SubmissionOutcome::EnrollmentNotFound),
        };

        self.dispatch(Delivery {
            suffix,
            user,
            enrollment,
        })
    }

    /// Current usable token, clearing the session if it has expired.
    ///
    /// Runs before every lookup, so a token that expires mid-submission is
    /// never sent.
    fn authorize(&self) -> Result<String, SubmissionOutcome> {
        let persistence =
            |e: dialer_store::StoreError| SubmissionOutcome::PersistenceError(e.to_string());

        let token = self
            .sessions
            .access_token()
            .map_err(persistence)?
            .ok_or(SubmissionOutcome::Unauthorized)?;

        if auth::is_expired(&token, auth::now_secs()) {
            warn!("access token expired, clearing session");
            self.sessions.clear().map_err(persistence)?;
            return Err(SubmissionOutcome::Unauthorized);
        }
        Ok(token)
    }

    fn dispatch(&self, delivery: Delivery) -> SubmissionOutcome {
        match self.connection.send(delivery.suffix.as_str()) {
            Ok(()) => SubmissionOutcome::Sent(delivery),
            Err(e) => {
                warn!(error = %e, "lookup succeeded but socket is unavailable");
                SubmissionOutcome::SocketNotOpen(Box::new(delivery))
            }
        }
    }
}

fn lookup_failure(err: LookupError, not_found: SubmissionOutcome) -> SubmissionOutcome {
    match err {
        LookupError::Unauthorized { .. } => SubmissionOutcome::Unauthorized,
        LookupError::NotFound { .. } => not_found,
        LookupError::Server { .. } | LookupError::Network(_) | LookupError::Decode(_) => {
            SubmissionOutcome::NetworkError(err.to_string())
        }
    }
}

fn record(outcome: &SubmissionOutcome) {
    counter!("submissions_total", "outcome" => outcome.label()).increment(1);
    info!(outcome = outcome.label(), "submission finished");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
