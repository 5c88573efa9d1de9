use super::transaction::ExternalTransactionId;
use serde::{Deserialize, Serialize};

/// Canonical reason attached to a `DECLINED` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclineReason {
    DoNotHonor,
    InsufficientFunds,
    Unknown,
}

impl DeclineReason {
    /// Maps a processor decline code. Anything not listed is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "do_not_honor" => DeclineReason::DoNotHonor,
            "insufficient_funds" => DeclineReason::InsufficientFunds,
            _ => DeclineReason::Unknown,
        }
    }
}

/// The non-success half shared by every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Declined(DeclineReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    Authorized(ExternalTransactionId),
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Settled,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    Rejected(Rejection),
}

/// The result vocabulary the host understands.
///
/// Serializes as `{"transactionStatus": ..}` plus at most one of
/// `processorTransactionId`, `declineReason` or `errorMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "transactionStatus",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum CanonicalOutcome {
    Authorized {
        processor_transaction_id: ExternalTransactionId,
    },
    Declined {
        decline_reason: DeclineReason,
    },
    Failed {
        error_message: String,
    },
    Settled,
    Cancelled,
}

impl CanonicalOutcome {
    pub fn transaction_status(&self) -> &'static str {
        match self {
            CanonicalOutcome::Authorized { .. } => "AUTHORIZED",
            CanonicalOutcome::Declined { .. } => "DECLINED",
            CanonicalOutcome::Failed { .. } => "FAILED",
            CanonicalOutcome::Settled => "SETTLED",
            CanonicalOutcome::Cancelled => "CANCELLED",
        }
    }
}

impl From<Rejection> for CanonicalOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Declined(decline_reason) => CanonicalOutcome::Declined { decline_reason },
            Rejection::Failed(error_message) => CanonicalOutcome::Failed { error_message },
        }
    }
}

impl From<AuthorizeOutcome> for CanonicalOutcome {
    fn from(outcome: AuthorizeOutcome) -> Self {
        match outcome {
            AuthorizeOutcome::Authorized(processor_transaction_id) => {
                CanonicalOutcome::Authorized {
                    processor_transaction_id,
                }
            }
            AuthorizeOutcome::Rejected(rejection) => rejection.into(),
        }
    }
}

impl From<CaptureOutcome> for CanonicalOutcome {
    fn from(outcome: CaptureOutcome) -> Self {
        match outcome {
            CaptureOutcome::Settled => CanonicalOutcome::Settled,
            CaptureOutcome::Rejected(rejection) => rejection.into(),
        }
    }
}

impl From<CancelOutcome> for CanonicalOutcome {
    fn from(outcome: CancelOutcome) -> Self {
        match outcome {
            CancelOutcome::Cancelled => CanonicalOutcome::Cancelled,
            CancelOutcome::Rejected(rejection) => rejection.into(),
        }
    }
}
