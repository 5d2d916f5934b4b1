//! Error taxonomy for the clinical workflow engine.
//!
//! Every fallible operation in this crate returns [`HcmsResult`]. The
//! variants map onto the HTTP layer as follows: validation and state
//! conflicts become 400, missing documents become 404, authorization
//! failures become 403 and storage faults become 500.

use crate::domain::{Role, VisitStatus};

/// Errors produced by the workflow engine and the document store.
#[derive(Debug, thiserror::Error)]
pub enum HcmsError {
    /// A request field failed validation. The message is safe to show
    /// to API clients.
    #[error("{0}")]
    Validation(String),

    /// A referenced document does not exist. Carries the document kind
    /// so the message reads e.g. "Patient not found".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The target document is not in a state that permits the
    /// requested operation.
    #[error("{0}")]
    InvalidState(String),

    /// The acting role is not allowed to move a visit into the target
    /// status.
    #[error("You are not authorized to update status to {target}")]
    ForbiddenTransition { role: Role, target: VisitStatus },

    /// The acting role is not allowed to perform this operation at all.
    #[error("Role {role} is not permitted to perform this operation")]
    Forbidden { role: Role },

    /// A lab result was submitted for a test that already has one.
    #[error("Lab test is already completed")]
    AlreadyCompleted,

    /// A confirmation was submitted for a payment that is already paid.
    #[error("Payment is already confirmed")]
    AlreadyConfirmed,

    /// A dispense was submitted for a fully dispensed prescription.
    #[error("Prescription is already dispensed")]
    AlreadyDispensed,

    /// The pharmacy does not hold enough stock to cover a dispense.
    #[error("Insufficient stock for {medicine}. Available: {available}, Required: {required}")]
    InsufficientStock {
        medicine: String,
        available: u32,
        required: u32,
    },

    /// An attachment or other storage backend failed. The message is
    /// for logs, not for API clients.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result alias used throughout the crate.
pub type HcmsResult<T> = std::result::Result<T, HcmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_document_kind() {
        let err = HcmsError::NotFound("Patient");
        assert_eq!(err.to_string(), "Patient not found");
    }

    #[test]
    fn forbidden_transition_message_names_the_target_status() {
        let err = HcmsError::ForbiddenTransition {
            role: Role::LabTech,
            target: VisitStatus::Diagnosed,
        };
        assert_eq!(
            err.to_string(),
            "You are not authorized to update status to diagnosed"
        );
    }

    #[test]
    fn insufficient_stock_message_reports_both_quantities() {
        let err = HcmsError::InsufficientStock {
            medicine: "Paracetamol".to_string(),
            available: 3,
            required: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Paracetamol. Available: 3, Required: 10"
        );
    }
}
