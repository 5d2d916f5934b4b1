//! Document models for the clinical workflow.
//!
//! One module per collection. All documents carry a [`uuid::Uuid`] id,
//! creation and update timestamps, and serialise with camelCase field
//! names to match the JSON wire format of the REST API.

pub mod lab;
pub mod medicine;
pub mod patient;
pub mod payment;
pub mod prescription;
pub mod user;
pub mod visit;

pub use lab::{LabTest, LabTestType};
pub use medicine::{Medicine, MedicineUnit};
pub use patient::{Address, Contact, Gender, Patient};
pub use payment::{Payment, PaymentMethod, PaymentType};
pub use prescription::{MedicineLine, PharmacyStatus, Prescription};
pub use user::{Actor, Role, User};
pub use visit::{Visit, VisitStatus};

use uuid::Uuid;

/// Renders the human-facing short code for a document: a fixed prefix
/// plus the last six hex digits of the id, uppercased.
pub(crate) fn short_code(prefix: &str, id: &Uuid) -> String {
    let simple = id.simple().to_string();
    let tail = &simple[simple.len() - 6..];
    format!("{}-{}", prefix, tail.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_code_uses_the_last_six_hex_digits_uppercased() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8")
            .expect("Failed to parse UUID");
        assert_eq!(short_code("VISIT", &id), "VISIT-5FE0C8");
    }
}
