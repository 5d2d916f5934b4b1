//! Payments collected at reception.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::short_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Consultation,
    Lab,
    Medicine,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Insurance,
    Online,
}

/// One payment against a visit. Recording a payment marks it paid
/// immediately; `is_paid: false` only occurs for imported or deferred
/// payments awaiting confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub visit: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Reception user that took the payment.
    pub received_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        visit: Uuid,
        amount: f64,
        payment_type: PaymentType,
        payment_method: PaymentMethod,
        received_by: Uuid,
        transaction_id: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            visit,
            amount,
            payment_type,
            payment_method,
            is_paid: true,
            paid_at: Some(now),
            received_by,
            transaction_id,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human-facing receipt code, e.g. `PAY-3E81D4`.
    pub fn code(&self) -> String {
        short_code("PAY", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_payments_are_paid_immediately() {
        let payment = Payment::new(
            Uuid::new_v4(),
            45.0,
            PaymentType::Consultation,
            PaymentMethod::Cash,
            Uuid::new_v4(),
            None,
            None,
        );
        assert!(payment.is_paid);
        assert!(payment.paid_at.is_some());
    }

    #[test]
    fn payment_enums_serialise_in_lowercase() {
        let json = serde_json::to_string(&PaymentType::Consultation).expect("Failed to serialise");
        assert_eq!(json, "\"consultation\"");
        let json = serde_json::to_string(&PaymentMethod::Insurance).expect("Failed to serialise");
        assert_eq!(json, "\"insurance\"");
    }
}
