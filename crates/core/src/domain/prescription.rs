//! Prescriptions written by the main doctor and dispensed at the
//! pharmacy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::short_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PharmacyStatus {
    Pending,
    PartiallyDispensed,
    Dispensed,
}

/// One prescribed medicine line.
///
/// `quantity` is the amount still owed to the patient; `dispensed_quantity`
/// accumulates what has been handed out. A line is settled when
/// `quantity` reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLine {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub dispensed_quantity: u32,
}

impl MedicineLine {
    pub fn is_settled(&self) -> bool {
        self.quantity == 0
    }
}

/// A prescription for one visit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub visit: Uuid,
    /// Main doctor that wrote the prescription.
    pub main_doctor: Uuid,
    pub medicines: Vec<MedicineLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Total medicine cost priced at prescription time.
    pub total_cost: f64,
    pub pharmacy_status: PharmacyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispensed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispensed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    pub fn new(
        visit: Uuid,
        main_doctor: Uuid,
        medicines: Vec<MedicineLine>,
        notes: Option<String>,
        total_cost: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            visit,
            main_doctor,
            medicines,
            notes,
            total_cost,
            pharmacy_status: PharmacyStatus::Pending,
            dispensed_by: None,
            dispensed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when every line has been fully handed out.
    pub fn fully_dispensed(&self) -> bool {
        self.medicines.iter().all(MedicineLine::is_settled)
    }

    /// Human-facing prescription code, e.g. `RX-9C21B0`.
    pub fn code(&self) -> String {
        short_code("RX", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, quantity: u32) -> MedicineLine {
        MedicineLine {
            name: name.to_string(),
            dosage: "500mg".to_string(),
            duration: "5 days".to_string(),
            instruction: None,
            quantity,
            dispensed_quantity: 0,
        }
    }

    #[test]
    fn new_prescriptions_start_pending() {
        let rx = Prescription::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![line("Paracetamol", 10)],
            None,
            12.5,
        );
        assert_eq!(rx.pharmacy_status, PharmacyStatus::Pending);
        assert!(rx.dispensed_by.is_none());
        assert!(!rx.fully_dispensed());
    }

    #[test]
    fn fully_dispensed_requires_every_line_settled() {
        let mut rx = Prescription::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![line("Paracetamol", 0), line("Amoxicillin", 3)],
            None,
            0.0,
        );
        assert!(!rx.fully_dispensed());
        rx.medicines[1].quantity = 0;
        assert!(rx.fully_dispensed());
    }

    #[test]
    fn pharmacy_status_serialises_in_snake_case() {
        let json =
            serde_json::to_string(&PharmacyStatus::PartiallyDispensed).expect("Failed to serialise");
        assert_eq!(json, "\"partially_dispensed\"");
    }

    #[test]
    fn medicine_line_defaults_dispensed_quantity_on_input() {
        let parsed: MedicineLine = serde_json::from_str(
            "{\"name\":\"Paracetamol\",\"dosage\":\"500mg\",\"duration\":\"5 days\",\"quantity\":10}",
        )
        .expect("Failed to deserialise");
        assert_eq!(parsed.dispensed_quantity, 0);
    }
}
