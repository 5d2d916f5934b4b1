//! Pharmacy inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MedicineUnit {
    #[default]
    Tablet,
    Capsule,
    Ml,
    Mg,
    G,
    Piece,
    Bottle,
    Tube,
}

/// One stocked medicine. Names are unique across the inventory and
/// are what prescription lines refer to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    /// Unit price used to cost prescriptions at write time.
    pub price: f64,
    pub stock: u32,
    /// Threshold below which the medicine counts as low on stock.
    pub minimum_stock: u32,
    pub unit: MedicineUnit,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        generic_name: Option<String>,
        price: f64,
        stock: u32,
        minimum_stock: u32,
        unit: MedicineUnit,
        is_active: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            generic_name,
            price,
            stock,
            minimum_stock,
            unit,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.minimum_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_compares_against_the_minimum() {
        let mut medicine = Medicine::new(
            "Paracetamol".to_string(),
            Some("Acetaminophen".to_string()),
            0.5,
            100,
            10,
            MedicineUnit::Tablet,
            true,
        );
        assert!(!medicine.is_low_stock());
        medicine.stock = 10;
        assert!(medicine.is_low_stock());
    }

    #[test]
    fn unit_serialises_in_lowercase() {
        let json = serde_json::to_string(&MedicineUnit::Ml).expect("Failed to serialise");
        assert_eq!(json, "\"ml\"");
    }
}
