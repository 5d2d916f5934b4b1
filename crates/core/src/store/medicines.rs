//! Medicine inventory operations, including the atomic batch
//! decrement used when dispensing.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Medicine;
use crate::error::{HcmsError, HcmsResult};

use super::{DocumentStore, Page, Paged};

/// One medicine's share of a dispense, by inventory name.
#[derive(Debug, Clone)]
pub struct StockDemand {
    pub name: String,
    pub quantity: u32,
}

/// How a stock adjustment applies its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    /// Add the quantity to the current stock.
    Add,
    /// Replace the current stock with the quantity.
    Set,
}

/// Listing filter for the inventory.
#[derive(Debug, Clone, Default)]
pub struct MedicineFilter {
    /// Case-insensitive substring of the name or generic name.
    pub search: Option<String>,
    /// Keep only medicines at or below their minimum stock.
    pub low_stock: bool,
    /// Include medicines that have been deactivated.
    pub include_inactive: bool,
}

impl DocumentStore {
    /// Inserts a new medicine. Names are unique across the inventory.
    pub async fn insert_medicine(&self, medicine: Medicine) -> HcmsResult<()> {
        let mut medicines = self.medicines.write().await;
        if medicines
            .values()
            .any(|existing| existing.name == medicine.name)
        {
            return Err(HcmsError::Validation(format!(
                "Medicine {} already exists",
                medicine.name
            )));
        }
        medicines.insert(medicine.id, medicine);
        Ok(())
    }

    pub async fn medicine(&self, id: Uuid) -> Option<Medicine> {
        self.medicines.read().await.get(&id).cloned()
    }

    pub async fn medicine_by_name(&self, name: &str) -> Option<Medicine> {
        self.medicines
            .read()
            .await
            .values()
            .find(|medicine| medicine.name == name)
            .cloned()
    }

    /// Snapshot of unit prices for the named medicines. Names missing
    /// from the inventory are simply absent from the map.
    pub async fn prices_for(&self, names: &[String]) -> HashMap<String, f64> {
        let medicines = self.medicines.read().await;
        let mut prices = HashMap::new();
        for medicine in medicines.values() {
            if names.contains(&medicine.name) {
                prices.insert(medicine.name.clone(), medicine.price);
            }
        }
        prices
    }

    /// Lists the inventory ordered by name.
    pub async fn list_medicines(&self, filter: &MedicineFilter, page: Page) -> Paged<Medicine> {
        let medicines = self.medicines.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut matches: Vec<Medicine> = medicines
            .values()
            .filter(|medicine| {
                if !filter.include_inactive && !medicine.is_active {
                    return false;
                }
                if filter.low_stock && !medicine.is_low_stock() {
                    return false;
                }
                match needle.as_deref() {
                    Some(needle) => {
                        medicine.name.to_lowercase().contains(needle)
                            || medicine
                                .generic_name
                                .as_deref()
                                .is_some_and(|name| name.to_lowercase().contains(needle))
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        let (items, total) = page.slice(matches);
        Paged::new(page, items, total)
    }

    /// Adjusts one medicine's stock level.
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        operation: StockOperation,
        quantity: u32,
    ) -> HcmsResult<Medicine> {
        let mut medicines = self.medicines.write().await;
        let medicine = medicines
            .get_mut(&id)
            .ok_or(HcmsError::NotFound("Medicine"))?;
        medicine.stock = match operation {
            StockOperation::Add => medicine.stock.saturating_add(quantity),
            StockOperation::Set => quantity,
        };
        medicine.updated_at = Utc::now();
        Ok(medicine.clone())
    }

    /// Decrements stock for a whole dispense in one step. Demands are
    /// aggregated by name, every aggregate is checked against current
    /// stock, and only then is anything written; on
    /// [`HcmsError::InsufficientStock`] no stock level has moved.
    /// Demands naming medicines that are not in the inventory are
    /// ignored, matching how prescriptions price them at zero.
    pub async fn dispense_stock(&self, demands: &[StockDemand]) -> HcmsResult<()> {
        let mut medicines = self.medicines.write().await;

        let mut required: HashMap<&str, u32> = HashMap::new();
        for demand in demands {
            if demand.quantity == 0 {
                continue;
            }
            *required.entry(demand.name.as_str()).or_insert(0) += demand.quantity;
        }

        let mut apply: Vec<(Uuid, u32)> = Vec::new();
        for (name, quantity) in &required {
            let Some(medicine) = medicines.values().find(|m| m.name == *name) else {
                continue;
            };
            if medicine.stock < *quantity {
                return Err(HcmsError::InsufficientStock {
                    medicine: medicine.name.clone(),
                    available: medicine.stock,
                    required: *quantity,
                });
            }
            apply.push((medicine.id, *quantity));
        }

        let now = Utc::now();
        for (id, quantity) in apply {
            if let Some(medicine) = medicines.get_mut(&id) {
                medicine.stock -= quantity;
                medicine.updated_at = now;
            }
        }
        Ok(())
    }

    /// Puts previously decremented stock back. Compensation path for
    /// dispenses whose prescription update did not commit.
    pub async fn restore_stock(&self, demands: &[StockDemand]) {
        let mut medicines = self.medicines.write().await;
        let now = Utc::now();
        for demand in demands {
            if let Some(medicine) = medicines.values_mut().find(|m| m.name == demand.name) {
                medicine.stock = medicine.stock.saturating_add(demand.quantity);
                medicine.updated_at = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MedicineUnit;

    fn medicine(name: &str, stock: u32) -> Medicine {
        Medicine::new(
            name.to_string(),
            None,
            0.5,
            stock,
            10,
            MedicineUnit::Tablet,
            true,
        )
    }

    fn demand(name: &str, quantity: u32) -> StockDemand {
        StockDemand {
            name: name.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn medicine_names_are_unique() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 100))
            .await
            .expect("First insert should succeed");
        let result = store.insert_medicine(medicine("Paracetamol", 50)).await;
        assert!(matches!(result, Err(HcmsError::Validation(_))));
    }

    #[tokio::test]
    async fn dispense_decrements_every_named_medicine() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 100))
            .await
            .expect("Insert should succeed");
        store
            .insert_medicine(medicine("Amoxicillin", 20))
            .await
            .expect("Insert should succeed");

        store
            .dispense_stock(&[demand("Paracetamol", 10), demand("Amoxicillin", 5)])
            .await
            .expect("Dispense should succeed");

        let para = store
            .medicine_by_name("Paracetamol")
            .await
            .expect("Medicine should exist");
        let amox = store
            .medicine_by_name("Amoxicillin")
            .await
            .expect("Medicine should exist");
        assert_eq!(para.stock, 90);
        assert_eq!(amox.stock, 15);
    }

    #[tokio::test]
    async fn a_single_shortfall_leaves_all_stock_untouched() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 100))
            .await
            .expect("Insert should succeed");
        store
            .insert_medicine(medicine("Amoxicillin", 3))
            .await
            .expect("Insert should succeed");

        let result = store
            .dispense_stock(&[demand("Paracetamol", 10), demand("Amoxicillin", 5)])
            .await;
        assert!(matches!(
            result,
            Err(HcmsError::InsufficientStock { available: 3, required: 5, .. })
        ));

        let para = store
            .medicine_by_name("Paracetamol")
            .await
            .expect("Medicine should exist");
        assert_eq!(para.stock, 100);
    }

    #[tokio::test]
    async fn duplicate_demands_are_aggregated_before_the_check() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 10))
            .await
            .expect("Insert should succeed");

        let result = store
            .dispense_stock(&[demand("Paracetamol", 6), demand("Paracetamol", 6)])
            .await;
        assert!(matches!(
            result,
            Err(HcmsError::InsufficientStock { required: 12, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_medicines_are_skipped_by_dispense() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 100))
            .await
            .expect("Insert should succeed");

        store
            .dispense_stock(&[demand("Paracetamol", 10), demand("Herbal Mix", 5)])
            .await
            .expect("Unknown names should not fail the dispense");
        let para = store
            .medicine_by_name("Paracetamol")
            .await
            .expect("Medicine should exist");
        assert_eq!(para.stock, 90);
    }

    #[tokio::test]
    async fn restore_puts_stock_back() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 90))
            .await
            .expect("Insert should succeed");
        store.restore_stock(&[demand("Paracetamol", 10)]).await;
        let para = store
            .medicine_by_name("Paracetamol")
            .await
            .expect("Medicine should exist");
        assert_eq!(para.stock, 100);
    }

    #[tokio::test]
    async fn adjust_stock_supports_add_and_set() {
        let store = DocumentStore::new();
        let med = medicine("Paracetamol", 10);
        let id = med.id;
        store
            .insert_medicine(med)
            .await
            .expect("Insert should succeed");

        let after_add = store
            .adjust_stock(id, StockOperation::Add, 15)
            .await
            .expect("Add should succeed");
        assert_eq!(after_add.stock, 25);

        let after_set = store
            .adjust_stock(id, StockOperation::Set, 7)
            .await
            .expect("Set should succeed");
        assert_eq!(after_set.stock, 7);
    }

    #[tokio::test]
    async fn listing_filters_low_stock_and_inactive() {
        let store = DocumentStore::new();
        store
            .insert_medicine(medicine("Paracetamol", 100))
            .await
            .expect("Insert should succeed");
        store
            .insert_medicine(medicine("Amoxicillin", 5))
            .await
            .expect("Insert should succeed");
        let mut inactive = medicine("Chloroquine", 50);
        inactive.is_active = false;
        store
            .insert_medicine(inactive)
            .await
            .expect("Insert should succeed");

        let all = store
            .list_medicines(&MedicineFilter::default(), Page::default())
            .await;
        assert_eq!(all.total, 2);

        let low = store
            .list_medicines(
                &MedicineFilter {
                    low_stock: true,
                    ..MedicineFilter::default()
                },
                Page::default(),
            )
            .await;
        assert_eq!(low.total, 1);
        assert_eq!(low.items[0].name, "Amoxicillin");

        let with_inactive = store
            .list_medicines(
                &MedicineFilter {
                    include_inactive: true,
                    ..MedicineFilter::default()
                },
                Page::default(),
            )
            .await;
        assert_eq!(with_inactive.total, 3);
    }
}
