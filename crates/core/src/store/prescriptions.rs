//! Prescription collection operations.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{PharmacyStatus, Prescription};
use crate::error::{HcmsError, HcmsResult};

use super::DocumentStore;

impl DocumentStore {
    pub async fn insert_prescription(&self, prescription: Prescription) {
        self.prescriptions
            .write()
            .await
            .insert(prescription.id, prescription);
    }

    /// Removes a prescription again. Used to roll back writes whose
    /// visit update did not commit.
    pub async fn remove_prescription(&self, id: Uuid) {
        self.prescriptions.write().await.remove(&id);
    }

    pub async fn prescription(&self, id: Uuid) -> Option<Prescription> {
        self.prescriptions.read().await.get(&id).cloned()
    }

    /// Runs a closure against one prescription under the collection's
    /// write lock, stamping `updated_at` on success.
    pub async fn with_prescription_mut<T, F>(&self, id: Uuid, f: F) -> HcmsResult<T>
    where
        F: FnOnce(&mut Prescription) -> HcmsResult<T>,
    {
        let mut prescriptions = self.prescriptions.write().await;
        let prescription = prescriptions
            .get_mut(&id)
            .ok_or(HcmsError::NotFound("Prescription"))?;
        let outcome = f(prescription)?;
        prescription.updated_at = Utc::now();
        Ok(outcome)
    }

    /// The prescription written for one visit, if any.
    pub async fn prescription_for_visit(&self, visit: Uuid) -> Option<Prescription> {
        self.prescriptions
            .read()
            .await
            .values()
            .find(|prescription| prescription.visit == visit)
            .cloned()
    }

    /// The pharmacy work queue: prescriptions not yet fully dispensed,
    /// oldest first.
    pub async fn pending_prescriptions(&self) -> Vec<Prescription> {
        let prescriptions = self.prescriptions.read().await;
        let mut queue: Vec<Prescription> = prescriptions
            .values()
            .filter(|prescription| prescription.pharmacy_status != PharmacyStatus::Dispensed)
            .cloned()
            .collect();
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        queue
    }
}
