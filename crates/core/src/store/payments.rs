//! Payment collection operations.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Payment;
use crate::error::{HcmsError, HcmsResult};

use super::DocumentStore;

impl DocumentStore {
    pub async fn insert_payment(&self, payment: Payment) {
        self.payments.write().await.insert(payment.id, payment);
    }

    /// Removes a payment again. Used to roll back records whose visit
    /// update did not commit.
    pub async fn remove_payment(&self, id: Uuid) {
        self.payments.write().await.remove(&id);
    }

    pub async fn payment(&self, id: Uuid) -> Option<Payment> {
        self.payments.read().await.get(&id).cloned()
    }

    /// Runs a closure against one payment under the collection's
    /// write lock, stamping `updated_at` on success.
    pub async fn with_payment_mut<T, F>(&self, id: Uuid, f: F) -> HcmsResult<T>
    where
        F: FnOnce(&mut Payment) -> HcmsResult<T>,
    {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&id)
            .ok_or(HcmsError::NotFound("Payment"))?;
        let outcome = f(payment)?;
        payment.updated_at = Utc::now();
        Ok(outcome)
    }

    /// All payments recorded against one visit, newest first.
    pub async fn payments_for_visit(&self, visit: Uuid) -> Vec<Payment> {
        let payments = self.payments.read().await;
        let mut matches: Vec<Payment> = payments
            .values()
            .filter(|payment| payment.visit == visit)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }
}
