//! Visit collection operations.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{LabTest, Patient, Payment, Prescription, User, Visit, VisitStatus};
use crate::error::{HcmsError, HcmsResult};

use super::{DocumentStore, Page, Paged};

/// Listing filter for visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitFilter {
    pub status: Option<VisitStatus>,
    pub paid: Option<bool>,
    pub patient: Option<Uuid>,
}

/// A visit with every related document resolved, as served by the
/// visit detail endpoint. Dangling references resolve to `None`
/// rather than failing the whole read.
#[derive(Debug, Clone)]
pub struct VisitBundle {
    pub visit: Visit,
    pub patient: Option<Patient>,
    pub checker_doctor: Option<User>,
    pub main_doctor: Option<User>,
    pub lab_tests: Vec<LabTest>,
    pub prescription: Option<Prescription>,
    pub payments: Vec<Payment>,
}

impl DocumentStore {
    pub async fn insert_visit(&self, visit: Visit) {
        self.visits.write().await.insert(visit.id, visit);
    }

    pub async fn visit(&self, id: Uuid) -> Option<Visit> {
        self.visits.read().await.get(&id).cloned()
    }

    /// Runs a closure against one visit under the collection's write
    /// lock. The closure sees the current document and may mutate it;
    /// `updated_at` is stamped only when the closure succeeds.
    pub async fn with_visit_mut<T, F>(&self, id: Uuid, f: F) -> HcmsResult<T>
    where
        F: FnOnce(&mut Visit) -> HcmsResult<T>,
    {
        let mut visits = self.visits.write().await;
        let visit = visits.get_mut(&id).ok_or(HcmsError::NotFound("Visit"))?;
        let outcome = f(visit)?;
        visit.updated_at = Utc::now();
        Ok(outcome)
    }

    /// Lists visits, newest first.
    pub async fn list_visits(&self, filter: VisitFilter, page: Page) -> Paged<Visit> {
        let visits = self.visits.read().await;
        let mut matches: Vec<Visit> = visits
            .values()
            .filter(|visit| {
                filter.status.is_none_or(|status| visit.status == status)
                    && filter.paid.is_none_or(|paid| visit.paid == paid)
                    && filter.patient.is_none_or(|patient| visit.patient == patient)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let (items, total) = page.slice(matches);
        Paged::new(page, items, total)
    }

    /// The checker doctor's queue: registered visits whose
    /// consultation has been paid, oldest first.
    pub async fn pending_visits(&self) -> Vec<Visit> {
        let visits = self.visits.read().await;
        let mut queue: Vec<Visit> = visits
            .values()
            .filter(|visit| visit.status == VisitStatus::Registered && visit.paid)
            .cloned()
            .collect();
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        queue
    }

    /// Loads one visit with all of its related documents.
    pub async fn load_visit_with_relations(&self, id: Uuid) -> HcmsResult<VisitBundle> {
        let visit = self.visit(id).await.ok_or(HcmsError::NotFound("Visit"))?;
        let patient = self.patient(visit.patient).await;
        let checker_doctor = match visit.checker_doctor {
            Some(doctor) => self.user(doctor).await,
            None => None,
        };
        let main_doctor = match visit.main_doctor {
            Some(doctor) => self.user(doctor).await,
            None => None,
        };
        let lab_tests = self.tests_for_visit(id).await;
        let prescription = self.prescription_for_visit(id).await;
        let payments = self.payments_for_visit(id).await;
        Ok(VisitBundle {
            visit,
            patient,
            checker_doctor,
            main_doctor,
            lab_tests,
            prescription,
            payments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit() -> Visit {
        Visit::new(Uuid::new_v4(), "fever".to_string(), None)
    }

    #[tokio::test]
    async fn with_visit_mut_stamps_updated_at_on_success_only() {
        let store = DocumentStore::new();
        let doc = visit();
        let id = doc.id;
        let before = doc.updated_at;
        store.insert_visit(doc).await;

        let result: HcmsResult<()> = store
            .with_visit_mut(id, |_| Err(HcmsError::Validation("nope".to_string())))
            .await;
        assert!(result.is_err());
        let unchanged = store.visit(id).await.expect("Visit should exist");
        assert_eq!(unchanged.updated_at, before);

        store
            .with_visit_mut(id, |visit| {
                visit.paid = true;
                Ok(())
            })
            .await
            .expect("Mutation should succeed");
        let changed = store.visit(id).await.expect("Visit should exist");
        assert!(changed.paid);
        assert!(changed.updated_at >= before);
    }

    #[tokio::test]
    async fn with_visit_mut_reports_missing_visits() {
        let store = DocumentStore::new();
        let result: HcmsResult<()> =
            store.with_visit_mut(Uuid::new_v4(), |_| Ok(())).await;
        assert!(matches!(result, Err(HcmsError::NotFound("Visit"))));
    }

    #[tokio::test]
    async fn pending_visits_require_registered_and_paid() {
        let store = DocumentStore::new();
        let mut paid = visit();
        paid.paid = true;
        let paid_id = paid.id;
        let unpaid = visit();
        let mut advanced = visit();
        advanced.paid = true;
        advanced.status = VisitStatus::Checked;
        store.insert_visit(paid).await;
        store.insert_visit(unpaid).await;
        store.insert_visit(advanced).await;

        let queue = store.pending_visits().await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, paid_id);
    }

    #[tokio::test]
    async fn listing_filters_by_status_and_paid() {
        let store = DocumentStore::new();
        let mut done = visit();
        done.status = VisitStatus::Done;
        done.paid = true;
        store.insert_visit(done).await;
        store.insert_visit(visit()).await;

        let filter = VisitFilter {
            status: Some(VisitStatus::Done),
            paid: Some(true),
            patient: None,
        };
        let found = store.list_visits(filter, Page::default()).await;
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].status, VisitStatus::Done);
    }

    #[tokio::test]
    async fn bundle_resolves_missing_relations_to_none() {
        let store = DocumentStore::new();
        let doc = visit();
        let id = doc.id;
        store.insert_visit(doc).await;

        let bundle = store
            .load_visit_with_relations(id)
            .await
            .expect("Bundle should load");
        assert!(bundle.patient.is_none());
        assert!(bundle.checker_doctor.is_none());
        assert!(bundle.prescription.is_none());
        assert!(bundle.lab_tests.is_empty());
        assert!(bundle.payments.is_empty());
    }

    #[tokio::test]
    async fn bundle_for_unknown_visit_is_not_found() {
        let store = DocumentStore::new();
        let result = store.load_visit_with_relations(Uuid::new_v4()).await;
        assert!(matches!(result, Err(HcmsError::NotFound("Visit"))));
    }
}
