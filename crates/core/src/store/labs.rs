//! Lab test collection operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::LabTest;
use crate::error::{HcmsError, HcmsResult};

use super::DocumentStore;

/// The fields written when a lab tech submits a result.
#[derive(Debug, Clone)]
pub struct LabResultUpdate {
    pub result: String,
    pub file_url: Option<String>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
    pub completed_at: DateTime<Utc>,
}

impl DocumentStore {
    pub async fn insert_lab_test(&self, test: LabTest) {
        self.lab_tests.write().await.insert(test.id, test);
    }

    /// Removes a lab test again. Used to roll back orders whose visit
    /// update did not commit.
    pub async fn remove_lab_test(&self, id: Uuid) {
        self.lab_tests.write().await.remove(&id);
    }

    pub async fn lab_test(&self, id: Uuid) -> Option<LabTest> {
        self.lab_tests.read().await.get(&id).cloned()
    }

    /// Marks a test completed and records the result. The check and
    /// the write happen under one write lock, so of two concurrent
    /// submissions exactly one wins and the other sees
    /// [`HcmsError::AlreadyCompleted`].
    pub async fn complete_lab_test(
        &self,
        id: Uuid,
        update: LabResultUpdate,
    ) -> HcmsResult<LabTest> {
        let mut tests = self.lab_tests.write().await;
        let test = tests.get_mut(&id).ok_or(HcmsError::NotFound("Lab test"))?;
        if test.is_completed {
            return Err(HcmsError::AlreadyCompleted);
        }
        test.is_completed = true;
        test.result = Some(update.result);
        test.file_url = update.file_url;
        test.notes = update.notes;
        test.performed_by = Some(update.performed_by);
        test.completed_at = Some(update.completed_at);
        test.updated_at = Utc::now();
        Ok(test.clone())
    }

    /// All tests ordered for one visit, oldest first.
    pub async fn tests_for_visit(&self, visit: Uuid) -> Vec<LabTest> {
        let tests = self.lab_tests.read().await;
        let mut matches: Vec<LabTest> = tests
            .values()
            .filter(|test| test.visit == visit)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        matches
    }

    /// Recomputes completion over the full set of a visit's tests.
    /// A visit with no tests on file does not count as complete.
    pub async fn all_tests_completed(&self, visit: Uuid) -> bool {
        let tests = self.lab_tests.read().await;
        let mut any = false;
        for test in tests.values().filter(|test| test.visit == visit) {
            if !test.is_completed {
                return false;
            }
            any = true;
        }
        any
    }

    /// The lab work queue: incomplete tests, oldest first.
    pub async fn pending_lab_tests(&self) -> Vec<LabTest> {
        let tests = self.lab_tests.read().await;
        let mut queue: Vec<LabTest> = tests
            .values()
            .filter(|test| !test.is_completed)
            .cloned()
            .collect();
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabTestType;

    fn test_for(visit: Uuid) -> LabTest {
        LabTest::new(visit, "CBC".to_string(), LabTestType::Blood, 25.0)
    }

    fn update_by(tech: Uuid) -> LabResultUpdate {
        LabResultUpdate {
            result: "Within normal ranges".to_string(),
            file_url: None,
            notes: None,
            performed_by: tech,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn completing_a_test_records_the_result_once() {
        let store = DocumentStore::new();
        let visit = Uuid::new_v4();
        let tech = Uuid::new_v4();
        let test = test_for(visit);
        let id = test.id;
        store.insert_lab_test(test).await;

        let completed = store
            .complete_lab_test(id, update_by(tech))
            .await
            .expect("First completion should succeed");
        assert!(completed.is_completed);
        assert_eq!(completed.performed_by, Some(tech));

        let second = store.complete_lab_test(id, update_by(tech)).await;
        assert!(matches!(second, Err(HcmsError::AlreadyCompleted)));
    }

    #[tokio::test]
    async fn completion_recompute_covers_the_full_set() {
        let store = DocumentStore::new();
        let visit = Uuid::new_v4();
        let first = test_for(visit);
        let second = test_for(visit);
        let first_id = first.id;
        let second_id = second.id;
        store.insert_lab_test(first).await;
        store.insert_lab_test(second).await;

        assert!(!store.all_tests_completed(visit).await);
        store
            .complete_lab_test(first_id, update_by(Uuid::new_v4()))
            .await
            .expect("Completion should succeed");
        assert!(!store.all_tests_completed(visit).await);
        store
            .complete_lab_test(second_id, update_by(Uuid::new_v4()))
            .await
            .expect("Completion should succeed");
        assert!(store.all_tests_completed(visit).await);
    }

    #[tokio::test]
    async fn a_visit_with_no_tests_is_not_complete() {
        let store = DocumentStore::new();
        assert!(!store.all_tests_completed(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn the_work_queue_lists_only_incomplete_tests() {
        let store = DocumentStore::new();
        let visit = Uuid::new_v4();
        let open = test_for(visit);
        let closed = test_for(visit);
        let open_id = open.id;
        let closed_id = closed.id;
        store.insert_lab_test(open).await;
        store.insert_lab_test(closed).await;
        store
            .complete_lab_test(closed_id, update_by(Uuid::new_v4()))
            .await
            .expect("Completion should succeed");

        let queue = store.pending_lab_tests().await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, open_id);
    }
}
