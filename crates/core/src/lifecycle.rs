//! The workflow engine.
//!
//! [`LifecycleService`] owns every write that moves a visit through
//! the clinic: registration, the checker assessment, lab results,
//! prescriptions, dispensing and payments. Each operation validates
//! its input, checks the acting role, re-checks document state under
//! the store's write lock and only then commits. Writes that span two
//! collections insert the dependent document first and roll it back
//! if the visit update does not commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::{
    MAX_DIAGNOSIS_LEN, MAX_DOSAGE_LEN, MAX_DURATION_LEN, MAX_INSTRUCTION_LEN,
    MAX_MEDICINE_NAME_LEN, MAX_RESULT_LEN, MAX_SHORT_NOTES_LEN, MAX_SYMPTOMS_LEN,
    MAX_TEST_NAME_LEN, MAX_TRANSACTION_ID_LEN, MAX_VISIT_NOTES_LEN,
};
use crate::costing;
use crate::domain::{
    Actor, LabTest, LabTestType, MedicineLine, Payment, PaymentMethod, PaymentType,
    PharmacyStatus, Prescription, Role, Visit, VisitStatus,
};
use crate::error::{HcmsError, HcmsResult};
use crate::machine;
use crate::notify::{NotificationEvent, Notifier, VisitNotice};
use crate::store::{DocumentStore, LabResultUpdate, StockDemand};
use crate::validation;

/// Request to register a new visit.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub patient: Uuid,
    pub complaint: String,
    pub visit_date: Option<DateTime<Utc>>,
}

/// One lab test the checker doctor orders.
#[derive(Debug, Clone)]
pub struct LabTestOrder {
    pub test_name: String,
    pub test_type: LabTestType,
    pub cost: f64,
}

/// The checker doctor's assessment: symptoms plus any lab orders.
#[derive(Debug, Clone)]
pub struct CheckerAssessment {
    pub symptoms: Option<String>,
    pub lab_tests: Vec<LabTestOrder>,
}

/// The checker doctor's shortcut for simple cases: no lab work, and
/// optionally a diagnosis on the spot.
#[derive(Debug, Clone)]
pub struct DirectAssessment {
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
}

/// A lab result submission.
#[derive(Debug, Clone)]
pub struct LabCompletion {
    pub result: String,
    pub file_url: Option<String>,
    pub notes: Option<String>,
}

/// One line of a new prescription.
#[derive(Debug, Clone)]
pub struct PrescriptionLine {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    pub instruction: Option<String>,
    pub quantity: u32,
}

/// Request to write a prescription for a visit.
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub visit: Uuid,
    pub medicines: Vec<PrescriptionLine>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
}

/// One medicine handed out during a partial dispense.
#[derive(Debug, Clone)]
pub struct DispensedLine {
    pub name: String,
    pub quantity: u32,
}

/// Request to hand out part of a prescription.
#[derive(Debug, Clone)]
pub struct PartialDispense {
    pub dispensed_medicines: Vec<DispensedLine>,
    pub notes: Option<String>,
}

/// Request to record a payment against a visit.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub visit: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// The workflow engine. Cheap to clone; shares the store and the
/// notifier.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<DocumentStore>,
    notifier: Arc<dyn Notifier>,
}

fn require_role(actor: Actor, allowed: &[Role]) -> HcmsResult<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(HcmsError::Forbidden { role: actor.role })
    }
}

impl LifecycleService {
    pub fn new(store: Arc<DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Registers a new visit for an existing patient and notifies the
    /// checker doctors.
    pub async fn create_visit(&self, actor: Actor, request: NewVisit) -> HcmsResult<Visit> {
        require_role(actor, &[Role::Reception, Role::Admin])?;
        let complaint = validation::complaint(&request.complaint)?;
        let patient = self
            .store
            .patient(request.patient)
            .await
            .ok_or(HcmsError::NotFound("Patient"))?;

        let visit = Visit::new(patient.id, complaint, request.visit_date);
        self.store.insert_visit(visit.clone()).await;
        tracing::info!(visit = %visit.id, patient = %patient.id, "visit registered");

        let notice = VisitNotice::from_visit(&visit, patient.full_name());
        self.notifier
            .notify(Role::CheckerDoctor, NotificationEvent::NewVisit(notice));
        Ok(visit)
    }

    /// Records the checker doctor's assessment. Ordering lab tests
    /// moves the visit to `lab_pending`; an assessment without tests
    /// moves it to `checked`. Test costs accrue on the visit.
    pub async fn record_checker_assessment(
        &self,
        actor: Actor,
        visit_id: Uuid,
        assessment: CheckerAssessment,
    ) -> HcmsResult<(Visit, Vec<LabTest>)> {
        require_role(actor, &[Role::CheckerDoctor])?;
        let symptoms =
            validation::optional_text("Symptoms", assessment.symptoms.as_deref(), MAX_SYMPTOMS_LEN)?;
        let mut orders = Vec::with_capacity(assessment.lab_tests.len());
        for order in assessment.lab_tests {
            let name = validation::required_text("Test name", &order.test_name, MAX_TEST_NAME_LEN)?;
            validation::amount("Lab test cost", order.cost)?;
            orders.push((name, order.test_type, order.cost));
        }

        let current = self
            .store
            .visit(visit_id)
            .await
            .ok_or(HcmsError::NotFound("Visit"))?;
        if current.status != VisitStatus::Registered {
            return Err(HcmsError::InvalidState(
                "Visit is not in registered status".to_string(),
            ));
        }

        let tests: Vec<LabTest> = orders
            .into_iter()
            .map(|(name, test_type, cost)| LabTest::new(visit_id, name, test_type, cost))
            .collect();
        for test in &tests {
            self.store.insert_lab_test(test.clone()).await;
        }

        let delta = costing::sum_lab_test_cost(&tests);
        let ordered_ids: Vec<Uuid> = tests.iter().map(|test| test.id).collect();
        let target = if tests.is_empty() {
            VisitStatus::Checked
        } else {
            VisitStatus::LabPending
        };

        let updated = self
            .store
            .with_visit_mut(visit_id, move |visit| {
                if visit.status != VisitStatus::Registered {
                    return Err(HcmsError::InvalidState(
                        "Visit is not in registered status".to_string(),
                    ));
                }
                visit.symptoms = symptoms;
                visit.checker_doctor = Some(actor.id);
                visit.lab_tests.extend(ordered_ids);
                visit.total_cost = costing::accrue(visit.total_cost, delta)?;
                visit.status = target;
                Ok(visit.clone())
            })
            .await;

        match updated {
            Ok(visit) => {
                tracing::info!(
                    visit = %visit.id,
                    tests = tests.len(),
                    status = %visit.status,
                    "checker assessment recorded"
                );
                Ok((visit, tests))
            }
            Err(err) => {
                // The visit update lost a race; take the orders back out.
                for test in &tests {
                    self.store.remove_lab_test(test.id).await;
                }
                Err(err)
            }
        }
    }

    /// Records an assessment for a case that needs no lab work. With a
    /// diagnosis the visit jumps straight to `diagnosed`, otherwise it
    /// lands on `checked`.
    pub async fn record_checker_direct(
        &self,
        actor: Actor,
        visit_id: Uuid,
        assessment: DirectAssessment,
    ) -> HcmsResult<Visit> {
        require_role(actor, &[Role::CheckerDoctor])?;
        let symptoms =
            validation::optional_text("Symptoms", assessment.symptoms.as_deref(), MAX_SYMPTOMS_LEN)?;
        let diagnosis = validation::optional_text(
            "Diagnosis",
            assessment.diagnosis.as_deref(),
            MAX_DIAGNOSIS_LEN,
        )?;

        let target = if diagnosis.is_some() {
            VisitStatus::Diagnosed
        } else {
            VisitStatus::Checked
        };
        let visit = self
            .store
            .with_visit_mut(visit_id, move |visit| {
                if visit.status != VisitStatus::Registered {
                    return Err(HcmsError::InvalidState(
                        "Visit is not in registered status".to_string(),
                    ));
                }
                visit.symptoms = symptoms;
                visit.checker_doctor = Some(actor.id);
                if let Some(diagnosis) = diagnosis {
                    visit.diagnosis = Some(diagnosis);
                }
                visit.status = target;
                Ok(visit.clone())
            })
            .await?;
        tracing::info!(visit = %visit.id, status = %visit.status, "direct assessment recorded");
        Ok(visit)
    }

    /// Submits a lab result. The first submission wins; once every
    /// test of the visit has a result the visit advances to
    /// `lab_done`.
    pub async fn complete_lab_test(
        &self,
        actor: Actor,
        lab_test_id: Uuid,
        completion: LabCompletion,
    ) -> HcmsResult<LabTest> {
        require_role(actor, &[Role::LabTech])?;
        let result = validation::required_text("Result", &completion.result, MAX_RESULT_LEN)?;
        let notes =
            validation::optional_text("Notes", completion.notes.as_deref(), MAX_SHORT_NOTES_LEN)?;

        let update = LabResultUpdate {
            result,
            file_url: completion.file_url,
            notes,
            performed_by: actor.id,
            completed_at: Utc::now(),
        };
        let test = self.store.complete_lab_test(lab_test_id, update).await?;
        tracing::info!(test = %test.id, visit = %test.visit, "lab result recorded");

        if self.store.all_tests_completed(test.visit).await {
            self.store
                .with_visit_mut(test.visit, |visit| {
                    match visit.status {
                        VisitStatus::LabPending => visit.status = VisitStatus::LabDone,
                        // A concurrent completion already advanced it.
                        VisitStatus::LabDone => {}
                        other => {
                            tracing::warn!(
                                visit = %visit.id,
                                status = %other,
                                "all lab tests complete but visit is not awaiting labs"
                            );
                        }
                    }
                    Ok(())
                })
                .await?;
        }
        Ok(test)
    }

    /// Writes a prescription for a visit whose lab work is finished.
    /// Lines are priced from the inventory at write time; the total
    /// accrues on the visit and the visit moves to `diagnosed`.
    pub async fn create_prescription(
        &self,
        actor: Actor,
        request: NewPrescription,
    ) -> HcmsResult<(Prescription, Visit)> {
        require_role(actor, &[Role::MainDoctor])?;
        if request.medicines.is_empty() {
            return Err(HcmsError::Validation(
                "At least one medicine is required".to_string(),
            ));
        }
        let diagnosis =
            validation::optional_text("Diagnosis", request.diagnosis.as_deref(), MAX_DIAGNOSIS_LEN)?;
        let notes =
            validation::optional_text("Notes", request.notes.as_deref(), MAX_SHORT_NOTES_LEN)?;
        let mut lines = Vec::with_capacity(request.medicines.len());
        for line in request.medicines {
            let name =
                validation::required_text("Medicine name", &line.name, MAX_MEDICINE_NAME_LEN)?;
            let dosage = validation::required_text("Dosage", &line.dosage, MAX_DOSAGE_LEN)?;
            let duration = validation::required_text("Duration", &line.duration, MAX_DURATION_LEN)?;
            let instruction = validation::optional_text(
                "Instruction",
                line.instruction.as_deref(),
                MAX_INSTRUCTION_LEN,
            )?;
            validation::quantity("Quantity", line.quantity)?;
            lines.push(MedicineLine {
                name,
                dosage,
                duration,
                instruction,
                quantity: line.quantity,
                dispensed_quantity: 0,
            });
        }

        let current = self
            .store
            .visit(request.visit)
            .await
            .ok_or(HcmsError::NotFound("Visit"))?;
        if current.status != VisitStatus::LabDone {
            return Err(HcmsError::InvalidState(
                "Visit is not ready for prescription".to_string(),
            ));
        }

        let names: Vec<String> = lines.iter().map(|line| line.name.clone()).collect();
        let prices = self.store.prices_for(&names).await;
        let total = costing::sum_medicine_cost(&lines, &prices);
        let prescription = Prescription::new(request.visit, actor.id, lines, notes, total);
        self.store.insert_prescription(prescription.clone()).await;

        let updated = self
            .store
            .with_visit_mut(request.visit, move |visit| {
                if visit.status != VisitStatus::LabDone {
                    return Err(HcmsError::InvalidState(
                        "Visit is not ready for prescription".to_string(),
                    ));
                }
                if let Some(diagnosis) = diagnosis {
                    visit.diagnosis = Some(diagnosis);
                }
                visit.main_doctor = Some(actor.id);
                visit.total_cost = costing::accrue(visit.total_cost, total)?;
                visit.status = VisitStatus::Diagnosed;
                Ok(visit.clone())
            })
            .await;

        match updated {
            Ok(visit) => {
                tracing::info!(
                    prescription = %prescription.id,
                    visit = %visit.id,
                    total,
                    "prescription written"
                );
                Ok((prescription, visit))
            }
            Err(err) => {
                self.store.remove_prescription(prescription.id).await;
                Err(err)
            }
        }
    }

    /// Hands out a whole prescription. Stock for every line is
    /// decremented in one all-or-nothing step before the prescription
    /// is marked dispensed and the visit finishes.
    pub async fn dispense_prescription(
        &self,
        actor: Actor,
        prescription_id: Uuid,
        notes: Option<String>,
    ) -> HcmsResult<Prescription> {
        require_role(actor, &[Role::Pharmacy])?;
        let notes = validation::optional_text("Notes", notes.as_deref(), MAX_SHORT_NOTES_LEN)?;

        let current = self
            .store
            .prescription(prescription_id)
            .await
            .ok_or(HcmsError::NotFound("Prescription"))?;
        if current.pharmacy_status == PharmacyStatus::Dispensed {
            return Err(HcmsError::AlreadyDispensed);
        }

        let demands: Vec<StockDemand> = current
            .medicines
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| StockDemand {
                name: line.name.clone(),
                quantity: line.quantity,
            })
            .collect();
        self.store.dispense_stock(&demands).await?;

        let updated = self
            .store
            .with_prescription_mut(prescription_id, move |prescription| {
                if prescription.pharmacy_status == PharmacyStatus::Dispensed {
                    return Err(HcmsError::AlreadyDispensed);
                }
                for line in &mut prescription.medicines {
                    line.dispensed_quantity += line.quantity;
                    line.quantity = 0;
                }
                prescription.pharmacy_status = PharmacyStatus::Dispensed;
                prescription.dispensed_by = Some(actor.id);
                prescription.dispensed_at = Some(Utc::now());
                if let Some(notes) = notes {
                    prescription.notes = Some(notes);
                }
                Ok(prescription.clone())
            })
            .await;
        let prescription = match updated {
            Ok(prescription) => prescription,
            Err(err) => {
                self.store.restore_stock(&demands).await;
                return Err(err);
            }
        };

        self.finish_visit(prescription.visit).await?;
        tracing::info!(
            prescription = %prescription.id,
            visit = %prescription.visit,
            "prescription dispensed"
        );
        Ok(prescription)
    }

    /// Hands out part of a prescription. Requested quantities are
    /// capped by what each line still owes; the prescription becomes
    /// `partially_dispensed`, or `dispensed` when nothing is left.
    pub async fn partial_dispense_prescription(
        &self,
        actor: Actor,
        prescription_id: Uuid,
        request: PartialDispense,
    ) -> HcmsResult<Prescription> {
        require_role(actor, &[Role::Pharmacy])?;
        let notes =
            validation::optional_text("Notes", request.notes.as_deref(), MAX_SHORT_NOTES_LEN)?;
        if request.dispensed_medicines.is_empty() {
            return Err(HcmsError::Validation(
                "At least one medicine is required".to_string(),
            ));
        }
        for (index, entry) in request.dispensed_medicines.iter().enumerate() {
            validation::quantity("Dispense quantity", entry.quantity)?;
            if request.dispensed_medicines[..index]
                .iter()
                .any(|earlier| earlier.name == entry.name)
            {
                return Err(HcmsError::Validation(format!(
                    "Duplicate medicine in dispense list: {}",
                    entry.name
                )));
            }
        }

        let current = self
            .store
            .prescription(prescription_id)
            .await
            .ok_or(HcmsError::NotFound("Prescription"))?;
        if current.pharmacy_status == PharmacyStatus::Dispensed {
            return Err(HcmsError::AlreadyDispensed);
        }

        let mut demands = Vec::new();
        for entry in &request.dispensed_medicines {
            // Names not on the prescription are ignored.
            let Some(line) = current.medicines.iter().find(|line| line.name == entry.name)
            else {
                continue;
            };
            if entry.quantity > line.quantity {
                return Err(HcmsError::Validation(format!(
                    "Cannot dispense {} of {}; only {} remaining",
                    entry.quantity, entry.name, line.quantity
                )));
            }
            demands.push(StockDemand {
                name: entry.name.clone(),
                quantity: entry.quantity,
            });
        }
        if demands.is_empty() {
            return Err(HcmsError::Validation(
                "No prescribed medicines match the dispense list".to_string(),
            ));
        }
        self.store.dispense_stock(&demands).await?;

        let taken = demands.clone();
        let updated = self
            .store
            .with_prescription_mut(prescription_id, move |prescription| {
                if prescription.pharmacy_status == PharmacyStatus::Dispensed {
                    return Err(HcmsError::AlreadyDispensed);
                }
                for entry in &taken {
                    if let Some(line) = prescription
                        .medicines
                        .iter_mut()
                        .find(|line| line.name == entry.name)
                    {
                        let take = entry.quantity.min(line.quantity);
                        line.quantity -= take;
                        line.dispensed_quantity += take;
                    }
                }
                prescription.dispensed_by = Some(actor.id);
                if prescription.fully_dispensed() {
                    prescription.pharmacy_status = PharmacyStatus::Dispensed;
                    prescription.dispensed_at = Some(Utc::now());
                } else {
                    prescription.pharmacy_status = PharmacyStatus::PartiallyDispensed;
                }
                if let Some(notes) = notes {
                    prescription.notes = Some(notes);
                }
                Ok(prescription.clone())
            })
            .await;
        let prescription = match updated {
            Ok(prescription) => prescription,
            Err(err) => {
                self.store.restore_stock(&demands).await;
                return Err(err);
            }
        };

        if prescription.pharmacy_status == PharmacyStatus::Dispensed {
            self.finish_visit(prescription.visit).await?;
        }
        tracing::info!(
            prescription = %prescription.id,
            status = ?prescription.pharmacy_status,
            "partial dispense recorded"
        );
        Ok(prescription)
    }

    /// Records a payment against a visit. The amount accrues on the
    /// visit's total and the visit counts as paid from then on.
    pub async fn record_payment(&self, actor: Actor, request: NewPayment) -> HcmsResult<Payment> {
        require_role(actor, &[Role::Reception, Role::Admin])?;
        validation::amount("Amount", request.amount)?;
        let transaction_id = validation::optional_text(
            "Transaction id",
            request.transaction_id.as_deref(),
            MAX_TRANSACTION_ID_LEN,
        )?;
        let notes =
            validation::optional_text("Notes", request.notes.as_deref(), MAX_SHORT_NOTES_LEN)?;
        if self.store.visit(request.visit).await.is_none() {
            return Err(HcmsError::NotFound("Visit"));
        }

        let payment = Payment::new(
            request.visit,
            request.amount,
            request.payment_type,
            request.payment_method,
            actor.id,
            transaction_id,
            notes,
        );
        self.store.insert_payment(payment.clone()).await;

        let amount = payment.amount;
        let applied = self
            .store
            .with_visit_mut(request.visit, move |visit| {
                visit.total_cost = costing::accrue(visit.total_cost, amount)?;
                visit.paid = true;
                Ok(())
            })
            .await;
        if let Err(err) = applied {
            self.store.remove_payment(payment.id).await;
            return Err(err);
        }
        tracing::info!(payment = %payment.id, visit = %payment.visit, amount, "payment recorded");
        Ok(payment)
    }

    /// Confirms a deferred payment. Confirmation happens once; the
    /// visit counts as paid afterwards.
    pub async fn confirm_payment(&self, actor: Actor, payment_id: Uuid) -> HcmsResult<Payment> {
        require_role(actor, &[Role::Reception, Role::Admin])?;
        let payment = self
            .store
            .with_payment_mut(payment_id, |payment| {
                if payment.is_paid {
                    return Err(HcmsError::AlreadyConfirmed);
                }
                payment.is_paid = true;
                payment.paid_at = Some(Utc::now());
                Ok(payment.clone())
            })
            .await?;
        self.store
            .with_visit_mut(payment.visit, |visit| {
                visit.paid = true;
                Ok(())
            })
            .await?;
        tracing::info!(payment = %payment.id, visit = %payment.visit, "payment confirmed");
        Ok(payment)
    }

    /// Moves a visit to an explicit target status, enforcing both the
    /// role matrix and the transition graph.
    pub async fn update_visit_status(
        &self,
        actor: Actor,
        visit_id: Uuid,
        target: VisitStatus,
        notes: Option<String>,
    ) -> HcmsResult<Visit> {
        let notes = validation::optional_text("Notes", notes.as_deref(), MAX_VISIT_NOTES_LEN)?;
        let visit = self
            .store
            .with_visit_mut(visit_id, move |visit| {
                machine::check_transition(actor.role, visit.status, target)?;
                visit.status = target;
                if let Some(notes) = notes {
                    visit.notes = Some(notes);
                }
                Ok(visit.clone())
            })
            .await?;
        tracing::info!(visit = %visit.id, status = %visit.status, role = %actor.role, "visit status updated");
        Ok(visit)
    }

    /// Finishes a visit after its prescription was fully dispensed.
    /// Idempotent: a visit that is already done stays done.
    async fn finish_visit(&self, visit_id: Uuid) -> HcmsResult<()> {
        self.store
            .with_visit_mut(visit_id, |visit| {
                match visit.status {
                    VisitStatus::Diagnosed => visit.status = VisitStatus::Done,
                    VisitStatus::Done => {}
                    other => {
                        tracing::warn!(
                            visit = %visit.id,
                            status = %other,
                            "prescription dispensed while visit was not diagnosed"
                        );
                    }
                }
                Ok(())
            })
            .await
    }
}
