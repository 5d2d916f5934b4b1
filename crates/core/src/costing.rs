//! Billing arithmetic for visits.
//!
//! A visit's `total_cost` is a running sum that only ever grows:
//! consultation payments, ordered lab tests and prescribed medicines
//! each add to it through [`accrue`].

use std::collections::HashMap;

use crate::domain::{LabTest, MedicineLine};
use crate::error::{HcmsError, HcmsResult};

/// Total cost of a batch of ordered lab tests.
pub fn sum_lab_test_cost(tests: &[LabTest]) -> f64 {
    tests.iter().map(|test| test.cost).sum()
}

/// Total cost of prescribed medicine lines, priced from the inventory
/// snapshot in `prices`. Lines whose name is not in the inventory
/// contribute nothing.
pub fn sum_medicine_cost(lines: &[MedicineLine], prices: &HashMap<String, f64>) -> f64 {
    lines
        .iter()
        .map(|line| {
            prices.get(&line.name).copied().unwrap_or(0.0) * f64::from(line.quantity)
        })
        .sum()
}

/// Adds a billing delta to a running total. Deltas must be finite and
/// not negative so the total never decreases.
pub fn accrue(current: f64, delta: f64) -> HcmsResult<f64> {
    if !delta.is_finite() || delta < 0.0 {
        return Err(HcmsError::Validation(
            "Cost delta must be a non-negative number".to_string(),
        ));
    }
    Ok(current + delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabTestType;
    use uuid::Uuid;

    fn lab_test(cost: f64) -> LabTest {
        LabTest::new(Uuid::new_v4(), "CBC".to_string(), LabTestType::Blood, cost)
    }

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
    fn lab_costs_sum_over_the_batch() {
        let tests = [lab_test(25.0), lab_test(40.5)];
        assert_eq!(sum_lab_test_cost(&tests), 65.5);
    }

    #[test]
    fn medicine_costs_multiply_price_by_quantity() {
        let mut prices = HashMap::new();
        prices.insert("Paracetamol".to_string(), 0.5);
        prices.insert("Amoxicillin".to_string(), 1.25);
        let lines = [line("Paracetamol", 10), line("Amoxicillin", 4)];
        assert_eq!(sum_medicine_cost(&lines, &prices), 10.0);
    }

    #[test]
    fn unknown_medicines_cost_nothing() {
        let prices = HashMap::new();
        let lines = [line("Paracetamol", 10)];
        assert_eq!(sum_medicine_cost(&lines, &prices), 0.0);
    }

    #[test]
    fn accrue_adds_and_rejects_decreases() {
        let total = accrue(10.0, 5.5).expect("Positive delta should accrue");
        assert_eq!(total, 15.5);
        assert!(accrue(10.0, -1.0).is_err());
        assert!(accrue(10.0, f64::INFINITY).is_err());
    }
}
