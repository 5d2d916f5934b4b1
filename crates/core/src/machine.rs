//! The visit status state machine.
//!
//! Both the allowed status transitions and the roles permitted to
//! trigger them live here, in one place. Workflow operations and the
//! generic status update endpoint all call [`check_transition`] so
//! there is exactly one source of truth.
//!
//! ```text
//! registered -> checked | lab_pending | diagnosed
//! checked    -> lab_pending | diagnosed
//! lab_pending -> lab_done
//! lab_done   -> diagnosed
//! diagnosed  -> done
//! done       (terminal)
//! ```

use crate::domain::{Role, VisitStatus};
use crate::error::{HcmsError, HcmsResult};

/// Statuses a visit may move to from `from`.
pub fn allowed_targets(from: VisitStatus) -> &'static [VisitStatus] {
    match from {
        VisitStatus::Registered => &[
            VisitStatus::Checked,
            VisitStatus::LabPending,
            VisitStatus::Diagnosed,
        ],
        VisitStatus::Checked => &[VisitStatus::LabPending, VisitStatus::Diagnosed],
        VisitStatus::LabPending => &[VisitStatus::LabDone],
        VisitStatus::LabDone => &[VisitStatus::Diagnosed],
        VisitStatus::Diagnosed => &[VisitStatus::Done],
        VisitStatus::Done => &[],
    }
}

pub fn can_transition(from: VisitStatus, to: VisitStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Roles allowed to move a visit into `target`, regardless of the
/// current status. Admin is deliberately absent: workflow steps belong
/// to the staff that perform them.
pub fn permitted_roles(target: VisitStatus) -> &'static [Role] {
    match target {
        VisitStatus::Registered => &[Role::Reception],
        VisitStatus::Checked => &[Role::CheckerDoctor],
        VisitStatus::LabPending => &[Role::Reception, Role::CheckerDoctor],
        VisitStatus::LabDone => &[Role::LabTech],
        VisitStatus::Diagnosed => &[Role::MainDoctor, Role::CheckerDoctor],
        VisitStatus::Done => &[Role::Pharmacy],
    }
}

pub fn role_may_set(role: Role, target: VisitStatus) -> bool {
    permitted_roles(target).contains(&role)
}

/// Checks a requested transition: the role gate first, then the
/// transition graph. A caller that is both unauthorized and requesting
/// an impossible move is told about the authorization problem.
pub fn check_transition(role: Role, from: VisitStatus, to: VisitStatus) -> HcmsResult<()> {
    if !role_may_set(role, to) {
        return Err(HcmsError::ForbiddenTransition { role, target: to });
    }
    if !can_transition(from, to) {
        return Err(HcmsError::InvalidState(format!(
            "Cannot change status from {from} to {to}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_happy_path_through_the_lab_is_allowed() {
        assert!(can_transition(VisitStatus::Registered, VisitStatus::LabPending));
        assert!(can_transition(VisitStatus::LabPending, VisitStatus::LabDone));
        assert!(can_transition(VisitStatus::LabDone, VisitStatus::Diagnosed));
        assert!(can_transition(VisitStatus::Diagnosed, VisitStatus::Done));
    }

    #[test]
    fn direct_diagnosis_skips_the_lab() {
        assert!(can_transition(VisitStatus::Registered, VisitStatus::Checked));
        assert!(can_transition(VisitStatus::Registered, VisitStatus::Diagnosed));
        assert!(can_transition(VisitStatus::Checked, VisitStatus::Diagnosed));
    }

    #[test]
    fn done_is_terminal() {
        for target in VisitStatus::ALL {
            assert!(!can_transition(VisitStatus::Done, target));
        }
    }

    #[test]
    fn backwards_and_skipping_moves_are_rejected() {
        assert!(!can_transition(VisitStatus::LabPending, VisitStatus::Registered));
        assert!(!can_transition(VisitStatus::Registered, VisitStatus::LabDone));
        assert!(!can_transition(VisitStatus::LabPending, VisitStatus::Done));
        assert!(!can_transition(VisitStatus::Diagnosed, VisitStatus::LabPending));
    }

    #[test]
    fn every_status_has_an_owner_role() {
        for status in VisitStatus::ALL {
            assert!(!permitted_roles(status).is_empty());
        }
    }

    #[test]
    fn admin_is_not_part_of_the_workflow_matrix() {
        for status in VisitStatus::ALL {
            assert!(!role_may_set(Role::Admin, status));
        }
    }

    #[test]
    fn role_gate_is_reported_before_the_transition_graph() {
        // A lab tech asking for diagnosed from registered fails both
        // checks; the authorization error must win.
        let err = check_transition(
            Role::LabTech,
            VisitStatus::Registered,
            VisitStatus::Diagnosed,
        )
        .unwrap_err();
        assert!(matches!(err, HcmsError::ForbiddenTransition { .. }));
    }

    #[test]
    fn authorized_but_impossible_moves_are_invalid_state() {
        let err = check_transition(Role::LabTech, VisitStatus::Registered, VisitStatus::LabDone)
            .unwrap_err();
        assert!(matches!(err, HcmsError::InvalidState(_)));
    }

    #[test]
    fn pharmacy_may_only_finish_diagnosed_visits() {
        check_transition(Role::Pharmacy, VisitStatus::Diagnosed, VisitStatus::Done)
            .expect("Pharmacy should be able to finish a diagnosed visit");
        let err = check_transition(Role::MainDoctor, VisitStatus::Diagnosed, VisitStatus::Done)
            .unwrap_err();
        assert!(matches!(err, HcmsError::ForbiddenTransition { .. }));
    }
}
