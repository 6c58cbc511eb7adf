use moat_core::{Criterion, CriterionStatus, MoatState, ECONOMIC_MOAT};

const PENDING_VALUE: &str = "Pending";

/// Replace the "Economic Moat" criterion's status and value with the current moat state.
///
/// All other criteria are passed through untouched and order is preserved. If there is
/// no "Economic Moat" entry the list comes back unchanged.
pub fn apply_moat_override(base: &[Criterion], state: &MoatState) -> Vec<Criterion> {
    base.iter()
        .map(|criterion| {
            if criterion.name == ECONOMIC_MOAT {
                override_moat(criterion, state)
            } else {
                criterion.clone()
            }
        })
        .collect()
}

fn override_moat(criterion: &Criterion, state: &MoatState) -> Criterion {
    let (status, value) = match state {
        MoatState::Evaluating => (CriterionStatus::Analyzing, PENDING_VALUE.to_string()),
        MoatState::NotEvaluated => (CriterionStatus::PendingEvaluation, PENDING_VALUE.to_string()),
        MoatState::Resolved(moat_type) => {
            let status = if moat_type.is_passing() {
                CriterionStatus::Pass
            } else {
                CriterionStatus::Fail
            };
            (status, moat_type.to_label().to_string())
        }
    };

    Criterion {
        name: criterion.name.clone(),
        status,
        value,
    }
}
