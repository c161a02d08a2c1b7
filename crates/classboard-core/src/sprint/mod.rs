//! Sprint lifecycle rules.

pub mod model;

pub use model::{Destination, Sprint, SprintPlan, SprintStatus};

use crate::error::{BoardError, BoardResult};

fn check_transition(sprint: &Sprint, to: SprintStatus) -> BoardResult<()> {
    if !sprint.status.can_transition_to(&to) {
        return Err(BoardError::InvalidSprintTransition {
            from: sprint.status.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }
    Ok(())
}

/// A sprint starts from INACTIVE, with at least one item and a forward
/// date range.
pub fn validate_start(sprint: &Sprint, plan: &SprintPlan) -> BoardResult<()> {
    check_transition(sprint, SprintStatus::InProgress)?;
    if sprint.work_items.is_empty() {
        return Err(BoardError::validation(format!(
            "{} has no work items to start with",
            sprint.display_name()
        )));
    }
    if plan.end_date <= plan.start_date {
        return Err(BoardError::validation("End date must be after start date"));
    }
    Ok(())
}

/// A sprint completes from IN PROGRESS into the backlog or another open
/// sprint.
pub fn validate_complete(
    sprint: &Sprint,
    destination: Destination,
    target: Option<&Sprint>,
) -> BoardResult<()> {
    check_transition(sprint, SprintStatus::Completed)?;
    match (destination, target) {
        (Destination::Backlog, _) => Ok(()),
        (Destination::Sprint(id), _) if id == sprint.id => Err(BoardError::validation(
            "Remaining items cannot move into the sprint being completed",
        )),
        (Destination::Sprint(id), None) => Err(BoardError::SprintNotFound(id)),
        (Destination::Sprint(_), Some(target)) if target.is_completed() => {
            Err(BoardError::validation(format!(
                "{} is already completed",
                target.display_name()
            )))
        }
        _ => Ok(()),
    }
}
