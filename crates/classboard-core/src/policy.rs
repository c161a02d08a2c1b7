//! Status transition policy.
//!
//! TO DO, IN PROGRESS and WAIT FOR REVIEW are freely selectable. DONE is
//! terminal and only reachable through the leader's approval; a rejection
//! sends a reviewed item back to TO DO.

use crate::error::{BoardError, BoardResult};
use crate::work_item::{WorkItem, WorkItemStatus};

/// Status an item returns to when its review is rejected.
pub const REJECTED_STATUS: WorkItemStatus = WorkItemStatus::ToDo;

/// Role of the acting user on a group board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Leader,
    Member,
}

/// What a status-menu selection resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDecision {
    /// Same as the current status; nothing to send.
    Unchanged,
    /// Send this status to the backend.
    Apply(WorkItemStatus),
    /// Open the approval dialog instead of changing the status.
    RequiresApproval,
}

/// Status-menu options offered to an actor. DONE appears only for leaders,
/// where picking it opens the approval dialog.
pub fn menu_options(actor: Actor) -> &'static [WorkItemStatus] {
    match actor {
        Actor::Leader => &[
            WorkItemStatus::ToDo,
            WorkItemStatus::InProgress,
            WorkItemStatus::WaitForReview,
            WorkItemStatus::Done,
        ],
        Actor::Member => &[
            WorkItemStatus::ToDo,
            WorkItemStatus::InProgress,
            WorkItemStatus::WaitForReview,
        ],
    }
}

fn check_sub_items_done(item: &WorkItem, sub_items: &[&WorkItem]) -> BoardResult<()> {
    let open = sub_items.iter().filter(|s| !s.is_done()).count();
    if open > 0 {
        return Err(BoardError::OpenSubItems {
            key: item.key.clone(),
            open,
        });
    }
    Ok(())
}

/// Resolve a status-menu selection for `item`.
pub fn decide_status_change(
    item: &WorkItem,
    new_status: WorkItemStatus,
    actor: Actor,
    sub_items: &[&WorkItem],
) -> BoardResult<StatusDecision> {
    if new_status == item.status {
        return Ok(StatusDecision::Unchanged);
    }
    if item.is_done() {
        return Err(BoardError::InvalidStatusTransition {
            from: item.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
        });
    }
    if new_status != WorkItemStatus::Done {
        return Ok(StatusDecision::Apply(new_status));
    }

    check_sub_items_done(item, sub_items)?;
    match actor {
        Actor::Leader => Ok(StatusDecision::RequiresApproval),
        Actor::Member => Err(BoardError::NotPermitted(format!(
            "Only the group leader can mark {} as done",
            item.key
        ))),
    }
}

/// Check that `actor` may approve `item` now.
pub fn check_approval(item: &WorkItem, actor: Actor, sub_items: &[&WorkItem]) -> BoardResult<()> {
    if actor != Actor::Leader {
        return Err(BoardError::NotPermitted(
            "Only the group leader can approve work items".to_string(),
        ));
    }
    if item.is_done() {
        return Err(BoardError::InvalidStatusTransition {
            from: item.status.as_str().to_string(),
            to: WorkItemStatus::Done.as_str().to_string(),
        });
    }
    check_sub_items_done(item, sub_items)
}

/// Check that `actor` may reject `item`, returning the status it will take.
pub fn check_rejection(item: &WorkItem, actor: Actor) -> BoardResult<WorkItemStatus> {
    if actor != Actor::Leader {
        return Err(BoardError::NotPermitted(
            "Only the group leader can reject work items".to_string(),
        ));
    }
    if item.status != WorkItemStatus::WaitForReview {
        return Err(BoardError::InvalidStatusTransition {
            from: item.status.as_str().to_string(),
            to: REJECTED_STATUS.as_str().to_string(),
        });
    }
    Ok(REJECTED_STATUS)
}
