//! Work item rules checked before a request is sent.

pub mod model;

pub use model::{
    AssigneeChange, Person, WorkItem, WorkItemDraft, WorkItemEdit, WorkItemStatus, WorkItemType,
};

use chrono::{DateTime, Utc};

use crate::error::{BoardError, BoardResult};

/// End must not precede start when both are given.
pub fn validate_dates(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> BoardResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(BoardError::validation(
                "End date must not be before start date",
            ));
        }
    }
    Ok(())
}

pub fn validate_story_points(points: Option<f64>) -> BoardResult<()> {
    match points {
        Some(p) if !p.is_finite() || p < 0.0 => Err(BoardError::validation(
            "Story points must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

/// Check the parent of an item of `item_type`. `parent` is the resolved
/// parent item when one was requested.
pub fn check_parent(item_type: WorkItemType, parent: Option<&WorkItem>) -> BoardResult<()> {
    match (item_type.parent_type(), parent) {
        (None, Some(_)) => Err(BoardError::validation("An epic cannot have a parent")),
        (Some(_), None) if item_type.requires_parent() => {
            Err(BoardError::validation("A subtask needs a parent task"))
        }
        (Some(expected), Some(parent)) if parent.item_type != expected => {
            Err(BoardError::validation(format!(
                "A {} must have a parent of type {}, but {} is a {}",
                item_type.as_str().to_lowercase(),
                expected.as_str(),
                parent.key,
                parent.item_type.as_str()
            )))
        }
        _ => Ok(()),
    }
}

pub fn validate_draft(draft: &WorkItemDraft) -> BoardResult<()> {
    if draft.summary.trim().is_empty() {
        return Err(BoardError::validation("Summary is required"));
    }
    validate_story_points(draft.story_points)?;
    validate_dates(draft.start_date, draft.end_date)
}

/// Lecturer-assigned items can never be deleted by students.
pub fn check_deletable(item: &WorkItem) -> BoardResult<()> {
    if item.is_lecturer_assigned() {
        return Err(BoardError::LecturerAssigned {
            key: item.key.clone(),
            action: "deleted",
        });
    }
    Ok(())
}

/// Validate a detail edit against the current item.
pub fn check_edit(item: &WorkItem, edit: &WorkItemEdit) -> BoardResult<()> {
    if item.is_lecturer_assigned() && edit.touches_locked_fields() {
        return Err(BoardError::LecturerAssigned {
            key: item.key.clone(),
            action: "edited",
        });
    }
    if let Some(summary) = &edit.summary {
        if summary.trim().is_empty() {
            return Err(BoardError::validation("Summary is required"));
        }
    }
    validate_story_points(edit.story_points)?;
    validate_dates(
        edit.start_date.or(item.start_date),
        edit.end_date.or(item.end_date),
    )?;
    if edit.parent_item_id == Some(item.id) {
        return Err(BoardError::validation("An item cannot be its own parent"));
    }
    Ok(())
}
