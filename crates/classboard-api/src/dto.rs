//! Wire types exchanged with the backend.
//!
//! Statuses and types travel as the backend's display strings ("TO DO",
//! "WAIT FOR REVIEW", ...). The domain layer parses them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Container id that denotes the backlog in move and complete requests.
pub const BACKLOG_ID: u64 = 0;

/// Assignee id that clears the assignment in a patch.
pub const UNASSIGNED_ID: u64 = 0;

/// Work item status strings.
pub mod status {
    pub const TO_DO: &str = "TO DO";
    pub const IN_PROGRESS: &str = "IN PROGRESS";
    pub const WAIT_FOR_REVIEW: &str = "WAIT FOR REVIEW";
    pub const DONE: &str = "DONE";
}

/// Sprint status strings.
pub mod sprint_status {
    pub const INACTIVE: &str = "INACTIVE";
    pub const IN_PROGRESS: &str = "IN PROGRESS";
    pub const COMPLETED: &str = "COMPLETED";
}

/// Work item type strings.
pub mod item_type {
    pub const EPIC: &str = "Epic";
    pub const STORY: &str = "Story";
    pub const TASK: &str = "Task";
    pub const SUBTASK: &str = "Subtask";
}

/// Feedback kind strings.
pub mod feedback_kind {
    pub const APPROVE: &str = "APPROVE";
    pub const REJECT: &str = "REJECT";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemDto {
    pub id: u64,
    pub key: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub story_points: Option<f64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee: Option<PersonDto>,
    pub reporter: PersonDto,
    #[serde(default)]
    pub parent_item_id: Option<u64>,
    #[serde(default)]
    pub sprint_id: Option<u64>,
    #[serde(default)]
    pub num_of_sub_items: u32,
    #[serde(default)]
    pub parent_lecturer_work_item_id: Option<u64>,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintDto {
    pub id: u64,
    pub number: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub work_items: Vec<WorkItemDto>,
}

/// Sprints-with-items plus backlog items for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDto {
    pub sprints: Vec<SprintDto>,
    pub backlog_items: Vec<WorkItemDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicDto {
    pub id: u64,
    pub key: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintNameDto {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    pub reporter_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<u64>,
}

/// Partial update of a work item. Absent fields are left untouched.
///
/// `sprint_id == Some(BACKLOG_ID)` moves the item to the backlog and
/// `assignee_id == Some(UNASSIGNED_ID)` clears the assignee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_item_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<u64>,
}

impl WorkItemPatch {
    /// Patch that only relocates the item.
    pub fn move_to(sprint_id: Option<u64>) -> Self {
        Self {
            sprint_id: Some(sprint_id.unwrap_or(BACKLOG_ID)),
            ..Default::default()
        }
    }

    /// Patch that only changes the status.
    pub fn status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    /// True when the patch touches fields that are locked on
    /// lecturer-assigned items.
    pub fn touches_locked_fields(&self) -> bool {
        self.summary.is_some()
            || self.description.is_some()
            || self.story_points.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.parent_item_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDto {
    pub id: u64,
    pub work_item_id: u64,
    pub kind: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    pub author_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSprintRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSprintRequest {
    /// Target sprint id, or `BACKLOG_ID`.
    pub destination: u64,
}
