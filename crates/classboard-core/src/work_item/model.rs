//! Work item domain models.

use chrono::{DateTime, Utc};
use classboard_api::dto::{self, NewWorkItem, PersonDto, WorkItemDto, WorkItemPatch};
use serde::{Deserialize, Serialize};

use crate::board::Container;
use crate::error::{BoardError, BoardResult};

/// Kind of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemType {
    Epic,
    Story,
    Task,
    Subtask,
}

impl WorkItemType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "epic" => Some(Self::Epic),
            "story" => Some(Self::Story),
            "task" => Some(Self::Task),
            "subtask" | "sub-task" => Some(Self::Subtask),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => dto::item_type::EPIC,
            Self::Story => dto::item_type::STORY,
            Self::Task => dto::item_type::TASK,
            Self::Subtask => dto::item_type::SUBTASK,
        }
    }

    /// Type a parent must have, if this type may have one.
    pub fn parent_type(&self) -> Option<Self> {
        match self {
            Self::Epic => None,
            Self::Story | Self::Task => Some(Self::Epic),
            Self::Subtask => Some(Self::Task),
        }
    }

    /// Whether a parent is mandatory.
    pub fn requires_parent(&self) -> bool {
        matches!(self, Self::Subtask)
    }
}

/// Work item status (board workflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemStatus {
    ToDo,
    InProgress,
    WaitForReview,
    Done,
}

impl WorkItemStatus {
    pub const ALL: [Self; 4] = [Self::ToDo, Self::InProgress, Self::WaitForReview, Self::Done];

    /// Parse the wire string, also accepting snake_case spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            dto::status::TO_DO | "TODO" => Some(Self::ToDo),
            dto::status::IN_PROGRESS => Some(Self::InProgress),
            dto::status::WAIT_FOR_REVIEW | "REVIEW" => Some(Self::WaitForReview),
            dto::status::DONE => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => dto::status::TO_DO,
            Self::InProgress => dto::status::IN_PROGRESS,
            Self::WaitForReview => dto::status::WAIT_FOR_REVIEW,
            Self::Done => dto::status::DONE,
        }
    }
}

impl std::fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

impl From<PersonDto> for Person {
    fn from(dto: PersonDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

/// An Epic, Story, Task or Subtask on a group board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    pub key: String,
    pub item_type: WorkItemType,
    pub summary: String,
    pub description: Option<String>,
    pub status: WorkItemStatus,
    pub story_points: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub assignee: Option<Person>,
    pub reporter: Person,
    pub parent_item_id: Option<u64>,
    pub sprint_id: Option<u64>,
    pub num_of_sub_items: u32,
    pub parent_lecturer_work_item_id: Option<u64>,
    pub approved: bool,
}

impl WorkItem {
    /// Create a WorkItem from its wire form.
    pub fn from_dto(dto: WorkItemDto) -> BoardResult<Self> {
        let item_type = WorkItemType::parse(&dto.item_type).ok_or_else(|| {
            BoardError::Malformed(format!("{} has unknown type '{}'", dto.key, dto.item_type))
        })?;
        let status = WorkItemStatus::parse(&dto.status).ok_or_else(|| {
            BoardError::Malformed(format!("{} has unknown status '{}'", dto.key, dto.status))
        })?;

        Ok(Self {
            id: dto.id,
            key: dto.key,
            item_type,
            summary: dto.summary,
            description: dto.description,
            status,
            story_points: dto.story_points,
            start_date: dto.start_date,
            end_date: dto.end_date,
            assignee: dto.assignee.map(Person::from),
            reporter: dto.reporter.into(),
            parent_item_id: dto.parent_item_id,
            sprint_id: dto.sprint_id,
            num_of_sub_items: dto.num_of_sub_items,
            parent_lecturer_work_item_id: dto.parent_lecturer_work_item_id,
            approved: dto.approved,
        })
    }

    /// Items copied from a lecturer assignment are read-mostly.
    pub fn is_lecturer_assigned(&self) -> bool {
        self.parent_lecturer_work_item_id.is_some()
    }

    pub fn container(&self) -> Container {
        Container::from_sprint_id(self.sprint_id)
    }

    pub fn is_done(&self) -> bool {
        self.status == WorkItemStatus::Done
    }
}

/// Input for creating a work item. The reporter is always the session user.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemDraft {
    pub item_type: WorkItemType,
    pub summary: String,
    pub description: Option<String>,
    pub story_points: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<u64>,
    pub parent_item_id: Option<u64>,
    pub sprint_id: Option<u64>,
}

impl WorkItemDraft {
    pub fn new(item_type: WorkItemType, summary: impl Into<String>) -> Self {
        Self {
            item_type,
            summary: summary.into(),
            description: None,
            story_points: None,
            start_date: None,
            end_date: None,
            assignee_id: None,
            parent_item_id: None,
            sprint_id: None,
        }
    }

    pub fn with_parent(mut self, parent_item_id: u64) -> Self {
        self.parent_item_id = Some(parent_item_id);
        self
    }

    pub fn in_sprint(mut self, sprint_id: u64) -> Self {
        self.sprint_id = Some(sprint_id);
        self
    }

    pub fn into_request(self, reporter_id: u64) -> NewWorkItem {
        NewWorkItem {
            item_type: self.item_type.as_str().to_string(),
            summary: self.summary.trim().to_string(),
            description: self.description,
            story_points: self.story_points,
            start_date: self.start_date,
            end_date: self.end_date,
            assignee_id: self.assignee_id,
            reporter_id,
            parent_item_id: self.parent_item_id,
            sprint_id: self.sprint_id,
        }
    }
}

/// Assignee change in a detail edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeChange {
    Assign(u64),
    Unassign,
}

/// Detail edit of an existing item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemEdit {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub story_points: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub parent_item_id: Option<u64>,
    pub assignee: Option<AssigneeChange>,
}

impl WorkItemEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields that lecturer-assigned items do not allow students to change.
    pub fn touches_locked_fields(&self) -> bool {
        self.summary.is_some()
            || self.description.is_some()
            || self.story_points.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.parent_item_id.is_some()
    }

    pub fn into_patch(self) -> WorkItemPatch {
        WorkItemPatch {
            summary: self.summary.map(|s| s.trim().to_string()),
            description: self.description,
            status: None,
            story_points: self.story_points,
            start_date: self.start_date,
            end_date: self.end_date,
            assignee_id: self.assignee.map(|change| match change {
                AssigneeChange::Assign(id) => id,
                AssigneeChange::Unassign => dto::UNASSIGNED_ID,
            }),
            parent_item_id: self.parent_item_id,
            sprint_id: None,
        }
    }
}
