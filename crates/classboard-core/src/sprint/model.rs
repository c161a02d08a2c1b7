//! Sprint domain models.

use chrono::{DateTime, Utc};
use classboard_api::dto::{self, SprintDto, StartSprintRequest};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};
use crate::work_item::WorkItem;

/// Sprint lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SprintStatus {
    Inactive,
    InProgress,
    Completed,
}

impl SprintStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            dto::sprint_status::INACTIVE => Some(Self::Inactive),
            dto::sprint_status::IN_PROGRESS => Some(Self::InProgress),
            dto::sprint_status::COMPLETED => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => dto::sprint_status::INACTIVE,
            Self::InProgress => dto::sprint_status::IN_PROGRESS,
            Self::Completed => dto::sprint_status::COMPLETED,
        }
    }

    /// Lifecycle only moves forward, one step at a time.
    pub fn can_transition_to(&self, to: &Self) -> bool {
        matches!(
            (self, to),
            (Self::Inactive, Self::InProgress) | (Self::InProgress, Self::Completed)
        )
    }
}

impl std::fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sprint and the work items it holds, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: u64,
    pub number: u32,
    pub name: Option<String>,
    pub status: SprintStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub work_items: Vec<WorkItem>,
}

impl Sprint {
    pub fn from_dto(dto: SprintDto) -> BoardResult<Self> {
        let status = SprintStatus::parse(&dto.status).ok_or_else(|| {
            BoardError::Malformed(format!(
                "Sprint {} has unknown status '{}'",
                dto.id, dto.status
            ))
        })?;
        let work_items = dto
            .work_items
            .into_iter()
            .map(WorkItem::from_dto)
            .collect::<BoardResult<Vec<_>>>()?;

        Ok(Self {
            id: dto.id,
            number: dto.number,
            name: dto.name.filter(|n| !n.trim().is_empty()),
            status,
            start_date: dto.start_date,
            end_date: dto.end_date,
            work_items,
        })
    }

    /// The sprint name, or "SPRINT {number}" when unnamed.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("SPRINT {}", self.number))
    }

    pub fn is_completed(&self) -> bool {
        self.status == SprintStatus::Completed
    }

    /// Items that would leave the sprint on completion.
    pub fn incomplete_items(&self) -> impl Iterator<Item = &WorkItem> {
        self.work_items.iter().filter(|i| !i.is_done())
    }
}

/// Input for starting a sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintPlan {
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl SprintPlan {
    pub fn into_request(self) -> StartSprintRequest {
        StartSprintRequest {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Where unfinished items go when a sprint completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Backlog,
    Sprint(u64),
}

impl Destination {
    /// `0` denotes the backlog.
    pub fn from_id(id: u64) -> Self {
        if id == dto::BACKLOG_ID {
            Self::Backlog
        } else {
            Self::Sprint(id)
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Backlog => dto::BACKLOG_ID,
            Self::Sprint(id) => *id,
        }
    }
}
