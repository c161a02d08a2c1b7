//! Board snapshot: sprints and backlog as last loaded from the backend.

use classboard_api::dto::BoardDto;
use serde::{Deserialize, Serialize};

use crate::error::BoardResult;
use crate::sprint::Sprint;
use crate::work_item::WorkItem;

/// The single place a work item lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    Backlog,
    Sprint(u64),
}

impl Container {
    pub fn from_sprint_id(sprint_id: Option<u64>) -> Self {
        match sprint_id {
            Some(id) => Self::Sprint(id),
            None => Self::Backlog,
        }
    }

    pub fn sprint_id(&self) -> Option<u64> {
        match self {
            Self::Backlog => None,
            Self::Sprint(id) => Some(*id),
        }
    }

    /// Parse "backlog" or a sprint id.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("backlog") || s == "0" {
            return Some(Self::Backlog);
        }
        s.parse().ok().map(Self::Sprint)
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backlog => f.write_str("backlog"),
            Self::Sprint(id) => write!(f, "sprint {}", id),
        }
    }
}

/// Authoritative board state for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub sprints: Vec<Sprint>,
    pub backlog: Vec<WorkItem>,
}

impl BoardSnapshot {
    pub fn from_dto(dto: BoardDto) -> BoardResult<Self> {
        let sprints = dto
            .sprints
            .into_iter()
            .map(Sprint::from_dto)
            .collect::<BoardResult<Vec<_>>>()?;
        let backlog = dto
            .backlog_items
            .into_iter()
            .map(WorkItem::from_dto)
            .collect::<BoardResult<Vec<_>>>()?;
        Ok(Self { sprints, backlog })
    }

    /// Every item on the board, sprints first in list order.
    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.sprints
            .iter()
            .flat_map(|s| s.work_items.iter())
            .chain(self.backlog.iter())
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    pub fn find_item(&self, item_id: u64) -> Option<&WorkItem> {
        self.items().find(|i| i.id == item_id)
    }

    /// Look an item up by key ("WI-42", case-insensitive) or by numeric id.
    pub fn find_by_key(&self, key: &str) -> Option<&WorkItem> {
        let key = key.trim();
        self.items()
            .find(|i| i.key.eq_ignore_ascii_case(key))
            .or_else(|| key.parse().ok().and_then(|id| self.find_item(id)))
    }

    pub fn sprint(&self, sprint_id: u64) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == sprint_id)
    }

    /// Container currently holding the item.
    pub fn container_of(&self, item_id: u64) -> Option<Container> {
        if self.backlog.iter().any(|i| i.id == item_id) {
            return Some(Container::Backlog);
        }
        self.sprints
            .iter()
            .find(|s| s.work_items.iter().any(|i| i.id == item_id))
            .map(|s| Container::Sprint(s.id))
    }

    /// Items in a container, in display order.
    pub fn items_in(&self, container: Container) -> &[WorkItem] {
        match container {
            Container::Backlog => self.backlog.as_slice(),
            Container::Sprint(id) => self
                .sprint(id)
                .map(|s| s.work_items.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn sub_items(&self, parent_id: u64) -> Vec<&WorkItem> {
        self.items()
            .filter(|i| i.parent_item_id == Some(parent_id))
            .collect()
    }

    /// Containers that accept drops: the backlog and every sprint that is
    /// not completed.
    pub fn open_containers(&self) -> Vec<Container> {
        self.sprints
            .iter()
            .filter(|s| !s.is_completed())
            .map(|s| Container::Sprint(s.id))
            .chain(std::iter::once(Container::Backlog))
            .collect()
    }
}
