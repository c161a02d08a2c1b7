//! In-process backend with the server-side board rules.
//!
//! Backs the dev server and the test suites. Every trait call is recorded
//! so callers can assert which requests a flow issued, and a failure can be
//! armed for the next call of a given operation.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::api::BoardApi;
use crate::client::{ApiError, ApiResult, ValidationIssue};
use crate::dto::{
    feedback_kind, item_type, sprint_status, status, ApproveRequest, BoardDto,
    CompleteSprintRequest, EpicDto, FeedbackDto, NewWorkItem, PersonDto, RejectRequest, SprintDto,
    SprintNameDto, StartSprintRequest, WorkItemDto, WorkItemPatch, BACKLOG_ID, UNASSIGNED_ID,
};

/// Sheet name reported for bulk-create validation issues.
const BULK_SHEET: &str = "work-items";

/// A backend request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchBoard,
    ListMembers,
    ListEpics,
    ListSprintNames,
    GetWorkItem,
    CreateWorkItem,
    CreateWorkItems,
    UpdateWorkItem,
    DeleteWorkItem,
    ApproveWorkItem,
    RejectWorkItem,
    ListFeedback,
    CreateSprint,
    StartSprint,
    CompleteSprint,
    DeleteSprint,
}

impl Operation {
    /// Whether the request changes server state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::FetchBoard
                | Self::ListMembers
                | Self::ListEpics
                | Self::ListSprintNames
                | Self::GetWorkItem
                | Self::ListFeedback
        )
    }
}

#[derive(Debug, Clone)]
struct GroupRecord {
    leader_id: u64,
    members: Vec<PersonDto>,
}

#[derive(Debug, Clone)]
struct SprintRecord {
    id: u64,
    group_id: u64,
    number: u32,
    name: Option<String>,
    status: String,
    start_date: Option<chrono::DateTime<Utc>>,
    end_date: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct ItemRecord {
    group_id: u64,
    item: WorkItemDto,
}

#[derive(Debug, Default)]
struct Store {
    groups: BTreeMap<u64, GroupRecord>,
    sprints: BTreeMap<u64, SprintRecord>,
    items: BTreeMap<u64, ItemRecord>,
    feedback: Vec<FeedbackDto>,
    next_sprint_id: u64,
    next_item_id: u64,
    next_feedback_id: u64,
}

/// In-memory implementation of [`BoardApi`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
    calls: Mutex<Vec<Operation>>,
    armed_failures: Mutex<Vec<Operation>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with one demo group (id 1) led by person 1.
    pub fn demo() -> Self {
        let backend = Self::new();
        backend.add_group(
            1,
            1,
            vec![
                person(1, "Ana Souza"),
                person(2, "Bruno Lima"),
                person(3, "Chen Wei"),
            ],
        );
        let seeded = backend.seed_demo_items();
        if let Err(e) = seeded {
            debug!(error = %e, "Demo seed incomplete");
        }
        backend
    }

    fn seed_demo_items(&self) -> ApiResult<()> {
        let epic = self.seed_work_item(1, &draft(item_type::EPIC, "Course portal", 1, None))?;
        let login = self.seed_work_item(1, &draft(item_type::STORY, "Login page", 1, Some(epic.id)))?;
        let task = self.seed_work_item(1, &draft(item_type::TASK, "Session cookie", 2, Some(epic.id)))?;
        self.seed_work_item(1, &draft(item_type::SUBTASK, "Expiry handling", 2, Some(task.id)))?;
        let report = self.seed_work_item(1, &draft(item_type::TASK, "Weekly report", 1, None))?;
        self.mark_lecturer_assigned(report.id, 900)?;
        self.seed_work_item(1, &draft(item_type::STORY, "Grade export", 3, Some(epic.id)))?;

        let sprint = self.seed_sprint(1)?;
        let now = Utc::now();
        {
            let mut store = self.store();
            for id in [login.id, task.id] {
                if let Some(record) = store.items.get_mut(&id) {
                    record.item.sprint_id = Some(sprint.id);
                }
            }
            if let Some(record) = store.sprints.get_mut(&sprint.id) {
                record.status = sprint_status::IN_PROGRESS.to_string();
                record.start_date = Some(now);
                record.end_date = Some(now + Duration::days(14));
            }
        }
        self.force_status(login.id, status::WAIT_FOR_REVIEW)?;
        self.seed_sprint(1)?;
        Ok(())
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: Operation) -> ApiResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        let mut armed = self
            .armed_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = armed.iter().position(|o| *o == op) {
            armed.remove(pos);
            debug!(?op, "Injected failure");
            return Err(ApiError::Status {
                status: 503,
                message: format!("{:?} unavailable", op),
            });
        }
        Ok(())
    }

    /// Register a group and its members.
    pub fn add_group(&self, group_id: u64, leader_id: u64, members: Vec<PersonDto>) {
        self.store()
            .groups
            .insert(group_id, GroupRecord { leader_id, members });
    }

    /// Make the next call of `op` fail with a 503.
    pub fn fail_next(&self, op: Operation) {
        self.armed_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded calls that change server state.
    pub fn mutation_calls(&self) -> Vec<Operation> {
        self.calls().into_iter().filter(|op| op.is_mutation()).collect()
    }

    pub fn reset_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Create a work item without recording a call.
    pub fn seed_work_item(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<WorkItemDto> {
        let mut store = self.store();
        store.validate_new(group_id, item)?;
        Ok(store.insert_item(group_id, item))
    }

    /// Create a sprint without recording a call.
    pub fn seed_sprint(&self, group_id: u64) -> ApiResult<SprintDto> {
        self.store().create_sprint(group_id)
    }

    /// Overwrite an item's status, bypassing workflow rules.
    pub fn force_status(&self, item_id: u64, new_status: &str) -> ApiResult<()> {
        let mut store = self.store();
        let record = store.item_mut(item_id)?;
        record.item.status = new_status.to_string();
        Ok(())
    }

    /// Overwrite a sprint's status, bypassing lifecycle rules.
    pub fn force_sprint_status(&self, sprint_id: u64, new_status: &str) -> ApiResult<()> {
        let mut store = self.store();
        let sprint = store.sprint_mut(sprint_id)?;
        sprint.status = new_status.to_string();
        Ok(())
    }

    /// Flag an item as created from a lecturer-assigned item.
    pub fn mark_lecturer_assigned(&self, item_id: u64, lecturer_item_id: u64) -> ApiResult<()> {
        let mut store = self.store();
        let record = store.item_mut(item_id)?;
        record.item.parent_lecturer_work_item_id = Some(lecturer_item_id);
        Ok(())
    }

    /// Read an item without recording a call.
    pub fn peek_work_item(&self, item_id: u64) -> ApiResult<WorkItemDto> {
        self.store().item_dto(item_id)
    }

    /// Read a sprint without recording a call.
    pub fn peek_sprint(&self, sprint_id: u64) -> ApiResult<SprintDto> {
        self.store().sprint_dto(sprint_id)
    }
}

fn person(id: u64, name: &str) -> PersonDto {
    PersonDto {
        id,
        name: name.to_string(),
    }
}

fn draft(kind: &str, summary: &str, reporter_id: u64, parent: Option<u64>) -> NewWorkItem {
    NewWorkItem {
        item_type: kind.to_string(),
        summary: summary.to_string(),
        description: None,
        story_points: None,
        start_date: None,
        end_date: None,
        assignee_id: None,
        reporter_id,
        parent_item_id: parent,
        sprint_id: None,
    }
}

fn is_known_type(kind: &str) -> bool {
    matches!(
        kind,
        item_type::EPIC | item_type::STORY | item_type::TASK | item_type::SUBTASK
    )
}

fn is_known_status(value: &str) -> bool {
    matches!(
        value,
        status::TO_DO | status::IN_PROGRESS | status::WAIT_FOR_REVIEW | status::DONE
    )
}

impl Store {
    fn group(&self, group_id: u64) -> ApiResult<&GroupRecord> {
        self.groups
            .get(&group_id)
            .ok_or_else(|| ApiError::not_found(format!("Group: {}", group_id)))
    }

    fn item(&self, item_id: u64) -> ApiResult<&ItemRecord> {
        self.items
            .get(&item_id)
            .ok_or_else(|| ApiError::not_found(format!("Work item: {}", item_id)))
    }

    fn item_mut(&mut self, item_id: u64) -> ApiResult<&mut ItemRecord> {
        self.items
            .get_mut(&item_id)
            .ok_or_else(|| ApiError::not_found(format!("Work item: {}", item_id)))
    }

    fn sprint(&self, sprint_id: u64) -> ApiResult<&SprintRecord> {
        self.sprints
            .get(&sprint_id)
            .ok_or_else(|| ApiError::not_found(format!("Sprint: {}", sprint_id)))
    }

    fn sprint_mut(&mut self, sprint_id: u64) -> ApiResult<&mut SprintRecord> {
        self.sprints
            .get_mut(&sprint_id)
            .ok_or_else(|| ApiError::not_found(format!("Sprint: {}", sprint_id)))
    }

    fn children(&self, parent_id: u64) -> impl Iterator<Item = &WorkItemDto> {
        self.items
            .values()
            .map(|r| &r.item)
            .filter(move |i| i.parent_item_id == Some(parent_id))
    }

    fn item_dto(&self, item_id: u64) -> ApiResult<WorkItemDto> {
        let mut item = self.item(item_id)?.item.clone();
        item.num_of_sub_items = self.children(item_id).count() as u32;
        Ok(item)
    }

    fn items_where(&self, pred: impl Fn(&ItemRecord) -> bool) -> Vec<WorkItemDto> {
        self.items
            .values()
            .filter(|r| pred(r))
            .filter_map(|r| self.item_dto(r.item.id).ok())
            .collect()
    }

    fn sprint_dto(&self, sprint_id: u64) -> ApiResult<SprintDto> {
        let sprint = self.sprint(sprint_id)?;
        Ok(SprintDto {
            id: sprint.id,
            number: sprint.number,
            name: sprint.name.clone(),
            status: sprint.status.clone(),
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            work_items: self.items_where(|r| r.item.sprint_id == Some(sprint_id)),
        })
    }

    fn board(&self, group_id: u64) -> ApiResult<BoardDto> {
        self.group(group_id)?;
        let mut sprint_ids: Vec<(u32, u64)> = self
            .sprints
            .values()
            .filter(|s| s.group_id == group_id)
            .map(|s| (s.number, s.id))
            .collect();
        sprint_ids.sort();

        let mut sprints = Vec::with_capacity(sprint_ids.len());
        for (_, id) in sprint_ids {
            sprints.push(self.sprint_dto(id)?);
        }

        Ok(BoardDto {
            sprints,
            backlog_items: self
                .items_where(|r| r.group_id == group_id && r.item.sprint_id.is_none()),
        })
    }

    fn member(&self, group_id: u64, person_id: u64) -> ApiResult<PersonDto> {
        self.group(group_id)?
            .members
            .iter()
            .find(|m| m.id == person_id)
            .cloned()
            .ok_or_else(|| ApiError::bad_request(format!("Person {} is not a group member", person_id)))
    }

    /// Sprint in the group that can still receive items.
    fn open_sprint(&self, group_id: u64, sprint_id: u64) -> ApiResult<&SprintRecord> {
        let sprint = self.sprint(sprint_id)?;
        if sprint.group_id != group_id {
            return Err(ApiError::bad_request(format!(
                "Sprint {} belongs to another group",
                sprint_id
            )));
        }
        if sprint.status == sprint_status::COMPLETED {
            return Err(ApiError::bad_request(format!(
                "Sprint {} is completed",
                sprint_id
            )));
        }
        Ok(sprint)
    }

    fn check_parent(&self, group_id: u64, kind: &str, parent: Option<u64>) -> Result<(), String> {
        let expected = match kind {
            item_type::EPIC => None,
            item_type::STORY | item_type::TASK => Some(item_type::EPIC),
            item_type::SUBTASK => Some(item_type::TASK),
            other => return Err(format!("Unknown work item type '{}'", other)),
        };
        match (parent, expected) {
            (None, Some(item_type::TASK)) => Err("A subtask needs a parent task".to_string()),
            (None, _) => Ok(()),
            (Some(_), None) => Err("An epic cannot have a parent".to_string()),
            (Some(parent_id), Some(expected)) => {
                let parent = self
                    .items
                    .get(&parent_id)
                    .ok_or_else(|| format!("Parent work item {} does not exist", parent_id))?;
                if parent.group_id != group_id || parent.item.item_type != expected {
                    return Err(format!(
                        "A {} must have a parent of type {}",
                        kind.to_lowercase(),
                        expected
                    ));
                }
                Ok(())
            }
        }
    }

    fn issues_for(&self, group_id: u64, item: &NewWorkItem) -> Vec<String> {
        let mut issues = Vec::new();
        if item.summary.trim().is_empty() {
            issues.push("Summary is required".to_string());
        }
        if !is_known_type(&item.item_type) {
            issues.push(format!("Unknown work item type '{}'", item.item_type));
        } else if let Err(e) = self.check_parent(group_id, &item.item_type, item.parent_item_id) {
            issues.push(e);
        }
        if let Some(points) = item.story_points {
            if !points.is_finite() || points < 0.0 {
                issues.push("Story points must be a non-negative number".to_string());
            }
        }
        if let (Some(start), Some(end)) = (item.start_date, item.end_date) {
            if end < start {
                issues.push("End date must not be before start date".to_string());
            }
        }
        if let Some(assignee) = item.assignee_id {
            if self.member(group_id, assignee).is_err() {
                issues.push(format!("Assignee {} is not a group member", assignee));
            }
        }
        if let Some(sprint_id) = item.sprint_id {
            if let Err(e) = self.open_sprint(group_id, sprint_id) {
                issues.push(e.to_string());
            }
        }
        issues
    }

    fn validate_new(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<()> {
        self.group(group_id)?;
        let issues = self.issues_for(group_id, item);
        if issues.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation(
            "Work item is invalid",
            issues.into_iter().map(ValidationIssue::new).collect(),
        ))
    }

    fn insert_item(&mut self, group_id: u64, item: &NewWorkItem) -> WorkItemDto {
        self.next_item_id += 1;
        let id = self.next_item_id;
        let reporter = self
            .member(group_id, item.reporter_id)
            .unwrap_or_else(|_| person(item.reporter_id, &format!("Person {}", item.reporter_id)));
        let assignee = item
            .assignee_id
            .and_then(|a| self.member(group_id, a).ok());
        let dto = WorkItemDto {
            id,
            key: format!("WI-{}", id),
            item_type: item.item_type.clone(),
            summary: item.summary.trim().to_string(),
            description: item.description.clone(),
            status: status::TO_DO.to_string(),
            story_points: item.story_points,
            start_date: item.start_date,
            end_date: item.end_date,
            assignee,
            reporter,
            parent_item_id: item.parent_item_id,
            sprint_id: item.sprint_id,
            num_of_sub_items: 0,
            parent_lecturer_work_item_id: None,
            approved: false,
        };
        self.items.insert(
            id,
            ItemRecord {
                group_id,
                item: dto.clone(),
            },
        );
        dto
    }

    fn update_item(&mut self, item_id: u64, patch: &WorkItemPatch) -> ApiResult<WorkItemDto> {
        let record = self.item(item_id)?.clone();
        let group_id = record.group_id;
        let mut item = record.item;

        if item.parent_lecturer_work_item_id.is_some() && patch.touches_locked_fields() {
            return Err(ApiError::forbidden(format!(
                "{} is assigned by the lecturer and cannot be edited",
                item.key
            )));
        }

        if let Some(summary) = &patch.summary {
            if summary.trim().is_empty() {
                return Err(ApiError::bad_request("Summary is required"));
            }
            item.summary = summary.trim().to_string();
        }
        if let Some(description) = &patch.description {
            item.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(points) = patch.story_points {
            if !points.is_finite() || points < 0.0 {
                return Err(ApiError::bad_request(
                    "Story points must be a non-negative number",
                ));
            }
            item.story_points = Some(points);
        }
        if patch.start_date.is_some() {
            item.start_date = patch.start_date;
        }
        if patch.end_date.is_some() {
            item.end_date = patch.end_date;
        }
        if let (Some(start), Some(end)) = (item.start_date, item.end_date) {
            if end < start {
                return Err(ApiError::bad_request(
                    "End date must not be before start date",
                ));
            }
        }
        if let Some(parent) = patch.parent_item_id {
            if parent == item_id {
                return Err(ApiError::bad_request("An item cannot be its own parent"));
            }
            self.check_parent(group_id, &item.item_type, Some(parent))
                .map_err(ApiError::bad_request)?;
            item.parent_item_id = Some(parent);
        }
        if let Some(assignee) = patch.assignee_id {
            item.assignee = if assignee == UNASSIGNED_ID {
                None
            } else {
                Some(self.member(group_id, assignee)?)
            };
        }
        if let Some(sprint_id) = patch.sprint_id {
            item.sprint_id = if sprint_id == BACKLOG_ID {
                None
            } else {
                Some(self.open_sprint(group_id, sprint_id)?.id)
            };
        }
        if let Some(new_status) = &patch.status {
            if !is_known_status(new_status) {
                return Err(ApiError::bad_request(format!(
                    "Unknown status '{}'",
                    new_status
                )));
            }
            if *new_status != item.status {
                if item.status == status::DONE {
                    return Err(ApiError::bad_request(format!("{} is already done", item.key)));
                }
                if new_status == status::DONE {
                    return Err(ApiError::bad_request(
                        "DONE can only be reached through approval",
                    ));
                }
                item.status = new_status.clone();
            }
        }

        self.item_mut(item_id)?.item = item;
        self.item_dto(item_id)
    }

    fn delete_item(&mut self, item_id: u64) -> ApiResult<()> {
        let item = &self.item(item_id)?.item;
        if item.parent_lecturer_work_item_id.is_some() {
            return Err(ApiError::forbidden(format!(
                "{} is assigned by the lecturer and cannot be deleted",
                item.key
            )));
        }

        let mut doomed = vec![item_id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            doomed.extend(self.children(parent).map(|c| c.id));
            cursor += 1;
        }
        for id in &doomed {
            self.items.remove(id);
        }
        self.feedback.retain(|f| !doomed.contains(&f.work_item_id));
        Ok(())
    }

    fn push_feedback(
        &mut self,
        item_id: u64,
        kind: &str,
        rating: Option<u8>,
        comment: Option<String>,
        author_id: u64,
    ) -> FeedbackDto {
        self.next_feedback_id += 1;
        let record = FeedbackDto {
            id: self.next_feedback_id,
            work_item_id: item_id,
            kind: kind.to_string(),
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
            author_id,
            created_at: Utc::now(),
        };
        self.feedback.push(record.clone());
        record
    }

    fn require_leader(&self, item_id: u64, author_id: u64) -> ApiResult<()> {
        let group = self.group(self.item(item_id)?.group_id)?;
        if group.leader_id != author_id {
            return Err(ApiError::forbidden(
                "Only the group leader can review work items",
            ));
        }
        Ok(())
    }

    fn approve(&mut self, item_id: u64, req: &ApproveRequest) -> ApiResult<FeedbackDto> {
        self.require_leader(item_id, req.author_id)?;
        if !(1..=5).contains(&req.rating) {
            return Err(ApiError::validation(
                "Rating must be between 1 and 5",
                vec![ValidationIssue::new(format!("rating {} is out of range", req.rating))],
            ));
        }
        let item = &self.item(item_id)?.item;
        if item.status == status::DONE {
            return Err(ApiError::bad_request(format!("{} is already done", item.key)));
        }
        let open = self
            .children(item_id)
            .filter(|c| c.status != status::DONE)
            .count();
        if open > 0 {
            return Err(ApiError::bad_request(format!(
                "{} has {} sub-item(s) that are not done",
                item.key, open
            )));
        }

        let record = self.item_mut(item_id)?;
        record.item.status = status::DONE.to_string();
        record.item.approved = true;
        Ok(self.push_feedback(
            item_id,
            feedback_kind::APPROVE,
            Some(req.rating),
            req.comment.clone(),
            req.author_id,
        ))
    }

    fn reject(&mut self, item_id: u64, req: &RejectRequest) -> ApiResult<FeedbackDto> {
        self.require_leader(item_id, req.author_id)?;
        let item = &self.item(item_id)?.item;
        if item.status != status::WAIT_FOR_REVIEW {
            return Err(ApiError::bad_request(format!(
                "{} is not waiting for review",
                item.key
            )));
        }

        let record = self.item_mut(item_id)?;
        record.item.status = status::TO_DO.to_string();
        record.item.approved = false;
        Ok(self.push_feedback(
            item_id,
            feedback_kind::REJECT,
            None,
            req.comment.clone(),
            req.author_id,
        ))
    }

    fn create_sprint(&mut self, group_id: u64) -> ApiResult<SprintDto> {
        self.group(group_id)?;
        let number = self
            .sprints
            .values()
            .filter(|s| s.group_id == group_id)
            .map(|s| s.number)
            .max()
            .unwrap_or(0)
            + 1;
        self.next_sprint_id += 1;
        let id = self.next_sprint_id;
        self.sprints.insert(
            id,
            SprintRecord {
                id,
                group_id,
                number,
                name: None,
                status: sprint_status::INACTIVE.to_string(),
                start_date: None,
                end_date: None,
            },
        );
        self.sprint_dto(id)
    }

    fn start_sprint(&mut self, sprint_id: u64, req: &StartSprintRequest) -> ApiResult<SprintDto> {
        let sprint = self.sprint(sprint_id)?;
        if sprint.status != sprint_status::INACTIVE {
            return Err(ApiError::bad_request(format!(
                "Sprint {} cannot be started from {}",
                sprint_id, sprint.status
            )));
        }
        let count = self
            .items
            .values()
            .filter(|r| r.item.sprint_id == Some(sprint_id))
            .count();
        if count == 0 {
            return Err(ApiError::bad_request("A sprint needs at least one work item to start"));
        }
        if req.end_date <= req.start_date {
            return Err(ApiError::bad_request("End date must be after start date"));
        }

        let sprint = self.sprint_mut(sprint_id)?;
        sprint.status = sprint_status::IN_PROGRESS.to_string();
        sprint.start_date = Some(req.start_date);
        sprint.end_date = Some(req.end_date);
        if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            sprint.name = Some(name.to_string());
        }
        self.sprint_dto(sprint_id)
    }

    fn complete_sprint(
        &mut self,
        sprint_id: u64,
        req: &CompleteSprintRequest,
    ) -> ApiResult<SprintDto> {
        let sprint = self.sprint(sprint_id)?;
        if sprint.status != sprint_status::IN_PROGRESS {
            return Err(ApiError::bad_request(format!(
                "Sprint {} cannot be completed from {}",
                sprint_id, sprint.status
            )));
        }
        let group_id = sprint.group_id;
        let destination = if req.destination == BACKLOG_ID {
            None
        } else if req.destination == sprint_id {
            return Err(ApiError::bad_request(
                "Remaining items cannot move into the sprint being completed",
            ));
        } else {
            Some(self.open_sprint(group_id, req.destination)?.id)
        };

        let mut moved = 0;
        for record in self.items.values_mut() {
            if record.item.sprint_id == Some(sprint_id) && record.item.status != status::DONE {
                record.item.sprint_id = destination;
                moved += 1;
            }
        }
        info!(sprint_id, moved, ?destination, "Sprint completed");

        self.sprint_mut(sprint_id)?.status = sprint_status::COMPLETED.to_string();
        self.sprint_dto(sprint_id)
    }

    fn delete_sprint(&mut self, sprint_id: u64) -> ApiResult<()> {
        self.sprint(sprint_id)?;
        for record in self.items.values_mut() {
            if record.item.sprint_id == Some(sprint_id) {
                record.item.sprint_id = None;
            }
        }
        self.sprints.remove(&sprint_id);
        Ok(())
    }
}

fn sprint_display_name(sprint: &SprintRecord) -> String {
    sprint
        .name
        .clone()
        .unwrap_or_else(|| format!("SPRINT {}", sprint.number))
}

#[async_trait]
impl BoardApi for MemoryBackend {
    async fn fetch_board(&self, group_id: u64) -> ApiResult<BoardDto> {
        self.record(Operation::FetchBoard)?;
        self.store().board(group_id)
    }

    async fn list_members(&self, group_id: u64) -> ApiResult<Vec<PersonDto>> {
        self.record(Operation::ListMembers)?;
        Ok(self.store().group(group_id)?.members.clone())
    }

    async fn list_epics(&self, group_id: u64) -> ApiResult<Vec<EpicDto>> {
        self.record(Operation::ListEpics)?;
        let store = self.store();
        store.group(group_id)?;
        Ok(store
            .items
            .values()
            .filter(|r| r.group_id == group_id && r.item.item_type == item_type::EPIC)
            .map(|r| EpicDto {
                id: r.item.id,
                key: r.item.key.clone(),
                summary: r.item.summary.clone(),
            })
            .collect())
    }

    async fn list_sprint_names(&self, group_id: u64) -> ApiResult<Vec<SprintNameDto>> {
        self.record(Operation::ListSprintNames)?;
        let store = self.store();
        store.group(group_id)?;
        let mut sprints: Vec<&SprintRecord> = store
            .sprints
            .values()
            .filter(|s| s.group_id == group_id && s.status != sprint_status::COMPLETED)
            .collect();
        sprints.sort_by_key(|s| s.number);
        Ok(sprints
            .into_iter()
            .map(|s| SprintNameDto {
                id: s.id,
                name: sprint_display_name(s),
            })
            .collect())
    }

    async fn get_work_item(&self, item_id: u64) -> ApiResult<WorkItemDto> {
        self.record(Operation::GetWorkItem)?;
        self.store().item_dto(item_id)
    }

    async fn create_work_item(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<WorkItemDto> {
        self.record(Operation::CreateWorkItem)?;
        let mut store = self.store();
        store.validate_new(group_id, item)?;
        let created = store.insert_item(group_id, item);
        info!(item_id = created.id, key = %created.key, "Work item created");
        Ok(created)
    }

    async fn create_work_items(
        &self,
        group_id: u64,
        items: &[NewWorkItem],
    ) -> ApiResult<Vec<WorkItemDto>> {
        self.record(Operation::CreateWorkItems)?;
        let mut store = self.store();
        store.group(group_id)?;

        let issues: Vec<ValidationIssue> = items
            .iter()
            .enumerate()
            .flat_map(|(row, item)| {
                store
                    .issues_for(group_id, item)
                    .into_iter()
                    .map(move |cause| ValidationIssue::at(BULK_SHEET, row as u32 + 1, cause))
            })
            .collect();
        if !issues.is_empty() {
            return Err(ApiError::validation(
                format!("{} problem(s) found, nothing was imported", issues.len()),
                issues,
            ));
        }

        Ok(items
            .iter()
            .map(|item| store.insert_item(group_id, item))
            .collect())
    }

    async fn update_work_item(&self, item_id: u64, patch: &WorkItemPatch) -> ApiResult<WorkItemDto> {
        self.record(Operation::UpdateWorkItem)?;
        self.store().update_item(item_id, patch)
    }

    async fn delete_work_item(&self, item_id: u64) -> ApiResult<()> {
        self.record(Operation::DeleteWorkItem)?;
        self.store().delete_item(item_id)
    }

    async fn approve_work_item(&self, item_id: u64, req: &ApproveRequest) -> ApiResult<FeedbackDto> {
        self.record(Operation::ApproveWorkItem)?;
        self.store().approve(item_id, req)
    }

    async fn reject_work_item(&self, item_id: u64, req: &RejectRequest) -> ApiResult<FeedbackDto> {
        self.record(Operation::RejectWorkItem)?;
        self.store().reject(item_id, req)
    }

    async fn list_feedback(&self, item_id: u64) -> ApiResult<Vec<FeedbackDto>> {
        self.record(Operation::ListFeedback)?;
        let store = self.store();
        store.item(item_id)?;
        Ok(store
            .feedback
            .iter()
            .filter(|f| f.work_item_id == item_id)
            .cloned()
            .collect())
    }

    async fn create_sprint(&self, group_id: u64) -> ApiResult<SprintDto> {
        self.record(Operation::CreateSprint)?;
        self.store().create_sprint(group_id)
    }

    async fn start_sprint(&self, sprint_id: u64, req: &StartSprintRequest) -> ApiResult<SprintDto> {
        self.record(Operation::StartSprint)?;
        self.store().start_sprint(sprint_id, req)
    }

    async fn complete_sprint(
        &self,
        sprint_id: u64,
        req: &CompleteSprintRequest,
    ) -> ApiResult<SprintDto> {
        self.record(Operation::CompleteSprint)?;
        self.store().complete_sprint(sprint_id, req)
    }

    async fn delete_sprint(&self, sprint_id: u64) -> ApiResult<()> {
        self.record(Operation::DeleteSprint)?;
        self.store().delete_sprint(sprint_id)
    }
}
