//! Board state controller.
//!
//! Holds the last authoritative snapshot for one group and exposes the
//! board actions. Every action is checked locally first, then sent to the
//! backend; the snapshot is replaced by a full reload only after the
//! backend confirms. A failed request leaves the snapshot untouched.
//!
//! A confirmed action is never reported as failed. If the reload after it
//! fails, the action still returns its result and the snapshot is marked
//! stale; the next action reloads before running its local checks.
//!
//! Actions take `&mut self`, so one controller never has two mutations in
//! flight at once.

pub mod model;

pub use model::{BoardSnapshot, Container};

use classboard_api::dto::WorkItemPatch;
use classboard_api::{ApiResult, BoardApi};
use tracing::{debug, info, warn};

use crate::dialog::{ApprovalDialog, DialogScope, SelectionOptions, Ticket};
use crate::drag::MoveIntent;
use crate::error::{BoardError, BoardResult};
use crate::feedback::{ApprovalForm, FeedbackRecord, RejectionForm};
use crate::policy::{self, Actor, StatusDecision};
use crate::session::Session;
use crate::sprint::{self, Destination, Sprint, SprintPlan};
use crate::work_item::{self, WorkItem, WorkItemDraft, WorkItemEdit, WorkItemStatus};

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target was the item's current container; nothing was sent.
    Unchanged,
    Moved,
}

/// Result of a status-menu selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Same status as before; nothing was sent.
    Unchanged,
    Updated(WorkItemStatus),
    /// The leader picked DONE; submit or cancel the returned dialog.
    ApprovalRequired(ApprovalDialog),
}

pub struct BoardController<A> {
    api: A,
    session: Session,
    group_id: u64,
    snapshot: Option<BoardSnapshot>,
    revision: u64,
    stale: bool,
    review: DialogScope,
}

impl<A: BoardApi> BoardController<A> {
    /// Create a controller for the session's current group.
    pub fn new(api: A, session: Session) -> BoardResult<Self> {
        let group = session.group()?;
        Ok(Self {
            api,
            session,
            group_id: group.id,
            snapshot: None,
            revision: 0,
            stale: false,
            review: DialogScope::new(),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn group_id(&self) -> u64 {
        self.group_id
    }

    pub fn actor(&self) -> Actor {
        self.session.actor()
    }

    /// Last loaded snapshot, if any load succeeded.
    pub fn snapshot(&self) -> Option<&BoardSnapshot> {
        self.snapshot.as_ref()
    }

    /// Number of successful loads so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the snapshot missed the reload after a confirmed action.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Statuses the current actor may pick from the status menu.
    pub fn status_options(&self) -> &'static [WorkItemStatus] {
        policy::menu_options(self.actor())
    }

    /// Scope of the approval dialog.
    pub fn review_scope(&self) -> &DialogScope {
        &self.review
    }

    fn board(&self) -> BoardResult<&BoardSnapshot> {
        self.snapshot.as_ref().ok_or(BoardError::NotLoaded)
    }

    fn item(&self, item_id: u64) -> BoardResult<&WorkItem> {
        self.board()?
            .find_item(item_id)
            .ok_or_else(|| BoardError::WorkItemNotFound(item_id.to_string()))
    }

    fn sprint(&self, sprint_id: u64) -> BoardResult<&Sprint> {
        self.board()?
            .sprint(sprint_id)
            .ok_or(BoardError::SprintNotFound(sprint_id))
    }

    /// Fetch sprints and backlog. On failure the previous snapshot stays.
    pub async fn load(&mut self) -> BoardResult<&BoardSnapshot> {
        let dto = self.api.fetch_board(self.group_id).await.map_err(|e| {
            warn!(group_id = self.group_id, error = %e, "Board load failed");
            BoardError::Load(e)
        })?;
        let snapshot = BoardSnapshot::from_dto(dto)?;
        self.revision += 1;
        self.stale = false;
        info!(
            group_id = self.group_id,
            revision = self.revision,
            sprints = snapshot.sprints.len(),
            items = snapshot.item_count(),
            "Board loaded"
        );
        Ok(self.snapshot.insert(snapshot))
    }

    /// Reload first if the last reload after a confirmed action failed.
    async fn ensure_fresh(&mut self) -> BoardResult<()> {
        if self.stale {
            debug!(group_id = self.group_id, "Reloading stale board");
            self.load().await?;
        }
        Ok(())
    }

    /// Turn a backend reply into the action result.
    fn confirm<T>(action: &'static str, result: ApiResult<T>) -> BoardResult<T> {
        result.map_err(|source| {
            warn!(action, error = %source, "Board action failed");
            BoardError::Mutation { action, source }
        })
    }

    /// Reload after a confirmed action. A failure marks the snapshot stale
    /// instead of failing the action.
    async fn refresh(&mut self, action: &'static str) {
        if let Err(e) = self.load().await {
            warn!(action, error = %e, "Reload after confirmed action failed; board is stale");
            self.stale = true;
        }
    }

    /// Confirm the backend reply, then reload.
    async fn commit<T>(&mut self, action: &'static str, result: ApiResult<T>) -> BoardResult<T> {
        let value = Self::confirm(action, result)?;
        self.refresh(action).await;
        Ok(value)
    }

    /// Move an item into a sprint or the backlog.
    pub async fn move_item(&mut self, item_id: u64, target: Container) -> BoardResult<MoveOutcome> {
        self.ensure_fresh().await?;
        let source = self
            .board()?
            .container_of(item_id)
            .ok_or_else(|| BoardError::WorkItemNotFound(item_id.to_string()))?;
        if source == target {
            debug!(item_id, %target, "Item already in target container");
            return Ok(MoveOutcome::Unchanged);
        }
        if let Container::Sprint(sprint_id) = target {
            let sprint = self.sprint(sprint_id)?;
            if sprint.is_completed() {
                return Err(BoardError::validation(format!(
                    "{} is completed and cannot receive items",
                    sprint.display_name()
                )));
            }
        }

        let patch = WorkItemPatch::move_to(target.sprint_id());
        let result = self.api.update_work_item(item_id, &patch).await;
        self.commit("Move work item", result).await?;
        info!(item_id, from = %source, to = %target, "Work item moved");
        Ok(MoveOutcome::Moved)
    }

    /// Apply a drop produced by the drag adapter.
    pub async fn apply_intent(&mut self, intent: MoveIntent) -> BoardResult<MoveOutcome> {
        self.move_item(intent.item_id, intent.target).await
    }

    /// Handle a status-menu selection.
    pub async fn change_status(
        &mut self,
        item_id: u64,
        new_status: WorkItemStatus,
    ) -> BoardResult<StatusOutcome> {
        self.ensure_fresh().await?;
        let (decision, key) = {
            let board = self.board()?;
            let item = self.item(item_id)?;
            let sub_items = board.sub_items(item_id);
            let decision =
                policy::decide_status_change(item, new_status, self.actor(), &sub_items)?;
            (decision, item.key.clone())
        };

        match decision {
            StatusDecision::Unchanged => Ok(StatusOutcome::Unchanged),
            StatusDecision::RequiresApproval => {
                let ticket = self.review.open();
                debug!(item_id, "Approval dialog opened");
                Ok(StatusOutcome::ApprovalRequired(ApprovalDialog {
                    item_id,
                    key,
                    ticket,
                }))
            }
            StatusDecision::Apply(status) => {
                let patch = WorkItemPatch::status(status.as_str());
                let result = self.api.update_work_item(item_id, &patch).await;
                self.commit("Change status", result).await?;
                info!(item_id, status = %status, "Status changed");
                Ok(StatusOutcome::Updated(status))
            }
        }
    }

    /// Whether `dialog` is the approval dialog currently open.
    pub fn is_reviewing(&self, dialog: &ApprovalDialog) -> bool {
        self.review.is_current(dialog.ticket)
    }

    /// Close the approval dialog without changing anything.
    pub fn cancel_approval(&mut self, dialog: &ApprovalDialog) {
        if self.review.is_current(dialog.ticket) {
            debug!(item_id = dialog.item_id, "Approval dialog cancelled");
            self.review.close();
        }
    }

    /// Submit the approval dialog: rates the item and marks it DONE.
    pub async fn submit_approval(
        &mut self,
        dialog: &ApprovalDialog,
        form: ApprovalForm,
    ) -> BoardResult<FeedbackRecord> {
        if !self.review.is_current(dialog.ticket) {
            return Err(BoardError::validation(format!(
                "The approval dialog for {} is no longer open",
                dialog.key
            )));
        }
        let request = form.into_request(self.session.profile.id)?;
        self.ensure_fresh().await?;
        {
            let board = self.board()?;
            let item = self.item(dialog.item_id)?;
            policy::check_approval(item, self.actor(), &board.sub_items(item.id))?;
        }

        let result = self.api.approve_work_item(dialog.item_id, &request).await;
        let feedback = Self::confirm("Approve work item", result)?;
        self.review.close();
        self.refresh("Approve work item").await;
        info!(item_id = dialog.item_id, rating = request.rating, "Work item approved");
        FeedbackRecord::from_dto(feedback)
    }

    /// Reject an item waiting for review, sending it back to TO DO.
    pub async fn reject(&mut self, item_id: u64, form: RejectionForm) -> BoardResult<FeedbackRecord> {
        self.ensure_fresh().await?;
        policy::check_rejection(self.item(item_id)?, self.actor())?;

        let request = form.into_request(self.session.profile.id);
        let result = self.api.reject_work_item(item_id, &request).await;
        let feedback = self.commit("Reject work item", result).await?;
        info!(item_id, "Work item rejected");
        FeedbackRecord::from_dto(feedback)
    }

    /// Review history of an item.
    pub async fn feedback(&self, item_id: u64) -> BoardResult<Vec<FeedbackRecord>> {
        self.api
            .list_feedback(item_id)
            .await
            .map_err(BoardError::Load)?
            .into_iter()
            .map(FeedbackRecord::from_dto)
            .collect()
    }

    /// Append a new INACTIVE sprint numbered after the existing ones.
    pub async fn create_sprint(&mut self) -> BoardResult<Sprint> {
        let result = self.api.create_sprint(self.group_id).await;
        let created = self.commit("Create sprint", result).await?;
        info!(sprint_id = created.id, number = created.number, "Sprint created");
        match self.snapshot.as_ref().and_then(|b| b.sprint(created.id)) {
            Some(sprint) => Ok(sprint.clone()),
            None => Sprint::from_dto(created),
        }
    }

    pub async fn start_sprint(&mut self, sprint_id: u64, plan: SprintPlan) -> BoardResult<()> {
        self.ensure_fresh().await?;
        sprint::validate_start(self.sprint(sprint_id)?, &plan)?;

        let request = plan.into_request();
        let result = self.api.start_sprint(sprint_id, &request).await;
        self.commit("Start sprint", result).await?;
        info!(sprint_id, "Sprint started");
        Ok(())
    }

    /// Complete a sprint, moving its unfinished items to `destination`.
    /// Returns how many items were moved.
    pub async fn complete_sprint(
        &mut self,
        sprint_id: u64,
        destination: Destination,
    ) -> BoardResult<usize> {
        self.ensure_fresh().await?;
        let moving = {
            let board = self.board()?;
            let sprint = self.sprint(sprint_id)?;
            let target = match destination {
                Destination::Sprint(id) => board.sprint(id),
                Destination::Backlog => None,
            };
            sprint::validate_complete(sprint, destination, target)?;
            sprint.incomplete_items().count()
        };

        let request = classboard_api::dto::CompleteSprintRequest {
            destination: destination.id(),
        };
        let result = self.api.complete_sprint(sprint_id, &request).await;
        self.commit("Complete sprint", result).await?;
        info!(sprint_id, moved = moving, ?destination, "Sprint completed");
        Ok(moving)
    }

    /// Delete a sprint; its items return to the backlog.
    pub async fn delete_sprint(&mut self, sprint_id: u64) -> BoardResult<()> {
        self.ensure_fresh().await?;
        self.sprint(sprint_id)?;

        let result = self.api.delete_sprint(sprint_id).await;
        self.commit("Delete sprint", result).await?;
        info!(sprint_id, "Sprint deleted");
        Ok(())
    }

    fn check_draft(&self, draft: &WorkItemDraft) -> BoardResult<()> {
        work_item::validate_draft(draft)?;
        let parent = match draft.parent_item_id {
            Some(parent_id) => Some(self.item(parent_id)?),
            None => None,
        };
        work_item::check_parent(draft.item_type, parent)?;
        if let Some(sprint_id) = draft.sprint_id {
            let sprint = self.sprint(sprint_id)?;
            if sprint.is_completed() {
                return Err(BoardError::validation(format!(
                    "{} is completed and cannot receive items",
                    sprint.display_name()
                )));
            }
        }
        Ok(())
    }

    /// Create a work item reported by the session user.
    pub async fn create_work_item(&mut self, draft: WorkItemDraft) -> BoardResult<WorkItem> {
        self.ensure_fresh().await?;
        self.check_draft(&draft)?;

        let request = draft.into_request(self.session.profile.id);
        let result = self.api.create_work_item(self.group_id, &request).await;
        let created = self.commit("Create work item", result).await?;
        info!(item_id = created.id, key = %created.key, "Work item created");
        WorkItem::from_dto(created)
    }

    /// Create several items at once. Nothing is created if any is invalid.
    pub async fn create_work_items(&mut self, drafts: Vec<WorkItemDraft>) -> BoardResult<Vec<WorkItem>> {
        self.ensure_fresh().await?;
        let problems: Vec<String> = drafts
            .iter()
            .enumerate()
            .filter_map(|(row, draft)| {
                self.check_draft(draft)
                    .err()
                    .map(|e| format!("row {}: {}", row + 1, e))
            })
            .collect();
        if !problems.is_empty() {
            return Err(BoardError::validation(problems.join("; ")));
        }

        let reporter_id = self.session.profile.id;
        let requests: Vec<_> = drafts
            .into_iter()
            .map(|d| d.into_request(reporter_id))
            .collect();
        let result = self.api.create_work_items(self.group_id, &requests).await;
        let created = self.commit("Import work items", result).await?;
        info!(count = created.len(), "Work items created");
        created.into_iter().map(WorkItem::from_dto).collect()
    }

    /// Apply a detail edit.
    pub async fn update_work_item(&mut self, item_id: u64, edit: WorkItemEdit) -> BoardResult<WorkItem> {
        self.ensure_fresh().await?;
        {
            let item = self.item(item_id)?;
            if edit.is_empty() {
                return Ok(item.clone());
            }
            work_item::check_edit(item, &edit)?;
            if let Some(parent_id) = edit.parent_item_id {
                work_item::check_parent(item.item_type, Some(self.item(parent_id)?))?;
            }
        }

        let patch = edit.into_patch();
        let result = self.api.update_work_item(item_id, &patch).await;
        let updated = self.commit("Update work item", result).await?;
        info!(item_id, "Work item updated");
        WorkItem::from_dto(updated)
    }

    /// Delete an item (and, on the backend, its sub-items).
    pub async fn delete_work_item(&mut self, item_id: u64) -> BoardResult<()> {
        self.ensure_fresh().await?;
        work_item::check_deletable(self.item(item_id)?)?;

        let result = self.api.delete_work_item(item_id).await;
        self.commit("Delete work item", result).await?;
        info!(item_id, "Work item deleted");
        Ok(())
    }

    /// Fetch member/epic/sprint choices for the dialog holding `ticket`.
    pub async fn selection_options(
        &self,
        scope: &DialogScope,
        ticket: Ticket,
    ) -> BoardResult<Option<SelectionOptions>> {
        SelectionOptions::fetch_for(&self.api, self.group_id, scope, ticket).await
    }
}
