//! The REST collaborator seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::ApiResult;
use crate::dto::{
    ApproveRequest, BoardDto, CompleteSprintRequest, EpicDto, FeedbackDto, NewWorkItem, PersonDto,
    RejectRequest, SprintDto, SprintNameDto, StartSprintRequest, WorkItemDto, WorkItemPatch,
};

/// Operations the board consumes from the backend.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn fetch_board(&self, group_id: u64) -> ApiResult<BoardDto>;

    async fn list_members(&self, group_id: u64) -> ApiResult<Vec<PersonDto>>;
    async fn list_epics(&self, group_id: u64) -> ApiResult<Vec<EpicDto>>;
    async fn list_sprint_names(&self, group_id: u64) -> ApiResult<Vec<SprintNameDto>>;

    async fn get_work_item(&self, item_id: u64) -> ApiResult<WorkItemDto>;
    async fn create_work_item(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<WorkItemDto>;
    async fn create_work_items(
        &self,
        group_id: u64,
        items: &[NewWorkItem],
    ) -> ApiResult<Vec<WorkItemDto>>;
    async fn update_work_item(&self, item_id: u64, patch: &WorkItemPatch) -> ApiResult<WorkItemDto>;
    async fn delete_work_item(&self, item_id: u64) -> ApiResult<()>;

    async fn approve_work_item(&self, item_id: u64, req: &ApproveRequest) -> ApiResult<FeedbackDto>;
    async fn reject_work_item(&self, item_id: u64, req: &RejectRequest) -> ApiResult<FeedbackDto>;
    async fn list_feedback(&self, item_id: u64) -> ApiResult<Vec<FeedbackDto>>;

    async fn create_sprint(&self, group_id: u64) -> ApiResult<SprintDto>;
    async fn start_sprint(&self, sprint_id: u64, req: &StartSprintRequest) -> ApiResult<SprintDto>;
    async fn complete_sprint(
        &self,
        sprint_id: u64,
        req: &CompleteSprintRequest,
    ) -> ApiResult<SprintDto>;
    async fn delete_sprint(&self, sprint_id: u64) -> ApiResult<()>;
}

#[async_trait]
impl<T: BoardApi + ?Sized> BoardApi for Arc<T> {
    async fn fetch_board(&self, group_id: u64) -> ApiResult<BoardDto> {
        (**self).fetch_board(group_id).await
    }

    async fn list_members(&self, group_id: u64) -> ApiResult<Vec<PersonDto>> {
        (**self).list_members(group_id).await
    }

    async fn list_epics(&self, group_id: u64) -> ApiResult<Vec<EpicDto>> {
        (**self).list_epics(group_id).await
    }

    async fn list_sprint_names(&self, group_id: u64) -> ApiResult<Vec<SprintNameDto>> {
        (**self).list_sprint_names(group_id).await
    }

    async fn get_work_item(&self, item_id: u64) -> ApiResult<WorkItemDto> {
        (**self).get_work_item(item_id).await
    }

    async fn create_work_item(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<WorkItemDto> {
        (**self).create_work_item(group_id, item).await
    }

    async fn create_work_items(
        &self,
        group_id: u64,
        items: &[NewWorkItem],
    ) -> ApiResult<Vec<WorkItemDto>> {
        (**self).create_work_items(group_id, items).await
    }

    async fn update_work_item(&self, item_id: u64, patch: &WorkItemPatch) -> ApiResult<WorkItemDto> {
        (**self).update_work_item(item_id, patch).await
    }

    async fn delete_work_item(&self, item_id: u64) -> ApiResult<()> {
        (**self).delete_work_item(item_id).await
    }

    async fn approve_work_item(&self, item_id: u64, req: &ApproveRequest) -> ApiResult<FeedbackDto> {
        (**self).approve_work_item(item_id, req).await
    }

    async fn reject_work_item(&self, item_id: u64, req: &RejectRequest) -> ApiResult<FeedbackDto> {
        (**self).reject_work_item(item_id, req).await
    }

    async fn list_feedback(&self, item_id: u64) -> ApiResult<Vec<FeedbackDto>> {
        (**self).list_feedback(item_id).await
    }

    async fn create_sprint(&self, group_id: u64) -> ApiResult<SprintDto> {
        (**self).create_sprint(group_id).await
    }

    async fn start_sprint(&self, sprint_id: u64, req: &StartSprintRequest) -> ApiResult<SprintDto> {
        (**self).start_sprint(sprint_id, req).await
    }

    async fn complete_sprint(
        &self,
        sprint_id: u64,
        req: &CompleteSprintRequest,
    ) -> ApiResult<SprintDto> {
        (**self).complete_sprint(sprint_id, req).await
    }

    async fn delete_sprint(&self, sprint_id: u64) -> ApiResult<()> {
        (**self).delete_sprint(sprint_id).await
    }
}
