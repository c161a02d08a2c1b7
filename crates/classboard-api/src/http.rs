//! `reqwest` implementation of [`BoardApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::BoardApi;
use crate::client::{ApiError, ApiResult, ErrorBody};
use crate::config::ClientConfig;
use crate::dto::{
    ApproveRequest, BoardDto, CompleteSprintRequest, EpicDto, FeedbackDto, NewWorkItem, PersonDto,
    RejectRequest, SprintDto, SprintNameDto, StartSprintRequest, WorkItemDto, WorkItemPatch,
};

/// Talks to the backend over HTTP.
#[derive(Clone)]
pub struct HttpBoardApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBoardApi {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        debug!(base_url = %config.api_url, "HttpBoardApi initialized");
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    /// Create a client from `CLASSBOARD_API_URL` (or the default URL).
    pub fn from_env() -> ApiResult<Self> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!(url = %url, "PUT");
        let response = self.client.put(&url).json(body).send().await?;
        decode(response).await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        debug!(url = %url, "PATCH");
        let response = self.client.patch(&url).json(body).send().await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path);
        debug!(url = %url, "DELETE");
        let response = self.client.delete(&url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    if response.status().is_success() {
        return Ok(response.json::<T>().await?);
    }
    Err(error_from(response).await)
}

async fn error_from(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return ApiError::Http(e),
    };
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| ErrorBody {
        message: if text.is_empty() {
            status.to_string()
        } else {
            text
        },
        issues: Vec::new(),
    });
    warn!(status_code = %status, message = %body.message, "Backend returned an error");
    ApiError::from_response(status.as_u16(), body)
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn fetch_board(&self, group_id: u64) -> ApiResult<BoardDto> {
        self.get(&format!("/groups/{}/board", group_id)).await
    }

    async fn list_members(&self, group_id: u64) -> ApiResult<Vec<PersonDto>> {
        self.get(&format!("/groups/{}/members", group_id)).await
    }

    async fn list_epics(&self, group_id: u64) -> ApiResult<Vec<EpicDto>> {
        self.get(&format!("/groups/{}/epics", group_id)).await
    }

    async fn list_sprint_names(&self, group_id: u64) -> ApiResult<Vec<SprintNameDto>> {
        self.get(&format!("/groups/{}/sprint-names", group_id)).await
    }

    async fn get_work_item(&self, item_id: u64) -> ApiResult<WorkItemDto> {
        self.get(&format!("/work-items/{}", item_id)).await
    }

    async fn create_work_item(&self, group_id: u64, item: &NewWorkItem) -> ApiResult<WorkItemDto> {
        self.post(&format!("/groups/{}/work-items", group_id), item)
            .await
    }

    async fn create_work_items(
        &self,
        group_id: u64,
        items: &[NewWorkItem],
    ) -> ApiResult<Vec<WorkItemDto>> {
        self.post(&format!("/groups/{}/work-items/bulk", group_id), items)
            .await
    }

    async fn update_work_item(&self, item_id: u64, patch: &WorkItemPatch) -> ApiResult<WorkItemDto> {
        self.patch(&format!("/work-items/{}", item_id), patch).await
    }

    async fn delete_work_item(&self, item_id: u64) -> ApiResult<()> {
        self.delete(&format!("/work-items/{}", item_id)).await
    }

    async fn approve_work_item(&self, item_id: u64, req: &ApproveRequest) -> ApiResult<FeedbackDto> {
        self.post(&format!("/work-items/{}/approve", item_id), req)
            .await
    }

    async fn reject_work_item(&self, item_id: u64, req: &RejectRequest) -> ApiResult<FeedbackDto> {
        self.post(&format!("/work-items/{}/reject", item_id), req)
            .await
    }

    async fn list_feedback(&self, item_id: u64) -> ApiResult<Vec<FeedbackDto>> {
        self.get(&format!("/work-items/{}/feedback", item_id)).await
    }

    async fn create_sprint(&self, group_id: u64) -> ApiResult<SprintDto> {
        self.post(&format!("/groups/{}/sprints", group_id), &serde_json::json!({}))
            .await
    }

    async fn start_sprint(&self, sprint_id: u64, req: &StartSprintRequest) -> ApiResult<SprintDto> {
        self.put(&format!("/sprints/{}/start", sprint_id), req).await
    }

    async fn complete_sprint(
        &self,
        sprint_id: u64,
        req: &CompleteSprintRequest,
    ) -> ApiResult<SprintDto> {
        self.put(&format!("/sprints/{}/complete", sprint_id), req)
            .await
    }

    async fn delete_sprint(&self, sprint_id: u64) -> ApiResult<()> {
        self.delete(&format!("/sprints/{}", sprint_id)).await
    }
}
