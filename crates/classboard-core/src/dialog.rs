//! Dialog scopes and the auxiliary data dialogs fetch on open.
//!
//! Each open of a scope issues a [`Ticket`]. Closing or reopening the scope
//! invalidates earlier tickets, so a response that lands after its dialog
//! went away is dropped instead of applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use classboard_api::dto::{EpicDto, SprintNameDto};
use classboard_api::BoardApi;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BoardError, BoardResult};
use crate::work_item::Person;

/// Identifies one opening of a dialog scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct ScopeState {
    generation: u64,
    open: bool,
}

/// Tracks whether the dialog that started a request is still showing.
/// Clones share state, so a close from any handle invalidates the rest.
#[derive(Debug, Clone, Default)]
pub struct DialogScope {
    state: Arc<Mutex<ScopeState>>,
}

impl DialogScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScopeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self) -> Ticket {
        let mut state = self.state();
        state.generation += 1;
        state.open = true;
        Ticket(state.generation)
    }

    pub fn close(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let state = self.state();
        state.open && state.generation == ticket.0
    }

    /// Pass `value` through only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(ticket = ticket.0, "Discarding response for a closed dialog");
            None
        }
    }
}

/// Approval dialog opened by a leader picking DONE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDialog {
    pub item_id: u64,
    pub key: String,
    pub(crate) ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicOption {
    pub id: u64,
    pub key: String,
    pub summary: String,
}

impl From<EpicDto> for EpicOption {
    fn from(dto: EpicDto) -> Self {
        Self {
            id: dto.id,
            key: dto.key,
            summary: dto.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintOption {
    pub id: u64,
    pub name: String,
}

impl From<SprintNameDto> for SprintOption {
    fn from(dto: SprintNameDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

/// Choices for the member, epic and sprint fields of an item dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    pub members: Vec<Person>,
    pub epics: Vec<EpicOption>,
    pub sprints: Vec<SprintOption>,
}

impl SelectionOptions {
    pub async fn fetch<A: BoardApi + ?Sized>(api: &A, group_id: u64) -> BoardResult<Self> {
        let (members, epics, sprints) = tokio::try_join!(
            api.list_members(group_id),
            api.list_epics(group_id),
            api.list_sprint_names(group_id),
        )
        .map_err(BoardError::Load)?;

        Ok(Self {
            members: members.into_iter().map(Person::from).collect(),
            epics: epics.into_iter().map(EpicOption::from).collect(),
            sprints: sprints.into_iter().map(SprintOption::from).collect(),
        })
    }

    /// Fetch for the dialog holding `ticket`. Returns `Ok(None)` when the
    /// dialog closed while the requests were in flight.
    pub async fn fetch_for<A: BoardApi + ?Sized>(
        api: &A,
        group_id: u64,
        scope: &DialogScope,
        ticket: Ticket,
    ) -> BoardResult<Option<Self>> {
        let fetched = Self::fetch(api, group_id).await;
        if !scope.is_current(ticket) {
            debug!(group_id, "Selection options arrived after the dialog closed");
            return Ok(None);
        }
        fetched.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classboard_api::dto::PersonDto;
    use classboard_api::MemoryBackend;

    #[test]
    fn test_reopen_invalidates_old_ticket() {
        let scope = DialogScope::new();
        let first = scope.open();
        assert!(scope.is_current(first));

        let second = scope.open();
        assert!(!scope.is_current(first));
        assert!(scope.is_current(second));

        scope.close();
        assert!(!scope.is_open());
        assert_eq!(scope.accept(second, 5), None);
    }

    #[test]
    fn test_clones_share_state() {
        let scope = DialogScope::new();
        let handle = scope.clone();
        let ticket = scope.open();
        handle.close();
        assert!(!scope.is_current(ticket));
    }

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.add_group(
            1,
            1,
            vec![PersonDto {
                id: 1,
                name: "Ana".to_string(),
            }],
        );
        backend
    }

    #[tokio::test]
    async fn test_fetch_for_open_dialog() {
        let backend = backend();
        let scope = DialogScope::new();
        let ticket = scope.open();

        let options = SelectionOptions::fetch_for(&backend, 1, &scope, ticket)
            .await
            .unwrap()
            .expect("dialog is open");
        assert_eq!(options.members.len(), 1);
        assert!(options.epics.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_for_closed_dialog_is_discarded() {
        let backend = backend();
        let scope = DialogScope::new();
        let ticket = scope.open();
        scope.close();

        let options = SelectionOptions::fetch_for(&backend, 1, &scope, ticket)
            .await
            .unwrap();
        assert!(options.is_none());
    }
}
