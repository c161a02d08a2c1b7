//! Shared setup for controller integration tests.
//!
//! The demo group (id 1) is led by person 1 and seeded as follows:
//! - WI-1 Epic, backlog
//! - WI-2 Story, sprint 1, WAIT FOR REVIEW
//! - WI-3 Task, sprint 1, parent of WI-4
//! - WI-4 Subtask, backlog, TO DO
//! - WI-5 Task, backlog, lecturer-assigned
//! - WI-6 Story, backlog
//!
//! Sprint 1 is IN PROGRESS and sprint 2 is INACTIVE and empty.

#![allow(dead_code)]

use std::sync::Arc;

use classboard_api::MemoryBackend;
use classboard_core::session::{Profile, Role};
use classboard_core::{BoardController, Session};

pub const LEADER_ID: u64 = 1;
pub const MEMBER_ID: u64 = 2;

pub const REVIEWED_STORY: u64 = 2;
pub const PARENT_TASK: u64 = 3;
pub const SUBTASK: u64 = 4;
pub const LECTURER_TASK: u64 = 5;
pub const BACKLOG_STORY: u64 = 6;

pub const ACTIVE_SPRINT: u64 = 1;
pub const EMPTY_SPRINT: u64 = 2;

pub type TestController = BoardController<Arc<MemoryBackend>>;

fn session(person_id: u64, name: &str) -> Session {
    Session::new(Profile {
        id: person_id,
        name: name.to_string(),
        role: Role::Student,
    })
    .with_group(1, LEADER_ID)
}

async fn controller(person_id: u64, name: &str) -> (Arc<MemoryBackend>, TestController) {
    let backend = Arc::new(MemoryBackend::demo());
    let mut controller = BoardController::new(backend.clone(), session(person_id, name))
        .expect("session has a group");
    controller.load().await.expect("demo board loads");
    backend.reset_calls();
    (backend, controller)
}

/// Loaded controller acting as the group leader.
pub async fn leader() -> (Arc<MemoryBackend>, TestController) {
    controller(LEADER_ID, "Ana Souza").await
}

/// Loaded controller acting as a regular member.
pub async fn member() -> (Arc<MemoryBackend>, TestController) {
    controller(MEMBER_ID, "Bruno Lima").await
}
