//! Integration tests for loading, moving and sprint lifecycle.

mod common;

use chrono::{Duration, Utc};
use classboard_api::dto::status;
use classboard_api::Operation;
use classboard_core::drag::{DragAdapter, DragOutcome, DropZone, Point, Rect};
use classboard_core::sprint::{Destination, SprintPlan, SprintStatus};
use classboard_core::work_item::{WorkItemDraft, WorkItemEdit, WorkItemType};
use classboard_core::{BoardError, Container, ErrorKind, MoveOutcome};
use common::*;
use pretty_assertions::assert_eq;

fn zones() -> Vec<DropZone> {
    vec![
        DropZone {
            container: Container::Sprint(ACTIVE_SPRINT),
            rect: Rect::new(0.0, 0.0, 600.0, 200.0),
        },
        DropZone {
            container: Container::Sprint(EMPTY_SPRINT),
            rect: Rect::new(0.0, 220.0, 600.0, 200.0),
        },
        DropZone {
            container: Container::Backlog,
            rect: Rect::new(0.0, 440.0, 600.0, 400.0),
        },
    ]
}

fn plan(days: i64) -> SprintPlan {
    let start = Utc::now();
    SprintPlan {
        name: Some("Polish".to_string()),
        start_date: start,
        end_date: start + Duration::days(days),
    }
}

#[tokio::test]
async fn test_load_builds_snapshot() {
    let (_backend, controller) = leader().await;
    let board = controller.snapshot().expect("loaded");

    assert_eq!(board.sprints.len(), 2);
    assert_eq!(board.item_count(), 6);
    assert_eq!(
        board.container_of(REVIEWED_STORY),
        Some(Container::Sprint(ACTIVE_SPRINT))
    );
    assert_eq!(board.container_of(BACKLOG_STORY), Some(Container::Backlog));
    assert_eq!(controller.revision(), 1);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_state() {
    let (backend, mut controller) = leader().await;
    backend.fail_next(Operation::FetchBoard);

    let err = controller.load().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert_eq!(controller.revision(), 1);
    assert_eq!(controller.snapshot().map(|b| b.item_count()), Some(6));
}

#[tokio::test]
async fn test_actions_require_a_loaded_board() {
    let backend = std::sync::Arc::new(classboard_api::MemoryBackend::demo());
    let session = classboard_core::Session::new(classboard_core::session::Profile {
        id: LEADER_ID,
        name: "Ana Souza".to_string(),
        role: classboard_core::session::Role::Student,
    })
    .with_group(1, LEADER_ID);
    let mut controller = classboard_core::BoardController::new(backend.clone(), session).unwrap();

    let err = controller
        .move_item(BACKLOG_STORY, Container::Sprint(EMPTY_SPRINT))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotLoaded));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_drag_backlog_item_into_inactive_sprint() {
    let (backend, mut controller) = leader().await;
    let item = controller
        .snapshot()
        .and_then(|b| b.find_item(BACKLOG_STORY))
        .cloned()
        .unwrap();

    let mut drag = DragAdapter::new();
    drag.press(&item, Point::new(50.0, 500.0));
    assert!(drag.pointer_move(Point::new(50.0, 480.0)));
    drag.pointer_move(Point::new(60.0, 300.0));
    let intent = match drag.release(Point::new(60.0, 300.0), &zones()) {
        DragOutcome::Move(intent) => intent,
        other => panic!("expected a move, got {:?}", other),
    };
    assert_eq!(intent.target, Container::Sprint(EMPTY_SPRINT));

    let outcome = controller.apply_intent(intent).await.unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(backend.mutation_calls(), vec![Operation::UpdateWorkItem]);

    let board = controller.snapshot().unwrap();
    let sprint = board.sprint(EMPTY_SPRINT).unwrap();
    assert!(sprint.work_items.iter().any(|i| i.id == BACKLOG_STORY));
    assert_eq!(
        board.find_item(BACKLOG_STORY).and_then(|i| i.sprint_id),
        Some(EMPTY_SPRINT)
    );
    assert_eq!(controller.revision(), 2);
}

#[tokio::test]
async fn test_drop_on_own_container_issues_no_request() {
    let (backend, mut controller) = leader().await;
    let item = controller
        .snapshot()
        .and_then(|b| b.find_item(BACKLOG_STORY))
        .cloned()
        .unwrap();

    let mut drag = DragAdapter::new();
    drag.press(&item, Point::new(50.0, 500.0));
    drag.pointer_move(Point::new(80.0, 520.0));
    assert_eq!(
        drag.release(Point::new(80.0, 520.0), &zones()),
        DragOutcome::Discarded
    );

    let outcome = controller
        .move_item(BACKLOG_STORY, Container::Backlog)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_move_to_backlog_clears_sprint() {
    let (backend, mut controller) = leader().await;

    controller
        .move_item(REVIEWED_STORY, Container::Backlog)
        .await
        .unwrap();

    assert_eq!(backend.peek_work_item(REVIEWED_STORY).unwrap().sprint_id, None);
    assert_eq!(
        controller.snapshot().unwrap().container_of(REVIEWED_STORY),
        Some(Container::Backlog)
    );
}

#[tokio::test]
async fn test_failed_move_leaves_board_as_loaded() {
    let (backend, mut controller) = leader().await;
    backend.fail_next(Operation::UpdateWorkItem);

    let err = controller
        .move_item(BACKLOG_STORY, Container::Sprint(EMPTY_SPRINT))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mutation);
    assert_eq!(controller.revision(), 1);
    assert_eq!(
        controller.snapshot().unwrap().container_of(BACKLOG_STORY),
        Some(Container::Backlog)
    );
    assert!(!backend.calls().contains(&Operation::FetchBoard));
}

#[tokio::test]
async fn test_move_into_completed_sprint_is_rejected() {
    let (backend, mut controller) = leader().await;
    backend
        .force_sprint_status(ACTIVE_SPRINT, "COMPLETED")
        .unwrap();
    controller.load().await.unwrap();
    backend.reset_calls();

    let err = controller
        .move_item(BACKLOG_STORY, Container::Sprint(ACTIVE_SPRINT))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_create_sprint_numbers_after_existing() {
    let (backend, mut controller) = leader().await;

    let sprint = controller.create_sprint().await.unwrap();
    assert_eq!(sprint.number, 3);
    assert_eq!(sprint.status, SprintStatus::Inactive);
    assert_eq!(controller.snapshot().unwrap().sprints.len(), 3);
    assert_eq!(backend.mutation_calls(), vec![Operation::CreateSprint]);
}

#[tokio::test]
async fn test_failed_create_sprint_is_surfaced() {
    let (backend, mut controller) = leader().await;
    backend.fail_next(Operation::CreateSprint);

    let err = controller.create_sprint().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mutation);
    assert_eq!(controller.snapshot().unwrap().sprints.len(), 2);
}

#[tokio::test]
async fn test_start_empty_sprint_is_rejected() {
    let (backend, mut controller) = leader().await;

    let err = controller.start_sprint(EMPTY_SPRINT, plan(14)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_start_with_backwards_dates_is_rejected() {
    let (backend, mut controller) = leader().await;
    controller
        .move_item(BACKLOG_STORY, Container::Sprint(EMPTY_SPRINT))
        .await
        .unwrap();
    backend.reset_calls();

    let err = controller.start_sprint(EMPTY_SPRINT, plan(0)).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
    let err = controller.start_sprint(EMPTY_SPRINT, plan(-3)).await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_start_sprint_sets_in_progress() {
    let (_backend, mut controller) = leader().await;
    controller
        .move_item(BACKLOG_STORY, Container::Sprint(EMPTY_SPRINT))
        .await
        .unwrap();

    controller.start_sprint(EMPTY_SPRINT, plan(7)).await.unwrap();

    let sprint = controller.snapshot().unwrap().sprint(EMPTY_SPRINT).unwrap();
    assert_eq!(sprint.status, SprintStatus::InProgress);
    assert_eq!(sprint.name.as_deref(), Some("Polish"));
}

#[tokio::test]
async fn test_complete_sprint_moves_only_unfinished_items() {
    let (backend, mut controller) = leader().await;
    backend.force_status(PARENT_TASK, status::DONE).unwrap();
    controller.load().await.unwrap();

    let moved = controller
        .complete_sprint(ACTIVE_SPRINT, Destination::Backlog)
        .await
        .unwrap();
    assert_eq!(moved, 1);

    let board = controller.snapshot().unwrap();
    let sprint = board.sprint(ACTIVE_SPRINT).unwrap();
    assert_eq!(sprint.status, SprintStatus::Completed);
    let remaining: Vec<u64> = sprint.work_items.iter().map(|i| i.id).collect();
    assert_eq!(remaining, vec![PARENT_TASK]);
    assert_eq!(board.container_of(REVIEWED_STORY), Some(Container::Backlog));
}

#[tokio::test]
async fn test_complete_sprint_into_another_sprint() {
    let (_backend, mut controller) = leader().await;

    let moved = controller
        .complete_sprint(ACTIVE_SPRINT, Destination::Sprint(EMPTY_SPRINT))
        .await
        .unwrap();
    assert_eq!(moved, 2);

    let board = controller.snapshot().unwrap();
    assert!(board.items_in(Container::Sprint(ACTIVE_SPRINT)).is_empty());
    assert_eq!(board.items_in(Container::Sprint(EMPTY_SPRINT)).len(), 2);
}

#[tokio::test]
async fn test_complete_sprint_into_itself_is_rejected() {
    let (backend, mut controller) = leader().await;

    let err = controller
        .complete_sprint(ACTIVE_SPRINT, Destination::Sprint(ACTIVE_SPRINT))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = controller
        .complete_sprint(EMPTY_SPRINT, Destination::Backlog)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidSprintTransition { .. }));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_delete_sprint_returns_items_to_backlog() {
    let (backend, mut controller) = leader().await;

    controller.delete_sprint(ACTIVE_SPRINT).await.unwrap();

    let board = controller.snapshot().unwrap();
    assert!(board.sprint(ACTIVE_SPRINT).is_none());
    for id in [REVIEWED_STORY, PARENT_TASK] {
        assert_eq!(board.find_item(id).unwrap().sprint_id, None);
        assert_eq!(backend.peek_work_item(id).unwrap().sprint_id, None);
    }
}

#[tokio::test]
async fn test_lecturer_assigned_item_cannot_be_deleted_or_edited() {
    let (backend, mut controller) = leader().await;

    let err = controller.delete_work_item(LECTURER_TASK).await.unwrap_err();
    assert!(matches!(err, BoardError::LecturerAssigned { .. }));

    let edit = WorkItemEdit {
        summary: Some("Renamed".to_string()),
        ..Default::default()
    };
    let err = controller
        .update_work_item(LECTURER_TASK, edit)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::LecturerAssigned { .. }));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_lecturer_assigned_item_can_still_move() {
    let (_backend, mut controller) = leader().await;

    let outcome = controller
        .move_item(LECTURER_TASK, Container::Sprint(ACTIVE_SPRINT))
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Moved);
}

#[tokio::test]
async fn test_delete_item_cascades_to_sub_items() {
    let (_backend, mut controller) = leader().await;

    controller.delete_work_item(PARENT_TASK).await.unwrap();

    let board = controller.snapshot().unwrap();
    assert!(board.find_item(PARENT_TASK).is_none());
    assert!(board.find_item(SUBTASK).is_none());
}

#[tokio::test]
async fn test_create_work_item_checks_parent_locally() {
    let (backend, mut controller) = leader().await;

    let orphan = WorkItemDraft::new(WorkItemType::Subtask, "Dangling");
    let err = controller.create_work_item(orphan).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let wrong_parent = WorkItemDraft::new(WorkItemType::Subtask, "Wrong").with_parent(BACKLOG_STORY);
    assert!(controller.create_work_item(wrong_parent).await.is_err());
    assert!(backend.mutation_calls().is_empty());

    let draft = WorkItemDraft::new(WorkItemType::Subtask, "Refresh token").with_parent(PARENT_TASK);
    let created = controller.create_work_item(draft).await.unwrap();
    assert_eq!(created.parent_item_id, Some(PARENT_TASK));
    assert_eq!(created.reporter.id, LEADER_ID);
    assert_eq!(controller.snapshot().unwrap().sub_items(PARENT_TASK).len(), 2);
}

#[tokio::test]
async fn test_confirmed_create_survives_failed_reload() {
    let (backend, mut controller) = leader().await;
    backend.fail_next(Operation::FetchBoard);

    let created = controller
        .create_work_item(WorkItemDraft::new(WorkItemType::Task, "Write report"))
        .await
        .unwrap();
    assert_eq!(created.summary, "Write report");
    assert!(controller.is_stale());
    assert_eq!(controller.snapshot().unwrap().find_item(created.id), None);
    assert_eq!(backend.mutation_calls(), vec![Operation::CreateWorkItem]);

    controller.load().await.unwrap();
    assert!(!controller.is_stale());
    assert_eq!(controller.snapshot().unwrap().item_count(), 7);
}

#[tokio::test]
async fn test_confirmed_bulk_create_survives_failed_reload() {
    let (backend, mut controller) = leader().await;
    backend.fail_next(Operation::FetchBoard);

    let created = controller
        .create_work_items(vec![
            WorkItemDraft::new(WorkItemType::Task, "Slides"),
            WorkItemDraft::new(WorkItemType::Story, "Demo day"),
        ])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(controller.is_stale());

    // Next action refreshes before its local checks.
    controller.delete_work_item(created[0].id).await.unwrap();
    assert!(!controller.is_stale());
    assert_eq!(controller.snapshot().unwrap().item_count(), 7);
    assert_eq!(
        backend.mutation_calls(),
        vec![Operation::CreateWorkItems, Operation::DeleteWorkItem]
    );
}

#[tokio::test]
async fn test_bulk_create_rejects_whole_batch() {
    let (backend, mut controller) = leader().await;
    let drafts = vec![
        WorkItemDraft::new(WorkItemType::Task, "Fine"),
        WorkItemDraft::new(WorkItemType::Task, "  "),
    ];

    let err = controller.create_work_items(drafts).await.unwrap_err();
    assert!(err.to_string().contains("row 2"));
    assert!(backend.mutation_calls().is_empty());

    let drafts = vec![
        WorkItemDraft::new(WorkItemType::Task, "Slides").in_sprint(EMPTY_SPRINT),
        WorkItemDraft::new(WorkItemType::Epic, "Final exam"),
    ];
    let created = controller.create_work_items(drafts).await.unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(controller.snapshot().unwrap().item_count(), 8);
}

#[tokio::test]
async fn test_update_work_item_applies_edit() {
    let (backend, mut controller) = leader().await;

    let edit = WorkItemEdit {
        summary: Some("Login and logout".to_string()),
        story_points: Some(3.0),
        ..Default::default()
    };
    let updated = controller.update_work_item(REVIEWED_STORY, edit).await.unwrap();
    assert_eq!(updated.summary, "Login and logout");
    assert_eq!(updated.story_points, Some(3.0));

    backend.reset_calls();
    controller
        .update_work_item(REVIEWED_STORY, WorkItemEdit::default())
        .await
        .unwrap();
    assert!(backend.calls().is_empty());
}
