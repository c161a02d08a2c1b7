//! Integration tests for status changes and the review workflow.

mod common;

use classboard_api::dto::status;
use classboard_api::Operation;
use classboard_core::dialog::DialogScope;
use classboard_core::feedback::{ApprovalForm, FeedbackKind, RejectionForm};
use classboard_core::policy::REJECTED_STATUS;
use classboard_core::work_item::WorkItemStatus;
use classboard_core::{BoardError, ErrorKind, StatusOutcome};
use common::*;
use pretty_assertions::assert_eq;

fn status_of(controller: &TestController, item_id: u64) -> WorkItemStatus {
    controller
        .snapshot()
        .and_then(|b| b.find_item(item_id))
        .map(|i| i.status)
        .expect("item on board")
}

#[tokio::test]
async fn test_same_status_issues_no_request() {
    let (backend, mut controller) = member().await;

    let outcome = controller
        .change_status(BACKLOG_STORY, WorkItemStatus::ToDo)
        .await
        .unwrap();
    assert_eq!(outcome, StatusOutcome::Unchanged);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_member_moves_item_through_working_statuses() {
    let (backend, mut controller) = member().await;

    for next in [
        WorkItemStatus::InProgress,
        WorkItemStatus::WaitForReview,
        WorkItemStatus::ToDo,
    ] {
        let outcome = controller.change_status(BACKLOG_STORY, next).await.unwrap();
        assert_eq!(outcome, StatusOutcome::Updated(next));
        assert_eq!(status_of(&controller, BACKLOG_STORY), next);
    }
    assert_eq!(backend.mutation_calls().len(), 3);
}

#[tokio::test]
async fn test_member_options_never_include_done() {
    let (_backend, member) = member().await;
    assert!(!member.status_options().contains(&WorkItemStatus::Done));

    let (_backend, leader) = leader().await;
    assert!(leader.status_options().contains(&WorkItemStatus::Done));
}

#[tokio::test]
async fn test_member_cannot_set_done() {
    let (backend, mut controller) = member().await;

    let err = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotPermitted(_)));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_done_with_open_sub_items_is_rejected() {
    let (backend, mut controller) = leader().await;

    let err = controller
        .change_status(PARENT_TASK, WorkItemStatus::Done)
        .await
        .unwrap_err();
    match err {
        BoardError::OpenSubItems { ref key, open } => {
            assert_eq!(key, "WI-3");
            assert_eq!(open, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!controller.review_scope().is_open());
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_leader_done_opens_dialog_without_mutation() {
    let (backend, mut controller) = leader().await;

    let outcome = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap();
    let dialog = match outcome {
        StatusOutcome::ApprovalRequired(dialog) => dialog,
        other => panic!("expected approval dialog, got {:?}", other),
    };
    assert_eq!(dialog.item_id, REVIEWED_STORY);
    assert!(controller.review_scope().is_open());
    assert!(backend.mutation_calls().is_empty());
    assert_eq!(
        status_of(&controller, REVIEWED_STORY),
        WorkItemStatus::WaitForReview
    );
}

#[tokio::test]
async fn test_approval_requires_rating_before_any_request() {
    let (backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(dialog) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };

    let missing = ApprovalForm {
        rating: None,
        comment: Some("Good".to_string()),
    };
    let err = controller.submit_approval(&dialog, missing).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = controller
        .submit_approval(&dialog, ApprovalForm::new(6, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(backend.mutation_calls().is_empty());
    assert!(controller.review_scope().is_open());
}

#[tokio::test]
async fn test_approval_marks_item_done_with_feedback() {
    let (backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(dialog) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };

    let record = controller
        .submit_approval(&dialog, ApprovalForm::new(4, Some("Good")))
        .await
        .unwrap();
    assert_eq!(record.kind, FeedbackKind::Approve);
    assert_eq!(record.rating.map(|r| r.value()), Some(4));
    assert_eq!(record.comment.as_deref(), Some("Good"));
    assert_eq!(record.author_id, LEADER_ID);

    let item = controller
        .snapshot()
        .and_then(|b| b.find_item(REVIEWED_STORY))
        .unwrap();
    assert_eq!(item.status, WorkItemStatus::Done);
    assert!(item.approved);
    assert!(!controller.review_scope().is_open());
    assert_eq!(backend.mutation_calls(), vec![Operation::ApproveWorkItem]);

    let history = controller.feedback(REVIEWED_STORY).await.unwrap();
    assert_eq!(history, vec![record]);
}

#[tokio::test]
async fn test_cancelled_dialog_cannot_be_submitted() {
    let (backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(dialog) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };

    controller.cancel_approval(&dialog);
    let err = controller
        .submit_approval(&dialog, ApprovalForm::new(5, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(backend.mutation_calls().is_empty());
    assert_eq!(
        status_of(&controller, REVIEWED_STORY),
        WorkItemStatus::WaitForReview
    );
}

#[tokio::test]
async fn test_reopened_dialog_invalidates_previous_one() {
    let (_backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(first) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };
    let StatusOutcome::ApprovalRequired(second) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };

    assert!(controller
        .submit_approval(&first, ApprovalForm::new(3, None))
        .await
        .is_err());
    assert!(controller
        .submit_approval(&second, ApprovalForm::new(3, None))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_confirmed_approval_survives_failed_reload() {
    let (backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(dialog) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };
    backend.fail_next(Operation::FetchBoard);

    let record = controller
        .submit_approval(&dialog, ApprovalForm::new(4, Some("Good")))
        .await
        .unwrap();
    assert_eq!(record.kind, FeedbackKind::Approve);
    assert!(!controller.is_reviewing(&dialog));
    assert!(controller.is_stale());
    assert_eq!(controller.revision(), 1);
    assert_eq!(
        backend.peek_work_item(REVIEWED_STORY).unwrap().status,
        status::DONE
    );

    // The dialog is gone, so a second submit sends nothing.
    let err = controller
        .submit_approval(&dialog, ApprovalForm::new(4, Some("Good")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(backend.mutation_calls(), vec![Operation::ApproveWorkItem]);

    // The next action reloads first and sees the item as DONE.
    let err = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidStatusTransition { .. }));
    assert!(!controller.is_stale());
    assert_eq!(status_of(&controller, REVIEWED_STORY), WorkItemStatus::Done);
    assert_eq!(backend.mutation_calls(), vec![Operation::ApproveWorkItem]);
}

#[tokio::test]
async fn test_failed_approval_keeps_dialog_open() {
    let (backend, mut controller) = leader().await;
    let StatusOutcome::ApprovalRequired(dialog) = controller
        .change_status(REVIEWED_STORY, WorkItemStatus::Done)
        .await
        .unwrap()
    else {
        panic!("expected approval dialog");
    };
    backend.fail_next(Operation::ApproveWorkItem);

    let err = controller
        .submit_approval(&dialog, ApprovalForm::new(4, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mutation);
    assert!(controller.is_reviewing(&dialog));
    assert_eq!(controller.revision(), 1);
}

#[tokio::test]
async fn test_done_item_is_terminal() {
    let (backend, mut controller) = leader().await;
    backend.force_status(BACKLOG_STORY, status::DONE).unwrap();
    controller.load().await.unwrap();
    backend.reset_calls();

    let err = controller
        .change_status(BACKLOG_STORY, WorkItemStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidStatusTransition { .. }));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_reject_returns_item_to_to_do() {
    let (backend, mut controller) = leader().await;

    let record = controller
        .reject(REVIEWED_STORY, RejectionForm::new(Some("Needs more detail")))
        .await
        .unwrap();
    assert_eq!(record.kind, FeedbackKind::Reject);
    assert_eq!(record.rating, None);
    assert_eq!(record.comment.as_deref(), Some("Needs more detail"));

    assert_eq!(status_of(&controller, REVIEWED_STORY), REJECTED_STATUS);
    assert_eq!(
        backend.peek_work_item(REVIEWED_STORY).unwrap().status,
        status::TO_DO
    );
}

#[tokio::test]
async fn test_reject_requires_wait_for_review() {
    let (backend, mut controller) = leader().await;

    let err = controller
        .reject(BACKLOG_STORY, RejectionForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::InvalidStatusTransition { .. }));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_member_cannot_reject() {
    let (backend, mut controller) = member().await;

    let err = controller
        .reject(REVIEWED_STORY, RejectionForm::new(None))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::NotPermitted(_)));
    assert!(backend.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_selection_options_for_closed_dialog_are_dropped() {
    let (_backend, controller) = member().await;
    let scope = DialogScope::new();

    let ticket = scope.open();
    let options = controller
        .selection_options(&scope, ticket)
        .await
        .unwrap()
        .expect("dialog still open");
    assert_eq!(options.members.len(), 3);
    assert_eq!(options.epics.len(), 1);
    assert_eq!(options.sprints.len(), 2);

    scope.close();
    let stale = controller.selection_options(&scope, ticket).await.unwrap();
    assert!(stale.is_none());
}
