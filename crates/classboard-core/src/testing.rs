//! Fixtures shared by unit tests.

use crate::sprint::{Sprint, SprintStatus};
use crate::work_item::{Person, WorkItem, WorkItemStatus, WorkItemType};

pub(crate) fn item(id: u64, item_type: WorkItemType) -> WorkItem {
    WorkItem {
        id,
        key: format!("WI-{}", id),
        item_type,
        summary: format!("Item {}", id),
        description: None,
        status: WorkItemStatus::ToDo,
        story_points: None,
        start_date: None,
        end_date: None,
        assignee: None,
        reporter: Person {
            id: 1,
            name: "Ana".to_string(),
        },
        parent_item_id: None,
        sprint_id: None,
        num_of_sub_items: 0,
        parent_lecturer_work_item_id: None,
        approved: false,
    }
}

pub(crate) fn item_with_status(id: u64, status: WorkItemStatus) -> WorkItem {
    let mut item = item(id, WorkItemType::Task);
    item.status = status;
    item
}

pub(crate) fn sprint(id: u64, number: u32, status: SprintStatus, items: Vec<WorkItem>) -> Sprint {
    Sprint {
        id,
        number,
        name: None,
        status,
        start_date: None,
        end_date: None,
        work_items: items
            .into_iter()
            .map(|mut i| {
                i.sprint_id = Some(id);
                i
            })
            .collect(),
    }
}
