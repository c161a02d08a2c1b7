//! Drag-interaction adapter.
//!
//! Turns press/move/release pointer input into a "move item to container"
//! intent. Two layers: [`DragAdapter::on_drag_start`] and
//! [`DragAdapter::on_drag_end`] are the gesture-library-agnostic interface;
//! the pointer methods on top of them apply the activation distance and
//! pick the drop target by corner proximity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Container;
use crate::work_item::{WorkItem, WorkItemStatus, WorkItemType};

/// Pointer travel (in pixels) before a press becomes a drag.
pub const ACTIVATION_DISTANCE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned bounding box of a drop container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }

    pub fn corners(&self) -> [Point; 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            Point::new(self.left, self.top),
            Point::new(right, self.top),
            Point::new(self.left, bottom),
            Point::new(right, bottom),
        ]
    }

    /// Mean distance from `p` to the four corners.
    fn corner_distance(&self, p: Point) -> f64 {
        self.corners().iter().map(|c| c.distance(&p)).sum::<f64>() / 4.0
    }
}

/// A container's drop area as currently laid out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub container: Container,
    pub rect: Rect,
}

/// Among the zones under `p`, the one whose corners are nearest.
/// `None` when the pointer is outside every zone.
pub fn closest_corners(zones: &[DropZone], p: Point) -> Option<&DropZone> {
    zones
        .iter()
        .filter(|z| z.rect.contains(p))
        .min_by(|a, b| a.rect.corner_distance(p).total_cmp(&b.rect.corner_distance(p)))
}

/// Data shown in the floating preview while dragging. Display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub item_id: u64,
    pub key: String,
    pub summary: String,
    pub item_type: WorkItemType,
    pub status: WorkItemStatus,
}

impl DragPreview {
    fn of(item: &WorkItem) -> Self {
        Self {
            item_id: item.id,
            key: item.key.clone(),
            summary: item.summary.clone(),
            item_type: item.item_type,
            status: item.status,
        }
    }
}

/// Request to relocate an item, consumed by the board controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub item_id: u64,
    pub source: Container,
    pub target: Container,
}

#[derive(Debug, Clone, PartialEq)]
struct DragOrigin {
    source: Container,
    preview: DragPreview,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Phase {
    #[default]
    Idle,
    Pressed {
        origin: DragOrigin,
        at: Point,
    },
    Dragging {
        origin: DragOrigin,
        pointer: Point,
    },
}

/// How a pointer release ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Released before the activation distance: a plain click on the item.
    Click(u64),
    /// Dropped outside any container, or back onto its own container.
    Discarded,
    /// Dropped onto a different container.
    Move(MoveIntent),
}

#[derive(Debug, Clone, Default)]
pub struct DragAdapter {
    phase: Phase,
}

impl DragAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `item`, recording where it came from.
    pub fn on_drag_start(&mut self, item: &WorkItem) {
        debug!(item_id = item.id, "Drag started");
        self.phase = Phase::Dragging {
            origin: DragOrigin {
                source: item.container(),
                preview: DragPreview::of(item),
            },
            pointer: Point::new(0.0, 0.0),
        };
    }

    /// Finish the drag over `target` (`None` when over no container).
    pub fn on_drag_end(&mut self, target: Option<Container>) -> Option<MoveIntent> {
        let Phase::Dragging { origin, .. } = std::mem::take(&mut self.phase) else {
            return None;
        };
        let target = target?;
        if target == origin.source {
            debug!(item_id = origin.preview.item_id, "Dropped on its own container");
            return None;
        }
        Some(MoveIntent {
            item_id: origin.preview.item_id,
            source: origin.source,
            target,
        })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Preview of the dragged item and the pointer position, while dragging.
    pub fn preview(&self) -> Option<(&DragPreview, Point)> {
        match &self.phase {
            Phase::Dragging { origin, pointer } => Some((&origin.preview, *pointer)),
            _ => None,
        }
    }

    /// Pointer pressed on `item`.
    pub fn press(&mut self, item: &WorkItem, at: Point) {
        self.phase = Phase::Pressed {
            origin: DragOrigin {
                source: item.container(),
                preview: DragPreview::of(item),
            },
            at,
        };
    }

    /// Pointer moved. Returns true on the move that activates the drag.
    pub fn pointer_move(&mut self, to: Point) -> bool {
        match &mut self.phase {
            Phase::Pressed { origin, at } if at.distance(&to) >= ACTIVATION_DISTANCE => {
                let origin = origin.clone();
                debug!(item_id = origin.preview.item_id, "Drag activated");
                self.phase = Phase::Dragging {
                    origin,
                    pointer: to,
                };
                true
            }
            Phase::Dragging { pointer, .. } => {
                *pointer = to;
                false
            }
            _ => false,
        }
    }

    /// Pointer released at `at` over the current layout.
    pub fn release(&mut self, at: Point, zones: &[DropZone]) -> DragOutcome {
        match &self.phase {
            Phase::Idle => DragOutcome::Discarded,
            Phase::Pressed { origin, .. } => {
                let item_id = origin.preview.item_id;
                self.phase = Phase::Idle;
                DragOutcome::Click(item_id)
            }
            Phase::Dragging { .. } => {
                let target = closest_corners(zones, at).map(|z| z.container);
                match self.on_drag_end(target) {
                    Some(intent) => DragOutcome::Move(intent),
                    None => DragOutcome::Discarded,
                }
            }
        }
    }

    /// Abort any press or drag.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}
