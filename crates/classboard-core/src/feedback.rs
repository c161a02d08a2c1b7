//! Review feedback: the approval and rejection audit log.

use chrono::{DateTime, Utc};
use classboard_api::dto::{self, ApproveRequest, FeedbackDto, RejectRequest};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Approve,
    Reject,
}

impl FeedbackKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            dto::feedback_kind::APPROVE => Some(Self::Approve),
            dto::feedback_kind::REJECT => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => dto::feedback_kind::APPROVE,
            Self::Reject => dto::feedback_kind::REJECT,
        }
    }
}

/// A review rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> BoardResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(BoardError::validation(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// One entry of an item's review history. Never the source of the
/// item's current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: u64,
    pub work_item_id: u64,
    pub kind: FeedbackKind,
    pub rating: Option<Rating>,
    pub comment: Option<String>,
    pub author_id: u64,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn from_dto(dto: FeedbackDto) -> BoardResult<Self> {
        let kind = FeedbackKind::parse(&dto.kind).ok_or_else(|| {
            BoardError::Malformed(format!("Feedback {} has unknown kind '{}'", dto.id, dto.kind))
        })?;
        let rating = dto
            .rating
            .map(Rating::new)
            .transpose()
            .map_err(|e| BoardError::Malformed(e.to_string()))?;

        Ok(Self {
            id: dto.id,
            work_item_id: dto.work_item_id,
            kind,
            rating,
            comment: dto.comment,
            author_id: dto.author_id,
            created_at: dto.created_at,
        })
    }
}

fn clean_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Approval dialog input. The rating is required, the comment is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalForm {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

impl ApprovalForm {
    pub fn new(rating: u8, comment: Option<&str>) -> Self {
        Self {
            rating: Some(rating),
            comment: comment.map(str::to_string),
        }
    }

    pub fn into_request(self, author_id: u64) -> BoardResult<ApproveRequest> {
        let rating = self
            .rating
            .ok_or_else(|| BoardError::validation("A rating is required to approve"))?;
        let rating = Rating::new(rating)?;
        Ok(ApproveRequest {
            rating: rating.value(),
            comment: clean_comment(self.comment),
            author_id,
        })
    }
}

/// Rejection dialog input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionForm {
    pub comment: Option<String>,
}

impl RejectionForm {
    pub fn new(comment: Option<&str>) -> Self {
        Self {
            comment: comment.map(str::to_string),
        }
    }

    pub fn into_request(self, author_id: u64) -> RejectRequest {
        RejectRequest {
            comment: clean_comment(self.comment),
            author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_approval_requires_rating() {
        let form = ApprovalForm {
            rating: None,
            comment: Some("Nice".to_string()),
        };
        assert!(matches!(
            form.into_request(1),
            Err(BoardError::Validation(_))
        ));

        let req = ApprovalForm::new(4, Some("  Good ")).into_request(1).unwrap();
        assert_eq!(req.rating, 4);
        assert_eq!(req.comment.as_deref(), Some("Good"));
    }

    #[test]
    fn test_blank_rejection_comment_is_dropped() {
        let req = RejectionForm::new(Some("   ")).into_request(2);
        assert_eq!(req.comment, None);
        assert_eq!(req.author_id, 2);
    }
}
