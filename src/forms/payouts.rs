use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::domain::approval::{ApprovalKind, ApprovalState};
use crate::forms::sanitize::non_empty_multiline;

const NOTE_MAX_LEN: u64 = 500;

/// Filters accepted by `GET /api/admin/approvals`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ApprovalFilter {
    pub status: Option<ApprovalState>,
    pub kind: Option<ApprovalKind>,
    pub order_id: Option<i32>,
}

/// Body of `POST /api/admin/approvals/{id}/reject`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectApprovalForm {
    #[validate(length(max = NOTE_MAX_LEN))]
    pub note: Option<String>,
}

impl RejectApprovalForm {
    pub fn into_note(self) -> Result<Option<String>, ValidationErrors> {
        self.validate()?;
        Ok(non_empty_multiline(self.note.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_note_is_dropped() {
        let form = RejectApprovalForm {
            note: Some("   ".to_string()),
        };
        assert_eq!(form.into_note().expect("valid"), None);
    }

    #[test]
    fn overlong_note_is_rejected() {
        let form = RejectApprovalForm {
            note: Some("x".repeat(501)),
        };
        assert!(form.into_note().is_err());
    }
}
