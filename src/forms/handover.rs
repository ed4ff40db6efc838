use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::order::OrderStatus;
use crate::domain::tracking::NewTrackingEvent;
use crate::forms::sanitize::{non_empty_inline, sanitize_code};

const NOTE_MAX_LEN: u64 = 500;

pub type HandoverFormResult<T> = Result<T, HandoverFormError>;

#[derive(Debug, Error)]
pub enum HandoverFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("code must be {expected} digits")]
    MalformedCode { expected: usize },
}

/// Body of the pickup and delivery confirmation endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeForm {
    pub code: String,
}

impl CodeForm {
    /// The submitted code, checked for shape before it costs an attempt.
    pub fn into_code(self, expected_len: usize) -> HandoverFormResult<String> {
        let code = sanitize_code(&self.code);
        if code.len() != expected_len || !code.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(HandoverFormError::MalformedCode {
                expected: expected_len,
            });
        }
        Ok(code)
    }
}

/// Body of `POST /api/deliveries/{id}/location`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordLocationForm {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = NOTE_MAX_LEN))]
    pub note: Option<String>,
}

impl RecordLocationForm {
    pub fn into_event(
        self,
        order_id: i32,
        actor_id: i32,
        agent_id: i32,
        status: OrderStatus,
    ) -> HandoverFormResult<NewTrackingEvent> {
        self.validate()?;

        Ok(NewTrackingEvent::status_change(order_id, actor_id, status)
            .with_agent(Some(agent_id))
            .with_position(self.latitude, self.longitude)
            .with_note(non_empty_inline(self.note.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_trimmed_and_checked() {
        let form = CodeForm {
            code: " 123456 ".to_string(),
        };
        assert_eq!(form.into_code(6).expect("valid"), "123456");

        let form = CodeForm {
            code: "12a456".to_string(),
        };
        assert!(matches!(
            form.into_code(6),
            Err(HandoverFormError::MalformedCode { expected: 6 })
        ));

        let form = CodeForm {
            code: "1234".to_string(),
        };
        assert!(form.into_code(6).is_err());
    }

    #[test]
    fn location_becomes_tracking_event() {
        let form = RecordLocationForm {
            latitude: -1.95,
            longitude: 30.06,
            note: Some("  near  market ".to_string()),
        };

        let event = form
            .into_event(10, 4, 2, OrderStatus::EnRoute)
            .expect("valid");

        assert_eq!(event.order_id, 10);
        assert_eq!(event.agent_id, Some(2));
        assert_eq!(event.latitude, Some(-1.95));
        assert_eq!(event.note.as_deref(), Some("near market"));
    }
}
