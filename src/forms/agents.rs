use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::agent::{AgentDecision, AgentStatus, ApprovalStatus};
use crate::domain::user::AgentType;

/// Result type returned by the agent form helpers.
pub type AgentFormResult<T> = Result<T, AgentFormError>;

#[derive(Debug, Error)]
pub enum AgentFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("a commission rate only applies when approving")]
    CommissionOnReject,
}

/// Body of `PUT /api/agents/me/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AgentStatusForm {
    pub status: AgentStatus,
}

/// Body of `PUT /api/agents/me/location`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct AgentLocationForm {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl AgentLocationForm {
    pub fn into_position(self) -> AgentFormResult<(f64, f64)> {
        self.validate()?;
        Ok((self.latitude, self.longitude))
    }
}

/// Body of `POST /api/admin/agents/{id}/decision`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct AgentDecisionForm {
    pub approve: bool,
    /// Overrides the default rate when approving.
    #[validate(range(min = 0, max = 10_000))]
    pub commission_rate_bp: Option<i32>,
}

impl AgentDecisionForm {
    pub fn into_decision(self) -> AgentFormResult<AgentDecision> {
        self.validate()?;

        if self.approve {
            Ok(AgentDecision::Approve {
                commission_rate_bp: self.commission_rate_bp,
            })
        } else if self.commission_rate_bp.is_some() {
            Err(AgentFormError::CommissionOnReject)
        } else {
            Ok(AgentDecision::Reject)
        }
    }
}

/// Filters accepted by `GET /api/admin/agents`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AgentFilter {
    pub approval_status: Option<ApprovalStatus>,
    pub agent_type: Option<AgentType>,
}
