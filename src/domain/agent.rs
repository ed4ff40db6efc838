use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::user::AgentType;
use crate::pagination::Pagination;

string_enum! {
    /// Operational availability reported by the agent.
    pub enum AgentStatus as "agent status" {
        /// Free and willing to take new deliveries.
        Available => "available",
        /// Working, possibly busy with a delivery.
        Active => "active",
        Offline => "offline",
    }
}

string_enum! {
    /// Outcome of the admin review of an agent registration.
    pub enum ApprovalStatus as "approval status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Operational profile attached to an agent account.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Agent {
    /// Agent profile identifier, referenced by `orders.agent_id`.
    pub id: i32,
    /// Account the profile belongs to.
    pub user_id: i32,
    /// Which kind of work the agent does.
    pub agent_type: AgentType,
    /// Availability reported by the agent.
    pub status: AgentStatus,
    /// Admin review outcome; only approved agents work.
    pub approval_status: ApprovalStatus,
    /// Commission in basis points of the order subtotal.
    pub commission_rate_bp: i32,
    /// Last reported position.
    pub latitude: Option<f64>,
    /// Last reported position.
    pub longitude: Option<f64>,
    /// Site a pickup site manager runs. Mirrors `pickup_sites.manager_id`.
    pub pickup_site_id: Option<i32>,
    /// Timestamp for when the profile was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the profile.
    pub updated_at: NaiveDateTime,
}

impl Agent {
    /// Approved agents that are not offline may take new work.
    pub fn can_take_orders(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
            && self.status != AgentStatus::Offline
            && self.agent_type.delivers()
    }
}

#[derive(Debug, Clone)]
pub struct NewAgent {
    /// Account the profile belongs to.
    pub user_id: i32,
    /// Which kind of work the agent does.
    pub agent_type: AgentType,
    /// Commission in basis points of the order subtotal.
    pub commission_rate_bp: i32,
    /// Site a manager registered for; linked on approval.
    pub pickup_site_id: Option<i32>,
}

/// Admin verdict on a pending agent registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentDecision {
    Approve { commission_rate_bp: Option<i32> },
    Reject,
}

impl AgentDecision {
    pub fn target_status(&self) -> ApprovalStatus {
        match self {
            AgentDecision::Approve { .. } => ApprovalStatus::Approved,
            AgentDecision::Reject => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentListQuery {
    pub approval_status: Option<ApprovalStatus>,
    pub agent_type: Option<AgentType>,
    pub pagination: Option<Pagination>,
}

impl AgentListQuery {
    pub fn new() -> Self {
        Self {
            approval_status: None,
            agent_type: None,
            pagination: None,
        }
    }

    pub fn approval_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = Some(status);
        self
    }

    pub fn agent_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = Some(agent_type);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Default for AgentListQuery {
    fn default() -> Self {
        Self::new()
    }
}
