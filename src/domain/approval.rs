use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::user::AgentType;
use crate::pagination::Pagination;

string_enum! {
    /// Money movement that needs an admin sign-off after delivery.
    pub enum ApprovalKind as "approval kind" {
        SellerPayout => "SELLER_PAYOUT",
        FdaCommission => "FDA_COMMISSION",
        PdaCommission => "PDA_COMMISSION",
    }
}

impl ApprovalKind {
    /// Commission line owed to an agent of `agent_type`, if any.
    pub fn commission_for(agent_type: AgentType) -> Option<ApprovalKind> {
        match agent_type {
            AgentType::FastDelivery => Some(ApprovalKind::FdaCommission),
            AgentType::PickupDelivery => Some(ApprovalKind::PdaCommission),
            AgentType::PickupSiteManager => None,
        }
    }
}

string_enum! {
    pub enum ApprovalState as "approval state" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// One payout line awaiting or holding an admin decision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Approval {
    pub id: i32,
    pub order_id: i32,
    pub kind: ApprovalKind,
    pub beneficiary_id: i32,
    pub amount: i64,
    pub status: ApprovalState,
    pub decided_by: Option<i32>,
    pub decided_at: Option<NaiveDateTime>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApproval {
    pub kind: ApprovalKind,
    pub beneficiary_id: i32,
    pub amount: i64,
}

/// Outcome of an approve/reject call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApprovalOutcome {
    pub approval: Approval,
    /// False when the call found the approval already in the target state.
    pub changed: bool,
}

/// Split a delivered order into its payout lines.
///
/// The seller receives the subtotal net of discount. The agent commission is
/// `commission_rate_bp` of the subtotal, rounded down.
pub fn payout_lines(
    subtotal: i64,
    discount: i64,
    seller_id: i32,
    agent: Option<(i32, AgentType, i32)>,
) -> Vec<NewApproval> {
    let mut lines = vec![NewApproval {
        kind: ApprovalKind::SellerPayout,
        beneficiary_id: seller_id,
        amount: (subtotal - discount).max(0),
    }];

    let commission = agent.and_then(|(agent_user_id, agent_type, commission_rate_bp)| {
        ApprovalKind::commission_for(agent_type).map(|kind| NewApproval {
            kind,
            beneficiary_id: agent_user_id,
            amount: subtotal * i64::from(commission_rate_bp) / 10_000,
        })
    });
    lines.extend(commission);

    lines
}

#[derive(Debug, Clone)]
pub struct ApprovalListQuery {
    pub status: Option<ApprovalState>,
    pub kind: Option<ApprovalKind>,
    pub order_id: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl ApprovalListQuery {
    pub fn new() -> Self {
        Self {
            status: None,
            kind: None,
            order_id: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: ApprovalState) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: ApprovalKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn order(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Default for ApprovalListQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_delivery_order_yields_seller_and_fda_lines() {
        let lines = payout_lines(4500, 0, 7, Some((9, AgentType::FastDelivery, 1000)));
        assert_eq!(
            lines,
            vec![
                NewApproval {
                    kind: ApprovalKind::SellerPayout,
                    beneficiary_id: 7,
                    amount: 4500,
                },
                NewApproval {
                    kind: ApprovalKind::FdaCommission,
                    beneficiary_id: 9,
                    amount: 450,
                },
            ]
        );
    }

    #[test]
    fn seller_payout_is_net_of_discount() {
        let lines = payout_lines(4500, 500, 7, None);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, 4000);
    }
}
