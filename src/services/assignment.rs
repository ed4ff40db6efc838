//! Delivery agents picking orders from the shared pool.

use crate::config::HandoverSettings;
use crate::domain::agent::{Agent, AgentStatus, ApprovalStatus};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::handover::generate_code;
use crate::domain::order::{
    AvailableOrdersQuery, ClaimOutcome, Order, OrderKind, OrderStatus, OrderViewer,
    TransitionOutcome,
};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{AgentReader, MessageWriter, OrderReader, OrderWriter};
use crate::services::agents::current_agent;
use crate::services::notify::notify;
use crate::services::orders::load_order;
use crate::services::{ServiceError, ServiceResult};

/// Profile of a calling agent that delivers orders and has been approved.
fn delivering_agent<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Agent>
where
    R: AgentReader + ?Sized,
{
    let agent = current_agent(repo, user)?;
    if !agent.agent_type.delivers() || agent.approval_status != ApprovalStatus::Approved {
        return Err(ServiceError::Forbidden);
    }
    Ok(agent)
}

/// Profile of the calling agent when it holds `order`. Other agents are told
/// the order does not exist.
pub(crate) fn assigned_agent<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order: &Order,
) -> ServiceResult<Agent>
where
    R: AgentReader + ?Sized,
{
    let agent = current_agent(repo, user)?;
    if order.agent_id != Some(agent.id) {
        return Err(ServiceError::NotFound);
    }
    Ok(agent)
}

/// Unassigned orders the caller's agent type may deliver, oldest first.
pub fn list_available_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pagination: Pagination,
) -> ServiceResult<Paginated<Order>>
where
    R: AgentReader + OrderReader + ?Sized,
{
    let agent = delivering_agent(repo, user)?;

    let query = AvailableOrdersQuery {
        kinds: OrderKind::for_agent(agent.agent_type),
        pagination: Some(pagination),
    };
    let (total, orders) = repo.list_available_orders(query)?;

    Ok(Paginated::new(orders, pagination, total)
        .map(|order| order.redacted_for(OrderViewer::Other)))
}

/// Claim an order for the calling agent and issue its pickup code.
///
/// Exactly one concurrent claim wins; the others get `AlreadyAssigned`.
/// Accepting an order the caller already holds returns it unchanged.
pub fn accept_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    handover: &HandoverSettings,
) -> ServiceResult<Order>
where
    R: AgentReader + OrderReader + OrderWriter + MessageWriter + ?Sized,
{
    let agent = delivering_agent(repo, user)?;
    if agent.status == AgentStatus::Offline {
        return Err(ServiceError::Conflict(
            "go online before accepting orders".to_string(),
        ));
    }

    let order = load_order(repo, order_id)?;
    if !order.kind.delivered_by(agent.agent_type) {
        log::warn!(
            "Agent {} ({}) tried to accept {} order {}",
            agent.id,
            agent.agent_type,
            order.kind,
            order.id
        );
        return Err(ServiceError::Forbidden);
    }

    if order.agent_id == Some(agent.id) && order.status == OrderStatus::Assigned {
        return Ok(order.redacted_for(OrderViewer::AssignedAgent));
    }

    let pickup_code = generate_code(handover.code_length);
    let claimable = order.kind.claimable_statuses();

    match repo.claim_order(order.id, agent.id, user.id, claimable, &pickup_code)? {
        ClaimOutcome::Claimed(claimed) => {
            log::info!("Agent {} accepted order {}", agent.id, claimed.id);
            notify(
                repo,
                claimed.buyer_id,
                Some(claimed.id),
                format!("A courier accepted order #{}", claimed.id),
            );
            Ok(claimed.redacted_for(OrderViewer::AssignedAgent))
        }
        ClaimOutcome::AlreadyAssigned => Err(ServiceError::AlreadyAssigned),
        ClaimOutcome::NotClaimable(status) => Err(ServiceError::InvalidTransition {
            from: status,
            to: OrderStatus::Assigned,
        }),
    }
}

/// Give an assigned order back to the pool before pickup.
pub fn release_order<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: AgentReader + OrderReader + OrderWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;
    let agent = assigned_agent(repo, user, &order)?;

    let to = order.kind.release_status();
    match repo.release_order(order.id, agent.id, user.id, to)? {
        TransitionOutcome::Applied(released) => {
            log::info!("Agent {} released order {}", agent.id, released.id);
            Ok(released.redacted_for(OrderViewer::Other))
        }
        TransitionOutcome::Stale(current) => Err(ServiceError::InvalidTransition {
            from: current,
            to,
        }),
    }
}
