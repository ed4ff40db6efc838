//! Pickup and delivery handovers confirmed with one-time codes.

use crate::config::HandoverSettings;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::handover::{CodeCheck, CodeKind, HandoverOutcome, generate_code};
use crate::domain::order::{Order, OrderStatus, OrderViewer, TransitionPatch};
use crate::domain::tracking::TrackingEvent;
use crate::domain::user::Role;
use crate::forms::handover::{CodeForm, RecordLocationForm};
use crate::repository::{AgentReader, MessageWriter, OrderReader, OrderWriter, PickupSiteReader};
use crate::services::assignment::assigned_agent;
use crate::services::notify::notify;
use crate::services::orders::{advance, load_order, manages_site_of};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Seller (or the manager of the order's pickup site) confirms the pickup code
/// read out by the assigned agent.
pub fn verify_pickup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    form: CodeForm,
    handover: &HandoverSettings,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + PickupSiteReader + MessageWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;

    let hands_over = match user.role {
        Role::Seller => order.seller_id == user.id,
        Role::Agent => manages_site_of(repo, user, &order)?,
        _ => false,
    };
    if !hands_over {
        return Err(ServiceError::Forbidden);
    }

    let code = form
        .into_code(handover.code_length)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let outcome = repo.submit_code(
        order.id,
        CodeKind::Pickup,
        &code,
        handover.max_attempts,
        user.id,
    )?;
    let picked_up = settle(order.id, CodeKind::Pickup, outcome)?;

    notify(
        repo,
        picked_up.buyer_id,
        Some(picked_up.id),
        format!("Order #{} was picked up by the courier", picked_up.id),
    );

    Ok(picked_up.redacted_for(OrderViewer::Other))
}

/// Assigned agent leaves with the goods.
pub fn mark_en_route<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: AgentReader + OrderReader + OrderWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;
    assigned_agent(repo, user, &order)?;

    let updated = advance(
        repo,
        &order,
        &[OrderStatus::PickedUp],
        OrderStatus::EnRoute,
        user.id,
        TransitionPatch::default(),
    )?;
    Ok(updated.redacted_for(OrderViewer::AssignedAgent))
}

/// Append a position update for an order in the agent's hands.
pub fn record_location<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    form: RecordLocationForm,
) -> ServiceResult<TrackingEvent>
where
    R: AgentReader + OrderReader + OrderWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;
    let agent = assigned_agent(repo, user, &order)?;

    if !matches!(
        order.status,
        OrderStatus::Assigned | OrderStatus::PickedUp | OrderStatus::EnRoute
    ) {
        return Err(ServiceError::Conflict(format!(
            "order is {}, location updates are closed",
            order.status
        )));
    }

    let event = form
        .into_event(order.id, user.id, agent.id, order.status)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    Ok(repo.record_location(&event, agent.id)?)
}

/// Assigned agent confirms the delivery code read out by the buyer. The
/// payout approvals are created with the status change.
pub fn confirm_delivery<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    form: CodeForm,
    handover: &HandoverSettings,
) -> ServiceResult<Order>
where
    R: AgentReader + OrderReader + OrderWriter + MessageWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;
    assigned_agent(repo, user, &order)?;

    let code = form
        .into_code(handover.code_length)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let outcome = repo.submit_code(
        order.id,
        CodeKind::Delivery,
        &code,
        handover.max_attempts,
        user.id,
    )?;
    let delivered = settle(order.id, CodeKind::Delivery, outcome)?;

    notify(
        repo,
        delivered.buyer_id,
        Some(delivered.id),
        format!("Order #{} was delivered", delivered.id),
    );

    Ok(delivered.redacted_for(OrderViewer::AssignedAgent))
}

/// Issue a fresh code after a lockout and reset its attempt counter.
pub fn regenerate_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    kind: CodeKind,
    handover: &HandoverSettings,
) -> ServiceResult<Order>
where
    R: AgentReader + OrderReader + OrderWriter + MessageWriter + ?Sized,
{
    ensure_admin(user)?;

    let order = load_order(repo, order_id)?;
    let code = generate_code(handover.code_length);
    let updated = repo.regenerate_code(order.id, kind, &code)?;
    log::info!("Admin {} regenerated the {kind} code of order {}", user.id, order.id);

    let holder = match kind {
        CodeKind::Delivery => Some(updated.buyer_id),
        CodeKind::Pickup => match updated.agent_id {
            Some(agent_id) => repo.get_agent_by_id(agent_id)?.map(|agent| agent.user_id),
            None => None,
        },
    };
    if let Some(holder) = holder {
        notify(
            repo,
            holder,
            Some(updated.id),
            format!("A new {kind} code was issued for order #{}", updated.id),
        );
    }

    Ok(updated.redacted_for(OrderViewer::Admin))
}

fn settle(order_id: i32, kind: CodeKind, outcome: HandoverOutcome) -> ServiceResult<Order> {
    match outcome {
        HandoverOutcome::Verified(order) => {
            log::info!("Order {order_id} {kind} code accepted, now {}", order.status);
            Ok(order)
        }
        HandoverOutcome::Refused(check) => {
            log::warn!("Order {order_id} {kind} code refused: {check:?}");
            Err(match check {
                CodeCheck::Mismatch { remaining } => ServiceError::CodeMismatch { remaining },
                CodeCheck::Locked => ServiceError::CodeLocked,
                CodeCheck::AlreadyUsed => ServiceError::CodeAlreadyUsed,
            })
        }
        HandoverOutcome::Stale(status) => Err(ServiceError::InvalidTransition {
            from: status,
            to: kind.next_status(),
        }),
    }
}
