//! Order placement, visibility and the seller/buyer side of the lifecycle.

use std::collections::HashMap;

use chrono::Utc;

use crate::config::OrderSettings;
use crate::domain::agent::ApprovalStatus;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::handover::generate_code;
use crate::domain::order::{
    NewOrder, Order, OrderItem, OrderKind, OrderListQuery, OrderScope, OrderStatus, OrderViewer,
    RequestedItem, TransitionOutcome, TransitionPatch,
};
use crate::domain::tracking::TrackingEvent;
use crate::domain::user::{AgentType, Role};
use crate::forms::orders::{CancelOrderForm, ManualOrderForm, OrderFilter, PlaceOrderForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{
    AgentReader, MessageWriter, OrderReader, OrderWriter, PickupSiteReader, ProductReader,
    PromotionReader, UserReader,
};
use crate::services::notify::notify;
use crate::services::promotions::resolve_discount;
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Catalog-priced lines of one seller.
struct PricedItems {
    seller_id: i32,
    items: Vec<OrderItem>,
    subtotal: i64,
}

/// Place a standard or grocery order for the calling buyer.
pub fn place_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: PlaceOrderForm,
    settings: &OrderSettings,
) -> ServiceResult<Order>
where
    R: ProductReader + PromotionReader + PickupSiteReader + OrderWriter + MessageWriter + ?Sized,
{
    ensure_role(user, &[Role::Buyer])?;

    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Some(site_id) = request.pickup_site_id {
        let site = repo.get_pickup_site_by_id(site_id)?;
        if !site.is_some_and(|site| site.is_active) {
            return Err(ServiceError::Form(format!("unknown pickup site {site_id}")));
        }
    }

    let priced = price_items(repo, &request.items, &settings.currency)?;

    let (promo_code, discount) = match request.promo_code.as_deref() {
        Some(code) => {
            let (code, discount) =
                resolve_discount(repo, code, priced.subtotal, Utc::now().naive_utc())?;
            (Some(code), discount)
        }
        None => (None, 0),
    };

    let total = priced.subtotal - discount + settings.delivery_fee;

    let new_order = NewOrder {
        kind: request.kind,
        buyer_id: user.id,
        seller_id: priced.seller_id,
        pickup_site_id: request.pickup_site_id,
        created_by: user.id,
        subtotal_amount: priced.subtotal,
        discount_amount: discount,
        delivery_fee_amount: settings.delivery_fee,
        total_amount: total,
        currency: settings.currency.clone(),
        promo_code,
        delivery_address: request.delivery_address,
        notes: request.notes,
        delivery_code: generate_code(settings.handover.code_length),
        items: priced.items,
    };

    let order = repo.create_order(&new_order)?;
    log::info!(
        "Buyer {} placed {} order {} for {} {}",
        user.id,
        order.kind,
        order.id,
        order.total_amount,
        order.currency
    );

    notify(
        repo,
        order.seller_id,
        Some(order.id),
        format!("New order #{} is waiting for you", order.id),
    );

    Ok(order.redacted_for(OrderViewer::Buyer))
}

/// Record a walk-in order at the calling manager's pickup site on behalf of a
/// registered buyer.
pub fn place_manual_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ManualOrderForm,
    settings: &OrderSettings,
) -> ServiceResult<Order>
where
    R: UserReader
        + AgentReader
        + PickupSiteReader
        + ProductReader
        + OrderWriter
        + MessageWriter
        + ?Sized,
{
    if !user.is_agent_of(AgentType::PickupSiteManager) {
        return Err(ServiceError::Forbidden);
    }

    let manager = repo
        .get_agent_by_user_id(user.id)?
        .ok_or(ServiceError::Forbidden)?;
    if manager.approval_status != ApprovalStatus::Approved {
        return Err(ServiceError::Forbidden);
    }

    let site = repo
        .get_pickup_site_by_manager(user.id)?
        .ok_or_else(|| ServiceError::Form("you do not manage a pickup site".to_string()))?;

    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let buyer = repo
        .get_user_by_email(&request.buyer_email)?
        .ok_or_else(|| ServiceError::Form("no buyer is registered with that email".to_string()))?;
    if buyer.role != Role::Buyer {
        log::warn!(
            "Manager {} tried to order for non-buyer account {}",
            user.id,
            buyer.id
        );
        return Err(ServiceError::Form(format!(
            "`{}` is not a buyer account",
            buyer.email
        )));
    }
    if !buyer.is_active {
        return Err(ServiceError::Form(format!(
            "`{}` is deactivated",
            buyer.email
        )));
    }

    let priced = price_items(repo, &request.items, &settings.currency)?;

    let new_order = NewOrder {
        kind: OrderKind::Manual,
        buyer_id: buyer.id,
        seller_id: priced.seller_id,
        pickup_site_id: Some(site.id),
        created_by: user.id,
        subtotal_amount: priced.subtotal,
        discount_amount: 0,
        delivery_fee_amount: settings.delivery_fee,
        total_amount: priced.subtotal + settings.delivery_fee,
        currency: settings.currency.clone(),
        promo_code: None,
        delivery_address: request.delivery_address,
        notes: request.notes,
        delivery_code: generate_code(settings.handover.code_length),
        items: priced.items,
    };

    let order = repo.create_order(&new_order)?;
    log::info!(
        "Manager {} recorded manual order {} for buyer {} at site {}",
        user.id,
        order.id,
        buyer.id,
        site.id
    );

    notify(
        repo,
        order.buyer_id,
        Some(order.id),
        format!("Order #{} was placed for you at {}", order.id, site.name),
    );
    notify(
        repo,
        order.seller_id,
        Some(order.id),
        format!("New order #{} is waiting for you", order.id),
    );

    Ok(order.redacted_for(OrderViewer::Other))
}

/// Orders visible to the caller, newest first.
pub fn list_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: OrderFilter,
    pagination: Pagination,
) -> ServiceResult<Paginated<Order>>
where
    R: OrderReader + AgentReader + PickupSiteReader + ?Sized,
{
    let Some(scope) = scope_for(repo, user)? else {
        return Ok(Paginated::new(Vec::new(), pagination, 0));
    };

    let mut query = OrderListQuery::new(scope).paginate(pagination);
    if let Some(status) = filter.status {
        query = query.status(status);
    }
    if let Some(kind) = filter.kind {
        query = query.kind(kind);
    }

    let viewer = match scope {
        OrderScope::Buyer(_) => OrderViewer::Buyer,
        OrderScope::Agent(_) => OrderViewer::AssignedAgent,
        OrderScope::All => OrderViewer::Admin,
        OrderScope::Seller(_) | OrderScope::PickupSite(_) => OrderViewer::Other,
    };

    let (total, orders) = repo.list_orders(query)?;
    Ok(Paginated::new(orders, pagination, total).map(|order| order.redacted_for(viewer)))
}

pub fn get_order<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + AgentReader + PickupSiteReader + ?Sized,
{
    let (order, viewer) = load_visible_order(repo, user, order_id)?;
    Ok(order.redacted_for(viewer))
}

/// Seller acknowledges the order.
pub fn mark_processing<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + PickupSiteReader + ?Sized,
{
    let order = load_order(repo, order_id)?;
    ensure_fulfiller(repo, user, &order)?;

    let updated = advance(
        repo,
        &order,
        &[OrderStatus::Pending],
        OrderStatus::Processing,
        user.id,
        TransitionPatch::default(),
    )?;
    Ok(updated.redacted_for(OrderViewer::Other))
}

/// Seller has packed the goods; the order enters the agents' pool.
pub fn mark_ready_for_pickup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + PickupSiteReader + MessageWriter + ?Sized,
{
    let order = load_order(repo, order_id)?;
    ensure_fulfiller(repo, user, &order)?;

    let updated = advance(
        repo,
        &order,
        &[OrderStatus::Processing],
        OrderStatus::ReadyForPickup,
        user.id,
        TransitionPatch::default(),
    )?;

    notify(
        repo,
        updated.buyer_id,
        Some(updated.id),
        format!("Order #{} is packed and waiting for a courier", updated.id),
    );

    Ok(updated.redacted_for(OrderViewer::Other))
}

/// Cancel an order and return its stock.
///
/// Buyers may cancel before the goods are ready, sellers before pickup and
/// admins from any non-terminal status.
pub fn cancel_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
    form: CancelOrderForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + AgentReader + PickupSiteReader + MessageWriter + ?Sized,
{
    let reason = form
        .into_reason()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (order, viewer) = load_visible_order(repo, user, order_id)?;

    let allowed: &[OrderStatus] = match user.role {
        Role::Admin => OrderStatus::ALL,
        Role::Buyer if order.buyer_id == user.id => {
            &[OrderStatus::Pending, OrderStatus::Processing]
        }
        Role::Seller | Role::Agent if is_fulfiller(repo, user, &order)? => &[
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::ReadyForPickup,
            OrderStatus::Assigned,
        ],
        _ => return Err(ServiceError::Forbidden),
    };

    let patch = TransitionPatch {
        note: Some(format!("cancelled by {}", user.role)),
        cancel_reason: reason,
    };
    let cancelled = advance(repo, &order, allowed, OrderStatus::Cancelled, user.id, patch)?;

    for party in [cancelled.buyer_id, cancelled.seller_id] {
        if party != user.id {
            notify(
                repo,
                party,
                Some(cancelled.id),
                format!("Order #{} was cancelled", cancelled.id),
            );
        }
    }

    Ok(cancelled.redacted_for(viewer))
}

/// Tracking history of an order the caller is party to.
pub fn tracking_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
) -> ServiceResult<Vec<TrackingEvent>>
where
    R: OrderReader + AgentReader + PickupSiteReader + ?Sized,
{
    let (order, _) = load_visible_order(repo, user, order_id)?;
    Ok(repo.list_tracking_events(order.id)?)
}

pub(crate) fn load_order<R>(repo: &R, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    repo.get_order_by_id(order_id)?
        .ok_or(ServiceError::NotFound)
}

/// Load an order and the caller's relationship to it. Orders the caller is
/// not party to are reported as missing.
pub(crate) fn load_visible_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: i32,
) -> ServiceResult<(Order, OrderViewer)>
where
    R: OrderReader + AgentReader + PickupSiteReader + ?Sized,
{
    let order = load_order(repo, order_id)?;

    let viewer = match user.role {
        Role::Admin => Some(OrderViewer::Admin),
        Role::Buyer => (order.buyer_id == user.id).then_some(OrderViewer::Buyer),
        Role::Seller => (order.seller_id == user.id).then_some(OrderViewer::Other),
        Role::Agent if user.is_agent_of(AgentType::PickupSiteManager) => {
            manages_site_of(repo, user, &order)?.then_some(OrderViewer::Other)
        }
        Role::Agent => {
            let agent = repo.get_agent_by_user_id(user.id)?;
            let assigned = agent.is_some_and(|agent| order.agent_id == Some(agent.id));
            assigned.then_some(OrderViewer::AssignedAgent)
        }
    };

    match viewer {
        Some(viewer) => Ok((order, viewer)),
        None => Err(ServiceError::NotFound),
    }
}

/// Apply `order.status -> to` if the current status is one of `allowed_from`
/// and the state machine permits it for this kind of order.
pub(crate) fn advance<R>(
    repo: &R,
    order: &Order,
    allowed_from: &[OrderStatus],
    to: OrderStatus,
    actor_id: i32,
    patch: TransitionPatch,
) -> ServiceResult<Order>
where
    R: OrderWriter + ?Sized,
{
    let from: Vec<OrderStatus> = allowed_from
        .iter()
        .copied()
        .filter(|status| status.can_transition_to(to, order.kind))
        .collect();

    if !from.contains(&order.status) {
        return Err(ServiceError::InvalidTransition {
            from: order.status,
            to,
        });
    }

    match repo.transition_order(order.id, &from, to, actor_id, &patch)? {
        TransitionOutcome::Applied(updated) => {
            log::info!(
                "Order {} moved {} -> {} by user {}",
                order.id,
                order.status,
                to,
                actor_id
            );
            Ok(updated)
        }
        TransitionOutcome::Stale(current) => Err(ServiceError::InvalidTransition {
            from: current,
            to,
        }),
    }
}

/// The seller of the order, or the manager of its pickup site for walk-in
/// orders.
fn is_fulfiller<R>(repo: &R, user: &AuthenticatedUser, order: &Order) -> ServiceResult<bool>
where
    R: PickupSiteReader + ?Sized,
{
    match user.role {
        Role::Seller => Ok(order.seller_id == user.id),
        Role::Agent if order.kind == OrderKind::Manual => manages_site_of(repo, user, order),
        _ => Ok(false),
    }
}

fn ensure_fulfiller<R>(repo: &R, user: &AuthenticatedUser, order: &Order) -> ServiceResult<()>
where
    R: PickupSiteReader + ?Sized,
{
    if is_fulfiller(repo, user, order)? {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub(crate) fn manages_site_of<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order: &Order,
) -> ServiceResult<bool>
where
    R: PickupSiteReader + ?Sized,
{
    if !user.is_agent_of(AgentType::PickupSiteManager) {
        return Ok(false);
    }
    let Some(site_id) = order.pickup_site_id else {
        return Ok(false);
    };
    let site = repo.get_pickup_site_by_id(site_id)?;
    Ok(site.is_some_and(|site| site.manager_id == Some(user.id)))
}

fn scope_for<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Option<OrderScope>>
where
    R: AgentReader + PickupSiteReader + ?Sized,
{
    let scope = match user.role {
        Role::Buyer => Some(OrderScope::Buyer(user.id)),
        Role::Seller => Some(OrderScope::Seller(user.id)),
        Role::Admin => Some(OrderScope::All),
        Role::Agent if user.is_agent_of(AgentType::PickupSiteManager) => repo
            .get_pickup_site_by_manager(user.id)?
            .map(|site| OrderScope::PickupSite(site.id)),
        Role::Agent => repo
            .get_agent_by_user_id(user.id)?
            .map(|agent| OrderScope::Agent(agent.id)),
    };
    Ok(scope)
}

/// Price requested lines from the catalog. All lines must come from one
/// seller and be in stock at the time of the check.
fn price_items<R>(
    repo: &R,
    requested: &[RequestedItem],
    currency: &str,
) -> ServiceResult<PricedItems>
where
    R: ProductReader + ?Sized,
{
    let ids: Vec<i32> = requested.iter().map(|item| item.product_id).collect();
    let products: HashMap<i32, _> = repo
        .get_products_by_ids(&ids)?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut seller_id = None;
    let mut items = Vec::with_capacity(requested.len());
    let mut subtotal: i64 = 0;

    for line in requested {
        let product = products
            .get(&line.product_id)
            .filter(|product| !product.is_archived)
            .ok_or_else(|| {
                ServiceError::Form(format!("product {} is not available", line.product_id))
            })?;

        match seller_id {
            None => seller_id = Some(product.seller_id),
            Some(seller) if seller != product.seller_id => {
                return Err(ServiceError::Form(
                    "all items of an order must come from the same seller".to_string(),
                ));
            }
            Some(_) => {}
        }

        if product.currency != currency {
            return Err(ServiceError::Form(format!(
                "product {} is priced in {}",
                product.id, product.currency
            )));
        }

        if product.stock < line.quantity {
            return Err(ServiceError::Conflict(format!(
                "insufficient stock for `{}`",
                product.name
            )));
        }

        let item = OrderItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: line.quantity,
            unit_price_amount: product.price_amount,
        };
        subtotal = product
            .price_amount
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| subtotal.checked_add(line_total))
            .ok_or_else(|| ServiceError::Form("order total is too large".to_string()))?;
        items.push(item);
    }

    let seller_id = seller_id.ok_or_else(|| ServiceError::Form("order has no items".to_string()))?;

    Ok(PricedItems {
        seller_id,
        items,
        subtotal,
    })
}
