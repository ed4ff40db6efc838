use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::{
    domain::{
        approval::{ApprovalKind, payout_lines},
        handover::{CodeCheck, CodeKind, HandoverOutcome, codes_match},
        order::{
            AvailableOrdersQuery, ClaimOutcome, NewOrder as DomainNewOrder, Order as DomainOrder,
            OrderKind, OrderListQuery, OrderScope, OrderStatus, PayoutStatus, TransitionOutcome,
            TransitionPatch,
        },
        tracking::{NewTrackingEvent as DomainNewTrackingEvent, TrackingEvent as DomainTrackingEvent},
        user::{AgentType, Role},
    },
    models::{
        agent::Agent as DbAgent,
        approval::NewApproval as DbNewApproval,
        order::{
            NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
            OrderChangeset, OrderItem as DbOrderItem,
        },
        tracking::{NewTrackingEvent as DbNewTrackingEvent, TrackingEvent as DbTrackingEvent},
    },
    repository::{
        DieselRepository, OrderReader, OrderWriter,
        errors::{RepositoryError, RepositoryResult},
    },
    schema::{agents, approvals, order_items, orders, products, promotions, tracking_events, users},
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn status_strs(statuses: &[OrderStatus]) -> Vec<&'static str> {
    statuses.iter().map(OrderStatus::as_str).collect()
}

fn hydrate(conn: &mut SqliteConnection, row: DbOrder) -> RepositoryResult<DomainOrder> {
    let items = order_items::table
        .filter(order_items::order_id.eq(row.id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?;
    row.into_domain(items)
}

fn hydrate_all(
    conn: &mut SqliteConnection,
    rows: Vec<DbOrder>,
) -> RepositoryResult<Vec<DomainOrder>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = rows.iter().map(|order| order.id).collect();
    let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();
    for item in order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    rows.into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            order.into_domain(items)
        })
        .collect()
}

fn current_status(conn: &mut SqliteConnection, order_id: i32) -> RepositoryResult<OrderStatus> {
    let status = orders::table
        .find(order_id)
        .select(orders::status)
        .first::<String>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;
    Ok(status.parse()?)
}

fn append_event(
    conn: &mut SqliteConnection,
    event: &DomainNewTrackingEvent,
    at: NaiveDateTime,
) -> RepositoryResult<DbTrackingEvent> {
    let row = diesel::insert_into(tracking_events::table)
        .values(&DbNewTrackingEvent::from_domain(event, at))
        .get_result::<DbTrackingEvent>(conn)?;
    Ok(row)
}

/// Return the stock and promotion usage taken by a cancelled order.
fn restock(conn: &mut SqliteConnection, order: &DbOrder, at: NaiveDateTime) -> RepositoryResult<()> {
    let items = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .load::<DbOrderItem>(conn)?;

    for item in items {
        diesel::update(products::table.find(item.product_id))
            .set((
                products::stock.eq(products::stock + item.quantity),
                products::updated_at.eq(at),
            ))
            .execute(conn)?;
    }

    if let Some(code) = order.promo_code.as_deref() {
        diesel::update(
            promotions::table
                .filter(promotions::code.eq(code))
                .filter(promotions::usage_count.gt(0)),
        )
        .set((
            promotions::usage_count.eq(promotions::usage_count - 1),
            promotions::updated_at.eq(at),
        ))
        .execute(conn)?;
    }

    Ok(())
}

fn scoped_orders<'a>(
    scope: OrderScope,
    status: Option<&'a str>,
    kind: Option<&'a str>,
) -> orders::BoxedQuery<'a, Sqlite> {
    let mut query = orders::table.into_boxed::<Sqlite>();

    query = match scope {
        OrderScope::Buyer(buyer_id) => query.filter(orders::buyer_id.eq(buyer_id)),
        OrderScope::Seller(seller_id) => query.filter(orders::seller_id.eq(seller_id)),
        OrderScope::Agent(agent_id) => query.filter(orders::agent_id.eq(agent_id)),
        OrderScope::PickupSite(site_id) => query.filter(orders::pickup_site_id.eq(site_id)),
        OrderScope::All => query,
    };

    if let Some(status) = status {
        query = query.filter(orders::status.eq(status));
    }

    if let Some(kind) = kind {
        query = query.filter(orders::kind.eq(kind));
    }

    query
}

fn available_orders<'a>(kinds: &[OrderKind]) -> orders::BoxedQuery<'a, Sqlite> {
    let kinds: Vec<&'static str> = kinds.iter().map(OrderKind::as_str).collect();
    // Every kind is claimable once ready; grocery orders are also claimable earlier.
    let early_grocery = status_strs(OrderKind::Grocery.claimable_statuses());

    orders::table
        .filter(orders::agent_id.is_null())
        .filter(orders::kind.eq_any(kinds))
        .filter(
            orders::status.eq(OrderStatus::ReadyForPickup.as_str()).or(orders::kind
                .eq(OrderKind::Grocery.as_str())
                .and(orders::status.eq_any(early_grocery))),
        )
        .into_boxed::<Sqlite>()
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        let mut conn = self.conn()?;

        let order = orders::table
            .find(id)
            .first::<DbOrder>(&mut conn)
            .optional()?;

        match order {
            Some(order) => Ok(Some(hydrate(&mut conn, order)?)),
            None => Ok(None),
        }
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        let mut conn = self.conn()?;

        let OrderListQuery {
            scope,
            status,
            kind,
            pagination,
        } = query;

        let status = status.map(|status| status.as_str());
        let kind = kind.map(|kind| kind.as_str());

        let total = scoped_orders(scope, status, kind)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = scoped_orders(scope, status, kind)
            .order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items.load::<DbOrder>(&mut conn)?;
        Ok((total, hydrate_all(&mut conn, rows)?))
    }

    fn list_available_orders(
        &self,
        query: AvailableOrdersQuery,
    ) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        let mut conn = self.conn()?;

        if query.kinds.is_empty() {
            return Ok((0, Vec::new()));
        }

        let total = available_orders(&query.kinds)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items =
            available_orders(&query.kinds).order((orders::created_at.asc(), orders::id.asc()));

        if let Some(pagination) = query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items.load::<DbOrder>(&mut conn)?;
        Ok((total, hydrate_all(&mut conn, rows)?))
    }

    fn list_tracking_events(&self, order_id: i32) -> RepositoryResult<Vec<DomainTrackingEvent>> {
        let mut conn = self.conn()?;

        tracking_events::table
            .filter(tracking_events::order_id.eq(order_id))
            .order((tracking_events::created_at.asc(), tracking_events::id.asc()))
            .load::<DbTrackingEvent>(&mut conn)?
            .into_iter()
            .map(DomainTrackingEvent::try_from)
            .collect()
    }
}

// Writes use BEGIN IMMEDIATE so concurrent writers queue on the busy timeout
// instead of failing to upgrade a read lock.
impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let buyer_role = users::table
                .find(new_order.buyer_id)
                .select(users::role)
                .first::<String>(conn)
                .optional()?;
            if buyer_role.as_deref() != Some(Role::Buyer.as_str()) {
                return Err(RepositoryError::ConstraintViolation(
                    "order buyer must have the buyer role".to_string(),
                ));
            }

            let now = now();

            if let Some(code) = new_order.promo_code.as_deref() {
                let redeemed = diesel::update(
                    promotions::table
                        .filter(promotions::code.eq(code))
                        .filter(promotions::is_active.eq(true))
                        .filter(
                            promotions::usage_limit.is_null().or(promotions::usage_count
                                .lt(promotions::usage_limit.assume_not_null())),
                        ),
                )
                .set((
                    promotions::usage_count.eq(promotions::usage_count + 1),
                    promotions::updated_at.eq(now),
                ))
                .execute(conn)?;

                if redeemed == 0 {
                    return Err(RepositoryError::Conflict(format!(
                        "promotion `{code}` is no longer available"
                    )));
                }
            }

            for item in &new_order.items {
                let reserved = diesel::update(
                    products::table
                        .filter(products::id.eq(item.product_id))
                        .filter(products::stock.ge(item.quantity)),
                )
                .set((
                    products::stock.eq(products::stock - item.quantity),
                    products::updated_at.eq(now),
                ))
                .execute(conn)?;

                if reserved == 0 {
                    return Err(RepositoryError::Conflict(format!(
                        "insufficient stock for `{}`",
                        item.name
                    )));
                }
            }

            let created = diesel::insert_into(orders::table)
                .values(&DbNewOrder::from(new_order))
                .get_result::<DbOrder>(conn)?;

            let payload: Vec<DbNewOrderItem> = new_order
                .items
                .iter()
                .map(|item| DbNewOrderItem::from_domain(created.id, item))
                .collect();
            diesel::insert_into(order_items::table)
                .values(&payload)
                .execute(conn)?;

            append_event(
                conn,
                &DomainNewTrackingEvent::status_change(
                    created.id,
                    new_order.created_by,
                    OrderStatus::Pending,
                ),
                now,
            )?;

            hydrate(conn, created)
        })
    }

    fn transition_order(
        &self,
        order_id: i32,
        from: &[OrderStatus],
        to: OrderStatus,
        actor_id: i32,
        patch: &TransitionPatch,
    ) -> RepositoryResult<TransitionOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<TransitionOutcome, RepositoryError, _>(|conn| {
            let now = now();
            let mut changes = OrderChangeset::touch(now);
            changes.status = Some(to.as_str().to_string());
            match to {
                OrderStatus::ReadyForPickup => changes.ready_at = Some(Some(now)),
                OrderStatus::Completed => changes.completed_at = Some(Some(now)),
                OrderStatus::Cancelled => {
                    changes.cancelled_at = Some(Some(now));
                    changes.cancel_reason = Some(patch.cancel_reason.clone());
                }
                _ => {}
            }

            let updated = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::status.eq_any(status_strs(from))),
            )
            .set(&changes)
            .get_result::<DbOrder>(conn)
            .optional()?;

            let Some(updated) = updated else {
                return Ok(TransitionOutcome::Stale(current_status(conn, order_id)?));
            };

            if to == OrderStatus::Cancelled {
                restock(conn, &updated, now)?;
            }

            append_event(
                conn,
                &DomainNewTrackingEvent::status_change(order_id, actor_id, to)
                    .with_agent(updated.agent_id)
                    .with_note(patch.note.clone()),
                now,
            )?;

            Ok(TransitionOutcome::Applied(hydrate(conn, updated)?))
        })
    }

    fn claim_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        claimable: &[OrderStatus],
        pickup_code: &str,
    ) -> RepositoryResult<ClaimOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<ClaimOutcome, RepositoryError, _>(|conn| {
            let now = now();
            let mut changes = OrderChangeset::touch(now);
            changes.status = Some(OrderStatus::Assigned.as_str().to_string());
            changes.agent_id = Some(Some(agent_id));
            changes.pickup_code = Some(Some(pickup_code.to_string()));
            changes.pickup_code_attempts = Some(0);
            changes.assigned_at = Some(Some(now));

            let claimed = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::agent_id.is_null())
                    .filter(orders::status.eq_any(status_strs(claimable))),
            )
            .set(&changes)
            .get_result::<DbOrder>(conn)
            .optional()?;

            if let Some(claimed) = claimed {
                append_event(
                    conn,
                    &DomainNewTrackingEvent::status_change(
                        order_id,
                        actor_id,
                        OrderStatus::Assigned,
                    )
                    .with_agent(Some(agent_id)),
                    now,
                )?;
                return Ok(ClaimOutcome::Claimed(hydrate(conn, claimed)?));
            }

            let current = orders::table
                .find(order_id)
                .select((orders::agent_id, orders::status))
                .first::<(Option<i32>, String)>(conn)
                .optional()?;

            match current {
                None => Err(RepositoryError::NotFound),
                Some((Some(_), _)) => Ok(ClaimOutcome::AlreadyAssigned),
                Some((None, status)) => Ok(ClaimOutcome::NotClaimable(status.parse()?)),
            }
        })
    }

    fn release_order(
        &self,
        order_id: i32,
        agent_id: i32,
        actor_id: i32,
        to: OrderStatus,
    ) -> RepositoryResult<TransitionOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<TransitionOutcome, RepositoryError, _>(|conn| {
            let now = now();
            let mut changes = OrderChangeset::touch(now);
            changes.status = Some(to.as_str().to_string());
            changes.agent_id = Some(None);
            changes.pickup_code = Some(None);
            changes.pickup_code_attempts = Some(0);
            changes.assigned_at = Some(None);

            let released = diesel::update(
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::agent_id.eq(agent_id))
                    .filter(orders::status.eq(OrderStatus::Assigned.as_str())),
            )
            .set(&changes)
            .get_result::<DbOrder>(conn)
            .optional()?;

            let Some(released) = released else {
                return Ok(TransitionOutcome::Stale(current_status(conn, order_id)?));
            };

            append_event(
                conn,
                &DomainNewTrackingEvent::status_change(order_id, actor_id, to)
                    .with_agent(Some(agent_id))
                    .with_note(Some("released by agent".to_string())),
                now,
            )?;

            Ok(TransitionOutcome::Applied(hydrate(conn, released)?))
        })
    }

    fn submit_code(
        &self,
        order_id: i32,
        kind: CodeKind,
        submitted: &str,
        max_attempts: i32,
        actor_id: i32,
    ) -> RepositoryResult<HandoverOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<HandoverOutcome, RepositoryError, _>(|conn| {
            let row = orders::table
                .find(order_id)
                .first::<DbOrder>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let status: OrderStatus = row.status.parse()?;

            let (stored, attempts, consumed) = match kind {
                CodeKind::Pickup => (
                    row.pickup_code.as_deref(),
                    row.pickup_code_attempts,
                    row.pickup_verified_at.is_some(),
                ),
                CodeKind::Delivery => (
                    Some(row.delivery_code.as_str()),
                    row.delivery_code_attempts,
                    row.delivered_at.is_some(),
                ),
            };

            if consumed {
                return Ok(HandoverOutcome::Refused(CodeCheck::AlreadyUsed));
            }
            let Some(stored) = stored.filter(|_| kind.accepted_in().contains(&status)) else {
                return Ok(HandoverOutcome::Stale(status));
            };
            if attempts >= max_attempts {
                return Ok(HandoverOutcome::Refused(CodeCheck::Locked));
            }

            let now = now();

            if !codes_match(stored, submitted) {
                let attempts = attempts + 1;
                let mut changes = OrderChangeset::touch(now);
                match kind {
                    CodeKind::Pickup => changes.pickup_code_attempts = Some(attempts),
                    CodeKind::Delivery => changes.delivery_code_attempts = Some(attempts),
                }
                diesel::update(orders::table.find(order_id))
                    .set(&changes)
                    .execute(conn)?;

                return Ok(HandoverOutcome::Refused(CodeCheck::Mismatch {
                    remaining: (max_attempts - attempts).max(0),
                }));
            }

            let mut changes = OrderChangeset::touch(now);
            let next = kind.next_status();
            match kind {
                CodeKind::Pickup => changes.pickup_verified_at = Some(Some(now)),
                CodeKind::Delivery => changes.delivered_at = Some(Some(now)),
            }
            changes.status = Some(next.as_str().to_string());

            let lines = if kind == CodeKind::Delivery {
                let agent = match row.agent_id {
                    Some(agent_id) => {
                        let agent = agents::table.find(agent_id).first::<DbAgent>(conn)?;
                        let agent_type: AgentType = agent.agent_type.parse()?;
                        Some((agent.user_id, agent_type, agent.commission_rate_bp))
                    }
                    None => None,
                };

                let lines = payout_lines(
                    row.subtotal_amount,
                    row.discount_amount,
                    row.seller_id,
                    agent,
                );
                let pending = Some(PayoutStatus::Pending.as_str().to_string());
                for line in &lines {
                    match line.kind {
                        ApprovalKind::SellerPayout => changes.seller_payout_status = pending.clone(),
                        ApprovalKind::FdaCommission => changes.fda_commission_status = pending.clone(),
                        ApprovalKind::PdaCommission => changes.pda_commission_status = pending.clone(),
                    }
                }
                lines
            } else {
                Vec::new()
            };

            // Consumption only succeeds while the code is still unused.
            let target = orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(status.as_str()));
            let updated = match kind {
                CodeKind::Pickup => diesel::update(target.filter(orders::pickup_verified_at.is_null()))
                    .set(&changes)
                    .get_result::<DbOrder>(conn)
                    .optional()?,
                CodeKind::Delivery => diesel::update(target.filter(orders::delivered_at.is_null()))
                    .set(&changes)
                    .get_result::<DbOrder>(conn)
                    .optional()?,
            };
            let Some(updated) = updated else {
                return Ok(HandoverOutcome::Refused(CodeCheck::AlreadyUsed));
            };

            if !lines.is_empty() {
                let payload: Vec<DbNewApproval> = lines
                    .iter()
                    .map(|line| DbNewApproval {
                        order_id,
                        kind: line.kind.as_str(),
                        beneficiary_id: line.beneficiary_id,
                        amount: line.amount,
                    })
                    .collect();
                diesel::insert_into(approvals::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            append_event(
                conn,
                &DomainNewTrackingEvent::status_change(order_id, actor_id, next)
                    .with_agent(updated.agent_id),
                now,
            )?;

            Ok(HandoverOutcome::Verified(hydrate(conn, updated)?))
        })
    }

    fn regenerate_code(
        &self,
        order_id: i32,
        kind: CodeKind,
        code: &str,
    ) -> RepositoryResult<DomainOrder> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let row = orders::table
                .find(order_id)
                .first::<DbOrder>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let status: OrderStatus = row.status.parse()?;
            if status.is_terminal() {
                return Err(RepositoryError::Conflict(format!(
                    "order is {status}, codes are closed"
                )));
            }

            let mut changes = OrderChangeset::touch(now());
            match kind {
                CodeKind::Pickup => {
                    if row.agent_id.is_none() || row.pickup_verified_at.is_some() {
                        return Err(RepositoryError::Conflict(
                            "order has no open pickup code".to_string(),
                        ));
                    }
                    changes.pickup_code = Some(Some(code.to_string()));
                    changes.pickup_code_attempts = Some(0);
                }
                CodeKind::Delivery => {
                    if row.delivered_at.is_some() {
                        return Err(RepositoryError::Conflict(
                            "delivery code was already used".to_string(),
                        ));
                    }
                    changes.delivery_code = Some(code.to_string());
                    changes.delivery_code_attempts = Some(0);
                }
            }

            let updated = diesel::update(orders::table.find(order_id))
                .set(&changes)
                .get_result::<DbOrder>(conn)?;

            hydrate(conn, updated)
        })
    }

    fn record_location(
        &self,
        event: &DomainNewTrackingEvent,
        agent_id: i32,
    ) -> RepositoryResult<DomainTrackingEvent> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainTrackingEvent, RepositoryError, _>(|conn| {
            let now = now();
            let row = append_event(conn, event, now)?;

            diesel::update(agents::table.find(agent_id))
                .set((
                    agents::latitude.eq(event.latitude),
                    agents::longitude.eq(event.longitude),
                    agents::updated_at.eq(now),
                ))
                .execute(conn)?;

            DomainTrackingEvent::try_from(row)
        })
    }
}
