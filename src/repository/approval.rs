use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        approval::{
            Approval as DomainApproval, ApprovalKind, ApprovalListQuery, ApprovalOutcome,
            ApprovalState,
        },
        order::{OrderStatus, PayoutStatus},
        tracking::NewTrackingEvent as DomainNewTrackingEvent,
    },
    models::{approval::Approval as DbApproval, tracking::NewTrackingEvent as DbNewTrackingEvent},
    repository::{
        ApprovalReader, ApprovalWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl ApprovalReader for DieselRepository {
    fn list_approvals(
        &self,
        query: ApprovalListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainApproval>)> {
        use crate::schema::approvals;

        let mut conn = self.conn()?;

        let status = query.status.map(|status| status.as_str());
        let kind = query.kind.map(|kind| kind.as_str());
        let order_id = query.order_id;

        let filtered = || {
            let mut items = approvals::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(status) = status {
                items = items.filter(approvals::status.eq(status));
            }
            if let Some(kind) = kind {
                items = items.filter(approvals::kind.eq(kind));
            }
            if let Some(order_id) = order_id {
                items = items.filter(approvals::order_id.eq(order_id));
            }
            items
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered()
            .order(approvals::created_at.asc())
            .then_order_by(approvals::id.asc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let approvals = items
            .load::<DbApproval>(&mut conn)?
            .into_iter()
            .map(DomainApproval::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, approvals))
    }
}

impl ApprovalWriter for DieselRepository {
    fn decide_approval(
        &self,
        approval_id: i32,
        target: ApprovalState,
        admin_id: i32,
        note: Option<String>,
    ) -> RepositoryResult<ApprovalOutcome> {
        use crate::schema::{approvals, orders, tracking_events};

        let payout = match target {
            ApprovalState::Approved => PayoutStatus::Released,
            ApprovalState::Rejected => PayoutStatus::Rejected,
            ApprovalState::Pending => {
                return Err(RepositoryError::ConstraintViolation(
                    "an approval cannot be moved back to pending".to_string(),
                ));
            }
        };

        let mut conn = self.conn()?;

        conn.immediate_transaction::<ApprovalOutcome, RepositoryError, _>(|conn| {
            let current = approvals::table
                .find(approval_id)
                .first::<DbApproval>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let state: ApprovalState = current.status.parse()?;
            if state == target {
                return Ok(ApprovalOutcome {
                    approval: current.try_into()?,
                    changed: false,
                });
            }
            if state != ApprovalState::Pending {
                return Err(RepositoryError::Conflict(format!(
                    "approval is already {state}"
                )));
            }

            let now = Utc::now().naive_utc();

            let updated = diesel::update(
                approvals::table
                    .filter(approvals::id.eq(approval_id))
                    .filter(approvals::status.eq(ApprovalState::Pending.as_str())),
            )
            .set((
                approvals::status.eq(target.as_str()),
                approvals::decided_by.eq(Some(admin_id)),
                approvals::decided_at.eq(Some(now)),
                approvals::note.eq(note),
                approvals::updated_at.eq(now),
            ))
            .get_result::<DbApproval>(conn)?;

            let order_id = updated.order_id;
            let order = orders::table.find(order_id);
            let payout = payout.as_str();
            match updated.kind.parse::<ApprovalKind>()? {
                ApprovalKind::SellerPayout => diesel::update(order)
                    .set((
                        orders::seller_payout_status.eq(payout),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                ApprovalKind::FdaCommission => diesel::update(order)
                    .set((
                        orders::fda_commission_status.eq(payout),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                ApprovalKind::PdaCommission => diesel::update(order)
                    .set((
                        orders::pda_commission_status.eq(payout),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?,
            };

            if target == ApprovalState::Approved {
                let outstanding = approvals::table
                    .filter(approvals::order_id.eq(order_id))
                    .filter(approvals::status.ne(ApprovalState::Approved.as_str()))
                    .count()
                    .get_result::<i64>(conn)?;

                if outstanding == 0 {
                    let completed = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order_id))
                            .filter(orders::status.eq(OrderStatus::Delivered.as_str())),
                    )
                    .set((
                        orders::status.eq(OrderStatus::Completed.as_str()),
                        orders::completed_at.eq(Some(now)),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                    if completed > 0 {
                        let event = DomainNewTrackingEvent::status_change(
                            order_id,
                            admin_id,
                            OrderStatus::Completed,
                        )
                        .with_note(Some("all payouts approved".to_string()));
                        diesel::insert_into(tracking_events::table)
                            .values(&DbNewTrackingEvent::from_domain(&event, now))
                            .execute(conn)?;
                    }
                }
            }

            Ok(ApprovalOutcome {
                approval: updated.try_into()?,
                changed: true,
            })
        })
    }
}
