//! Admin sign-off of the payout lines created at delivery.

use crate::domain::approval::{Approval, ApprovalListQuery, ApprovalOutcome, ApprovalState};
use crate::domain::auth::AuthenticatedUser;
use crate::forms::payouts::{ApprovalFilter, RejectApprovalForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{ApprovalReader, ApprovalWriter, MessageWriter};
use crate::services::notify::notify;
use crate::services::{ServiceError, ServiceResult, ensure_admin};

pub fn list_approvals<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: ApprovalFilter,
    pagination: Pagination,
) -> ServiceResult<Paginated<Approval>>
where
    R: ApprovalReader + ?Sized,
{
    ensure_admin(user)?;

    let mut query = ApprovalListQuery::new().paginate(pagination);
    if let Some(status) = filter.status {
        query = query.status(status);
    }
    if let Some(kind) = filter.kind {
        query = query.kind(kind);
    }
    if let Some(order_id) = filter.order_id {
        query = query.order(order_id);
    }

    let (total, approvals) = repo.list_approvals(query)?;
    Ok(Paginated::new(approvals, pagination, total))
}

/// Release a payout line. Approving twice returns the approved record with
/// `changed = false`.
pub fn approve<R>(repo: &R, user: &AuthenticatedUser, approval_id: i32) -> ServiceResult<ApprovalOutcome>
where
    R: ApprovalWriter + MessageWriter + ?Sized,
{
    ensure_admin(user)?;
    decide(repo, user, approval_id, ApprovalState::Approved, None)
}

pub fn reject<R>(
    repo: &R,
    user: &AuthenticatedUser,
    approval_id: i32,
    form: RejectApprovalForm,
) -> ServiceResult<ApprovalOutcome>
where
    R: ApprovalWriter + MessageWriter + ?Sized,
{
    ensure_admin(user)?;

    let note = form
        .into_note()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    decide(repo, user, approval_id, ApprovalState::Rejected, note)
}

fn decide<R>(
    repo: &R,
    user: &AuthenticatedUser,
    approval_id: i32,
    target: ApprovalState,
    note: Option<String>,
) -> ServiceResult<ApprovalOutcome>
where
    R: ApprovalWriter + MessageWriter + ?Sized,
{
    let outcome = repo.decide_approval(approval_id, target, user.id, note)?;
    let approval = &outcome.approval;

    if !outcome.changed {
        log::info!("Approval {approval_id} was already {target}");
        return Ok(outcome);
    }

    log::info!(
        "Admin {} marked {} approval {} of order {} as {target}",
        user.id,
        approval.kind,
        approval.id,
        approval.order_id
    );

    let verdict = match target {
        ApprovalState::Approved => "released",
        _ => "rejected",
    };
    notify(
        repo,
        approval.beneficiary_id,
        Some(approval.order_id),
        format!(
            "Your payout of {} for order #{} was {verdict}",
            approval.amount, approval.order_id
        ),
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::approval::ApprovalKind;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{ADMIN_ID, SELLER_ID, admin, approval, message_from, seller};

    #[test]
    fn first_approval_notifies_beneficiary() {
        let mut repo = FakeRepo::new();
        repo.approval_writer
            .expect_decide_approval()
            .withf(|id, target, admin_id, note| {
                *id == 3 && *target == ApprovalState::Approved && *admin_id == ADMIN_ID && note.is_none()
            })
            .times(1)
            .returning(|id, target, _, _| {
                Ok(ApprovalOutcome {
                    approval: approval(id, ApprovalKind::SellerPayout, target),
                    changed: true,
                })
            });
        repo.message_writer
            .expect_create_message()
            .withf(|message| message.receiver_id == SELLER_ID && message.order_id == Some(10))
            .times(1)
            .returning(|message| Ok(message_from(message)));

        let outcome = approve(&repo, &admin(), 3).expect("approved");
        assert!(outcome.changed);
        assert_eq!(outcome.approval.status, ApprovalState::Approved);
    }

    #[test]
    fn repeated_approval_is_quiet() {
        let mut repo = FakeRepo::new();
        repo.approval_writer
            .expect_decide_approval()
            .returning(|id, target, _, _| {
                Ok(ApprovalOutcome {
                    approval: approval(id, ApprovalKind::FdaCommission, target),
                    changed: false,
                })
            });
        repo.message_writer.expect_create_message().never();

        let outcome = approve(&repo, &admin(), 3).expect("approved");
        assert!(!outcome.changed);
    }

    #[test]
    fn approving_rejected_line_conflicts() {
        let mut repo = FakeRepo::new();
        repo.approval_writer
            .expect_decide_approval()
            .returning(|_, _, _, _| Err(RepositoryError::Conflict("approval is already rejected".into())));

        assert!(matches!(
            approve(&repo, &admin(), 3),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn reject_carries_note() {
        let mut repo = FakeRepo::new();
        repo.approval_writer
            .expect_decide_approval()
            .withf(|_, target, _, note| {
                *target == ApprovalState::Rejected && note.as_deref() == Some("duplicate order")
            })
            .returning(|id, target, _, _| {
                Ok(ApprovalOutcome {
                    approval: approval(id, ApprovalKind::SellerPayout, target),
                    changed: true,
                })
            });
        repo.message_writer
            .expect_create_message()
            .returning(|message| Ok(message_from(message)));

        let form = RejectApprovalForm {
            note: Some(" duplicate order ".to_string()),
        };
        let outcome = reject(&repo, &admin(), 3, form).expect("rejected");
        assert_eq!(outcome.approval.status, ApprovalState::Rejected);
    }

    #[test]
    fn non_admins_cannot_decide_or_list() {
        let repo = FakeRepo::new();
        assert!(matches!(approve(&repo, &seller(), 3), Err(ServiceError::Forbidden)));
        assert!(matches!(
            list_approvals(&repo, &seller(), ApprovalFilter::default(), Pagination::new(1, 20)),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn listing_passes_filters() {
        let mut repo = FakeRepo::new();
        repo.approval_reader
            .expect_list_approvals()
            .withf(|query| {
                query.status == Some(ApprovalState::Pending) && query.order_id == Some(10)
            })
            .returning(|_| {
                Ok((
                    1,
                    vec![approval(1, ApprovalKind::SellerPayout, ApprovalState::Pending)],
                ))
            });

        let filter = ApprovalFilter {
            status: Some(ApprovalState::Pending),
            kind: None,
            order_id: Some(10),
        };
        let page = list_approvals(&repo, &admin(), filter, Pagination::new(1, 20)).expect("listed");
        assert_eq!(page.total, 1);
    }
}
