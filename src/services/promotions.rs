use chrono::{NaiveDateTime, Utc};
use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::promotion::{Promotion, PromotionPreview};
use crate::forms::auth::SetActiveForm;
use crate::forms::promotions::{AddPromotionForm, PreviewQuery, normalize_code};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{PromotionReader, PromotionWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

pub fn list_promotions<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pagination: Pagination,
) -> ServiceResult<Paginated<Promotion>>
where
    R: PromotionReader + ?Sized,
{
    ensure_admin(user)?;

    let (total, promotions) = repo.list_promotions(pagination)?;
    Ok(Paginated::new(promotions, pagination, total))
}

pub fn create_promotion<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddPromotionForm,
) -> ServiceResult<Promotion>
where
    R: PromotionWriter + ?Sized,
{
    ensure_admin(user)?;

    let new_promotion = form
        .into_new_promotion()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let promotion = repo.create_promotion(&new_promotion)?;
    log::info!("Admin {} created promotion {}", user.id, promotion.code);
    Ok(promotion)
}

pub fn set_promotion_active<R>(
    repo: &R,
    user: &AuthenticatedUser,
    promotion_id: i32,
    form: SetActiveForm,
) -> ServiceResult<Promotion>
where
    R: PromotionWriter + ?Sized,
{
    ensure_admin(user)?;
    Ok(repo.set_promotion_active(promotion_id, form.is_active)?)
}

/// Discount `code` would give on `subtotal` right now.
pub fn preview_promotion<R>(
    repo: &R,
    _user: &AuthenticatedUser,
    code: &str,
    query: PreviewQuery,
) -> ServiceResult<PromotionPreview>
where
    R: PromotionReader + ?Sized,
{
    query
        .validate()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (code, discount) = resolve_discount(repo, code, query.subtotal, Utc::now().naive_utc())?;

    Ok(PromotionPreview {
        code,
        subtotal: query.subtotal,
        discount,
        total: query.subtotal - discount,
    })
}

/// Look up `raw_code` and compute its discount, naming why it does not apply.
pub(crate) fn resolve_discount<R>(
    repo: &R,
    raw_code: &str,
    subtotal: i64,
    now: NaiveDateTime,
) -> ServiceResult<(String, i64)>
where
    R: PromotionReader + ?Sized,
{
    let unknown = || ServiceError::Form("unknown promotion code".to_string());

    let code = normalize_code(raw_code).ok_or_else(unknown)?;
    let promotion = repo.get_promotion_by_code(&code)?.ok_or_else(unknown)?;

    promotion
        .check(subtotal, now)
        .map_err(|rejection| ServiceError::Form(rejection.to_string()))?;

    Ok((promotion.code.clone(), promotion.discount_for(subtotal)))
}
