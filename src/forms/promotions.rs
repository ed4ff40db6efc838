use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::promotion::{DiscountKind, NewPromotion};
use crate::forms::sanitize::sanitize_code;

const CODE_MIN_LEN: usize = 3;
const CODE_MAX_LEN: usize = 32;
/// Percentages are expressed in basis points.
const FULL_PERCENTAGE_BP: i64 = 10_000;

pub type PromotionFormResult<T> = Result<T, PromotionFormError>;

#[derive(Debug, Error)]
pub enum PromotionFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("promotion code must be 3-32 letters, digits, `-` or `_`")]
    InvalidCode,
    #[error("percentage discounts cannot exceed 100%")]
    PercentageTooLarge,
    #[error("promotion must end after it starts")]
    InvalidWindow,
}

/// Body of `POST /api/admin/promotions`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddPromotionForm {
    pub code: String,
    pub discount_kind: DiscountKind,
    /// Basis points for percentages, minor units for fixed amounts.
    #[validate(range(min = 1))]
    pub discount_value: i64,
    #[validate(range(min = 0))]
    pub min_order_amount: Option<i64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i32>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

impl AddPromotionForm {
    pub fn into_new_promotion(self) -> PromotionFormResult<NewPromotion> {
        self.validate()?;

        let code = normalize_code(&self.code).ok_or(PromotionFormError::InvalidCode)?;

        if self.discount_kind == DiscountKind::Percentage
            && self.discount_value > FULL_PERCENTAGE_BP
        {
            return Err(PromotionFormError::PercentageTooLarge);
        }

        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at)
            && ends_at <= starts_at
        {
            return Err(PromotionFormError::InvalidWindow);
        }

        Ok(NewPromotion {
            code,
            discount_kind: self.discount_kind,
            discount_value: self.discount_value,
            min_order_amount: self.min_order_amount,
            usage_limit: self.usage_limit,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

/// Query of `GET /api/promotions/{code}/preview`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PreviewQuery {
    #[validate(range(min = 0))]
    pub subtotal: i64,
}

/// Upper-cased code, or `None` when it has the wrong shape.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = sanitize_code(raw).to_uppercase();
    let valid_len = (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&code.len());
    let valid_chars = code
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    (valid_len && valid_chars).then_some(code)
}
