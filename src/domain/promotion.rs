use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

string_enum! {
    pub enum DiscountKind as "discount kind" {
        /// Value is in basis points of the subtotal.
        Percentage => "percentage",
        /// Value is an amount in minor units.
        Fixed => "fixed",
    }
}

/// Discount code redeemable at checkout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Promotion {
    pub id: i32,
    pub code: String,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub min_order_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Reasons a promotion cannot be applied to an order.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PromotionRejection {
    #[error("promotion is not active")]
    Inactive,
    #[error("promotion has not started yet")]
    NotStarted,
    #[error("promotion has expired")]
    Expired,
    #[error("order total is below the promotion minimum")]
    BelowMinimum,
    #[error("promotion usage limit reached")]
    Exhausted,
}

impl Promotion {
    /// Check whether the promotion may be applied to `subtotal` at `now`.
    pub fn check(&self, subtotal: i64, now: NaiveDateTime) -> Result<(), PromotionRejection> {
        if !self.is_active {
            return Err(PromotionRejection::Inactive);
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(PromotionRejection::NotStarted);
        }
        if self.ends_at.is_some_and(|ends| now > ends) {
            return Err(PromotionRejection::Expired);
        }
        if self.min_order_amount.is_some_and(|min| subtotal < min) {
            return Err(PromotionRejection::BelowMinimum);
        }
        if self.usage_limit.is_some_and(|limit| self.usage_count >= limit) {
            return Err(PromotionRejection::Exhausted);
        }
        Ok(())
    }

    /// Discount granted on `subtotal`, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal: i64) -> i64 {
        let raw = match self.discount_kind {
            DiscountKind::Percentage => subtotal.saturating_mul(self.discount_value) / 10_000,
            DiscountKind::Fixed => self.discount_value,
        };
        raw.clamp(0, subtotal.max(0))
    }
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub code: String,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub min_order_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

/// Result of previewing a code against a prospective subtotal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromotionPreview {
    pub code: String,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}
