use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::order::{OrderKind, OrderStatus, RequestedItem};
use crate::forms::sanitize::{non_empty_inline, non_empty_multiline, sanitize_code};

const MAX_LINES: u64 = 100;
const MAX_QUANTITY: i32 = 1000;
const ADDRESS_MAX_LEN: u64 = 256;
const NOTES_MAX_LEN: u64 = 1000;
const REASON_MAX_LEN: u64 = 500;
const PROMO_MAX_LEN: u64 = 32;

/// Result type returned by the order form helpers.
pub type OrderFormResult<T> = Result<T, OrderFormError>;

/// Errors raised while turning order payloads into requests.
#[derive(Debug, Error)]
pub enum OrderFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("order must contain at least one item")]
    NoItems,
    #[error("quantity for product {product_id} exceeds the per-line limit")]
    QuantityTooLarge { product_id: i32 },
    #[error("manual orders are recorded by pickup site managers")]
    ManualKind,
    #[error("a delivery address is required")]
    MissingAddress,
    #[error("buyer email cannot be empty")]
    MissingBuyer,
}

/// One requested line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct OrderLineForm {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrderForm {
    #[serde(default = "default_kind")]
    pub kind: OrderKind,
    #[validate(length(min = 1, max = MAX_LINES), nested)]
    pub items: Vec<OrderLineForm>,
    #[validate(length(max = PROMO_MAX_LEN))]
    pub promo_code: Option<String>,
    pub pickup_site_id: Option<i32>,
    #[validate(length(max = ADDRESS_MAX_LEN))]
    pub delivery_address: Option<String>,
    #[validate(length(max = NOTES_MAX_LEN))]
    pub notes: Option<String>,
}

fn default_kind() -> OrderKind {
    OrderKind::Standard
}

/// Sanitized buyer order ready for pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub kind: OrderKind,
    pub items: Vec<RequestedItem>,
    pub promo_code: Option<String>,
    pub pickup_site_id: Option<i32>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

impl PlaceOrderForm {
    pub fn into_request(self) -> OrderFormResult<OrderRequest> {
        self.validate()?;

        if self.kind == OrderKind::Manual {
            return Err(OrderFormError::ManualKind);
        }

        let items = merge_lines(&self.items)?;

        let delivery_address = non_empty_inline(self.delivery_address.as_deref());
        if delivery_address.is_none() {
            return Err(OrderFormError::MissingAddress);
        }

        let promo_code = self
            .promo_code
            .as_deref()
            .map(sanitize_code)
            .filter(|code| !code.is_empty())
            .map(|code| code.to_uppercase());

        Ok(OrderRequest {
            kind: self.kind,
            items,
            promo_code,
            pickup_site_id: self.pickup_site_id,
            delivery_address,
            notes: non_empty_multiline(self.notes.as_deref()),
        })
    }
}

/// Body of `POST /api/orders/manual`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualOrderForm {
    #[validate(email)]
    pub buyer_email: String,
    #[validate(length(min = 1, max = MAX_LINES), nested)]
    pub items: Vec<OrderLineForm>,
    #[validate(length(max = ADDRESS_MAX_LEN))]
    pub delivery_address: Option<String>,
    #[validate(length(max = NOTES_MAX_LEN))]
    pub notes: Option<String>,
}

/// Sanitized walk-in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualOrderRequest {
    pub buyer_email: String,
    pub items: Vec<RequestedItem>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

impl ManualOrderForm {
    pub fn into_request(self) -> OrderFormResult<ManualOrderRequest> {
        self.validate()?;

        let buyer_email = self.buyer_email.trim().to_lowercase();
        if buyer_email.is_empty() {
            return Err(OrderFormError::MissingBuyer);
        }

        Ok(ManualOrderRequest {
            buyer_email,
            items: merge_lines(&self.items)?,
            delivery_address: non_empty_inline(self.delivery_address.as_deref()),
            notes: non_empty_multiline(self.notes.as_deref()),
        })
    }
}

/// Body of `POST /api/orders/{id}/cancel`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CancelOrderForm {
    #[validate(length(max = REASON_MAX_LEN))]
    pub reason: Option<String>,
}

impl CancelOrderForm {
    pub fn into_reason(self) -> OrderFormResult<Option<String>> {
        self.validate()?;
        Ok(non_empty_multiline(self.reason.as_deref()))
    }
}

/// Filters accepted by `GET /api/orders`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub kind: Option<OrderKind>,
}

/// Fold repeated products into one line each, sorted by product id.
fn merge_lines(lines: &[OrderLineForm]) -> OrderFormResult<Vec<RequestedItem>> {
    if lines.is_empty() {
        return Err(OrderFormError::NoItems);
    }

    let mut merged: BTreeMap<i32, i32> = BTreeMap::new();
    for line in lines {
        let quantity = merged.entry(line.product_id).or_default();
        *quantity = quantity.saturating_add(line.quantity);
        if *quantity > MAX_QUANTITY {
            return Err(OrderFormError::QuantityTooLarge {
                product_id: line.product_id,
            });
        }
    }

    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| RequestedItem {
            product_id,
            quantity,
        })
        .collect())
}
