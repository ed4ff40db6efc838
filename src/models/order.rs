use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{
    NewOrder as DomainNewOrder, Order as DomainOrder, OrderItem as DomainOrderItem,
};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub kind: String,
    pub buyer_id: i32,
    pub seller_id: i32,
    pub agent_id: Option<i32>,
    pub pickup_site_id: Option<i32>,
    pub created_by: i32,
    pub status: String,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub delivery_fee_amount: i64,
    pub total_amount: i64,
    pub currency: String,
    pub promo_code: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub pickup_code: Option<String>,
    pub pickup_code_attempts: i32,
    pub pickup_verified_at: Option<NaiveDateTime>,
    pub delivery_code: String,
    pub delivery_code_attempts: i32,
    pub delivered_at: Option<NaiveDateTime>,
    pub seller_payout_status: String,
    pub fda_commission_status: String,
    pub pda_commission_status: String,
    pub ready_at: Option<NaiveDateTime>,
    pub assigned_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancel_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price_amount: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub kind: &'a str,
    pub buyer_id: i32,
    pub seller_id: i32,
    pub pickup_site_id: Option<i32>,
    pub created_by: i32,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub delivery_fee_amount: i64,
    pub total_amount: i64,
    pub currency: &'a str,
    pub promo_code: Option<&'a str>,
    pub delivery_address: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub delivery_code: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub product_id: i32,
    pub name: &'a str,
    pub quantity: i32,
    pub unit_price_amount: i64,
}

/// Partial update applied together with a status change.
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
pub struct OrderChangeset {
    pub status: Option<String>,
    pub agent_id: Option<Option<i32>>,
    pub pickup_code: Option<Option<String>>,
    pub pickup_code_attempts: Option<i32>,
    pub pickup_verified_at: Option<Option<NaiveDateTime>>,
    pub delivery_code: Option<String>,
    pub delivery_code_attempts: Option<i32>,
    pub delivered_at: Option<Option<NaiveDateTime>>,
    pub seller_payout_status: Option<String>,
    pub fda_commission_status: Option<String>,
    pub pda_commission_status: Option<String>,
    pub ready_at: Option<Option<NaiveDateTime>>,
    pub assigned_at: Option<Option<NaiveDateTime>>,
    pub completed_at: Option<Option<NaiveDateTime>>,
    pub cancelled_at: Option<Option<NaiveDateTime>>,
    pub cancel_reason: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl OrderChangeset {
    pub fn touch(updated_at: NaiveDateTime) -> Self {
        Self {
            updated_at,
            ..Default::default()
        }
    }
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> Result<DomainOrder, RepositoryError> {
        Ok(DomainOrder {
            id: self.id,
            kind: self.kind.parse()?,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            agent_id: self.agent_id,
            pickup_site_id: self.pickup_site_id,
            created_by: self.created_by,
            status: self.status.parse()?,
            subtotal_amount: self.subtotal_amount,
            discount_amount: self.discount_amount,
            delivery_fee_amount: self.delivery_fee_amount,
            total_amount: self.total_amount,
            currency: self.currency,
            promo_code: self.promo_code,
            delivery_address: self.delivery_address,
            notes: self.notes,
            pickup_code: self.pickup_code,
            pickup_code_attempts: self.pickup_code_attempts,
            pickup_verified_at: self.pickup_verified_at,
            delivery_code: Some(self.delivery_code),
            delivery_code_attempts: self.delivery_code_attempts,
            delivered_at: self.delivered_at,
            seller_payout_status: self.seller_payout_status.parse()?,
            fda_commission_status: self.fda_commission_status.parse()?,
            pda_commission_status: self.pda_commission_status.parse()?,
            ready_at: self.ready_at,
            assigned_at: self.assigned_at,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            cancel_reason: self.cancel_reason,
            items: items.into_iter().map(OrderItem::into_domain).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrderItem {
    pub fn into_domain(self) -> DomainOrderItem {
        DomainOrderItem {
            product_id: self.product_id,
            name: self.name,
            quantity: self.quantity,
            unit_price_amount: self.unit_price_amount,
        }
    }
}

impl TryFrom<(Order, Vec<OrderItem>)> for DomainOrder {
    type Error = RepositoryError;

    fn try_from(value: (Order, Vec<OrderItem>)) -> Result<Self, Self::Error> {
        value.0.into_domain(value.1)
    }
}

impl<'a> From<&'a DomainNewOrder> for NewOrder<'a> {
    fn from(value: &'a DomainNewOrder) -> Self {
        Self {
            kind: value.kind.as_str(),
            buyer_id: value.buyer_id,
            seller_id: value.seller_id,
            pickup_site_id: value.pickup_site_id,
            created_by: value.created_by,
            subtotal_amount: value.subtotal_amount,
            discount_amount: value.discount_amount,
            delivery_fee_amount: value.delivery_fee_amount,
            total_amount: value.total_amount,
            currency: value.currency.as_str(),
            promo_code: value.promo_code.as_deref(),
            delivery_address: value.delivery_address.as_deref(),
            notes: value.notes.as_deref(),
            delivery_code: value.delivery_code.as_str(),
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_domain(order_id: i32, value: &'a DomainOrderItem) -> Self {
        Self {
            order_id,
            product_id: value.product_id,
            name: value.name.as_str(),
            quantity: value.quantity,
            unit_price_amount: value.unit_price_amount,
        }
    }
}
