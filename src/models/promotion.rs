use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::promotion::{NewPromotion as DomainNewPromotion, Promotion as DomainPromotion};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::promotions)]
pub struct Promotion {
    pub id: i32,
    pub code: String,
    pub discount_kind: String,
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::promotions)]
pub struct NewPromotion<'a> {
    pub code: &'a str,
    pub discount_kind: &'a str,
    pub discount_value: i64,
    pub min_order_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

impl TryFrom<Promotion> for DomainPromotion {
    type Error = RepositoryError;

    fn try_from(value: Promotion) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            code: value.code,
            discount_kind: value.discount_kind.parse()?,
            discount_value: value.discount_value,
            min_order_amount: value.min_order_amount,
            usage_limit: value.usage_limit,
            usage_count: value.usage_count,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewPromotion> for NewPromotion<'a> {
    fn from(value: &'a DomainNewPromotion) -> Self {
        Self {
            code: value.code.as_str(),
            discount_kind: value.discount_kind.as_str(),
            discount_value: value.discount_value,
            min_order_amount: value.min_order_amount,
            usage_limit: value.usage_limit,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
        }
    }
}
