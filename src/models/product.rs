use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, UpdateProduct as DomainUpdateProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub seller_id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_amount: i64,
    pub currency: String,
    pub stock: i32,
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub seller_id: i32,
    pub name: &'a str,
    pub sku: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price_amount: i64,
    pub currency: &'a str,
    pub stock: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub name: Option<&'a str>,
    pub sku: Option<Option<&'a str>>,
    pub description: Option<Option<&'a str>>,
    pub price_amount: Option<i64>,
    pub stock: Option<i32>,
    pub is_archived: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            seller_id: value.seller_id,
            name: value.name,
            sku: value.sku,
            description: value.description,
            price_amount: value.price_amount,
            currency: value.currency,
            stock: value.stock,
            is_archived: value.is_archived,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            seller_id: value.seller_id,
            name: value.name.as_str(),
            sku: value.sku.as_deref(),
            description: value.description.as_deref(),
            price_amount: value.price_amount,
            currency: value.currency.as_str(),
            stock: value.stock,
        }
    }
}

impl<'a> UpdateProduct<'a> {
    pub fn from_domain(value: &'a DomainUpdateProduct, updated_at: NaiveDateTime) -> Self {
        Self {
            name: value.name.as_deref(),
            sku: value.sku.as_ref().map(|sku| sku.as_deref()),
            description: value
                .description
                .as_ref()
                .map(|description| description.as_deref()),
            price_amount: value.price_amount,
            stock: value.stock,
            is_archived: value.is_archived,
            updated_at,
        }
    }
}
