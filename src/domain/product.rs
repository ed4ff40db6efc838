use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Catalog entry offered by a seller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Seller account that owns the product.
    pub seller_id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Optional stock keeping unit identifier.
    pub sku: Option<String>,
    /// Optional longer description shown to buyers.
    pub description: Option<String>,
    /// Unit price in the smallest currency unit.
    pub price_amount: i64,
    /// ISO 4217 currency code of the price.
    pub currency: String,
    /// Units on hand; never negative.
    pub stock: i32,
    /// Archived products are hidden from buyers and cannot be ordered.
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub seller_id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_amount: i64,
    pub currency: String,
    pub stock: i32,
}

impl NewProduct {
    /// Build a new product payload with no stock on hand.
    pub fn new(
        seller_id: i32,
        name: impl Into<String>,
        price_amount: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            seller_id,
            name: name.into(),
            sku: None,
            description: None,
            price_amount,
            currency: currency.into(),
            stock: 0,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }
}

/// Patch data applied when updating an existing product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProduct {
    pub name: Option<String>,
    /// `Some(None)` clears the SKU.
    pub sku: Option<Option<String>>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub price_amount: Option<i64>,
    pub stock: Option<i32>,
    pub is_archived: Option<bool>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        self == &UpdateProduct::default()
    }
}

/// Query definition used to list catalog products.
#[derive(Debug, Clone)]
pub struct ProductListQuery {
    pub seller_id: Option<i32>,
    pub search: Option<String>,
    pub include_archived: bool,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self {
            seller_id: None,
            search: None,
            include_archived: false,
            pagination: None,
        }
    }

    pub fn seller(mut self, seller_id: i32) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn include_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self::new()
    }
}
