use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{StringRecord, Trim};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, UpdateProduct};
use crate::forms::sanitize::{sanitize_code, sanitize_inline_text, sanitize_multiline_text};

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: u64 = 128;
/// Maximum allowed length for a SKU.
const SKU_MAX_LEN: u64 = 64;
const DESCRIPTION_MAX_LEN: u64 = 4000;
/// Upper bound on a single price, in minor units.
const PRICE_MAX: i64 = 1_000_000_000;
const STOCK_MAX: i32 = 1_000_000;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    /// The edit payload did not change anything.
    #[error("no changes submitted")]
    NoChanges,
    /// The uploaded CSV is missing required columns.
    #[error("upload is missing the required `name`/`title`, `price` or `stock` headers")]
    MissingRequiredHeaders,
    /// A CSV row did not include a product name.
    #[error("row {row} is missing a product name")]
    UploadMissingName { row: usize },
    /// A CSV row carried a price that is not a positive whole amount.
    #[error("row {row} has invalid price `{value}`")]
    UploadInvalidPrice { row: usize, value: String },
    /// A CSV row carried a stock level that is not a non-negative integer.
    #[error("row {row} has invalid stock `{value}`")]
    UploadInvalidStock { row: usize, value: String },
    /// The uploaded CSV did not contain any usable products.
    #[error("upload contains no products")]
    EmptyUpload,
    /// The uploaded file could not be read.
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parsing failures.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Body of `POST /api/products`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = SKU_MAX_LEN))]
    pub sku: Option<String>,
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    /// Unit price in minor units of the marketplace currency.
    #[validate(range(min = 1, max = PRICE_MAX))]
    pub price: i64,
    #[validate(range(min = 0, max = STOCK_MAX))]
    #[serde(default)]
    pub stock: i32,
}

impl AddProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    pub fn into_new_product(self, seller_id: i32, currency: &str) -> ProductFormResult<NewProduct> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let mut new_product =
            NewProduct::new(seller_id, name, self.price, currency).with_stock(self.stock);

        if let Some(sku) = self
            .sku
            .as_deref()
            .map(sanitize_code)
            .filter(|value| !value.is_empty())
        {
            new_product = new_product.with_sku(sku);
        }

        if let Some(description) = self
            .description
            .as_deref()
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty())
        {
            new_product = new_product.with_description(description);
        }

        Ok(new_product)
    }
}

/// Body of `PUT /api/products/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    /// Empty string clears the existing SKU.
    #[validate(length(max = SKU_MAX_LEN))]
    pub sku: Option<String>,
    /// Empty string clears the existing description.
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = PRICE_MAX))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = STOCK_MAX))]
    pub stock: Option<i32>,
    pub is_archived: Option<bool>,
}

impl EditProductForm {
    /// Validates and sanitizes the payload into a domain `UpdateProduct`.
    pub fn into_update_product(self) -> ProductFormResult<UpdateProduct> {
        self.validate()?;

        let mut updates = UpdateProduct::default();

        if let Some(name) = self.name {
            let sanitized = sanitize_inline_text(&name);
            if sanitized.is_empty() {
                return Err(ProductFormError::EmptyName);
            }
            updates.name = Some(sanitized);
        }

        if let Some(sku) = self.sku {
            let sanitized = sanitize_code(&sku);
            updates.sku = Some((!sanitized.is_empty()).then_some(sanitized));
        }

        if let Some(description) = self.description {
            let sanitized = sanitize_multiline_text(&description);
            updates.description = Some((!sanitized.is_empty()).then_some(sanitized));
        }

        updates.price_amount = self.price;
        updates.stock = self.stock;
        updates.is_archived = self.is_archived;

        if updates.is_empty() {
            return Err(ProductFormError::NoChanges);
        }

        Ok(updates)
    }
}

#[derive(MultipartForm)]
/// Multipart form for uploading a CSV file with new products.
pub struct UploadProductsForm {
    #[multipart(limit = "10MB")]
    /// Uploaded CSV file with `name` (or `title`), `price`, `stock` and
    /// optional `sku` and `description` columns.
    pub csv: TempFile,
}

impl UploadProductsForm {
    /// Parse the uploaded CSV file into [`NewProduct`] records for `seller_id`.
    pub fn into_new_products(
        &mut self,
        seller_id: i32,
        currency: &str,
    ) -> ProductFormResult<Vec<NewProduct>> {
        self.csv.file.rewind()?;
        parse_products(self.csv.file.by_ref(), seller_id, currency)
    }
}

struct ProductHeaderIndexes {
    name_index: Option<usize>,
    title_index: Option<usize>,
    price_index: usize,
    stock_index: usize,
    sku_index: Option<usize>,
    description_index: Option<usize>,
}

fn parse_products<R: Read>(
    reader: R,
    seller_id: i32,
    currency: &str,
) -> ProductFormResult<Vec<NewProduct>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let indexes = locate_product_headers(&headers)?;

    let mut products = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2; // account for header row
        let record = row?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let name = sanitize_inline_text(resolve_product_name(
            &record,
            indexes.name_index,
            indexes.title_index,
        ));
        if name.is_empty() {
            return Err(ProductFormError::UploadMissingName { row: row_number });
        }

        let price_raw = record.get(indexes.price_index).unwrap_or("").trim();
        let price = price_raw
            .parse::<i64>()
            .ok()
            .filter(|price| (1..=PRICE_MAX).contains(price))
            .ok_or_else(|| ProductFormError::UploadInvalidPrice {
                row: row_number,
                value: price_raw.to_string(),
            })?;

        let stock_raw = record.get(indexes.stock_index).unwrap_or("").trim();
        let stock = stock_raw
            .parse::<i32>()
            .ok()
            .filter(|stock| (0..=STOCK_MAX).contains(stock))
            .ok_or_else(|| ProductFormError::UploadInvalidStock {
                row: row_number,
                value: stock_raw.to_string(),
            })?;

        let mut product = NewProduct::new(seller_id, name, price, currency).with_stock(stock);

        if let Some(sku) = indexes
            .sku_index
            .and_then(|idx| record.get(idx))
            .map(sanitize_code)
            .filter(|value| !value.is_empty())
        {
            product = product.with_sku(sku);
        }

        if let Some(description) = indexes
            .description_index
            .and_then(|idx| record.get(idx))
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty())
        {
            product = product.with_description(description);
        }

        products.push(product);
    }

    if products.is_empty() {
        return Err(ProductFormError::EmptyUpload);
    }

    Ok(products)
}

fn locate_product_headers(headers: &StringRecord) -> ProductFormResult<ProductHeaderIndexes> {
    let name_index = locate_header(headers, "name");
    let title_index = locate_header(headers, "title");
    if name_index.is_none() && title_index.is_none() {
        return Err(ProductFormError::MissingRequiredHeaders);
    }

    let (Some(price_index), Some(stock_index)) =
        (locate_header(headers, "price"), locate_header(headers, "stock"))
    else {
        return Err(ProductFormError::MissingRequiredHeaders);
    };

    Ok(ProductHeaderIndexes {
        name_index,
        title_index,
        price_index,
        stock_index,
        sku_index: locate_header(headers, "sku"),
        description_index: locate_header(headers, "description"),
    })
}

fn locate_header(headers: &StringRecord, expected: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(expected))
}

fn resolve_product_name(
    record: &StringRecord,
    name_index: Option<usize>,
    title_index: Option<usize>,
) -> &str {
    [name_index, title_index]
        .into_iter()
        .flatten()
        .filter_map(|index| record.get(index))
        .find(|value| !value.trim().is_empty())
        .unwrap_or("")
}
