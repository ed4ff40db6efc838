use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::product::{Product, ProductListQuery};
use crate::domain::user::Role;
use crate::forms::products::{AddProductForm, EditProductForm, UploadProductsForm};
use crate::forms::sanitize::non_empty_inline;
use crate::pagination::{Paginated, Pagination};
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Query parameters accepted by the catalog listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductsQuery {
    /// Restrict the listing to one seller's shop.
    pub seller_id: Option<i32>,
    /// Free-text search over name, SKU and description.
    pub search: Option<String>,
    /// Archived products are only returned to their seller and to admins.
    #[serde(default)]
    pub show_archived: bool,
}

/// Lists catalog products visible to the caller.
pub fn list_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ProductsQuery,
    pagination: Pagination,
) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader + ?Sized,
{
    let ProductsQuery {
        seller_id,
        search,
        show_archived,
    } = query;

    let mut list_query = ProductListQuery::new().paginate(pagination);

    if let Some(seller_id) = seller_id {
        list_query = list_query.seller(seller_id);
    }

    if let Some(search_term) = non_empty_inline(search.as_deref()) {
        list_query = list_query.search(search_term);
    }

    let owns_listing = user.role == Role::Seller && seller_id == Some(user.id);
    if show_archived && (owns_listing || user.is_admin()) {
        list_query = list_query.include_archived();
    }

    let (total, items) = repo.list_products(list_query)?;
    Ok(Paginated::new(items, pagination, total))
}

/// Creates a product in the calling seller's shop.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddProductForm,
    currency: &str,
) -> ServiceResult<Product>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, &[Role::Seller])?;

    let new_product = form
        .into_new_product(user.id, currency)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let product = repo.create_product(&new_product)?;
    log::info!("Seller {} created product {}", user.id, product.id);
    Ok(product)
}

/// Updates one of the calling seller's products.
pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: EditProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + ?Sized,
{
    ensure_role(user, &[Role::Seller])?;

    let existing = repo
        .get_product_by_id(product_id)?
        .ok_or(ServiceError::NotFound)?;
    if existing.seller_id != user.id {
        return Err(ServiceError::Forbidden);
    }

    let updates = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    Ok(repo.update_product(product_id, user.id, &updates)?)
}

/// Imports products from an uploaded CSV file.
pub fn import_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    mut form: UploadProductsForm,
    currency: &str,
) -> ServiceResult<usize>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, &[Role::Seller])?;

    let uploads = form
        .into_new_products(user.id, currency)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo.create_products(&uploads)?;
    log::info!("Seller {} imported {created} products", user.id);
    Ok(created)
}
