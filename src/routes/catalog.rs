use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, get, post, put, web};
use serde_json::json;

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::products::{AddProductForm, EditProductForm, UploadProductsForm};
use crate::forms::promotions::PreviewQuery;
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::services::products::ProductsQuery;
use crate::services::{ServiceError, pickup_sites, products, promotions};

#[get("/products")]
pub async fn list_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    query: web::Query<ProductsQuery>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = products::list_products(repo.get_ref(), &user, query.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/products")]
pub async fn create_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    form: web::Json<AddProductForm>,
) -> Result<HttpResponse, ServiceError> {
    let product = products::create_product(repo.get_ref(), &user, form.into_inner(), &config.currency)?;
    Ok(HttpResponse::Created().json(product))
}

#[put("/products/{id}")]
pub async fn update_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<EditProductForm>,
) -> Result<HttpResponse, ServiceError> {
    let product = products::update_product(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(product))
}

/// Bulk catalog import from a CSV file in the `csv` multipart field.
#[post("/products/upload")]
pub async fn upload_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadProductsForm>,
) -> Result<HttpResponse, ServiceError> {
    let imported = products::import_products(repo.get_ref(), &user, form, &config.currency)?;
    Ok(HttpResponse::Created().json(json!({ "imported": imported })))
}

#[get("/pickup-sites")]
pub async fn list_pickup_sites(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let sites = pickup_sites::list_pickup_sites(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(sites))
}

#[get("/promotions/{code}/preview")]
pub async fn preview_promotion(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<String>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, ServiceError> {
    let preview = promotions::preview_promotion(repo.get_ref(), &user, &path, query.into_inner())?;
    Ok(HttpResponse::Ok().json(preview))
}
