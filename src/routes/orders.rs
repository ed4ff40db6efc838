use actix_web::{HttpResponse, get, post, web};

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::orders::{CancelOrderForm, ManualOrderForm, OrderFilter, PlaceOrderForm};
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, orders};

#[post("/orders")]
pub async fn place_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    form: web::Json<PlaceOrderForm>,
) -> Result<HttpResponse, ServiceError> {
    let order = orders::place_order(
        repo.get_ref(),
        &user,
        form.into_inner(),
        &config.order_settings(),
    )?;
    Ok(HttpResponse::Created().json(order))
}

/// Walk-in order recorded by a pickup site manager.
#[post("/orders/manual")]
pub async fn place_manual_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    form: web::Json<ManualOrderForm>,
) -> Result<HttpResponse, ServiceError> {
    let order = orders::place_manual_order(
        repo.get_ref(),
        &user,
        form.into_inner(),
        &config.order_settings(),
    )?;
    Ok(HttpResponse::Created().json(order))
}

#[get("/orders")]
pub async fn list_orders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    filter: web::Query<OrderFilter>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = orders::list_orders(repo.get_ref(), &user, filter.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/orders/{id}")]
pub async fn get_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = orders::get_order(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/orders/{id}/processing")]
pub async fn mark_processing(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = orders::mark_processing(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/orders/{id}/ready")]
pub async fn mark_ready(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = orders::mark_ready_for_pickup(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

/// The body is optional; an empty request cancels without a reason.
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: Option<web::Json<CancelOrderForm>>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let order = orders::cancel_order(repo.get_ref(), &user, path.into_inner(), form)?;
    Ok(HttpResponse::Ok().json(order))
}

#[get("/orders/{id}/tracking")]
pub async fn tracking_history(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let events = orders::tracking_history(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(events))
}
