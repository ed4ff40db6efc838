use actix_web::{HttpResponse, get, post, web};

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::handover::{CodeForm, RecordLocationForm};
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, assignment, handover};

#[get("/deliveries/available")]
pub async fn list_available(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = assignment::list_available_orders(repo.get_ref(), &user, page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/deliveries/{id}/accept")]
pub async fn accept(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = assignment::accept_order(repo.get_ref(), &user, path.into_inner(), &config.handover)?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/deliveries/{id}/release")]
pub async fn release(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = assignment::release_order(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/deliveries/{id}/pickup")]
pub async fn verify_pickup(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    path: web::Path<i32>,
    form: web::Json<CodeForm>,
) -> Result<HttpResponse, ServiceError> {
    let order = handover::verify_pickup(
        repo.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
        &config.handover,
    )?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/deliveries/{id}/en-route")]
pub async fn mark_en_route(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let order = handover::mark_en_route(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/deliveries/{id}/location")]
pub async fn record_location(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<RecordLocationForm>,
) -> Result<HttpResponse, ServiceError> {
    let event = handover::record_location(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Created().json(event))
}

#[post("/deliveries/{id}/deliver")]
pub async fn confirm_delivery(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    path: web::Path<i32>,
    form: web::Json<CodeForm>,
) -> Result<HttpResponse, ServiceError> {
    let order = handover::confirm_delivery(
        repo.get_ref(),
        &user,
        path.into_inner(),
        form.into_inner(),
        &config.handover,
    )?;
    Ok(HttpResponse::Ok().json(order))
}
