//! Admin-only endpoints. Every service behind them checks the admin role.

use actix_web::{HttpResponse, get, post, put, web};

use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::handover::CodeKind;
use crate::forms::agents::{AgentDecisionForm, AgentFilter};
use crate::forms::auth::{SetActiveForm, UserFilter};
use crate::forms::payouts::{ApprovalFilter, RejectApprovalForm};
use crate::forms::pickup_sites::{AddPickupSiteForm, AssignManagerForm};
use crate::forms::promotions::AddPromotionForm;
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::services::{
    ServiceError, agents, handover, payouts, pickup_sites, promotions, users,
};

#[get("/admin/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    filter: web::Query<UserFilter>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = users::list_users(repo.get_ref(), &user, filter.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[put("/admin/users/{id}/active")]
pub async fn set_user_active(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<SetActiveForm>,
) -> Result<HttpResponse, ServiceError> {
    let updated = users::set_user_active(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/admin/agents")]
pub async fn list_agents(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    filter: web::Query<AgentFilter>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = agents::list_agents(repo.get_ref(), &user, filter.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/admin/agents/{id}/decision")]
pub async fn decide_agent(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<AgentDecisionForm>,
) -> Result<HttpResponse, ServiceError> {
    let agent = agents::decide_agent(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(agent))
}

#[post("/admin/pickup-sites")]
pub async fn create_pickup_site(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddPickupSiteForm>,
) -> Result<HttpResponse, ServiceError> {
    let site = pickup_sites::create_pickup_site(repo.get_ref(), &user, form.into_inner())?;
    Ok(HttpResponse::Created().json(site))
}

#[put("/admin/pickup-sites/{id}/manager")]
pub async fn assign_manager(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<AssignManagerForm>,
) -> Result<HttpResponse, ServiceError> {
    let site = pickup_sites::assign_manager(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(site))
}

#[get("/admin/promotions")]
pub async fn list_promotions(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = promotions::list_promotions(repo.get_ref(), &user, page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/admin/promotions")]
pub async fn create_promotion(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddPromotionForm>,
) -> Result<HttpResponse, ServiceError> {
    let promotion = promotions::create_promotion(repo.get_ref(), &user, form.into_inner())?;
    Ok(HttpResponse::Created().json(promotion))
}

#[put("/admin/promotions/{id}/active")]
pub async fn set_promotion_active(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: web::Json<SetActiveForm>,
) -> Result<HttpResponse, ServiceError> {
    let promotion =
        promotions::set_promotion_active(repo.get_ref(), &user, path.into_inner(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(promotion))
}

#[get("/admin/approvals")]
pub async fn list_approvals(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    filter: web::Query<ApprovalFilter>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = payouts::list_approvals(repo.get_ref(), &user, filter.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/admin/approvals/{id}/approve")]
pub async fn approve(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let outcome = payouts::approve(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/admin/approvals/{id}/reject")]
pub async fn reject(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    form: Option<web::Json<RejectApprovalForm>>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let outcome = payouts::reject(repo.get_ref(), &user, path.into_inner(), form)?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Replace a locked pickup or delivery code.
#[post("/admin/orders/{id}/codes/{kind}")]
pub async fn regenerate_code(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    path: web::Path<(i32, CodeKind)>,
) -> Result<HttpResponse, ServiceError> {
    let (order_id, kind) = path.into_inner();
    let order = handover::regenerate_code(repo.get_ref(), &user, order_id, kind, &config.handover)?;
    Ok(HttpResponse::Ok().json(order))
}
