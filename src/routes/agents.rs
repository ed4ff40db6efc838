use actix_web::{HttpResponse, get, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::agents::{AgentLocationForm, AgentStatusForm};
use crate::repository::DieselRepository;
use crate::services::{ServiceError, agents};

#[get("/agents/me")]
pub async fn my_profile(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let agent = agents::my_agent_profile(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(agent))
}

#[put("/agents/me/status")]
pub async fn update_status(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AgentStatusForm>,
) -> Result<HttpResponse, ServiceError> {
    let agent = agents::update_agent_status(repo.get_ref(), &user, form.into_inner())?;
    Ok(HttpResponse::Ok().json(agent))
}

#[put("/agents/me/location")]
pub async fn update_location(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AgentLocationForm>,
) -> Result<HttpResponse, ServiceError> {
    let agent = agents::update_agent_location(repo.get_ref(), &user, form.into_inner())?;
    Ok(HttpResponse::Ok().json(agent))
}
