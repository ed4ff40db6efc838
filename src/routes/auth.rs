use actix_web::{HttpResponse, get, post, web};

use crate::auth::JwtKeys;
use crate::config::ServerConfig;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::auth::{LoginForm, RegisterForm};
use crate::repository::DieselRepository;
use crate::services::{ServiceError, users};

#[post("/auth/register")]
pub async fn register(
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    form: web::Json<RegisterForm>,
) -> Result<HttpResponse, ServiceError> {
    let user = users::register(
        repo.get_ref(),
        form.into_inner(),
        config.default_commission_bp,
    )?;
    Ok(HttpResponse::Created().json(user))
}

#[post("/auth/login")]
pub async fn login(
    repo: web::Data<DieselRepository>,
    keys: web::Data<JwtKeys>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, ServiceError> {
    let response = users::login(repo.get_ref(), keys.get_ref(), form.into_inner())?;
    Ok(HttpResponse::Ok().json(response))
}

/// The canonical session description for the bearer of the token.
#[get("/auth/me")]
pub async fn me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let session = users::current_session(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(session))
}
