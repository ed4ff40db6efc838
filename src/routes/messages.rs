use actix_web::{HttpResponse, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::messages::{InboxFilter, SendMessageForm};
use crate::pagination::PageParams;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, messages};

#[get("/messages")]
pub async fn inbox(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    filter: web::Query<InboxFilter>,
    page: web::Query<PageParams>,
) -> Result<HttpResponse, ServiceError> {
    let page = messages::inbox(repo.get_ref(), &user, filter.into_inner(), page.pagination())?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/messages/unread")]
pub async fn unread_count(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let count = messages::unread_count(repo.get_ref(), &user)?;
    Ok(HttpResponse::Ok().json(count))
}

#[post("/messages")]
pub async fn send_message(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<SendMessageForm>,
) -> Result<HttpResponse, ServiceError> {
    let message = messages::send_message(repo.get_ref(), &user, form.into_inner())?;
    Ok(HttpResponse::Created().json(message))
}

#[post("/messages/{id}/read")]
pub async fn mark_read(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let message = messages::mark_read(repo.get_ref(), &user, path.into_inner())?;
    Ok(HttpResponse::Ok().json(message))
}
