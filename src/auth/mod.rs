//! Request authentication: password hashing, token signing and the
//! `AuthenticatedUser` extractor.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};

use crate::domain::auth::AuthenticatedUser;
use crate::repository::{DieselRepository, UserReader};
use crate::services::ServiceError;

pub mod jwt;
pub mod password;

pub use jwt::JwtKeys;
pub use password::{hash_password, verify_password};

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            let Some(repo) = req.app_data::<web::Data<DieselRepository>>() else {
                return Err(ServiceError::Internal(
                    "repository is not configured".to_string(),
                ));
            };
            ensure_active(repo.get_ref(), &user)?;
            Ok(user)
        }))
    }
}

/// Tokens outlive account changes, so every request re-reads the account.
/// Deactivated or deleted accounts are rejected as `Unauthorized`.
pub fn ensure_active<R>(repo: &R, user: &AuthenticatedUser) -> Result<(), ServiceError>
where
    R: UserReader + ?Sized,
{
    match repo.get_user_by_id(user.id)? {
        Some(account) if account.is_active => Ok(()),
        _ => {
            log::warn!("Rejected token of inactive or missing user {}", user.id);
            Err(ServiceError::Unauthorized)
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let Some(keys) = req.app_data::<web::Data<JwtKeys>>() else {
        return Err(ServiceError::Internal(
            "token keys are not configured".to_string(),
        ));
    };

    let token = bearer_token(req).ok_or(ServiceError::Unauthorized)?;
    let claims = keys.decode(token)?;

    AuthenticatedUser::try_from(claims).map_err(|_| ServiceError::Unauthorized)
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
