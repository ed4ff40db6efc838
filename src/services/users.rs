//! Registration, login, sessions and admin account management.

use chrono::DateTime;

use crate::auth::{JwtKeys, hash_password, verify_password};
use crate::domain::auth::{AuthenticatedUser, LoginResponse, SessionContext};
use crate::domain::user::{NewUser, Role, User, UserListQuery};
use crate::forms::auth::{LoginForm, RegisterForm, SetActiveForm, UserFilter};
use crate::forms::sanitize::non_empty_inline;
use crate::pagination::{Paginated, Pagination};
use crate::repository::{PickupSiteReader, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Create a buyer, seller or agent account. Agent accounts start with a
/// pending profile at `default_commission_bp`.
pub fn register<R>(repo: &R, form: RegisterForm, default_commission_bp: i32) -> ServiceResult<User>
where
    R: UserReader + UserWriter + PickupSiteReader + ?Sized,
{
    let registration = form
        .into_registration()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo.get_user_by_email(&registration.email)?.is_some() {
        return Err(ServiceError::Conflict(
            "an account with this email already exists".to_string(),
        ));
    }

    if let Some(site_id) = registration.pickup_site_id
        && repo.get_pickup_site_by_id(site_id)?.is_none()
    {
        return Err(ServiceError::Form(format!("unknown pickup site {site_id}")));
    }

    let password_hash = hash_password(&registration.password)?;
    let new_user = registration.new_user(password_hash);

    let user = if registration.role == Role::Agent {
        let (user, agent) = repo.create_agent_user(
            &new_user,
            default_commission_bp,
            registration.pickup_site_id,
        )?;
        log::info!(
            "Registered {} agent {} (profile {}) pending approval",
            agent.agent_type,
            user.id,
            agent.id
        );
        user
    } else {
        let user = repo.create_user(&new_user)?;
        log::info!("Registered {} account {}", user.role, user.id);
        user
    };

    Ok(user)
}

/// Exchange credentials for a bearer token and the session context.
///
/// Unknown emails, wrong passwords and deactivated accounts are all reported
/// as `Unauthorized`.
pub fn login<R>(repo: &R, keys: &JwtKeys, form: LoginForm) -> ServiceResult<LoginResponse>
where
    R: UserReader + ?Sized,
{
    let (email, password) = form
        .into_credentials()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let Some(user) = repo.get_user_by_email(&email)? else {
        log::warn!("Login attempt for unknown email");
        return Err(ServiceError::Unauthorized);
    };

    if !verify_password(&user.password_hash, &password)? {
        log::warn!("Login attempt with wrong password for user {}", user.id);
        return Err(ServiceError::Unauthorized);
    }

    if !user.is_active {
        log::warn!("Login attempt for deactivated user {}", user.id);
        return Err(ServiceError::Unauthorized);
    }

    let (token, expires_at) = keys.issue(&user)?;

    Ok(LoginResponse {
        token,
        session: SessionContext::new(user, expires_at),
    })
}

/// Canonical session description for the bearer of the current token.
pub fn current_session<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SessionContext>
where
    R: UserReader + ?Sized,
{
    let account = repo
        .get_user_by_id(user.id)?
        .filter(|account| account.is_active)
        .ok_or(ServiceError::Unauthorized)?;

    let expires_at = DateTime::from_timestamp(user.exp, 0)
        .ok_or_else(|| ServiceError::Internal(format!("invalid token expiry {}", user.exp)))?;

    Ok(SessionContext::new(account, expires_at))
}

pub fn list_users<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: UserFilter,
    pagination: Pagination,
) -> ServiceResult<Paginated<User>>
where
    R: UserReader + ?Sized,
{
    ensure_admin(user)?;

    let mut query = UserListQuery::new().paginate(pagination);
    if let Some(role) = filter.role {
        query = query.role(role);
    }
    if let Some(search) = non_empty_inline(filter.search.as_deref()) {
        query = query.search(search);
    }

    let (total, users) = repo.list_users(query)?;
    Ok(Paginated::new(users, pagination, total))
}

/// Activate or deactivate an account. Admins cannot deactivate themselves.
pub fn set_user_active<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    form: SetActiveForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_admin(user)?;

    if user_id == user.id && !form.is_active {
        return Err(ServiceError::Form(
            "you cannot deactivate your own account".to_string(),
        ));
    }

    if repo.get_user_by_id(user_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let updated = repo.set_user_active(user_id, form.is_active)?;
    log::info!(
        "Admin {} set user {} active={}",
        user.id,
        user_id,
        form.is_active
    );
    Ok(updated)
}

/// Create the bootstrap admin unless an admin with that email exists.
///
/// Returns the account when it was created by this call.
pub fn ensure_admin_account<R>(repo: &R, email: &str, password: &str) -> ServiceResult<Option<User>>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = email.trim().to_lowercase();

    if let Some(existing) = repo.get_user_by_email(&email)? {
        if existing.role == Role::Admin {
            return Ok(None);
        }
        return Err(ServiceError::Conflict(format!(
            "`{email}` is registered with role {}",
            existing.role
        )));
    }

    let password_hash = hash_password(password)?;
    let admin = repo.create_user(&NewUser::new("Administrator", email, password_hash, Role::Admin))?;
    log::info!("Created bootstrap admin account {}", admin.id);
    Ok(Some(admin))
}
