use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::Role;

pub mod errors;

pub use errors::{ServiceError, ServiceResult};

pub mod agents;
pub mod assignment;
pub mod handover;
pub mod messages;
pub mod notify;
pub mod orders;
pub mod payouts;
pub mod pickup_sites;
pub mod products;
pub mod promotions;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

/// Reject callers whose role is not in `allowed`.
pub(crate) fn ensure_role(user: &AuthenticatedUser, allowed: &[Role]) -> ServiceResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub(crate) fn ensure_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    ensure_role(user, &[Role::Admin])
}
