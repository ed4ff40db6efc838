use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::user::{AgentType, NewUser, Role};
use crate::forms::sanitize::{non_empty_inline, sanitize_inline_text};

const NAME_MAX_LEN: u64 = 128;
const PASSWORD_MIN_LEN: u64 = 8;
const PASSWORD_MAX_LEN: u64 = 128;
const PHONE_MAX_LEN: u64 = 32;

/// Result type returned by the account form helpers.
pub type AuthFormResult<T> = Result<T, AuthFormError>;

/// Errors raised while processing registration and login payloads.
#[derive(Debug, Error)]
pub enum AuthFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("name cannot be empty")]
    EmptyName,
    #[error("admin accounts cannot be registered")]
    AdminRegistration,
    #[error("agent accounts need an agent type")]
    MissingAgentType,
    #[error("only agent accounts carry an agent type")]
    UnexpectedAgentType,
    #[error("only pickup site managers can be linked to a pickup site")]
    UnexpectedPickupSite,
}

/// Payload of `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = PASSWORD_MIN_LEN, max = PASSWORD_MAX_LEN))]
    pub password: String,
    #[validate(length(max = PHONE_MAX_LEN))]
    pub phone: Option<String>,
    pub role: Role,
    pub agent_type: Option<AgentType>,
    /// Pickup site a manager registers for.
    pub pickup_site_id: Option<i32>,
}

/// Validated registration waiting for its password hash.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
    pub agent_type: Option<AgentType>,
    pub pickup_site_id: Option<i32>,
}

impl Registration {
    /// Build the account row once the password has been hashed.
    pub fn new_user(&self, password_hash: String) -> NewUser {
        let mut new_user = NewUser::new(&self.name, &self.email, password_hash, self.role);
        if let Some(phone) = &self.phone {
            new_user = new_user.with_phone(phone);
        }
        if let Some(agent_type) = self.agent_type {
            new_user = new_user.with_agent_type(agent_type);
        }
        new_user
    }
}

impl RegisterForm {
    pub fn into_registration(self) -> AuthFormResult<Registration> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(AuthFormError::EmptyName);
        }

        match (self.role, self.agent_type) {
            (Role::Admin, _) => return Err(AuthFormError::AdminRegistration),
            (Role::Agent, None) => return Err(AuthFormError::MissingAgentType),
            (Role::Buyer | Role::Seller, Some(_)) => {
                return Err(AuthFormError::UnexpectedAgentType);
            }
            _ => {}
        }

        if self.pickup_site_id.is_some()
            && self.agent_type != Some(AgentType::PickupSiteManager)
        {
            return Err(AuthFormError::UnexpectedPickupSite);
        }

        Ok(Registration {
            name,
            email: self.email.trim().to_lowercase(),
            phone: non_empty_inline(self.phone.as_deref()),
            password: self.password,
            role: self.role,
            agent_type: self.agent_type,
            pickup_site_id: self.pickup_site_id,
        })
    }
}

/// Payload of `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = PASSWORD_MAX_LEN))]
    pub password: String,
}

impl LoginForm {
    /// Normalised email and the raw password.
    pub fn into_credentials(self) -> AuthFormResult<(String, String)> {
        self.validate()?;
        Ok((self.email.trim().to_lowercase(), self.password))
    }
}

/// Body of the admin toggles that switch a record on or off.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetActiveForm {
    pub is_active: bool,
}

/// Filters accepted by `GET /api/admin/users`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(role: Role, agent_type: Option<AgentType>) -> RegisterForm {
        RegisterForm {
            name: "  Jean   Claude ".to_string(),
            email: "Jean@Example.com".to_string(),
            password: "long-enough".to_string(),
            phone: Some(" ".to_string()),
            role,
            agent_type,
            pickup_site_id: None,
        }
    }

    #[test]
    fn buyer_registration_is_normalised() {
        let registration = form(Role::Buyer, None)
            .into_registration()
            .expect("valid registration");

        assert_eq!(registration.name, "Jean Claude");
        assert_eq!(registration.email, "jean@example.com");
        assert_eq!(registration.phone, None);

        let user = registration.new_user("hash".to_string());
        assert_eq!(user.role, Role::Buyer);
        assert_eq!(user.agent_type, None);
    }

    #[test]
    fn admin_cannot_self_register() {
        assert!(matches!(
            form(Role::Admin, None).into_registration(),
            Err(AuthFormError::AdminRegistration)
        ));
    }

    #[test]
    fn agent_requires_agent_type() {
        assert!(matches!(
            form(Role::Agent, None).into_registration(),
            Err(AuthFormError::MissingAgentType)
        ));
        assert!(matches!(
            form(Role::Seller, Some(AgentType::FastDelivery)).into_registration(),
            Err(AuthFormError::UnexpectedAgentType)
        ));
    }

    #[test]
    fn pickup_site_only_for_managers() {
        let mut fda = form(Role::Agent, Some(AgentType::FastDelivery));
        fda.pickup_site_id = Some(1);
        assert!(matches!(
            fda.into_registration(),
            Err(AuthFormError::UnexpectedPickupSite)
        ));

        let mut psm = form(Role::Agent, Some(AgentType::PickupSiteManager));
        psm.pickup_site_id = Some(1);
        assert_eq!(psm.into_registration().expect("valid").pickup_site_id, Some(1));
    }

    #[test]
    fn short_password_fails_validation() {
        let mut short = form(Role::Buyer, None);
        short.password = "short".to_string();
        assert!(matches!(
            short.into_registration(),
            Err(AuthFormError::Validation(_))
        ));
    }
}
