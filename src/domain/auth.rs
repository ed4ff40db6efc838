use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::{AgentType, Role, User};

/// Version of the session payload handed to clients.
pub const SESSION_VERSION: u32 = 1;

/// JWT claims issued at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id, as a string per RFC 7519.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<AgentType>,
    pub iat: i64,
    pub exp: i64,
}

/// Identity resolved from a bearer token for the current request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub agent_type: Option<AgentType>,
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_agent_of(&self, agent_type: AgentType) -> bool {
        self.role == Role::Agent && self.agent_type == Some(agent_type)
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = std::num::ParseIntError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.sub.parse()?,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            agent_type: claims.agent_type,
            exp: claims.exp,
        })
    }
}

/// Canonical description of the current session. Clients keep exactly this
/// object under one storage key instead of assembling it from several.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub version: u32,
    pub user: User,
    pub role: Role,
    pub agent_type: Option<AgentType>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user: User, expires_at: DateTime<Utc>) -> Self {
        Self {
            version: SESSION_VERSION,
            role: user.role,
            agent_type: user.agent_type,
            user,
            expires_at,
        }
    }
}

/// Response body returned by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionContext,
}
