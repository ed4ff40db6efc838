use chrono::NaiveDateTime;
use serde::Serialize;

use crate::pagination::Pagination;

string_enum! {
    /// Actor class carried by every account and every issued token.
    pub enum Role as "role" {
        Buyer => "buyer",
        Seller => "seller",
        Agent => "agent",
        Admin => "admin",
    }
}

string_enum! {
    /// Sub-type of an agent account.
    pub enum AgentType as "agent type" {
        /// FDA: delivers standard and grocery orders straight to the buyer.
        FastDelivery => "fast_delivery",
        /// PDA: delivers orders collected at a pickup site.
        PickupDelivery => "pickup_delivery",
        /// PSM: runs a pickup site and records walk-in orders.
        PickupSiteManager => "pickup_site_manager",
    }
}

impl AgentType {
    /// Whether agents of this type take deliveries at all.
    pub fn delivers(&self) -> bool {
        !matches!(self, AgentType::PickupSiteManager)
    }
}

/// Account record. The password hash never leaves the repository layer in
/// serialized form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub agent_type: Option<AgentType>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub agent_type: Option<AgentType>,
}

impl NewUser {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            phone: None,
            password_hash: password_hash.into(),
            role,
            agent_type: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_agent_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = Some(agent_type);
        self
    }
}

#[derive(Debug, Clone)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self {
            role: None,
            search: None,
            pagination: None,
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self::new()
    }
}
