use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::user::{AgentType, NewUser as DomainNewUser, User as DomainUser};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub agent_type: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub agent_type: Option<&'a str>,
}

impl TryFrom<User> for DomainUser {
    type Error = RepositoryError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            password_hash: value.password_hash,
            role: value.role.parse()?,
            agent_type: value
                .agent_type
                .as_deref()
                .map(str::parse::<AgentType>)
                .transpose()?,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(value: &'a DomainNewUser) -> Self {
        Self {
            name: value.name.as_str(),
            email: value.email.as_str(),
            phone: value.phone.as_deref(),
            password_hash: value.password_hash.as_str(),
            role: value.role.as_str(),
            agent_type: value.agent_type.map(|agent_type| agent_type.as_str()),
        }
    }
}
