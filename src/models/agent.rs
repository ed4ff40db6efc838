use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::agent::{Agent as DomainAgent, NewAgent as DomainNewAgent};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::agents)]
pub struct Agent {
    pub id: i32,
    pub user_id: i32,
    pub agent_type: String,
    pub status: String,
    pub approval_status: String,
    pub commission_rate_bp: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pickup_site_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::agents)]
pub struct NewAgent<'a> {
    pub user_id: i32,
    pub agent_type: &'a str,
    pub commission_rate_bp: i32,
    pub pickup_site_id: Option<i32>,
}

impl TryFrom<Agent> for DomainAgent {
    type Error = RepositoryError;

    fn try_from(value: Agent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            agent_type: value.agent_type.parse()?,
            status: value.status.parse()?,
            approval_status: value.approval_status.parse()?,
            commission_rate_bp: value.commission_rate_bp,
            latitude: value.latitude,
            longitude: value.longitude,
            pickup_site_id: value.pickup_site_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewAgent> for NewAgent<'a> {
    fn from(value: &'a DomainNewAgent) -> Self {
        Self {
            user_id: value.user_id,
            agent_type: value.agent_type.as_str(),
            commission_rate_bp: value.commission_rate_bp,
            pickup_site_id: value.pickup_site_id,
        }
    }
}
