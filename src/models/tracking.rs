use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::tracking::{
    NewTrackingEvent as DomainNewTrackingEvent, TrackingEvent as DomainTrackingEvent,
};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tracking_events)]
pub struct TrackingEvent {
    pub id: i32,
    pub order_id: i32,
    pub actor_id: i32,
    pub agent_id: Option<i32>,
    pub status: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tracking_events)]
pub struct NewTrackingEvent<'a> {
    pub order_id: i32,
    pub actor_id: i32,
    pub agent_id: Option<i32>,
    pub status: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<TrackingEvent> for DomainTrackingEvent {
    type Error = RepositoryError;

    fn try_from(value: TrackingEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            order_id: value.order_id,
            actor_id: value.actor_id,
            agent_id: value.agent_id,
            status: value.status.parse()?,
            latitude: value.latitude,
            longitude: value.longitude,
            note: value.note,
            created_at: value.created_at,
        })
    }
}

impl<'a> NewTrackingEvent<'a> {
    pub fn from_domain(value: &'a DomainNewTrackingEvent, created_at: NaiveDateTime) -> Self {
        Self {
            order_id: value.order_id,
            actor_id: value.actor_id,
            agent_id: value.agent_id,
            status: value.status.as_str(),
            latitude: value.latitude,
            longitude: value.longitude,
            note: value.note.as_deref(),
            created_at,
        }
    }
}
