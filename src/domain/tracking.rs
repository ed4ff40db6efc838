use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::order::OrderStatus;

/// Append-only history row for an order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackingEvent {
    /// Unique identifier of the event.
    pub id: i32,
    /// Order the event belongs to.
    pub order_id: i32,
    /// User whose action produced the event.
    pub actor_id: i32,
    /// Agent holding the order at the time, if any.
    pub agent_id: Option<i32>,
    /// Order status after the event.
    pub status: OrderStatus,
    /// Reported position for location updates.
    pub latitude: Option<f64>,
    /// Reported position for location updates.
    pub longitude: Option<f64>,
    /// Free-form note such as a cancel reason.
    pub note: Option<String>,
    /// When the event was recorded.
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTrackingEvent {
    pub order_id: i32,
    pub actor_id: i32,
    pub agent_id: Option<i32>,
    pub status: OrderStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
}

impl NewTrackingEvent {
    pub fn status_change(order_id: i32, actor_id: i32, status: OrderStatus) -> Self {
        Self {
            order_id,
            actor_id,
            agent_id: None,
            status,
            latitude: None,
            longitude: None,
            note: None,
        }
    }

    pub fn with_agent(mut self, agent_id: Option<i32>) -> Self {
        self.agent_id = agent_id;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}
