use chrono::NaiveDateTime;
use serde::Serialize;

/// Fixed collection point run by a pickup site manager.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PickupSite {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub manager_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPickupSite {
    pub name: String,
    pub address: String,
    pub manager_id: Option<i32>,
}
