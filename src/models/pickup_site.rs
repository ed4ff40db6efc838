use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::pickup_site::{
    NewPickupSite as DomainNewPickupSite, PickupSite as DomainPickupSite,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::pickup_sites)]
pub struct PickupSite {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub manager_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::pickup_sites)]
pub struct NewPickupSite<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub manager_id: Option<i32>,
}

impl From<PickupSite> for DomainPickupSite {
    fn from(value: PickupSite) -> Self {
        Self {
            id: value.id,
            name: value.name,
            address: value.address,
            manager_id: value.manager_id,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewPickupSite> for NewPickupSite<'a> {
    fn from(value: &'a DomainNewPickupSite) -> Self {
        Self {
            name: value.name.as_str(),
            address: value.address.as_str(),
            manager_id: value.manager_id,
        }
    }
}
