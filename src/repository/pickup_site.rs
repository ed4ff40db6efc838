use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::pickup_site::{NewPickupSite as DomainNewPickupSite, PickupSite as DomainPickupSite},
    models::pickup_site::{NewPickupSite as DbNewPickupSite, PickupSite as DbPickupSite},
    repository::{
        DieselRepository, PickupSiteReader, PickupSiteWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl PickupSiteReader for DieselRepository {
    fn get_pickup_site_by_id(&self, id: i32) -> RepositoryResult<Option<DomainPickupSite>> {
        use crate::schema::pickup_sites;

        let mut conn = self.conn()?;
        let site = pickup_sites::table
            .find(id)
            .first::<DbPickupSite>(&mut conn)
            .optional()?;

        Ok(site.map(Into::into))
    }

    fn get_pickup_site_by_manager(
        &self,
        manager_id: i32,
    ) -> RepositoryResult<Option<DomainPickupSite>> {
        use crate::schema::pickup_sites;

        let mut conn = self.conn()?;
        let site = pickup_sites::table
            .filter(pickup_sites::manager_id.eq(manager_id))
            .filter(pickup_sites::is_active.eq(true))
            .order(pickup_sites::id.asc())
            .first::<DbPickupSite>(&mut conn)
            .optional()?;

        Ok(site.map(Into::into))
    }

    fn list_pickup_sites(&self) -> RepositoryResult<Vec<DomainPickupSite>> {
        use crate::schema::pickup_sites;

        let mut conn = self.conn()?;
        let sites = pickup_sites::table
            .filter(pickup_sites::is_active.eq(true))
            .order(pickup_sites::name.asc())
            .load::<DbPickupSite>(&mut conn)?;

        Ok(sites.into_iter().map(Into::into).collect())
    }
}

impl PickupSiteWriter for DieselRepository {
    fn create_pickup_site(
        &self,
        new_site: &DomainNewPickupSite,
    ) -> RepositoryResult<DomainPickupSite> {
        use crate::schema::pickup_sites;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<DomainPickupSite, RepositoryError, _>(|conn| {
            let unmanaged = DomainNewPickupSite {
                manager_id: None,
                ..new_site.clone()
            };
            let created = diesel::insert_into(pickup_sites::table)
                .values(&DbNewPickupSite::from(&unmanaged))
                .get_result::<DbPickupSite>(conn)?;

            let site = match new_site.manager_id {
                Some(manager_id) => {
                    link_site_manager(conn, created.id, manager_id, Utc::now().naive_utc())?
                }
                None => created,
            };
            Ok(site.into())
        })
    }

    fn assign_manager(&self, site_id: i32, manager_id: i32) -> RepositoryResult<DomainPickupSite> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainPickupSite, RepositoryError, _>(|conn| {
            let site = link_site_manager(conn, site_id, manager_id, Utc::now().naive_utc())?;
            Ok(site.into())
        })
    }
}

/// Make `manager_id` the only manager of `site_id` and the site the only one
/// the manager runs. `pickup_sites.manager_id` is authoritative;
/// `agents.pickup_site_id` mirrors it.
pub(super) fn link_site_manager(
    conn: &mut SqliteConnection,
    site_id: i32,
    manager_id: i32,
    now: NaiveDateTime,
) -> RepositoryResult<DbPickupSite> {
    use crate::schema::{agents, pickup_sites};

    let previous = pickup_sites::table
        .find(site_id)
        .select(pickup_sites::manager_id)
        .first::<Option<i32>>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    if let Some(previous) = previous.filter(|previous| *previous != manager_id) {
        diesel::update(
            agents::table
                .filter(agents::user_id.eq(previous))
                .filter(agents::pickup_site_id.eq(site_id)),
        )
        .set((
            agents::pickup_site_id.eq(None::<i32>),
            agents::updated_at.eq(now),
        ))
        .execute(conn)?;
    }

    diesel::update(
        pickup_sites::table
            .filter(pickup_sites::manager_id.eq(manager_id))
            .filter(pickup_sites::id.ne(site_id)),
    )
    .set((
        pickup_sites::manager_id.eq(None::<i32>),
        pickup_sites::updated_at.eq(now),
    ))
    .execute(conn)?;

    let updated = diesel::update(pickup_sites::table.find(site_id))
        .set((
            pickup_sites::manager_id.eq(Some(manager_id)),
            pickup_sites::updated_at.eq(now),
        ))
        .get_result::<DbPickupSite>(conn)?;

    diesel::update(agents::table.filter(agents::user_id.eq(manager_id)))
        .set((
            agents::pickup_site_id.eq(Some(site_id)),
            agents::updated_at.eq(now),
        ))
        .execute(conn)?;

    Ok(updated)
}
