use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        agent::{Agent as DomainAgent, NewAgent as DomainNewAgent},
        user::{NewUser as DomainNewUser, User as DomainUser, UserListQuery},
    },
    models::{
        agent::{Agent as DbAgent, NewAgent as DbNewAgent},
        user::{NewUser as DbNewUser, User as DbUser},
    },
    repository::{
        DieselRepository, UserReader, UserWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<DomainUser>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .find(id)
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(DomainUser::try_from).transpose()
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<DomainUser>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(DomainUser::try_from).transpose()
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<DomainUser>)> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let role = query.role.map(|role| role.as_str());
        let pattern = query.search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = users::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(role) = role {
            count_query = count_query.filter(users::role.eq(role));
        }

        if let Some(pattern) = pattern.as_ref() {
            count_query = count_query.filter(
                users::name
                    .like(pattern.clone())
                    .or(users::email.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = users::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(role) = role {
            items = items.filter(users::role.eq(role));
        }

        if let Some(pattern) = pattern.as_ref() {
            items = items.filter(
                users::name
                    .like(pattern.clone())
                    .or(users::email.like(pattern.clone())),
            );
        }

        items = items.order(users::created_at.desc()).then_order_by(users::id.desc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let users = items
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(DomainUser::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, users))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &DomainNewUser) -> RepositoryResult<DomainUser> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new = DbNewUser::from(new_user);

        let created = diesel::insert_into(users::table)
            .values(&db_new)
            .get_result::<DbUser>(&mut conn)?;

        created.try_into()
    }

    fn create_agent_user(
        &self,
        new_user: &DomainNewUser,
        commission_rate_bp: i32,
        pickup_site_id: Option<i32>,
    ) -> RepositoryResult<(DomainUser, DomainAgent)> {
        use crate::schema::{agents, users};

        let agent_type = new_user.agent_type.ok_or_else(|| {
            RepositoryError::ConstraintViolation("agent accounts need an agent type".to_string())
        })?;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<(DomainUser, DomainAgent), RepositoryError, _>(|conn| {
            let user = diesel::insert_into(users::table)
                .values(&DbNewUser::from(new_user))
                .get_result::<DbUser>(conn)?;

            let new_agent = DomainNewAgent {
                user_id: user.id,
                agent_type,
                commission_rate_bp,
                pickup_site_id,
            };

            let agent = diesel::insert_into(agents::table)
                .values(&DbNewAgent::from(&new_agent))
                .get_result::<DbAgent>(conn)?;

            Ok((user.try_into()?, agent.try_into()?))
        })
    }

    fn set_user_active(&self, user_id: i32, is_active: bool) -> RepositoryResult<DomainUser> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::is_active.eq(is_active),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbUser>(&mut conn)?;

        updated.try_into()
    }
}
