use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        agent::{Agent as DomainAgent, AgentDecision, AgentListQuery, AgentStatus, ApprovalStatus},
        user::AgentType,
    },
    models::agent::Agent as DbAgent,
    repository::{
        AgentReader, AgentWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
        pickup_site::link_site_manager,
    },
};

impl AgentReader for DieselRepository {
    fn get_agent_by_id(&self, id: i32) -> RepositoryResult<Option<DomainAgent>> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let agent = agents::table
            .find(id)
            .first::<DbAgent>(&mut conn)
            .optional()?;

        agent.map(DomainAgent::try_from).transpose()
    }

    fn get_agent_by_user_id(&self, user_id: i32) -> RepositoryResult<Option<DomainAgent>> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let agent = agents::table
            .filter(agents::user_id.eq(user_id))
            .first::<DbAgent>(&mut conn)
            .optional()?;

        agent.map(DomainAgent::try_from).transpose()
    }

    fn list_agents(&self, query: AgentListQuery) -> RepositoryResult<(usize, Vec<DomainAgent>)> {
        use crate::schema::agents;

        let mut conn = self.conn()?;

        let approval = query.approval_status.map(|status| status.as_str());
        let agent_type = query.agent_type.map(|agent_type| agent_type.as_str());

        let filtered = || {
            let mut query = agents::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(approval) = approval {
                query = query.filter(agents::approval_status.eq(approval));
            }
            if let Some(agent_type) = agent_type {
                query = query.filter(agents::agent_type.eq(agent_type));
            }
            query
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered().order(agents::created_at.asc()).then_order_by(agents::id.asc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let agents = items
            .load::<DbAgent>(&mut conn)?
            .into_iter()
            .map(DomainAgent::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, agents))
    }
}

impl AgentWriter for DieselRepository {
    fn decide_agent(
        &self,
        agent_id: i32,
        decision: AgentDecision,
    ) -> RepositoryResult<DomainAgent> {
        use crate::schema::agents;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainAgent, RepositoryError, _>(|conn| {
            let now = Utc::now().naive_utc();
            let target = agents::table
                .filter(agents::id.eq(agent_id))
                .filter(agents::approval_status.eq(ApprovalStatus::Pending.as_str()));
            let status = decision.target_status().as_str();

            let updated = match decision {
                AgentDecision::Approve {
                    commission_rate_bp: Some(rate),
                } => diesel::update(target)
                    .set((
                        agents::approval_status.eq(status),
                        agents::commission_rate_bp.eq(rate),
                        agents::updated_at.eq(now),
                    ))
                    .get_result::<DbAgent>(conn)
                    .optional()?,
                _ => diesel::update(target)
                    .set((
                        agents::approval_status.eq(status),
                        agents::updated_at.eq(now),
                    ))
                    .get_result::<DbAgent>(conn)
                    .optional()?,
            };

            let Some(agent) = updated else {
                let exists = agents::table
                    .find(agent_id)
                    .select(agents::id)
                    .first::<i32>(conn)
                    .optional()?;
                return match exists {
                    Some(_) => Err(RepositoryError::Conflict(
                        "agent was already reviewed".to_string(),
                    )),
                    None => Err(RepositoryError::NotFound),
                };
            };

            // A manager who registered for a site takes it over on approval.
            let manages_site = agent.agent_type == AgentType::PickupSiteManager.as_str();
            let approved = matches!(decision, AgentDecision::Approve { .. });
            match agent.pickup_site_id {
                Some(site_id) if manages_site && approved => {
                    link_site_manager(conn, site_id, agent.user_id, now)?;
                    agents::table
                        .find(agent.id)
                        .first::<DbAgent>(conn)?
                        .try_into()
                }
                _ => agent.try_into(),
            }
        })
    }

    fn update_agent_status(
        &self,
        agent_id: i32,
        status: AgentStatus,
    ) -> RepositoryResult<DomainAgent> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let updated = diesel::update(agents::table.find(agent_id))
            .set((
                agents::status.eq(status.as_str()),
                agents::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbAgent>(&mut conn)?;

        updated.try_into()
    }

    fn update_agent_location(
        &self,
        agent_id: i32,
        latitude: f64,
        longitude: f64,
    ) -> RepositoryResult<DomainAgent> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let updated = diesel::update(agents::table.find(agent_id))
            .set((
                agents::latitude.eq(Some(latitude)),
                agents::longitude.eq(Some(longitude)),
                agents::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbAgent>(&mut conn)?;

        updated.try_into()
    }
}
