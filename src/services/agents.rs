//! Agent onboarding and self-service profile updates.

use crate::domain::agent::{Agent, AgentListQuery, AgentStatus, ApprovalStatus};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::Role;
use crate::forms::agents::{AgentDecisionForm, AgentFilter, AgentLocationForm, AgentStatusForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{AgentReader, AgentWriter, MessageWriter};
use crate::services::notify::notify;
use crate::services::{ServiceError, ServiceResult, ensure_admin, ensure_role};

/// Agent profile of the calling user.
pub fn current_agent<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Agent>
where
    R: AgentReader + ?Sized,
{
    ensure_role(user, &[Role::Agent])?;
    repo.get_agent_by_user_id(user.id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_agents<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: AgentFilter,
    pagination: Pagination,
) -> ServiceResult<Paginated<Agent>>
where
    R: AgentReader + ?Sized,
{
    ensure_admin(user)?;

    let mut query = AgentListQuery::new().paginate(pagination);
    if let Some(status) = filter.approval_status {
        query = query.approval_status(status);
    }
    if let Some(agent_type) = filter.agent_type {
        query = query.agent_type(agent_type);
    }

    let (total, agents) = repo.list_agents(query)?;
    Ok(Paginated::new(agents, pagination, total))
}

/// Approve or reject a pending agent. Repeating the decision already taken
/// returns the agent unchanged; reversing it is a conflict.
pub fn decide_agent<R>(
    repo: &R,
    user: &AuthenticatedUser,
    agent_id: i32,
    form: AgentDecisionForm,
) -> ServiceResult<Agent>
where
    R: AgentReader + AgentWriter + MessageWriter + ?Sized,
{
    ensure_admin(user)?;

    let decision = form
        .into_decision()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let agent = repo
        .get_agent_by_id(agent_id)?
        .ok_or(ServiceError::NotFound)?;

    let target = decision.target_status();
    if agent.approval_status == target {
        return Ok(agent);
    }
    if agent.approval_status != ApprovalStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "agent is already {}",
            agent.approval_status
        )));
    }

    let decided = repo.decide_agent(agent_id, decision)?;
    log::info!("Admin {} marked agent {} {}", user.id, agent_id, target);

    notify(
        repo,
        decided.user_id,
        None,
        format!("Your agent account was {target}"),
    );

    Ok(decided)
}

pub fn my_agent_profile<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Agent>
where
    R: AgentReader + ?Sized,
{
    current_agent(repo, user)
}

/// Change availability. Only approved agents may go online.
pub fn update_agent_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AgentStatusForm,
) -> ServiceResult<Agent>
where
    R: AgentReader + AgentWriter + ?Sized,
{
    let agent = current_agent(repo, user)?;

    if form.status != AgentStatus::Offline && agent.approval_status != ApprovalStatus::Approved {
        return Err(ServiceError::Conflict(
            "agent account is not approved".to_string(),
        ));
    }

    Ok(repo.update_agent_status(agent.id, form.status)?)
}

pub fn update_agent_location<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AgentLocationForm,
) -> ServiceResult<Agent>
where
    R: AgentReader + AgentWriter + ?Sized,
{
    let agent = current_agent(repo, user)?;
    let (latitude, longitude) = form
        .into_position()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    Ok(repo.update_agent_location(agent.id, latitude, longitude)?)
}
