use crate::domain::auth::AuthenticatedUser;
use crate::domain::pickup_site::PickupSite;
use crate::domain::user::AgentType;
use crate::forms::pickup_sites::{AddPickupSiteForm, AssignManagerForm};
use crate::repository::{PickupSiteReader, PickupSiteWriter, UserReader};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

pub fn list_pickup_sites<R>(repo: &R, _user: &AuthenticatedUser) -> ServiceResult<Vec<PickupSite>>
where
    R: PickupSiteReader + ?Sized,
{
    Ok(repo.list_pickup_sites()?)
}

pub fn create_pickup_site<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddPickupSiteForm,
) -> ServiceResult<PickupSite>
where
    R: PickupSiteWriter + UserReader + ?Sized,
{
    ensure_admin(user)?;

    let mut new_site = form
        .into_new_pickup_site()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let manager_id = new_site.manager_id.take();
    if let Some(manager_id) = manager_id {
        ensure_site_manager(repo, manager_id)?;
    }

    let site = repo.create_pickup_site(&new_site)?;
    log::info!("Admin {} created pickup site {}", user.id, site.id);

    match manager_id {
        Some(manager_id) => Ok(repo.assign_manager(site.id, manager_id)?),
        None => Ok(site),
    }
}

pub fn assign_manager<R>(
    repo: &R,
    user: &AuthenticatedUser,
    site_id: i32,
    form: AssignManagerForm,
) -> ServiceResult<PickupSite>
where
    R: PickupSiteReader + PickupSiteWriter + UserReader + ?Sized,
{
    ensure_admin(user)?;

    if repo.get_pickup_site_by_id(site_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }
    ensure_site_manager(repo, form.manager_id)?;

    let site = repo.assign_manager(site_id, form.manager_id)?;
    log::info!(
        "Admin {} assigned manager {} to pickup site {}",
        user.id,
        form.manager_id,
        site_id
    );
    Ok(site)
}

fn ensure_site_manager<R>(repo: &R, user_id: i32) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    match repo.get_user_by_id(user_id)? {
        Some(user) if user.agent_type == Some(AgentType::PickupSiteManager) => Ok(()),
        Some(_) => Err(ServiceError::Form(format!(
            "user {user_id} is not a pickup site manager"
        ))),
        None => Err(ServiceError::Form(format!("unknown user {user_id}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{admin, agent_user, pickup_site, seller, user};

    fn form(manager_id: Option<i32>) -> AddPickupSiteForm {
        AddPickupSiteForm {
            name: "Remera Hub".to_string(),
            address: "KG 9 Ave".to_string(),
            manager_id,
        }
    }

    #[test]
    fn create_with_manager_links_them() {
        let mut repo = FakeRepo::new();
        repo.user_reader
            .expect_get_user_by_id()
            .returning(|id| Ok(Some(agent_user(id, AgentType::PickupSiteManager))));
        repo.pickup_site_writer
            .expect_create_pickup_site()
            .withf(|site| site.manager_id.is_none() && site.name == "Remera Hub")
            .times(1)
            .returning(|_| Ok(pickup_site(7, None)));
        repo.pickup_site_writer
            .expect_assign_manager()
            .withf(|site_id, manager_id| *site_id == 7 && *manager_id == 11)
            .times(1)
            .returning(|site_id, manager_id| Ok(pickup_site(site_id, Some(manager_id))));

        let site = create_pickup_site(&repo, &admin(), form(Some(11))).expect("created");
        assert_eq!(site.manager_id, Some(11));
    }

    #[test]
    fn manager_must_be_site_manager_agent() {
        let mut repo = FakeRepo::new();
        repo.user_reader
            .expect_get_user_by_id()
            .returning(|id| Ok(Some(user(id, Role::Seller))));
        repo.pickup_site_writer.expect_create_pickup_site().never();

        assert!(matches!(
            create_pickup_site(&repo, &admin(), form(Some(2))),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn assign_manager_on_missing_site_is_not_found() {
        let mut repo = FakeRepo::new();
        repo.pickup_site_reader
            .expect_get_pickup_site_by_id()
            .returning(|_| Ok(None));

        assert!(matches!(
            assign_manager(&repo, &admin(), 99, AssignManagerForm { manager_id: 11 }),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn sellers_cannot_create_sites() {
        let repo = FakeRepo::new();
        assert!(matches!(
            create_pickup_site(&repo, &seller(), form(None)),
            Err(ServiceError::Forbidden)
        ));
    }
}
