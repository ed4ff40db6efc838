use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::pickup_site::NewPickupSite;
use crate::forms::sanitize::sanitize_inline_text;

const NAME_MAX_LEN: u64 = 128;
const ADDRESS_MAX_LEN: u64 = 256;

pub type PickupSiteFormResult<T> = Result<T, PickupSiteFormError>;

#[derive(Debug, Error)]
pub enum PickupSiteFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("pickup site name cannot be empty")]
    EmptyName,
    #[error("pickup site address cannot be empty")]
    EmptyAddress,
}

/// Body of `POST /api/admin/pickup-sites`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddPickupSiteForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(min = 1, max = ADDRESS_MAX_LEN))]
    pub address: String,
    pub manager_id: Option<i32>,
}

impl AddPickupSiteForm {
    pub fn into_new_pickup_site(self) -> PickupSiteFormResult<NewPickupSite> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(PickupSiteFormError::EmptyName);
        }
        let address = sanitize_inline_text(&self.address);
        if address.is_empty() {
            return Err(PickupSiteFormError::EmptyAddress);
        }

        Ok(NewPickupSite {
            name,
            address,
            manager_id: self.manager_id,
        })
    }
}

/// Body of `PUT /api/admin/pickup-sites/{id}/manager`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AssignManagerForm {
    pub manager_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_site_fields_are_sanitized() {
        let form = AddPickupSiteForm {
            name: " Nyabugogo   Hub ".to_string(),
            address: "KN 1 Rd,\tKigali".to_string(),
            manager_id: None,
        };

        let site = form.into_new_pickup_site().expect("valid");
        assert_eq!(site.name, "Nyabugogo Hub");
        assert_eq!(site.address, "KN 1 Rd, Kigali");
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let form = AddPickupSiteForm {
            name: "   ".to_string(),
            address: "Kigali".to_string(),
            manager_id: None,
        };
        assert!(matches!(
            form.into_new_pickup_site(),
            Err(PickupSiteFormError::EmptyName)
        ));
    }
}
