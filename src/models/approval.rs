use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::approval::Approval as DomainApproval;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::approvals)]
pub struct Approval {
    pub id: i32,
    pub order_id: i32,
    pub kind: String,
    pub beneficiary_id: i32,
    pub amount: i64,
    pub status: String,
    pub decided_by: Option<i32>,
    pub decided_at: Option<NaiveDateTime>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::approvals)]
pub struct NewApproval<'a> {
    pub order_id: i32,
    pub kind: &'a str,
    pub beneficiary_id: i32,
    pub amount: i64,
}

impl TryFrom<Approval> for DomainApproval {
    type Error = RepositoryError;

    fn try_from(value: Approval) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            order_id: value.order_id,
            kind: value.kind.parse()?,
            beneficiary_id: value.beneficiary_id,
            amount: value.amount,
            status: value.status.parse()?,
            decided_by: value.decided_by,
            decided_at: value.decided_at,
            note: value.note,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
