use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::promotion::{NewPromotion as DomainNewPromotion, Promotion as DomainPromotion},
    models::promotion::{NewPromotion as DbNewPromotion, Promotion as DbPromotion},
    pagination::Pagination,
    repository::{DieselRepository, PromotionReader, PromotionWriter, errors::RepositoryResult},
};

impl PromotionReader for DieselRepository {
    fn get_promotion_by_code(&self, code: &str) -> RepositoryResult<Option<DomainPromotion>> {
        use crate::schema::promotions;

        let mut conn = self.conn()?;
        let promotion = promotions::table
            .filter(promotions::code.eq(code.trim().to_uppercase()))
            .first::<DbPromotion>(&mut conn)
            .optional()?;

        promotion.map(DomainPromotion::try_from).transpose()
    }

    fn list_promotions(
        &self,
        pagination: Pagination,
    ) -> RepositoryResult<(usize, Vec<DomainPromotion>)> {
        use crate::schema::promotions;

        let mut conn = self.conn()?;

        let total = promotions::table
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let promotions = promotions::table
            .order(promotions::created_at.desc())
            .then_order_by(promotions::id.desc())
            .offset(pagination.offset())
            .limit(pagination.limit())
            .load::<DbPromotion>(&mut conn)?
            .into_iter()
            .map(DomainPromotion::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, promotions))
    }
}

impl PromotionWriter for DieselRepository {
    fn create_promotion(
        &self,
        new_promotion: &DomainNewPromotion,
    ) -> RepositoryResult<DomainPromotion> {
        use crate::schema::promotions;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(promotions::table)
            .values(&DbNewPromotion::from(new_promotion))
            .get_result::<DbPromotion>(&mut conn)?;

        created.try_into()
    }

    fn set_promotion_active(
        &self,
        promotion_id: i32,
        is_active: bool,
    ) -> RepositoryResult<DomainPromotion> {
        use crate::schema::promotions;

        let mut conn = self.conn()?;
        let updated = diesel::update(promotions::table.find(promotion_id))
            .set((
                promotions::is_active.eq(is_active),
                promotions::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbPromotion>(&mut conn)?;

        updated.try_into()
    }
}
