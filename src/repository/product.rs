use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
        UpdateProduct as DomainUpdateProduct,
    },
    models::product::{
        NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
    },
    repository::{
        DieselRepository, ProductReader, ProductWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .find(id)
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(Into::into))
    }

    fn get_products_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let products = products::table
            .filter(products::id.eq_any(ids))
            .order(products::id.asc())
            .load::<DbProduct>(&mut conn)?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let pattern = query.search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(seller_id) = query.seller_id {
            count_query = count_query.filter(products::seller_id.eq(seller_id));
        }

        if !query.include_archived {
            count_query = count_query.filter(products::is_archived.eq(false));
        }

        if let Some(pattern) = pattern.as_ref() {
            count_query = count_query.filter(
                products::name
                    .like(pattern.clone())
                    .or(products::sku.like(pattern.clone()))
                    .or(products::description.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(seller_id) = query.seller_id {
            items = items.filter(products::seller_id.eq(seller_id));
        }

        if !query.include_archived {
            items = items.filter(products::is_archived.eq(false));
        }

        if let Some(pattern) = pattern.as_ref() {
            items = items.filter(
                products::name
                    .like(pattern.clone())
                    .or(products::sku.like(pattern.clone()))
                    .or(products::description.like(pattern.clone())),
            );
        }

        items = items.order(products::name.asc()).then_order_by(products::id.asc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let products = items.load::<DbProduct>(&mut conn)?;

        Ok((total, products.into_iter().map(Into::into).collect()))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(products::table)
            .values(&DbNewProduct::from(new_product))
            .get_result::<DbProduct>(&mut conn)?;

        Ok(created.into())
    }

    fn create_products(&self, new_products: &[DomainNewProduct]) -> RepositoryResult<usize> {
        use crate::schema::products;

        if new_products.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;

        conn.immediate_transaction::<usize, RepositoryError, _>(|conn| {
            let payload: Vec<DbNewProduct> = new_products.iter().map(DbNewProduct::from).collect();
            let inserted = diesel::insert_into(products::table)
                .values(&payload)
                .execute(conn)?;
            Ok(inserted)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        seller_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateProduct::from_domain(updates, Utc::now().naive_utc());

        let target = products::table
            .filter(products::id.eq(product_id))
            .filter(products::seller_id.eq(seller_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbProduct>(&mut conn)?;

        Ok(updated.into())
    }
}
