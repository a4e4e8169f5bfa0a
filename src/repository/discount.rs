use chrono::Utc;
use diesel::prelude::*;

use crate::domain::auth::StoreScope;
use crate::domain::discount::{
    DiscountCode as DomainDiscountCode, NewDiscountCode as DomainNewDiscountCode,
};
use crate::models::discount::{DiscountCode as DbDiscountCode, NewDiscountCode as DbNewDiscountCode};
use crate::repository::{
    DieselRepository, DiscountReader, DiscountWriter, RepositoryError, RepositoryResult,
};

impl DiscountReader for DieselRepository {
    fn list_discount_codes(
        &self,
        scope: &StoreScope,
    ) -> RepositoryResult<Vec<DomainDiscountCode>> {
        use crate::schema::discount_codes;

        let mut conn = self.conn()?;

        let mut query = discount_codes::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(store_id) = scope.store_id() {
            query = query.filter(discount_codes::store_id.eq(store_id));
        }

        query
            .order(discount_codes::code.asc())
            .load::<DbDiscountCode>(&mut conn)?
            .into_iter()
            .map(|row| DomainDiscountCode::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn get_discount_by_code(
        &self,
        scope: &StoreScope,
        code: &str,
    ) -> RepositoryResult<Option<DomainDiscountCode>> {
        use crate::schema::discount_codes;

        let mut conn = self.conn()?;

        let mut query = discount_codes::table
            .filter(discount_codes::code.eq(code.trim().to_uppercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(store_id) = scope.store_id() {
            query = query.filter(discount_codes::store_id.eq(store_id));
        }

        let row = query.first::<DbDiscountCode>(&mut conn).optional()?;
        row.map(DomainDiscountCode::try_from)
            .transpose()
            .map_err(Into::into)
    }
}

impl DiscountWriter for DieselRepository {
    fn create_discount_code(
        &self,
        new_code: &DomainNewDiscountCode,
    ) -> RepositoryResult<DomainDiscountCode> {
        use crate::schema::discount_codes;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(discount_codes::table)
            .values(&DbNewDiscountCode::from(new_code))
            .get_result::<DbDiscountCode>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn deactivate_discount_code(
        &self,
        scope: &StoreScope,
        discount_id: i32,
    ) -> RepositoryResult<DomainDiscountCode> {
        use crate::schema::discount_codes;

        let mut conn = self.conn()?;

        let mut query = discount_codes::table
            .filter(discount_codes::id.eq(discount_id))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(store_id) = scope.store_id() {
            query = query.filter(discount_codes::store_id.eq(store_id));
        }

        let existing = query
            .first::<DbDiscountCode>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        let updated = diesel::update(discount_codes::table.find(existing.id))
            .set((
                discount_codes::is_active.eq(false),
                discount_codes::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbDiscountCode>(&mut conn)?;

        Ok(updated.try_into()?)
    }
}
