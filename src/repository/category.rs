use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::category::{
    Category as DomainCategory, CategoryListQuery, NewCategory as DomainNewCategory,
    UpdateCategory as DomainUpdateCategory,
};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryError, RepositoryResult,
};

impl CategoryReader for DieselRepository {
    fn list_categories(
        &self,
        scope: &StoreScope,
        query: &CategoryListQuery,
    ) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut items_query = categories::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            items_query = items_query.filter(categories::store_id.eq(store_id));
        }

        if !query.include_archived {
            items_query = items_query.filter(categories::is_archived.eq(false));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            items_query = items_query.filter(
                categories::name
                    .like(pattern.clone())
                    .or(categories::description.like(pattern)),
            );
        }

        let categories = items_query
            .order((categories::parent_id.asc(), categories::name.asc()))
            .load::<DbCategory>(&mut conn)?;

        Ok(categories.into_iter().map(DomainCategory::from).collect())
    }

    fn get_category_by_id(
        &self,
        scope: &StoreScope,
        category_id: i32,
    ) -> RepositoryResult<Option<DomainCategory>> {
        let mut conn = self.conn()?;
        let category = find_category(&mut conn, scope, category_id)?;
        Ok(category.map(DomainCategory::from))
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        if let Some(parent_id) = new_category.parent_id {
            ensure_category_in_store(&mut conn, new_category.store_id, parent_id)?;
        }

        let insertable = DbNewCategory::from(new_category);

        let created = diesel::insert_into(categories::table)
            .values(&insertable)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.into())
    }

    fn update_category(
        &self,
        scope: &StoreScope,
        category_id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        conn.transaction::<DomainCategory, RepositoryError, _>(|conn| {
            let existing =
                find_category(conn, scope, category_id)?.ok_or(RepositoryError::NotFound)?;

            if let Some(parent_id) = updates.parent_id {
                ensure_category_in_store(conn, existing.store_id, parent_id)?;
            }

            let updated = diesel::update(categories::table.find(existing.id))
                .set(&UpdateCategory::from(updates))
                .get_result::<DbCategory>(conn)?;

            Ok(updated.into())
        })
    }

    fn delete_category(&self, scope: &StoreScope, category_id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let existing =
            find_category(&mut conn, scope, category_id)?.ok_or(RepositoryError::NotFound)?;

        let deleted = diesel::delete(categories::table.find(existing.id)).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn find_category(
    conn: &mut SqliteConnection,
    scope: &StoreScope,
    category_id: i32,
) -> RepositoryResult<Option<DbCategory>> {
    use crate::schema::categories;

    let mut query = categories::table
        .filter(categories::id.eq(category_id))
        .into_boxed::<diesel::sqlite::Sqlite>();

    if let Some(store_id) = scope.store_id() {
        query = query.filter(categories::store_id.eq(store_id));
    }

    Ok(query.first::<DbCategory>(conn).optional()?)
}

pub(super) fn ensure_category_in_store(
    conn: &mut SqliteConnection,
    store_id: i32,
    category_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::categories;

    let exists = select(exists(
        categories::table
            .filter(categories::id.eq(category_id))
            .filter(categories::store_id.eq(store_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}
