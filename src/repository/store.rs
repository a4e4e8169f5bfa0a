use diesel::prelude::*;

use crate::domain::auth::StoreScope;
use crate::domain::store::{
    NewStore as DomainNewStore, Store as DomainStore, UpdateStoreSettings, UpdateSubscription,
};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};
use crate::models::store::{
    NewStore as DbNewStore, Store as DbStore, StoreSettingsChangeset, SubscriptionChangeset,
};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::pagination::Pagination;
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, StoreReader, StoreWriter,
};

impl StoreReader for DieselRepository {
    fn get_store(&self, scope: &StoreScope, store_id: i32) -> RepositoryResult<Option<DomainStore>> {
        use crate::schema::stores;

        if !scope.allows(store_id) {
            return Ok(None);
        }

        let mut conn = self.conn()?;
        let store = stores::table
            .filter(stores::id.eq(store_id))
            .first::<DbStore>(&mut conn)
            .optional()?;

        store.map(DomainStore::try_from).transpose().map_err(Into::into)
    }

    fn get_store_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainStore>> {
        use crate::schema::stores;

        let mut conn = self.conn()?;
        let store = stores::table
            .filter(stores::slug.eq(slug))
            .first::<DbStore>(&mut conn)
            .optional()?;

        store.map(DomainStore::try_from).transpose().map_err(Into::into)
    }

    fn list_stores(&self, pagination: Pagination) -> RepositoryResult<(usize, Vec<DomainStore>)> {
        use crate::schema::stores;

        let mut conn = self.conn()?;

        let total = stores::table.count().get_result::<i64>(&mut conn)? as usize;

        let stores = stores::table
            .order(stores::name.asc())
            .offset(pagination.offset())
            .limit(pagination.limit())
            .load::<DbStore>(&mut conn)?
            .into_iter()
            .map(DomainStore::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, stores))
    }
}

impl StoreWriter for DieselRepository {
    fn create_store_with_admin(
        &self,
        new_store: &DomainNewStore,
        admin: &DomainNewUser,
    ) -> RepositoryResult<(DomainStore, DomainUser)> {
        use crate::schema::{stores, users};

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let store = diesel::insert_into(stores::table)
                .values(&DbNewStore::from(new_store))
                .get_result::<DbStore>(conn)?;

            let mut db_admin = DbNewUser::from(admin);
            db_admin.store_id = Some(store.id);

            let user = diesel::insert_into(users::table)
                .values(&db_admin)
                .get_result::<DbUser>(conn)?;

            Ok((DomainStore::try_from(store)?, DomainUser::try_from(user)?))
        })
    }

    fn update_store_settings(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateStoreSettings,
    ) -> RepositoryResult<DomainStore> {
        use crate::schema::stores;

        if !scope.allows(store_id) {
            return Err(RepositoryError::NotFound);
        }

        let mut conn = self.conn()?;
        let store = diesel::update(stores::table.filter(stores::id.eq(store_id)))
            .set(StoreSettingsChangeset::from(updates))
            .get_result::<DbStore>(&mut conn)?;

        Ok(store.try_into()?)
    }

    fn update_subscription(
        &self,
        scope: &StoreScope,
        store_id: i32,
        updates: &UpdateSubscription,
    ) -> RepositoryResult<DomainStore> {
        use crate::schema::stores;

        if !scope.allows(store_id) {
            return Err(RepositoryError::NotFound);
        }

        let mut conn = self.conn()?;
        let store = diesel::update(stores::table.filter(stores::id.eq(store_id)))
            .set(SubscriptionChangeset::from(updates))
            .get_result::<DbStore>(&mut conn)?;

        Ok(store.try_into()?)
    }
}
