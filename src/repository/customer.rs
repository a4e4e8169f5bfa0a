use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::auth::StoreScope;
use crate::domain::customer::{
    ANONYMIZED_NAME, Customer as DomainCustomer, CustomerListQuery,
    NewCustomer as DomainNewCustomer,
};
use crate::models::customer::{
    AnonymizeCustomer, Customer as DbCustomer, NewCustomer as DbNewCustomer,
};
use crate::models::order::ScrubOrderPersonalData;
use crate::repository::{
    CustomerReader, CustomerWriter, DieselRepository, RepositoryError, RepositoryResult,
};

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<Option<DomainCustomer>> {
        let mut conn = self.conn()?;
        let customer = find_customer(&mut conn, scope, customer_id)?;
        Ok(customer.map(Into::into))
    }

    fn get_customer_by_user_id(
        &self,
        scope: &StoreScope,
        user_id: i32,
    ) -> RepositoryResult<Option<DomainCustomer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let mut query = customers::table
            .filter(customers::user_id.eq(user_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(customers::store_id.eq(store_id));
        }

        let customer = query.first::<DbCustomer>(&mut conn).optional()?;
        Ok(customer.map(Into::into))
    }

    fn list_customers(
        &self,
        scope: &StoreScope,
        query: &CustomerListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCustomer>)> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let mut count_query = customers::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            count_query = count_query.filter(customers::store_id.eq(store_id));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            count_query = count_query.filter(
                customers::name
                    .like(pattern.clone())
                    .or(customers::email.like(pattern)),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = customers::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            items = items.filter(customers::store_id.eq(store_id));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            items = items.filter(
                customers::name
                    .like(pattern.clone())
                    .or(customers::email.like(pattern)),
            );
        }

        items = items.order(customers::created_at.desc());

        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let db_customers = items.load::<DbCustomer>(&mut conn)?;

        Ok((total, db_customers.into_iter().map(Into::into).collect()))
    }

    fn count_new_customers(
        &self,
        scope: &StoreScope,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let mut query = customers::table
            .filter(customers::created_at.ge(from))
            .filter(customers::created_at.lt(to))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(store_id) = scope.store_id() {
            query = query.filter(customers::store_id.eq(store_id));
        }

        Ok(query.count().get_result::<i64>(&mut conn)? as usize)
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(
        &self,
        new_customer: &DomainNewCustomer,
    ) -> RepositoryResult<DomainCustomer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(customers::table)
            .values(&DbNewCustomer::from(new_customer))
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(created.into())
    }

    fn anonymize_customer(
        &self,
        scope: &StoreScope,
        customer_id: i32,
    ) -> RepositoryResult<DomainCustomer> {
        use crate::schema::{customers, orders, users};

        let mut conn = self.conn()?;

        conn.transaction::<DomainCustomer, RepositoryError, _>(|conn| {
            let customer =
                find_customer(conn, scope, customer_id)?.ok_or(RepositoryError::NotFound)?;
            let now = Utc::now().naive_utc();

            if let Some(user_id) = customer.user_id {
                diesel::update(users::table.find(user_id))
                    .set((
                        users::name.eq(ANONYMIZED_NAME),
                        users::email.eq(format!("deleted-user-{user_id}@anonymized.invalid")),
                        users::password_hash.eq(""),
                        users::is_active.eq(false),
                        users::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            let email = format!("deleted-{}@anonymized.invalid", customer.id);
            let anonymized = diesel::update(customers::table.find(customer.id))
                .set(&AnonymizeCustomer {
                    user_id: None,
                    name: ANONYMIZED_NAME,
                    email: &email,
                    phone: None,
                    is_anonymized: true,
                    updated_at: now,
                })
                .get_result::<DbCustomer>(conn)?;

            diesel::update(orders::table.filter(orders::customer_id.eq(customer.id)))
                .set(&ScrubOrderPersonalData {
                    shipping_name: None,
                    shipping_address: None,
                    notes: None,
                    updated_at: now,
                })
                .execute(conn)?;

            Ok(anonymized.into())
        })
    }
}

fn find_customer(
    conn: &mut SqliteConnection,
    scope: &StoreScope,
    customer_id: i32,
) -> RepositoryResult<Option<DbCustomer>> {
    use crate::schema::customers;

    let mut query = customers::table
        .filter(customers::id.eq(customer_id))
        .into_boxed::<diesel::sqlite::Sqlite>();

    if let Some(store_id) = scope.store_id() {
        query = query.filter(customers::store_id.eq(store_id));
    }

    Ok(query.first::<DbCustomer>(conn).optional()?)
}
