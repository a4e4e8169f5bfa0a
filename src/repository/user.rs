use diesel::prelude::*;

use crate::domain::auth::StoreScope;
use crate::domain::customer::{Customer as DomainCustomer, NewCustomer as DomainNewCustomer};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser, UserCredentials};
use crate::models::customer::{Customer as DbCustomer, NewCustomer as DbNewCustomer};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::{DieselRepository, RepositoryError, RepositoryResult, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_credentials_by_email(&self, email: &str) -> RepositoryResult<Option<UserCredentials>> {
        use crate::schema::users;

        let normalized_email = email.trim().to_lowercase();

        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(normalized_email))
            .first::<DbUser>(&mut conn)
            .optional()?;

        user.map(UserCredentials::try_from)
            .transpose()
            .map_err(Into::into)
    }

    fn list_users(&self, scope: &StoreScope) -> RepositoryResult<Vec<DomainUser>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let mut query = users::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(store_id) = scope.store_id() {
            query = query.filter(users::store_id.eq(store_id));
        }

        let users = query
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(DomainUser::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &DomainNewUser) -> RepositoryResult<DomainUser> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = diesel::insert_into(users::table)
            .values(&DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        Ok(user.try_into()?)
    }

    fn register_customer(
        &self,
        new_user: &DomainNewUser,
        new_customer: &DomainNewCustomer,
    ) -> RepositoryResult<(DomainUser, DomainCustomer)> {
        use crate::schema::{customers, users};

        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let user = diesel::insert_into(users::table)
                .values(&DbNewUser::from(new_user))
                .get_result::<DbUser>(conn)?;

            let mut db_customer = DbNewCustomer::from(new_customer);
            db_customer.user_id = Some(user.id);

            // A guest checkout may already have created the customer row.
            let existing = customers::table
                .filter(customers::store_id.eq(new_customer.store_id))
                .filter(customers::email.eq(db_customer.email))
                .first::<DbCustomer>(conn)
                .optional()?;

            let customer = match existing {
                Some(existing) if existing.user_id.is_none() => {
                    diesel::update(customers::table.find(existing.id))
                        .set(customers::user_id.eq(user.id))
                        .get_result::<DbCustomer>(conn)?
                }
                Some(_) => {
                    return Err(RepositoryError::Conflict(
                        "customer already registered".to_string(),
                    ));
                }
                None => diesel::insert_into(customers::table)
                    .values(&db_customer)
                    .get_result::<DbCustomer>(conn)?,
            };

            Ok((DomainUser::try_from(user)?, customer.into()))
        })
    }
}
