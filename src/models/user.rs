use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser, UserCredentials};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub store_id: Option<i32>,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = UnknownVariant;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            store_id: value.store_id,
            name: value.name,
            email: value.email,
            role: value.role.parse()?,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}

impl TryFrom<User> for UserCredentials {
    type Error = UnknownVariant;

    fn try_from(mut value: User) -> Result<Self, Self::Error> {
        let password_hash = std::mem::take(&mut value.password_hash);
        Ok(Self {
            user: value.try_into()?,
            password_hash,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(value: &'a DomainNewUser) -> Self {
        Self {
            store_id: value.store_id,
            name: value.name.as_str(),
            email: value.email.as_str(),
            password_hash: value.password_hash.as_str(),
            role: value.role.as_str(),
        }
    }
}
