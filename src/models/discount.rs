use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::UnknownVariant;
use crate::domain::discount::{DiscountCode as DomainDiscountCode, NewDiscountCode as DomainNewDiscountCode};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::discount_codes)]
pub struct DiscountCode {
    pub id: i32,
    pub store_id: i32,
    pub code: String,
    pub kind: String,
    pub value: i64,
    pub min_subtotal_cents: Option<i64>,
    pub max_uses: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::discount_codes)]
pub struct NewDiscountCode<'a> {
    pub store_id: i32,
    pub code: &'a str,
    pub kind: &'a str,
    pub value: i64,
    pub min_subtotal_cents: Option<i64>,
    pub max_uses: Option<i32>,
}

impl TryFrom<DiscountCode> for DomainDiscountCode {
    type Error = UnknownVariant;

    fn try_from(value: DiscountCode) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            store_id: value.store_id,
            code: value.code,
            kind: value.kind.parse()?,
            value: value.value,
            min_subtotal_cents: value.min_subtotal_cents,
            max_uses: value.max_uses,
            usage_count: value.usage_count,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDiscountCode> for NewDiscountCode<'a> {
    fn from(value: &'a DomainNewDiscountCode) -> Self {
        Self {
            store_id: value.store_id,
            code: value.code.as_str(),
            kind: value.kind.as_str(),
            value: value.value,
            min_subtotal_cents: value.min_subtotal_cents,
            max_uses: value.max_uses,
        }
    }
}
