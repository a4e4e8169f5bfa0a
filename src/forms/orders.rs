use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use validator::Validate;

use crate::domain::order::{OrderListQuery, OrderStatus, StatusChangeRequest};
use crate::forms::{FormError, FormResult, TEXT_MAX_LEN, optional_multiline, sanitize_inline_text};
use crate::pagination::Pagination;

/// Status change submitted by staff.
#[derive(Debug, Deserialize, Validate)]
pub struct StatusChangeForm {
    pub status: OrderStatus,
    #[validate(length(max = 128))]
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[validate(length(max = TEXT_MAX_LEN))]
    #[serde(default)]
    pub note: Option<String>,
    /// Must be `true` to cancel or refund.
    #[serde(default)]
    pub confirm: bool,
}

impl StatusChangeForm {
    pub fn into_request(self) -> FormResult<StatusChangeRequest> {
        self.validate()?;

        Ok(StatusChangeRequest {
            status: self.status,
            tracking_number: self
                .tracking_number
                .as_deref()
                .map(sanitize_inline_text)
                .filter(|value| !value.is_empty()),
            note: optional_multiline(self.note.as_deref()),
            confirmed: self.confirm,
        })
    }
}

/// Query parameters accepted by the order listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<i32>,
    pub search: Option<String>,
    /// Inclusive first day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive last day, `YYYY-MM-DD`.
    pub to: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Parse a `YYYY-MM-DD` query value.
pub fn parse_day(field: &'static str, value: &str) -> FormResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FormError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

/// Start of `day` as a timestamp.
pub fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

impl OrdersQuery {
    pub fn into_list_query(self) -> FormResult<OrderListQuery> {
        let mut query = OrderListQuery::new().paginate(Pagination::new(self.page, self.per_page));

        if let Some(status) = self.status {
            query = query.status(status);
        }
        if let Some(customer_id) = self.customer_id {
            query = query.customer_id(customer_id);
        }
        if let Some(search) = self
            .search
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
        {
            query = query.search(search);
        }
        if let Some(from) = self.from.as_deref() {
            query.created_from = Some(start_of(parse_day("from", from)?));
        }
        if let Some(to) = self.to.as_deref() {
            let last_day = parse_day("to", to)?;
            query.created_to = last_day.succ_opt().map(start_of);
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_trims_tracking_number() {
        let form = StatusChangeForm {
            status: OrderStatus::Shipped,
            tracking_number: Some("  1Z 999 ".to_string()),
            note: Some("\n".to_string()),
            confirm: false,
        };

        let request = form.into_request().expect("valid");
        assert_eq!(request.tracking_number.as_deref(), Some("1Z 999"));
        assert!(request.note.is_none());
        assert!(!request.confirmed);
    }

    #[test]
    fn date_range_covers_whole_last_day() {
        let query = OrdersQuery {
            from: Some("2024-03-01".to_string()),
            to: Some("2024-03-31".to_string()),
            ..OrdersQuery::default()
        }
        .into_list_query()
        .expect("valid");

        assert_eq!(
            query.created_from,
            NaiveDate::from_ymd_opt(2024, 3, 1).map(start_of)
        );
        assert_eq!(
            query.created_to,
            NaiveDate::from_ymd_opt(2024, 4, 1).map(start_of)
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let result = OrdersQuery {
            from: Some("03/01/2024".to_string()),
            ..OrdersQuery::default()
        }
        .into_list_query();

        assert!(matches!(
            result,
            Err(FormError::InvalidValue { field: "from", .. })
        ));
    }
}
