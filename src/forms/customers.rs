use serde::Deserialize;

use crate::domain::customer::CustomerListQuery;
use crate::forms::sanitize_inline_text;
use crate::pagination::Pagination;

/// Query parameters accepted by the customer listing.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl CustomersQuery {
    pub fn into_list_query(self) -> CustomerListQuery {
        let query = CustomerListQuery::new().paginate(Pagination::new(self.page, self.per_page));

        match self
            .search
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
        {
            Some(search) => query.search(search),
            None => query,
        }
    }
}
