use serde::Deserialize;
use validator::Validate;

use crate::domain::category::{CategoryListQuery, NewCategory, UpdateCategory};
use crate::forms::{
    FormResult, NAME_MAX_LEN, optional_multiline, required_inline, sanitize_inline_text,
};

/// Maximum length allowed for a category description.
const DESCRIPTION_MAX_LEN: u64 = 2048;

/// Payload used to create a category.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

impl AddCategoryForm {
    /// Validates and sanitizes the payload into a domain `NewCategory`.
    pub fn into_new_category(self, store_id: i32) -> FormResult<NewCategory> {
        self.validate()?;

        let mut new_category = NewCategory::new(store_id, required_inline(&self.name, "name")?);
        if let Some(description) = optional_multiline(self.description.as_deref()) {
            new_category = new_category.with_description(description);
        }
        if let Some(parent_id) = self.parent_id {
            new_category = new_category.with_parent_id(parent_id);
        }

        Ok(new_category)
    }
}

/// Payload used to replace a category's editable fields.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCategoryForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    #[serde(default)]
    pub description: Option<String>,
    /// `None` moves the category to the root.
    #[serde(default)]
    pub parent_id: Option<i32>,
    #[serde(default)]
    pub is_archived: bool,
}

impl EditCategoryForm {
    pub fn into_update_category(self) -> FormResult<UpdateCategory> {
        self.validate()?;

        Ok(UpdateCategory::new(
            required_inline(&self.name, "name")?,
            optional_multiline(self.description.as_deref()),
            self.parent_id,
            self.is_archived,
        ))
    }
}

/// Query parameters accepted by the category listing.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    #[serde(default)]
    pub include_archived: bool,
    pub search: Option<String>,
}

impl CategoriesQuery {
    pub fn into_list_query(self) -> CategoryListQuery {
        let mut query = CategoryListQuery::new();
        if self.include_archived {
            query = query.include_archived();
        }
        if let Some(search) = self
            .search
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
        {
            query = query.search(search);
        }
        query
    }
}
