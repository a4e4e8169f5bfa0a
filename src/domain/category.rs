use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hierarchical product category belonging to a store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier of the category.
    pub id: i32,
    /// Owning store identifier.
    pub store_id: i32,
    /// Optional identifier of the parent category when building a tree.
    pub parent_id: Option<i32>,
    /// Human-readable name of the category.
    pub name: String,
    /// Optional description that expands upon the category name.
    pub description: Option<String>,
    /// Flag indicating whether the category has been archived.
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new category for a store.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub store_id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl NewCategory {
    /// Build a new category payload with the supplied details and current timestamp.
    pub fn new(store_id: i32, name: impl Into<String>) -> Self {
        Self {
            store_id,
            parent_id: None,
            name: name.into(),
            description: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Attach a parent identifier to the category payload.
    pub fn with_parent_id(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Attach a descriptive text to the category payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Patch data applied when updating an existing category.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub name: String,
    /// New description value; `None` clears the description.
    pub description: Option<String>,
    /// New parent; `None` moves the category to the root.
    pub parent_id: Option<i32>,
    pub is_archived: bool,
    pub updated_at: NaiveDateTime,
}

impl UpdateCategory {
    pub fn new(
        name: String,
        description: Option<String>,
        parent_id: Option<i32>,
        is_archived: bool,
    ) -> Self {
        Self {
            name,
            description,
            parent_id,
            is_archived,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Query definition used to retrieve the categories visible in a scope.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    /// Whether archived categories should be included in the results.
    pub include_archived: bool,
    /// Optional substring search applied to name and description.
    pub search: Option<String>,
}

impl CategoryListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include archived categories in the results.
    pub fn include_archived(mut self) -> Self {
        self.include_archived = true;
        self
    }

    /// Filter results by a search term applied to the name and description.
    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }
}

/// Node representation of a category and its children for tree traversal.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl Into<Vec<CategoryTreeNode>>) -> Self {
        self.children = children.into();
        self
    }
}
