use std::collections::{HashMap, HashSet};

use crate::domain::auth::{AuthenticatedUser, Role, STAFF_ROLES};
use crate::domain::category::{Category, CategoryListQuery, CategoryTreeNode};
use crate::forms::categories::{AddCategoryForm, CategoriesQuery, EditCategoryForm};
use crate::repository::{CategoryReader, CategoryWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

/// Loads the category tree visible to the user. Archived categories are only
/// shown to store staff, and only when asked for.
pub fn load_category_tree<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CategoriesQuery,
) -> ServiceResult<Vec<CategoryTreeNode>>
where
    R: CategoryReader + ?Sized,
{
    let scope = scope_for(user)?;

    let mut query = params.into_list_query();
    if user.role == Role::Customer {
        query.include_archived = false;
    }

    let flat = repo.list_categories(&scope, &query)?;
    Ok(build_category_tree(&flat))
}

/// Creates a new category in the user's store.
pub fn create_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;
    let store_id = owning_store(&scope)?;

    let new_category = form.into_new_category(store_id)?;

    repo.create_category(&new_category)
        .map_err(|err| match ServiceError::from(err) {
            ServiceError::NotFound => {
                ServiceError::Form("parent category does not exist".to_string())
            }
            other => other,
        })
}

/// Updates a category, refusing to make it its own ancestor.
pub fn modify_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    category_id: i32,
    form: EditCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let update = form.into_update_category()?;

    if let Some(parent_id) = update.parent_id {
        let all = repo.list_categories(&scope, &CategoryListQuery::new().include_archived())?;
        if !all.iter().any(|category| category.id == category_id) {
            return Err(ServiceError::NotFound);
        }
        if creates_cycle(&all, category_id, parent_id) {
            return Err(ServiceError::Form(
                "a category cannot be moved under itself or its descendants".to_string(),
            ));
        }
    }

    Ok(repo.update_category(&scope, category_id, &update)?)
}

/// Deletes a category; its children move to the root and its products
/// become uncategorised.
pub fn remove_category<R>(repo: &R, user: &AuthenticatedUser, category_id: i32) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    Ok(repo.delete_category(&scope, category_id)?)
}

/// Whether re-parenting `category_id` under `new_parent_id` would close a loop.
fn creates_cycle(categories: &[Category], category_id: i32, new_parent_id: i32) -> bool {
    let parents: HashMap<i32, Option<i32>> = categories
        .iter()
        .map(|category| (category.id, category.parent_id))
        .collect();

    let mut current = Some(new_parent_id);
    let mut steps = 0;
    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            return true;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}

fn build_category_tree(categories: &[Category]) -> Vec<CategoryTreeNode> {
    let known: HashSet<i32> = categories.iter().map(|category| category.id).collect();
    let mut children_by_parent: HashMap<Option<i32>, Vec<&Category>> = HashMap::new();

    for category in categories {
        // A parent filtered out of the listing (archived, not matched) puts
        // the child at the root.
        let parent = category.parent_id.filter(|id| known.contains(id));
        children_by_parent.entry(parent).or_default().push(category);
    }

    for children in children_by_parent.values_mut() {
        children.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn build_branch(
        parent_id: Option<i32>,
        grouped: &HashMap<Option<i32>, Vec<&Category>>,
    ) -> Vec<CategoryTreeNode> {
        match grouped.get(&parent_id) {
            Some(children) => {
                let mut nodes = Vec::with_capacity(children.len());
                for category in children {
                    let sub_tree = build_branch(Some(category.id), grouped);
                    nodes.push(CategoryTreeNode::new((*category).clone()).with_children(sub_tree));
                }
                nodes
            }
            None => Vec::new(),
        }
    }

    build_branch(None, &children_by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{fixed_datetime, store_admin, user_with_role};

    fn sample_category(id: i32, store_id: i32, name: &str) -> Category {
        Category {
            id,
            store_id,
            parent_id: None,
            name: name.to_string(),
            description: None,
            is_archived: false,
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn nested_categories() -> Vec<Category> {
        let beverages = sample_category(1, 9, "Beverages");
        let mut hot_drinks = sample_category(2, 9, "Hot Drinks");
        hot_drinks.parent_id = Some(beverages.id);
        hot_drinks.is_archived = true;
        let mut coffee = sample_category(3, 9, "Coffee");
        coffee.parent_id = Some(hot_drinks.id);
        vec![beverages, hot_drinks, coffee]
    }

    #[test]
    fn load_category_tree_returns_nested_nodes() {
        let mut repo = MockRepo::new();
        repo.category_reader
            .expect_list_categories()
            .times(1)
            .returning(|scope, query| {
                assert_eq!(scope.store_id(), Some(9));
                assert!(query.include_archived);
                Ok(nested_categories())
            });

        let params = CategoriesQuery {
            include_archived: true,
            search: None,
        };
        let tree = load_category_tree(&repo, &store_admin(), params).expect("expected success");

        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.category.name, "Beverages");
        assert_eq!(root.children.len(), 1);

        let child = &root.children[0];
        assert_eq!(child.category.name, "Hot Drinks");
        assert!(child.category.is_archived);
        assert_eq!(child.children.len(), 1);
        assert_eq!(child.children[0].category.name, "Coffee");
    }

    #[test]
    fn customers_never_see_archived_categories() {
        let mut repo = MockRepo::new();
        repo.category_reader
            .expect_list_categories()
            .withf(|_, query| !query.include_archived)
            .returning(|_, _| Ok(Vec::new()));

        let params = CategoriesQuery {
            include_archived: true,
            search: None,
        };
        let customer = user_with_role(Role::Customer, Some(9));

        assert!(load_category_tree(&repo, &customer, params).is_ok());
    }

    #[test]
    fn orphaned_children_surface_at_root() {
        let mut coffee = sample_category(3, 9, "Coffee");
        coffee.parent_id = Some(2);

        let tree = build_category_tree(&[coffee]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, 3);
    }

    #[test]
    fn create_category_requires_staff_role() {
        let repo = MockRepo::new();
        let form = AddCategoryForm {
            name: "Retail".to_string(),
            description: None,
            parent_id: None,
        };

        let result = create_category(&repo, &user_with_role(Role::Customer, Some(9)), form);

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn create_category_persists_new_entry() {
        let mut repo = MockRepo::new();
        repo.category_writer
            .expect_create_category()
            .times(1)
            .withf(|new_category| {
                assert_eq!(new_category.store_id, 9);
                assert_eq!(new_category.name, "Fresh Produce");
                assert_eq!(new_category.parent_id, Some(4));
                true
            })
            .returning(|_| Ok(sample_category(10, 9, "Fresh Produce")));

        let form = AddCategoryForm {
            name: "  Fresh   Produce ".to_string(),
            description: Some(" seasonal goods ".to_string()),
            parent_id: Some(4),
        };

        let created = create_category(&repo, &store_admin(), form).expect("expected success");

        assert_eq!(created.id, 10);
    }

    #[test]
    fn modify_category_rejects_cycles() {
        let mut repo = MockRepo::new();
        repo.category_reader
            .expect_list_categories()
            .returning(|_, _| Ok(nested_categories()));
        repo.category_writer.expect_update_category().never();

        let form = EditCategoryForm {
            name: "Beverages".to_string(),
            description: None,
            parent_id: Some(3),
            is_archived: false,
        };

        let result = modify_category(&repo, &store_admin(), 1, form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn modify_category_updates_entry() {
        let mut repo = MockRepo::new();
        repo.category_reader
            .expect_list_categories()
            .returning(|_, _| Ok(nested_categories()));
        repo.category_writer
            .expect_update_category()
            .times(1)
            .withf(|scope, category_id, updates| {
                scope.store_id() == Some(9)
                    && *category_id == 3
                    && updates.name == "Dry Goods"
                    && updates.parent_id == Some(1)
            })
            .returning(|_, _, _| Ok(sample_category(3, 9, "Dry Goods")));

        let form = EditCategoryForm {
            name: " Dry Goods ".to_string(),
            description: None,
            parent_id: Some(1),
            is_archived: false,
        };

        let updated = modify_category(&repo, &store_admin(), 3, form).expect("expected success");

        assert_eq!(updated.id, 3);
    }

    #[test]
    fn remove_category_deletes_entry() {
        let mut repo = MockRepo::new();
        repo.category_writer
            .expect_delete_category()
            .times(1)
            .withf(|scope, category_id| scope.store_id() == Some(9) && *category_id == 5)
            .returning(|_, _| Ok(()));

        assert!(remove_category(&repo, &store_admin(), 5).is_ok());
    }
}
