use crate::documents::csv::products_csv;
use crate::domain::auth::{AuthenticatedUser, Role, STAFF_ROLES, StoreScope};
use crate::domain::product::{Product, ProductListQuery, ProductStatus, ProductVariant};
use crate::domain::store::Store;
use crate::forms::products::{ProductForm, ProductsQuery, UploadProductsForm, VariantForm};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{ProductReader, ProductWriter, StoreReader};
use crate::services::billing::ensure_product_capacity;
use crate::services::{ServiceError, ServiceResult, ensure_role, owning_store, scope_for};

/// Lists products visible to the user. Customers only ever see active
/// products, whatever status filter they ask for.
pub fn list_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ProductsQuery,
) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader + ?Sized,
{
    let scope = scope_for(user)?;

    let mut query = params.into_list_query();
    if user.role == Role::Customer {
        query.status = Some(ProductStatus::Active);
    }
    let pagination = query.pagination.unwrap_or_else(|| Pagination::new(None, None));

    let (total, products) = repo.list_products(&scope, &query)?;
    Ok(Paginated::new(products, pagination, total))
}

/// Loads a single product with its variants.
pub fn get_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    let scope = scope_for(user)?;

    let product = repo
        .get_product_by_id(&scope, product_id)?
        .ok_or(ServiceError::NotFound)?;

    if user.role == Role::Customer && product.status != ProductStatus::Active {
        return Err(ServiceError::NotFound);
    }

    Ok(product)
}

fn own_store<R>(repo: &R, scope: &StoreScope) -> ServiceResult<Store>
where
    R: StoreReader + ?Sized,
{
    let store_id = owning_store(scope)?;
    repo.get_store(scope, store_id)?
        .ok_or(ServiceError::NotFound)
}

fn category_not_found(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::NotFound => ServiceError::Form("category does not exist".to_string()),
        other => other,
    }
}

/// Creates a product in the user's store within the plan's product limit.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;
    let store = own_store(repo, &scope)?;

    let new_product = form.into_new_product(store.id)?;
    if new_product.status != ProductStatus::Archived {
        ensure_product_capacity(&store, repo.count_products(&scope)?, 1)?;
    }

    repo.create_product(&new_product)
        .map_err(|err| category_not_found(err.into()))
}

/// Imports every row of the uploaded CSV, or none of them.
pub fn import_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &mut UploadProductsForm,
) -> ServiceResult<usize>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;
    let store = own_store(repo, &scope)?;

    let new_products = form.parse(store.id)?;
    let counted = new_products
        .iter()
        .filter(|product| product.status != ProductStatus::Archived)
        .count();
    ensure_product_capacity(&store, repo.count_products(&scope)?, counted)?;

    let created = repo.create_products(&new_products)?;
    log::info!("imported {created} products into store {}", store.id);

    Ok(created)
}

/// Replaces the editable fields of a product. Reviving an archived product
/// counts against the plan limit again.
pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: StoreReader + ProductReader + ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let updates = form.into_update_product()?;
    let existing = repo
        .get_product_by_id(&scope, product_id)?
        .ok_or(ServiceError::NotFound)?;

    if existing.status == ProductStatus::Archived && updates.status != ProductStatus::Archived {
        let store = repo
            .get_store(&scope, existing.store_id)?
            .ok_or(ServiceError::NotFound)?;
        ensure_product_capacity(&store, repo.count_products(&scope)?, 1)?;
    }

    repo.update_product(&scope, product_id, &updates)
        .map_err(|err| category_not_found(err.into()))
}

/// Soft-deletes a product; it stays referenced by past orders.
pub fn archive_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    Ok(repo.archive_product(&scope, product_id)?)
}

pub fn add_variant<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: VariantForm,
) -> ServiceResult<ProductVariant>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let new_variant = form.into_new_variant(product_id)?;
    Ok(repo.add_variant(&scope, &new_variant)?)
}

pub fn remove_variant<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    variant_id: i32,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    Ok(repo.delete_variant(&scope, product_id, variant_id)?)
}

/// Exports the non-archived catalog of the user's scope as CSV.
pub fn export_products<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<u8>>
where
    R: ProductReader + ?Sized,
{
    ensure_role(user, STAFF_ROLES)?;
    let scope = scope_for(user)?;

    let (_, products) = repo.list_products(&scope, &ProductListQuery::new())?;
    Ok(products_csv(&products)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use actix_multipart::form::tempfile::TempFile;

    use super::*;
    use crate::repository::RepositoryError;
    use crate::repository::mock::MockRepo;
    use crate::services::test_support::{sample_product, sample_store, store_admin, user_with_role};

    fn product_form(status: ProductStatus) -> ProductForm {
        ProductForm {
            name: "Mug".to_string(),
            sku: Some("MUG-1".to_string()),
            description: None,
            price_cents: 1_200,
            compare_at_price_cents: None,
            category_id: None,
            status,
            track_inventory: true,
            stock_quantity: 5,
            low_stock_threshold: 1,
        }
    }

    #[test]
    fn customers_only_list_active_products() {
        let mut repo = MockRepo::new();
        repo.product_reader
            .expect_list_products()
            .times(1)
            .withf(|scope, query| {
                scope.store_id() == Some(9) && query.status == Some(ProductStatus::Active)
            })
            .returning(|_, _| Ok((1, vec![sample_product(1, 9, 500)])));

        let params = ProductsQuery {
            status: Some(ProductStatus::Draft),
            ..ProductsQuery::default()
        };
        let customer = user_with_role(Role::Customer, Some(9));
        let page = list_products(&repo, &customer, params).expect("listed");

        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn customers_cannot_open_draft_products() {
        let mut repo = MockRepo::new();
        repo.product_reader
            .expect_get_product_by_id()
            .returning(|_, id| {
                let mut product = sample_product(id, 9, 500);
                product.status = ProductStatus::Draft;
                Ok(Some(product))
            });

        let customer = user_with_role(Role::Customer, Some(9));

        assert!(matches!(
            get_product(&repo, &customer, 3),
            Err(ServiceError::NotFound)
        ));
        assert!(get_product(&repo, &store_admin(), 3).is_ok());
    }

    #[test]
    fn create_product_respects_plan_limit() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));
        repo.product_reader
            .expect_count_products()
            .returning(|_| Ok(25));
        repo.product_writer.expect_create_product().never();

        let result = create_product(&repo, &store_admin(), product_form(ProductStatus::Active));

        assert!(matches!(result, Err(ServiceError::PlanLimit(_))));
    }

    #[test]
    fn create_product_persists_in_own_store() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));
        repo.product_reader
            .expect_count_products()
            .returning(|_| Ok(3));
        repo.product_writer
            .expect_create_product()
            .times(1)
            .withf(|new_product| new_product.store_id == 9 && new_product.name == "Mug")
            .returning(|new_product| Ok(sample_product(7, new_product.store_id, 1_200)));

        let created = create_product(&repo, &store_admin(), product_form(ProductStatus::Active))
            .expect("created");

        assert_eq!(created.id, 7);
    }

    #[test]
    fn platform_scope_cannot_create_products() {
        let repo = MockRepo::new();
        let super_admin = user_with_role(Role::SuperAdmin, None);

        let result = create_product(&repo, &super_admin, product_form(ProductStatus::Active));

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn unknown_category_is_a_form_error() {
        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));
        repo.product_reader
            .expect_count_products()
            .returning(|_| Ok(0));
        repo.product_writer
            .expect_create_product()
            .returning(|_| Err(RepositoryError::NotFound));

        let mut form = product_form(ProductStatus::Draft);
        form.category_id = Some(404);

        assert!(matches!(
            create_product(&repo, &store_admin(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn import_checks_capacity_for_all_rows() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"name,price\nA,1\nB,2\nC,3\n").expect("write");
        let mut form = UploadProductsForm {
            csv: TempFile {
                file,
                content_type: None,
                file_name: None,
                size: 0,
            },
        };

        let mut repo = MockRepo::new();
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));
        repo.product_reader
            .expect_count_products()
            .returning(|_| Ok(23));
        repo.product_writer.expect_create_products().never();

        let result = import_products(&repo, &store_admin(), &mut form);

        assert!(matches!(result, Err(ServiceError::PlanLimit(_))));
    }

    #[test]
    fn reviving_archived_product_counts_against_limit() {
        let mut repo = MockRepo::new();
        repo.product_reader
            .expect_get_product_by_id()
            .returning(|_, id| {
                let mut product = sample_product(id, 9, 500);
                product.status = ProductStatus::Archived;
                Ok(Some(product))
            });
        repo.store_reader
            .expect_get_store()
            .returning(|_, id| Ok(Some(sample_store(id))));
        repo.product_reader
            .expect_count_products()
            .returning(|_| Ok(25));
        repo.product_writer.expect_update_product().never();

        let result = update_product(&repo, &store_admin(), 2, product_form(ProductStatus::Active));

        assert!(matches!(result, Err(ServiceError::PlanLimit(_))));
    }

    #[test]
    fn export_requires_staff() {
        let repo = MockRepo::new();
        let customer = user_with_role(Role::Customer, Some(9));

        assert!(matches!(
            export_products(&repo, &customer),
            Err(ServiceError::Forbidden)
        ));
    }
}
