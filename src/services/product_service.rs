use rust_decimal::Decimal;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
    store::{NewProduct, ProductFilter, ProductPatch},
};

pub fn list_products(state: &AppState, query: ProductQuery) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let filter = ProductFilter {
        category_id: query.category_id,
        search: query.search.filter(|s| !s.is_empty()),
        featured: query.featured,
    };
    let mut items = state.store.products(&filter);

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    items.sort_by(|a, b| {
        let ordering = match sort_by {
            ProductSortBy::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            ProductSortBy::Price => a.price.cmp(&b.price).then(a.id.cmp(&b.id)),
            ProductSortBy::Name => a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub fn get_product(state: &AppState, id: i64) -> AppResult<ApiResponse<Product>> {
    let product = state.store.product(id).ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub fn featured_products(
    state: &AppState,
    limit: Option<usize>,
) -> AppResult<ApiResponse<ProductList>> {
    let items = state.store.featured_products(limit);
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Featured products",
        ProductList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if payload.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.inventory < 0 {
        return Err(AppError::BadRequest("inventory must not be negative".into()));
    }

    let product = state.store.create_product(NewProduct {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        image_url: payload.image_url,
        category_id: payload.category_id,
        inventory: payload.inventory,
        featured: payload.featured,
    });

    tracing::info!(product_id = product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if payload.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.inventory.is_some_and(|i| i < 0) {
        return Err(AppError::BadRequest("inventory must not be negative".into()));
    }

    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        image_url: payload.image_url,
        category_id: payload.category_id,
        inventory: payload.inventory,
        featured: payload.featured,
    };
    let product = state
        .store
        .update_product(id, patch)
        .ok_or(AppError::NotFound)?;

    tracing::info!(product_id = product.id, "product updated");
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub fn delete_product(state: &AppState, user: &AuthUser, id: i64) -> AppResult<()> {
    ensure_admin(user)?;
    if !state.store.delete_product(id) {
        return Err(AppError::NotFound);
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(())
}
