use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
    store::NewCategory,
};

pub fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = state.store.categories();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let CreateCategoryRequest { name, slug } = payload;
    if name.trim().is_empty() || slug.trim().is_empty() {
        return Err(AppError::BadRequest("name and slug are required".into()));
    }
    if state.store.category_by_slug(&slug).is_some() {
        return Err(AppError::BadRequest("Slug is already taken".into()));
    }

    let category = state.store.create_category(NewCategory { name, slug });
    tracing::info!(category_id = category.id, "category created");
    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}
