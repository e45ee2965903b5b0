use crate::{
    dto::cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let items: Vec<CartItemDto> = state
        .store
        .cart_items(user.user_id)
        .into_iter()
        .map(|item| CartItemDto {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            product: state.store.product(item.product_id),
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        CartList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItemDto>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = state
        .store
        .product(payload.product_id)
        .ok_or(AppError::NotFound)?;

    if product.inventory < payload.quantity {
        return Err(AppError::BadRequest("Not enough inventory".to_string()));
    }

    let item = state
        .store
        .add_to_cart(user.user_id, payload.product_id, payload.quantity);

    tracing::debug!(
        user_id = user.user_id,
        product_id = payload.product_id,
        quantity = item.quantity,
        "cart item added"
    );

    let dto = CartItemDto {
        id: item.id,
        product_id: item.product_id,
        quantity: item.quantity,
        product: Some(product),
    };
    Ok(ApiResponse::success("Added to cart", dto, None))
}

pub fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItemDto>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest("Invalid quantity".to_string()));
    }

    let product = state.store.product(product_id).ok_or(AppError::NotFound)?;

    if product.inventory < payload.quantity {
        return Err(AppError::BadRequest("Not enough inventory".to_string()));
    }

    let item = state
        .store
        .update_cart_item(user.user_id, product_id, payload.quantity)
        .ok_or(AppError::NotFound)?;

    let dto = CartItemDto {
        id: item.id,
        product_id: item.product_id,
        quantity: item.quantity,
        product: Some(product),
    };
    Ok(ApiResponse::success("Cart item updated", dto, None))
}

pub fn remove_from_cart(state: &AppState, user: &AuthUser, product_id: i64) -> AppResult<()> {
    if !state.store.remove_from_cart(user.user_id, product_id) {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<()> {
    state.store.clear_cart(user.user_id);
    Ok(())
}
