use rust_decimal::Decimal;

use crate::{
    dto::orders::{
        OrderItemDetail, OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    store::{InventoryError, NewOrder, NewOrderItem},
};

pub fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    // Admins see every order, everyone else only their own.
    let scope = if user.is_admin() {
        None
    } else {
        Some(user.user_id)
    };
    let mut orders = state.store.orders(scope);

    if let Some(status) = query.status {
        orders.retain(|o| o.status == status);
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    orders.sort_by(|a, b| {
        let ordering = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = orders.len() as i64;
    let items = orders
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(|order| expand_order(state, order))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub fn get_order(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = state.store.order(id).ok_or(AppError::NotFound)?;

    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    Ok(ApiResponse::success(
        "OK",
        expand_order(state, order),
        Some(Meta::empty()),
    ))
}

/// Converts the caller's cart into a durable order.
///
/// Line items always come from the server-side cart; the request body's
/// items are ignored beyond a non-empty check. Inventory is taken through
/// the store's conditional decrement, and any already-applied decrement is
/// undone if a later line loses a race, so a failed placement never leaves
/// a partial decrement behind.
pub fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.shipping_address.trim().is_empty() {
        return Err(AppError::BadRequest("Shipping address is required".into()));
    }
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must have at least one item".into(),
        ));
    }

    let cart = state.store.cart_items(user.user_id);
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // Resolve every product and pre-validate stock before touching anything.
    let mut lines: Vec<(i32, Product)> = Vec::with_capacity(cart.len());
    for item in &cart {
        let product = state.store.product(item.product_id).ok_or_else(|| {
            AppError::BadRequest(format!("Product {} not found", item.product_id))
        })?;
        if product.inventory < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Not enough inventory for product {}",
                product.name
            )));
        }
        lines.push((item.quantity, product));
    }

    // Decrement stock line by line, keeping an undo log. A concurrent
    // checkout may still win the race for the last units between the
    // pre-validation above and this point; the conditional decrement
    // catches that, and the undo log restores whatever was already taken.
    let mut applied: Vec<(i64, i32)> = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;
    let mut order_items: Vec<NewOrderItem> = Vec::with_capacity(lines.len());
    for (quantity, product) in &lines {
        match state.store.adjust_inventory(product.id, -*quantity) {
            Ok(_) => {
                applied.push((product.id, *quantity));
                total += product.price * Decimal::from(*quantity);
                order_items.push(NewOrderItem {
                    product_id: product.id,
                    quantity: *quantity,
                    price: product.price,
                });
            }
            Err(err) => {
                rollback_decrements(state, &applied);
                return Err(match err {
                    InventoryError::NotFound => {
                        AppError::BadRequest(format!("Product {} not found", product.id))
                    }
                    InventoryError::Insufficient => AppError::BadRequest(format!(
                        "Not enough inventory for product {}",
                        product.name
                    )),
                });
            }
        }
    }

    let order = state.store.create_order(
        user.user_id,
        NewOrder {
            status: OrderStatus::Pending,
            total_amount: total,
            shipping_address: payload.shipping_address,
        },
        order_items,
    );

    state.store.clear_cart(user.user_id);

    tracing::info!(
        order_id = order.id,
        user_id = user.user_id,
        total = %order.total_amount,
        "order placed"
    );

    Ok(ApiResponse::success(
        "Order placed",
        expand_order(state, order),
        Some(Meta::empty()),
    ))
}

pub fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = state.store.order(id).ok_or(AppError::NotFound)?;

    if state.config.strict_order_transitions
        && !existing.status.can_transition_to(payload.status)
    {
        return Err(AppError::BadRequest(format!(
            "Illegal status transition {} -> {}",
            existing.status, payload.status
        )));
    }

    let order = state
        .store
        .update_order_status(id, payload.status)
        .ok_or(AppError::NotFound)?;

    tracing::info!(order_id = order.id, status = %order.status, "order status updated");
    Ok(ApiResponse::success(
        "Order updated",
        order,
        Some(Meta::empty()),
    ))
}

fn rollback_decrements(state: &AppState, applied: &[(i64, i32)]) {
    for (product_id, quantity) in applied.iter().rev() {
        if let Err(err) = state.store.adjust_inventory(*product_id, *quantity) {
            // The product vanished between decrement and undo; nothing
            // left to restore.
            tracing::error!(product_id, error = %err, "failed to restore inventory");
        }
    }
}

fn expand_order(state: &AppState, order: Order) -> OrderWithItems {
    let items = state
        .store
        .order_items(order.id)
        .into_iter()
        .map(|item| {
            let product = state.store.product(item.product_id);
            OrderItemDetail { item, product }
        })
        .collect();
    OrderWithItems { order, items }
}
