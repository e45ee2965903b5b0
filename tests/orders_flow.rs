mod common;

use common::{auth_admin, auth_user, seed_product, test_state};
use rust_decimal_macros::dec;
use shopsmart_api::{
    dto::orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
    error::AppError,
    models::OrderStatus,
    services::order_service,
};

fn checkout_payload() -> PlaceOrderRequest {
    PlaceOrderRequest {
        shipping_address: "1 Main St, Springfield".to_string(),
        // The server recomputes lines from the live cart; this list only has
        // to be non-empty.
        items: vec![OrderLineRequest {
            product_id: 1,
            quantity: 1,
        }],
    }
}

#[tokio::test]
async fn checkout_decrements_inventory_and_clears_the_cart() {
    let state = test_state();
    let user = auth_user(1);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 2);

    let resp = order_service::place_order(&state, &user, checkout_payload()).unwrap();
    let placed = resp.data.unwrap();

    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.total_amount, dec!(20.00));
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].item.price, dec!(10.00));
    assert_eq!(placed.items[0].item.quantity, 2);

    assert_eq!(state.store.product(product.id).unwrap().inventory, 3);
    assert!(state.store.cart_items(user.user_id).is_empty());
}

#[tokio::test]
async fn checkout_with_one_short_line_mutates_nothing() {
    let state = test_state();
    let user = auth_user(1);
    let in_stock = seed_product(&state, "Plentiful", dec!(10.00), 5);
    let sold_out = seed_product(&state, "Sold Out", dec!(20.00), 0);
    state.store.add_to_cart(user.user_id, in_stock.id, 2);
    state.store.add_to_cart(user.user_id, sold_out.id, 1);

    let err = order_service::place_order(&state, &user, checkout_payload()).unwrap_err();
    match err {
        AppError::BadRequest(msg) => assert!(msg.contains("Sold Out"), "unexpected message: {msg}"),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // The sufficient line must not have been decremented.
    assert_eq!(state.store.product(in_stock.id).unwrap().inventory, 5);
    assert_eq!(state.store.product(sold_out.id).unwrap().inventory, 0);
    assert!(state.store.orders(Some(user.user_id)).is_empty());
    assert_eq!(state.store.cart_items(user.user_id).len(), 2);
}

#[tokio::test]
async fn checkout_fails_when_a_cart_product_was_deleted() {
    let state = test_state();
    let user = auth_user(1);
    let product = seed_product(&state, "Ephemeral", dec!(5.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 1);
    state.store.delete_product(product.id);

    let err = order_service::place_order(&state, &user, checkout_payload()).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(state.store.orders(Some(user.user_id)).is_empty());
}

#[tokio::test]
async fn checkout_requires_a_cart_and_a_shipping_address() {
    let state = test_state();
    let user = auth_user(1);

    let err = order_service::place_order(&state, &user, checkout_payload()).unwrap_err();
    match err {
        AppError::BadRequest(msg) => assert_eq!(msg, "Cart is empty"),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    let product = seed_product(&state, "Widget", dec!(10.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 1);

    let blank_address = PlaceOrderRequest {
        shipping_address: "   ".to_string(),
        items: checkout_payload().items,
    };
    let err = order_service::place_order(&state, &user, blank_address).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let no_items = PlaceOrderRequest {
        shipping_address: "1 Main St".to_string(),
        items: Vec::new(),
    };
    let err = order_service::place_order(&state, &user, no_items).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn order_item_price_is_frozen_at_purchase_time() {
    let state = test_state();
    let user = auth_user(1);
    let product = seed_product(&state, "Volatile", dec!(10.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 2);

    let placed = order_service::place_order(&state, &user, checkout_payload())
        .unwrap()
        .data
        .unwrap();

    state.store.update_product(
        product.id,
        shopsmart_api::store::ProductPatch {
            price: Some(dec!(99.00)),
            ..Default::default()
        },
    );

    let fetched = order_service::get_order(&state, &user, placed.order.id)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(fetched.items[0].item.price, dec!(10.00));
    assert_eq!(fetched.order.total_amount, dec!(20.00));
}

#[tokio::test]
async fn order_access_is_owner_or_admin_only() {
    let state = test_state();
    let owner = auth_user(1);
    let stranger = auth_user(2);
    let admin = auth_admin(3);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);
    state.store.add_to_cart(owner.user_id, product.id, 1);

    let placed = order_service::place_order(&state, &owner, checkout_payload())
        .unwrap()
        .data
        .unwrap();

    let err = order_service::get_order(&state, &stranger, placed.order.id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    assert!(order_service::get_order(&state, &owner, placed.order.id).is_ok());
    assert!(order_service::get_order(&state, &admin, placed.order.id).is_ok());
}

#[tokio::test]
async fn order_listing_scopes_to_the_caller_unless_admin() {
    let state = test_state();
    let alice = auth_user(1);
    let bob = auth_user(2);
    let admin = auth_admin(3);
    let product = seed_product(&state, "Widget", dec!(10.00), 50);

    for user in [&alice, &bob] {
        state.store.add_to_cart(user.user_id, product.id, 1);
        order_service::place_order(&state, user, checkout_payload()).unwrap();
    }

    let query = || shopsmart_api::routes::params::OrderListQuery {
        pagination: shopsmart_api::routes::params::Pagination {
            page: None,
            per_page: None,
        },
        status: None,
        sort_order: None,
    };

    let own = order_service::list_orders(&state, &alice, query())
        .unwrap()
        .data
        .unwrap();
    assert_eq!(own.items.len(), 1);
    assert_eq!(own.items[0].order.user_id, alice.user_id);

    let all = order_service::list_orders(&state, &admin, query())
        .unwrap()
        .data
        .unwrap();
    assert_eq!(all.items.len(), 2);
}

#[tokio::test]
async fn status_updates_are_admin_gated() {
    let state = test_state();
    let user = auth_user(1);
    let admin = auth_admin(2);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 1);
    let placed = order_service::place_order(&state, &user, checkout_payload())
        .unwrap()
        .data
        .unwrap();

    let err = order_service::update_order_status(
        &state,
        &user,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let updated = order_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn strict_mode_rejects_illegal_transitions() {
    let state = test_state_with_strict();
    let user = auth_user(1);
    let admin = auth_admin(2);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);
    state.store.add_to_cart(user.user_id, product.id, 1);
    let placed = order_service::place_order(&state, &user, checkout_payload())
        .unwrap()
        .data
        .unwrap();

    // pending -> shipped skips processing
    let err = order_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    for status in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        order_service::update_order_status(
            &state,
            &admin,
            placed.order.id,
            UpdateOrderStatusRequest { status },
        )
        .unwrap();
    }

    // delivered is terminal
    let err = order_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

fn test_state_with_strict() -> shopsmart_api::state::AppState {
    common::test_state_with(|config| config.strict_order_transitions = true)
}
