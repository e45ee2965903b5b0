use std::sync::Arc;

use rust_decimal::Decimal;
use shopsmart_api::{
    config::AppConfig,
    middleware::auth::AuthUser,
    models::Product,
    state::AppState,
    store::{MemStore, NewProduct},
};

pub fn test_state() -> AppState {
    test_state_with(|_| {})
}

pub fn test_state_with(tweak: impl FnOnce(&mut AppConfig)) -> AppState {
    let mut config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        strict_order_transitions: false,
    };
    tweak(&mut config);
    AppState::new(Arc::new(MemStore::new()), config)
}

pub fn auth_user(user_id: i64) -> AuthUser {
    AuthUser {
        user_id,
        role: "user".to_string(),
    }
}

pub fn auth_admin(user_id: i64) -> AuthUser {
    AuthUser {
        user_id,
        role: "admin".to_string(),
    }
}

pub fn seed_product(state: &AppState, name: &str, price: Decimal, inventory: i32) -> Product {
    state.store.create_product(NewProduct {
        name: name.to_string(),
        description: Some(format!("{name} for testing")),
        price,
        image_url: None,
        category_id: 1,
        inventory,
        featured: false,
    })
}
