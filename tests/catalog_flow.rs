mod common;

use common::{auth_admin, auth_user, seed_product, test_state};
use rust_decimal_macros::dec;
use shopsmart_api::{
    dto::{
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::AppError,
    routes::params::{Pagination, ProductQuery},
    services::{category_service, product_service},
};

fn product_query() -> ProductQuery {
    ProductQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        category_id: None,
        search: None,
        featured: None,
        sort_by: None,
        sort_order: None,
    }
}

#[tokio::test]
async fn product_mutations_are_admin_gated() {
    let state = test_state();
    let user = auth_user(1);
    let admin = auth_admin(2);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);

    let update = UpdateProductRequest {
        name: Some("Tampered".to_string()),
        description: None,
        price: None,
        image_url: None,
        category_id: None,
        inventory: None,
        featured: None,
    };

    let err = product_service::update_product(&state, &user, product.id, update).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(state.store.product(product.id).unwrap().name, "Widget");

    let err = product_service::delete_product(&state, &user, product.id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert!(state.store.product(product.id).is_some());

    let err = product_service::create_product(
        &state,
        &user,
        CreateProductRequest {
            name: "Another".to_string(),
            description: None,
            price: dec!(1.00),
            image_url: None,
            category_id: 1,
            inventory: 1,
            featured: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Admin succeeds.
    product_service::delete_product(&state, &admin, product.id).unwrap();
    assert!(state.store.product(product.id).is_none());
}

#[tokio::test]
async fn product_creation_validates_price_and_inventory() {
    let state = test_state();
    let admin = auth_admin(1);

    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Bad".to_string(),
            description: None,
            price: dec!(-1.00),
            image_url: None,
            category_id: 1,
            inventory: 1,
            featured: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Bad".to_string(),
            description: None,
            price: dec!(1.00),
            image_url: None,
            category_id: 1,
            inventory: -5,
            featured: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn partial_updates_merge_into_the_existing_product() {
    let state = test_state();
    let admin = auth_admin(1);
    let product = seed_product(&state, "Widget", dec!(10.00), 5);

    let updated = product_service::update_product(
        &state,
        &admin,
        product.id,
        UpdateProductRequest {
            name: None,
            description: None,
            price: Some(dec!(12.50)),
            image_url: None,
            category_id: None,
            inventory: None,
            featured: Some(true),
        },
    )
    .unwrap()
    .data
    .unwrap();

    assert_eq!(updated.name, "Widget");
    assert_eq!(updated.price, dec!(12.50));
    assert_eq!(updated.inventory, 5);
    assert!(updated.featured);
}

#[tokio::test]
async fn listing_filters_combine_and_paginate() {
    let state = test_state();
    let admin = auth_admin(1);
    for i in 0..3 {
        product_service::create_product(
            &state,
            &admin,
            CreateProductRequest {
                name: format!("Gadget {i}"),
                description: Some("a shiny gadget".to_string()),
                price: dec!(10.00),
                image_url: None,
                category_id: 1,
                inventory: 5,
                featured: i == 0,
            },
        )
        .unwrap();
    }
    seed_product(&state, "Other thing", dec!(3.00), 1);

    let mut query = product_query();
    query.search = Some("gadget".to_string());
    let found = product_service::list_products(&state, query)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(found.items.len(), 3);

    let mut query = product_query();
    query.search = Some("gadget".to_string());
    query.featured = Some(true);
    let found = product_service::list_products(&state, query)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].name, "Gadget 0");

    let mut query = product_query();
    query.pagination = Pagination {
        page: Some(2),
        per_page: Some(3),
    };
    let resp = product_service::list_products(&state, query).unwrap();
    let meta = resp.meta.unwrap();
    assert_eq!(meta.total, Some(4));
    assert_eq!(resp.data.unwrap().items.len(), 1);
}

#[tokio::test]
async fn featured_listing_caps_at_the_limit() {
    let state = test_state();
    let admin = auth_admin(1);
    for i in 0..3 {
        product_service::create_product(
            &state,
            &admin,
            CreateProductRequest {
                name: format!("Featured {i}"),
                description: None,
                price: dec!(1.00),
                image_url: None,
                category_id: 1,
                inventory: 1,
                featured: true,
            },
        )
        .unwrap();
    }

    let all = product_service::featured_products(&state, None)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(all.items.len(), 3);

    let capped = product_service::featured_products(&state, Some(2))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(capped.items.len(), 2);
}

#[tokio::test]
async fn category_creation_is_admin_gated_and_slugs_are_unique() {
    let state = test_state();
    let user = auth_user(1);
    let admin = auth_admin(2);

    let payload = || CreateCategoryRequest {
        name: "Garden".to_string(),
        slug: "garden".to_string(),
    };

    let err = category_service::create_category(&state, &user, payload()).unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    category_service::create_category(&state, &admin, payload()).unwrap();
    let err = category_service::create_category(&state, &admin, payload()).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let list = category_service::list_categories(&state).unwrap().data.unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].slug, "garden");
}
