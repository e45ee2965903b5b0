use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserResponse},
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        categories::{CategoryList, CreateCategoryRequest},
        orders::{
            OrderItemDetail, OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{CartItem, Category, Order, OrderItem, OrderStatus, Product, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        categories::list_categories,
        categories::create_category,
        products::list_products,
        products::featured_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::get_order,
        orders::place_order,
        orders::update_order_status,
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            CartItem,
            Order,
            OrderItem,
            OrderStatus,
            UserResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            CreateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            PlaceOrderRequest,
            OrderLineRequest,
            UpdateOrderStatusRequest,
            OrderItemDetail,
            OrderWithItems,
            OrderList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
