use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CartItem, Category, Order, OrderItem, OrderStatus, Product, User};

pub mod memory;

pub use memory::MemStore;

/// Optional product listing filters; combined with logical AND.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    /// Case-insensitive substring match over name and description.
    pub search: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

/// Profile fields a user may change after registration. `None` leaves the
/// existing value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub inventory: i32,
    pub featured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub inventory: Option<i32>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("product not found")]
    NotFound,
    #[error("insufficient inventory")]
    Insufficient,
}

/// Sole gateway to persisted entities. Every method is atomic with respect
/// to the backing state; business logic composes them and never touches the
/// collections directly.
pub trait Store: Send + Sync {
    // Users
    fn user(&self, id: i64) -> Option<User>;
    fn user_by_username(&self, username: &str) -> Option<User>;
    fn user_by_email(&self, email: &str) -> Option<User>;
    fn create_user(&self, new: NewUser) -> User;
    fn update_user(&self, id: i64, patch: UserPatch) -> Option<User>;

    // Categories
    fn categories(&self) -> Vec<Category>;
    fn category_by_slug(&self, slug: &str) -> Option<Category>;
    fn create_category(&self, new: NewCategory) -> Category;

    // Products
    fn products(&self, filter: &ProductFilter) -> Vec<Product>;
    fn product(&self, id: i64) -> Option<Product>;
    fn featured_products(&self, limit: Option<usize>) -> Vec<Product>;
    fn create_product(&self, new: NewProduct) -> Product;
    fn update_product(&self, id: i64, patch: ProductPatch) -> Option<Product>;
    fn delete_product(&self, id: i64) -> bool;
    /// Conditional stock adjustment: applies `delta` only if the product
    /// exists and the resulting inventory stays non-negative. The check and
    /// the write happen under one lock, so concurrent checkouts cannot
    /// jointly oversell.
    fn adjust_inventory(&self, product_id: i64, delta: i32) -> Result<Product, InventoryError>;

    // Orders
    fn orders(&self, user_id: Option<i64>) -> Vec<Order>;
    fn order(&self, id: i64) -> Option<Order>;
    /// Creates the order and its line items in one atomic step.
    fn create_order(&self, user_id: i64, new: NewOrder, items: Vec<NewOrderItem>) -> Order;
    fn update_order_status(&self, id: i64, status: OrderStatus) -> Option<Order>;
    fn order_items(&self, order_id: i64) -> Vec<OrderItem>;

    // Cart, keyed by (user, product)
    fn cart_items(&self, user_id: i64) -> Vec<CartItem>;
    fn cart_item(&self, user_id: i64, product_id: i64) -> Option<CartItem>;
    /// Upsert-by-increment: an existing row's quantity grows by `quantity`,
    /// otherwise a new row is inserted.
    fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i32) -> CartItem;
    /// Absolute set; returns `None` when no row exists for the pair.
    fn update_cart_item(&self, user_id: i64, product_id: i64, quantity: i32) -> Option<CartItem>;
    fn remove_from_cart(&self, user_id: i64, product_id: i64) -> bool;
    fn clear_cart(&self, user_id: i64) -> bool;
}
