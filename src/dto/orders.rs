use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, OrderStatus, Product};

/// Checkout payload. The items list is accepted for API compatibility but
/// the server always recomputes lines from the live cart, so tampered
/// prices or quantities in the body have no effect.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub shipping_address: String,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
