use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::models::{CartItem, Category, Order, OrderItem, OrderStatus, Product, User};

use super::{
    InventoryError, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, ProductFilter,
    ProductPatch, Store, UserPatch,
};

/// In-memory repository. All state lives behind a single `RwLock`, so each
/// trait method is atomic; nothing survives a process restart.
///
/// `BTreeMap` keeps iteration in id order, which doubles as insertion order
/// since ids are assigned sequentially.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    cart_items: BTreeMap<i64, CartItem>,

    next_user_id: i64,
    next_category_id: i64,
    next_product_id: i64,
    next_order_id: i64,
    next_order_item_id: i64,
    next_cart_item_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn user(&self, id: i64) -> Option<User> {
        self.inner.read().users.get(&id).cloned()
    }

    fn user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.read();
        inner.users.values().find(|u| u.username == username).cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read();
        inner.users.values().find(|u| u.email == email).cloned()
    }

    fn create_user(&self, new: NewUser) -> User {
        let mut inner = self.inner.write();
        let id = next_id(&mut inner.next_user_id);
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            is_admin: new.is_admin,
            address: None,
            phone: None,
        };
        inner.users.insert(id, user.clone());
        user
    }

    fn update_user(&self, id: i64, patch: UserPatch) -> Option<User> {
        let mut inner = self.inner.write();
        let user = inner.users.get_mut(&id)?;
        if let Some(name) = patch.name {
            user.name = Some(name);
        }
        if let Some(address) = patch.address {
            user.address = Some(address);
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        Some(user.clone())
    }

    fn categories(&self) -> Vec<Category> {
        self.inner.read().categories.values().cloned().collect()
    }

    fn category_by_slug(&self, slug: &str) -> Option<Category> {
        let inner = self.inner.read();
        inner.categories.values().find(|c| c.slug == slug).cloned()
    }

    fn create_category(&self, new: NewCategory) -> Category {
        let mut inner = self.inner.write();
        let id = next_id(&mut inner.next_category_id);
        let category = Category {
            id,
            name: new.name,
            slug: new.slug,
        };
        inner.categories.insert(id, category.clone());
        category
    }

    fn products(&self, filter: &ProductFilter) -> Vec<Product> {
        let inner = self.inner.read();
        inner
            .products
            .values()
            .filter(|p| {
                if let Some(category_id) = filter.category_id {
                    if p.category_id != category_id {
                        return false;
                    }
                }
                if let Some(search) = filter.search.as_deref() {
                    let term = search.to_lowercase();
                    let in_name = p.name.to_lowercase().contains(&term);
                    let in_description = p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term));
                    if !in_name && !in_description {
                        return false;
                    }
                }
                if let Some(featured) = filter.featured {
                    if p.featured != featured {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }

    fn product(&self, id: i64) -> Option<Product> {
        self.inner.read().products.get(&id).cloned()
    }

    fn featured_products(&self, limit: Option<usize>) -> Vec<Product> {
        let inner = self.inner.read();
        let featured = inner.products.values().filter(|p| p.featured).cloned();
        match limit {
            Some(limit) => featured.take(limit).collect(),
            None => featured.collect(),
        }
    }

    fn create_product(&self, new: NewProduct) -> Product {
        let mut inner = self.inner.write();
        let id = next_id(&mut inner.next_product_id);
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            image_url: new.image_url,
            category_id: new.category_id,
            inventory: new.inventory,
            featured: new.featured,
            created_at: Utc::now(),
        };
        inner.products.insert(id, product.clone());
        product
    }

    fn update_product(&self, id: i64, patch: ProductPatch) -> Option<Product> {
        let mut inner = self.inner.write();
        let product = inner.products.get_mut(&id)?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(category_id) = patch.category_id {
            product.category_id = category_id;
        }
        if let Some(inventory) = patch.inventory {
            product.inventory = inventory;
        }
        if let Some(featured) = patch.featured {
            product.featured = featured;
        }
        Some(product.clone())
    }

    fn delete_product(&self, id: i64) -> bool {
        self.inner.write().products.remove(&id).is_some()
    }

    fn adjust_inventory(&self, product_id: i64, delta: i32) -> Result<Product, InventoryError> {
        let mut inner = self.inner.write();
        let product = inner
            .products
            .get_mut(&product_id)
            .ok_or(InventoryError::NotFound)?;
        let adjusted = product.inventory + delta;
        if adjusted < 0 {
            return Err(InventoryError::Insufficient);
        }
        product.inventory = adjusted;
        Ok(product.clone())
    }

    fn orders(&self, user_id: Option<i64>) -> Vec<Order> {
        let inner = self.inner.read();
        inner
            .orders
            .values()
            .filter(|o| user_id.is_none_or(|uid| o.user_id == uid))
            .cloned()
            .collect()
    }

    fn order(&self, id: i64) -> Option<Order> {
        self.inner.read().orders.get(&id).cloned()
    }

    fn create_order(&self, user_id: i64, new: NewOrder, items: Vec<NewOrderItem>) -> Order {
        let mut inner = self.inner.write();
        let id = next_id(&mut inner.next_order_id);
        let order = Order {
            id,
            user_id,
            status: new.status,
            total_amount: new.total_amount,
            shipping_address: new.shipping_address,
            created_at: Utc::now(),
        };
        inner.orders.insert(id, order.clone());

        for item in items {
            let item_id = next_id(&mut inner.next_order_item_id);
            inner.order_items.insert(
                item_id,
                OrderItem {
                    id: item_id,
                    order_id: id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                },
            );
        }

        order
    }

    fn update_order_status(&self, id: i64, status: OrderStatus) -> Option<Order> {
        let mut inner = self.inner.write();
        let order = inner.orders.get_mut(&id)?;
        order.status = status;
        Some(order.clone())
    }

    fn order_items(&self, order_id: i64) -> Vec<OrderItem> {
        let inner = self.inner.read();
        inner
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn cart_items(&self, user_id: i64) -> Vec<CartItem> {
        let inner = self.inner.read();
        inner
            .cart_items
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect()
    }

    fn cart_item(&self, user_id: i64, product_id: i64) -> Option<CartItem> {
        let inner = self.inner.read();
        inner
            .cart_items
            .values()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
            .cloned()
    }

    fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i32) -> CartItem {
        let mut inner = self.inner.write();
        let existing = inner
            .cart_items
            .values_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id);
        if let Some(item) = existing {
            item.quantity += quantity;
            return item.clone();
        }

        let id = next_id(&mut inner.next_cart_item_id);
        let item = CartItem {
            id,
            user_id,
            product_id,
            quantity,
        };
        inner.cart_items.insert(id, item.clone());
        item
    }

    fn update_cart_item(&self, user_id: i64, product_id: i64, quantity: i32) -> Option<CartItem> {
        let mut inner = self.inner.write();
        let item = inner
            .cart_items
            .values_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)?;
        item.quantity = quantity;
        Some(item.clone())
    }

    fn remove_from_cart(&self, user_id: i64, product_id: i64) -> bool {
        let mut inner = self.inner.write();
        let id = inner
            .cart_items
            .values()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
            .map(|i| i.id);
        match id {
            Some(id) => inner.cart_items.remove(&id).is_some(),
            None => false,
        }
    }

    fn clear_cart(&self, user_id: i64) -> bool {
        let mut inner = self.inner.write();
        let ids: Vec<i64> = inner
            .cart_items
            .values()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.id)
            .collect();
        for id in ids {
            inner.cart_items.remove(&id);
        }
        true
    }
}
