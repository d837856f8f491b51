/**
 * Catalog Store
 *
 * Persistence seam for the catalog. `CatalogStore` is what the REST handlers
 * use; `DigestSource` is the narrower read view the digest job consumes, so
 * the job never sees the mutating half of the store.
 *
 * `MemoryCatalogStore` backs the server when no database is configured and
 * is the store used throughout the tests.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::shared::catalog::{NewCategory, NewOrder, NewProduct, NewUser, ProductUpdate};
use crate::shared::{Category, Order, OrderStatus, Product, Recipient, User};

/// Catalog persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A foreign key points at a row that does not exist
    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Read access needed by the digest job
#[async_trait]
pub trait DigestSource: Send + Sync {
    /// Products with `from < created_at <= to`, oldest first
    async fn find_products_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Every user as a digest recipient, addressable or not
    async fn find_all_recipients(&self) -> Result<Vec<Recipient>, StoreError>;
}

#[async_trait]
pub trait CatalogStore: DigestSource {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError>;
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;
    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError>;
    /// Delete a product, returning the removed row
    async fn delete_product(&self, id: Uuid) -> Result<Product, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError>;
    async fn delete_category(&self, id: Uuid) -> Result<Category, StoreError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError>;
    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
}

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    orders: HashMap<Uuid, Order>,
    users: HashMap<Uuid, User>,
}

/// In-memory catalog
#[derive(Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed product, keeping its timestamps
    pub async fn insert_product(&self, product: Product) {
        self.tables.write().await.products.insert(product.id, product);
    }

    /// Insert a fully-formed user
    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }
}

fn sorted_by_creation<T: Clone>(rows: &HashMap<Uuid, T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.values().cloned().collect();
    rows.sort_by_key(|row| created_at(row));
    rows
}

#[async_trait]
impl DigestSource for MemoryCatalogStore {
    async fn find_products_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Product>, StoreError> {
        let tables = self.tables.read().await;
        let mut delta: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.created_at > from && p.created_at <= to)
            .cloned()
            .collect();
        delta.sort_by_key(|p| p.created_at);
        Ok(delta)
    }

    async fn find_all_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_creation(&tables.users, |u| u.created_at)
            .iter()
            .map(Recipient::from)
            .collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(sorted_by_creation(&self.tables.read().await.products, |p| p.created_at))
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        self.tables
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(category_id) = new.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(StoreError::InvalidReference { entity: "category", id: category_id });
            }
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            description: new.description,
            price_cents: new.price_cents,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(category_id) = update.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(StoreError::InvalidReference { entity: "category", id: category_id });
            }
        }

        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        update.apply(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        // Matches ON DELETE CASCADE on orders.product_id
        tables.orders.retain(|_, order| order.product_id != id);
        Ok(product)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(sorted_by_creation(&self.tables.read().await.categories, |c| c.created_at))
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let category = Category {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("category", id))?;
        // Matches ON DELETE SET NULL on products.category_id
        for product in tables.products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(category)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(sorted_by_creation(&self.tables.read().await.orders, |o| o.created_at))
    }

    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&new.product_id) {
            return Err(StoreError::InvalidReference { entity: "product", id: new.product_id });
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            product_id: new.product_id,
            quantity: new.quantity,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(sorted_by_creation(&self.tables.read().await.users, |u| u.created_at))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let email = new
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let user = User {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            email,
            created_at: Utc::now(),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        Ok(user)
    }
}
