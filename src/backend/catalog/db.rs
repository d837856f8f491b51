/**
 * PostgreSQL Catalog Store
 *
 * Runtime-checked sqlx queries against the tables created by the
 * migrations under `migrations/`. Order status is stored as text and parsed
 * on the way out.
 *
 * Timestamps are bound from the application clock rather than `NOW()`, so
 * `created_at` and the digest cutoff are read from the same clock.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::catalog::store::{CatalogStore, DigestSource, StoreError};
use crate::shared::catalog::{NewCategory, NewOrder, NewProduct, NewUser, ProductUpdate};
use crate::shared::{Category, Order, OrderStatus, Product, Recipient, User};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, category_id, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, product_id, quantity, status, created_at, updated_at";

/// Postgres foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i64,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::Decode(format!("Invalid order status: {}", e).into()))?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Catalog store backed by PostgreSQL
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a foreign key violation into `InvalidReference`
fn reference_error(e: sqlx::Error, entity: &'static str, id: Uuid) -> StoreError {
    let violated = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
    if violated {
        StoreError::InvalidReference { entity, id }
    } else {
        StoreError::Database(e)
    }
}

#[async_trait]
impl DigestSource for PgCatalogStore {
    async fn find_products_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE created_at > $1 AND created_at <= $2 ORDER BY created_at ASC",
            PRODUCT_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_all_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Recipient::from(&User::from(row)))
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY created_at ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Product::from)
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, name, description, price_cents, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.name.trim())
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.category_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error(e, "category", new.category_id.unwrap_or_default()))?;

        Ok(row.into())
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                category_id = COALESCE($5, category_id),
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.category_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| reference_error(e, "category", update.category_id.unwrap_or_default()))?;

        row.map(Product::from)
            .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn delete_product(&self, id: Uuid) -> Result<Product, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::from)
        .ok_or_else(|| StoreError::not_found("product", id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, created_at FROM categories ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_category(&self, id: Uuid) -> Result<Category, StoreError> {
        sqlx::query_as::<_, CategoryRow>(
            "DELETE FROM categories WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Category::from)
        .ok_or_else(|| StoreError::not_found("category", id))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY created_at ASC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (id, product_id, quantity, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.product_id)
        .bind(new.quantity)
        .bind(OrderStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| reference_error(e, "product", new.product_id))?;

        row.try_into()
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::not_found("order", id))?.try_into()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let email = new
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name.trim())
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
