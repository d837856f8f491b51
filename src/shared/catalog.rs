/**
 * Catalog Entities
 *
 * Products, categories, orders and users, plus the request bodies used to
 * create or change them. Every entity serializes to the snapshot carried in
 * the `data` field of a change event.
 *
 * Prices are stored as integer cents.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::event::Entity;

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const ENTITY_TYPE: &'static str = "product";
}

/// Request body for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_name("name", &self.name)?;
        validate_price(self.price_cents)
    }
}

/// Request body for a partial product update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(price) = self.price_cents {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Apply the present fields onto a product
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = Some(category_id);
        }
        product.updated_at = Utc::now();
    }
}

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Category {
    const ENTITY_TYPE: &'static str = "category";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_name("name", &self.name)
    }
}

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(SharedError::validation(
                "status",
                format!("Unknown order status '{}'", other),
            )),
        }
    }
}

/// A customer order for a single product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Order {
    const ENTITY_TYPE: &'static str = "order";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.quantity <= 0 {
            return Err(SharedError::validation("quantity", "Quantity must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The part of a user broadcast to subscribers; the email stays private
#[derive(Serialize)]
struct PublicUser<'a> {
    id: Uuid,
    name: &'a str,
    created_at: DateTime<Utc>,
}

impl Entity for User {
    const ENTITY_TYPE: &'static str = "user";

    fn public_fields(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(PublicUser {
            id: self.id,
            name: &self.name,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_name("name", &self.name)?;
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() && !email.contains('@') => Err(
                SharedError::validation("email", "Email address must contain '@'"),
            ),
            _ => Ok(()),
        }
    }
}

/// Digest recipient
///
/// The address may be missing or blank; such recipients are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

impl Recipient {
    /// The trimmed address, if present and non-blank
    pub fn deliverable_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            address: user.email.clone(),
        }
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, "Name cannot be blank"));
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> Result<(), SharedError> {
    if price_cents < 0 {
        return Err(SharedError::validation("price_cents", "Price cannot be negative"));
    }
    Ok(())
}
