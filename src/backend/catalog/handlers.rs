/**
 * Catalog HTTP Handlers
 *
 * Every mutating handler follows the same order: validate the body, write
 * through the store, then notify the entity's channel. The notification
 * happens after the write has succeeded and cannot change the response.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::catalog::{NewCategory, NewOrder, NewProduct, NewUser, OrderStatusUpdate, ProductUpdate};
use crate::shared::{Category, OperationKind, Order, Product, User};

pub const PRODUCTS_CHANNEL: &str = "products";
pub const CATEGORIES_CHANNEL: &str = "categories";
pub const ORDERS_CHANNEL: &str = "orders";
pub const USERS_CHANNEL: &str = "users";

/// List products (GET /api/products)
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, BackendError> {
    Ok(Json(state.store.list_products().await?))
}

/// Create a product (POST /api/products)
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), BackendError> {
    body.validate()?;
    let product = state.store.create_product(body).await?;
    tracing::info!("[Catalog] Created product {} ({})", product.id, product.name);

    state.notifier.notify(PRODUCTS_CHANNEL, OperationKind::Create, &product);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (PUT /api/products/{id})
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>, BackendError> {
    body.validate()?;
    let product = state.store.update_product(id, body).await?;
    tracing::info!("[Catalog] Updated product {}", product.id);

    state.notifier.notify(PRODUCTS_CHANNEL, OperationKind::Update, &product);
    Ok(Json(product))
}

/// Delete a product (DELETE /api/products/{id})
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let product = state.store.delete_product(id).await?;
    tracing::info!("[Catalog] Deleted product {}", product.id);

    state.notifier.notify(PRODUCTS_CHANNEL, OperationKind::Delete, &product);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, BackendError> {
    Ok(Json(state.store.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), BackendError> {
    body.validate()?;
    let category = state.store.create_category(body).await?;
    tracing::info!("[Catalog] Created category {} ({})", category.id, category.name);

    state.notifier.notify(CATEGORIES_CHANNEL, OperationKind::Create, &category);
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let category = state.store.delete_category(id).await?;
    tracing::info!("[Catalog] Deleted category {}", category.id);

    state.notifier.notify(CATEGORIES_CHANNEL, OperationKind::Delete, &category);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, BackendError> {
    Ok(Json(state.store.list_orders().await?))
}

/// Place an order (POST /api/orders)
///
/// New orders always start as `pending`.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), BackendError> {
    body.validate()?;
    let order = state.store.create_order(body).await?;
    tracing::info!("[Catalog] Created order {} for product {}", order.id, order.product_id);

    state.notifier.notify(ORDERS_CHANNEL, OperationKind::Create, &order);
    Ok((StatusCode::CREATED, Json(order)))
}

/// Change an order's status (PUT /api/orders/{id}/status)
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderStatusUpdate>,
) -> Result<Json<Order>, BackendError> {
    let order = state.store.update_order_status(id, body.status).await?;
    tracing::info!("[Catalog] Order {} is now {}", order.id, order.status.as_str());

    state.notifier.notify(ORDERS_CHANNEL, OperationKind::Update, &order);
    Ok(Json(order))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, BackendError> {
    Ok(Json(state.store.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), BackendError> {
    body.validate()?;
    let user = state.store.create_user(body).await?;
    tracing::info!("[Catalog] Registered user {}", user.id);

    state.notifier.notify(USERS_CHANNEL, OperationKind::Create, &user);
    Ok((StatusCode::CREATED, Json(user)))
}
