/**
 * API Route Configuration
 *
 * # Catalog
 *
 * - `GET/POST /api/products`, `PUT/DELETE /api/products/{id}`
 * - `GET/POST /api/categories`, `DELETE /api/categories/{id}`
 * - `GET/POST /api/orders`, `PUT /api/orders/{id}/status`
 * - `GET/POST /api/users`
 *
 * Every mutation notifies the matching channel after the store write.
 */

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::backend::catalog::handlers::{
    create_category, create_order, create_product, create_user, delete_category, delete_product,
    list_categories, list_orders, list_products, list_users, update_order_status, update_product,
};
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", put(update_product).delete(delete_product))
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/{id}", delete(delete_category))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route("/api/users", get(list_users).post(create_user))
}
