use airport_core::OrderSummary;
use airport_order::{CreateOrderRequest, OrderManager};
use airport_shared::{Id, Order};
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Router,
};

use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::Claims;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", get(list_orders).post(create_order))
        .route("/order/{id}", get(get_order).delete(delete_order))
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<OrderSummary>>, AppError> {
    let user = state.current_user(&claims).await?;
    let request = query.request(&state.pagination);
    let page = OrderManager::new(state.store.as_ref())
        .list_orders(&user, request)
        .await?;
    Ok(Json(Paginated::new(page, &request)))
}

/// `POST /order` with `{"tickets": [{"row", "seat", "flight"}, ...]}`.
/// All tickets are written or none are.
async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let user = state.current_user(&claims).await?;
    let order = OrderManager::new(state.store.as_ref())
        .create_order(&user, &payload.tickets)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Id>,
) -> Result<Json<Order>, AppError> {
    let user = state.current_user(&claims).await?;
    let order = OrderManager::new(state.store.as_ref())
        .get_order(&user, id)
        .await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Id>,
) -> Result<StatusCode, AppError> {
    let user = state.current_user(&claims).await?;
    OrderManager::new(state.store.as_ref())
        .delete_order(&user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
