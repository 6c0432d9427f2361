use airport_shared::{Airport, NewAirport, NewRoute, Route};
use airport_core::RouteView;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Router,
};

use crate::error::AppError;
use crate::extract::{Json, Query};
use crate::middleware::Claims;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airport", get(list_airports).post(create_airport))
        .route("/route", get(list_routes).post(create_route))
}

async fn list_airports(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Airport>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_airports(request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_airport(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewAirport>,
) -> Result<(StatusCode, Json<Airport>), AppError> {
    claims.require_admin()?;
    let airport = state.store.create_airport(&payload).await?;
    tracing::info!("Airport {} created: {}", airport.id, airport.full_name());
    Ok((StatusCode::CREATED, Json(airport)))
}

async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<RouteView>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_routes(request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewRoute>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    claims.require_admin()?;
    let route = state.store.create_route(&payload).await?;
    tracing::info!(
        "Route {} created: {} -> {} ({})",
        route.id, route.source, route.destination, route.distance
    );
    Ok((StatusCode::CREATED, Json(route)))
}
