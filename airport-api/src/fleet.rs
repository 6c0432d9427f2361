use airport_core::AirplaneView;
use airport_shared::{Airplane, AirplaneType, NewAirplane, NewAirplaneType};
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::extract::{Json, Query};
use crate::middleware::Claims;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AirplaneResponse {
    #[serde(flatten)]
    pub airplane: Airplane,
    pub capacity: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airplane_type", get(list_airplane_types).post(create_airplane_type))
        .route("/airplane", get(list_airplanes).post(create_airplane))
}

async fn list_airplane_types(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<AirplaneType>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_airplane_types(request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_airplane_type(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewAirplaneType>,
) -> Result<(StatusCode, Json<AirplaneType>), AppError> {
    claims.require_admin()?;
    let airplane_type = state.store.create_airplane_type(&payload).await?;
    Ok((StatusCode::CREATED, Json(airplane_type)))
}

async fn list_airplanes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<AirplaneView>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_airplanes(request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_airplane(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewAirplane>,
) -> Result<(StatusCode, Json<AirplaneResponse>), AppError> {
    claims.require_admin()?;
    let airplane = state.store.create_airplane(&payload).await?;
    tracing::info!(
        "Airplane {} created with {} seats",
        airplane.name,
        airplane.capacity()
    );
    Ok((
        StatusCode::CREATED,
        Json(AirplaneResponse {
            capacity: airplane.capacity(),
            airplane,
        }),
    ))
}
