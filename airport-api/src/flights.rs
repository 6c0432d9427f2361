use airport_core::{FlightDetail, FlightFilter, FlightRecord, FlightSummary};
use airport_shared::{Crew, Id, NewCrew, NewFlight};
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
        .route("/crew", get(list_crews).post(create_crew))
        .route("/crew/{id}", get(get_crew))
        .route("/flight", get(list_flights).post(create_flight))
        .route("/flight/{id}", get(get_flight))
}

async fn list_crews(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Crew>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_crews(request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_crew(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewCrew>,
) -> Result<(StatusCode, Json<Crew>), AppError> {
    claims.require_admin()?;
    let crew = state.store.create_crew(&payload).await?;
    Ok((StatusCode::CREATED, Json(crew)))
}

async fn get_crew(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Crew>, AppError> {
    state
        .store
        .get_crew(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("crew {} not found", id)))
}

/// `GET /flight?departure_date=YYYY-MM-DD&source_city=...`
async fn list_flights(
    State(state): State<AppState>,
    Query(filter): Query<FlightFilter>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FlightSummary>>, AppError> {
    let request = query.request(&state.pagination);
    let page = state.store.list_flights(&filter, request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

async fn create_flight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewFlight>,
) -> Result<(StatusCode, Json<FlightRecord>), AppError> {
    claims.require_admin()?;
    let record = state.store.create_flight(&payload).await?;
    tracing::info!(
        "Flight {} scheduled on route {} with {} seats",
        record.flight.id,
        record.flight.route,
        record.tickets_available
    );
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<FlightDetail>, AppError> {
    state
        .store
        .get_flight(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("flight {} not found", id)))
}
