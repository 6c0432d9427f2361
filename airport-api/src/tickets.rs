use airport_core::{TicketFilter, TicketView};
use airport_order::{CreateTicketRequest, OrderManager};
use airport_shared::{Id, Ticket};
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::Claims;
use crate::pagination::{PageQuery, Paginated};
use crate::state::AppState;

/// Raw ticket filters; `airplane` is a comma-separated id list.
#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub airplane: Option<String>,
    pub source_city: Option<String>,
    pub destination_city: Option<String>,
}

impl TicketQuery {
    pub fn into_filter(self) -> Result<TicketFilter, AppError> {
        let airplanes = self
            .airplane
            .map(|ids| {
                ids.split(',')
                    .map(|id| id.trim().parse::<Id>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| {
                        AppError::bad_request(format!("airplane must be a list of ids, got {:?}", ids))
                    })
            })
            .transpose()?;

        Ok(TicketFilter {
            airplanes,
            source_city: self.source_city,
            destination_city: self.destination_city,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ticket", get(list_tickets).post(create_ticket))
        .route("/ticket/{id}", get(get_ticket).delete(delete_ticket))
}

async fn list_tickets(
    State(state): State<AppState>,
    Query(filter): Query<TicketQuery>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<TicketView>>, AppError> {
    let filter = filter.into_filter()?;
    let request = query.request(&state.pagination);
    let page = state.store.list_tickets(&filter, request).await?;
    Ok(Json(Paginated::new(page, &request)))
}

/// Issue one more ticket into an order the caller owns.
async fn create_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let user = state.current_user(&claims).await?;
    let ticket = OrderManager::new(state.store.as_ref())
        .issue_ticket(&user, payload.order, &payload.seat())
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<TicketView>, AppError> {
    state
        .store
        .get_ticket(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("ticket {} not found", id)))
}

async fn delete_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Id>,
) -> Result<StatusCode, AppError> {
    claims.require_admin()?;
    if state.store.delete_ticket(id).await? {
        tracing::info!("Ticket {} deleted by {}", id, claims.sub);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("ticket {} not found", id)))
    }
}
