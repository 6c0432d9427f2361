pub mod page;
pub mod repository;
pub mod search;
pub mod views;

use airport_catalog::ValidationError;
use airport_shared::Id;

pub use page::{Page, PageRequest};
pub use repository::{FleetRepository, FlightRepository, NetworkRepository, OrderRepository, Store};
pub use search::{FlightFilter, TicketFilter};
pub use views::{AirplaneView, FlightDetail, FlightRecord, FlightSummary, OrderSummary, RouteView, TicketView};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Seat row:{row} seat:{seat} is already taken on flight {flight}")]
    DuplicateSeat { flight: Id, row: i32, seat: i32 },

    #[error("{entity} with this {field} already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Invalid {field}: {entity} {id} does not exist")]
    InvalidReference {
        field: &'static str,
        entity: &'static str,
        id: Id,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
