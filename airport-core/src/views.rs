//! Read projections: entities joined with the labels of what they reference.

use airport_shared::{Flight, Id};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteView {
    pub id: Id,
    pub source: String,
    pub destination: String,
    pub distance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirplaneView {
    pub id: Id,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: String,
    pub capacity: i64,
}

/// A flight as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightSummary {
    pub id: Id,
    pub route: String,
    pub airplane: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crews: Vec<String>,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightDetail {
    #[serde(flatten)]
    pub summary: FlightSummary,
    /// `"row:R seat:S"` for every issued ticket, ordered by row then seat.
    pub taken_places: Vec<String>,
}

/// A freshly written flight, by id, with its current availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightRecord {
    #[serde(flatten)]
    pub flight: Flight,
    pub tickets_available: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
    pub id: Id,
    pub row: i32,
    pub seat: i32,
    pub flight: String,
    pub order: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: Id,
    pub created: DateTime<Utc>,
    pub user: String,
    pub tickets: Vec<String>,
}
