use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Id;

/// A principal known to the booking service. Created on first authenticated write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub is_staff: bool,
}

/// A claim on one seat of one flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: Id,
    pub row: i32,
    pub seat: i32,
    pub flight: Id,
    pub order: Id,
}

/// Requested seat, as submitted by a client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NewTicket {
    pub row: i32,
    pub seat: i32,
    pub flight: Id,
}

/// A group of tickets bought together. `created` is fixed at commit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: Id,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub user: Id,
    pub tickets: Vec<Ticket>,
}
