pub mod errors;
pub mod fleet;
pub mod inventory;
pub mod network;
pub mod schedule;

pub use errors::{FieldErrors, ValidationError};
pub use fleet::{validate_airplane, validate_airplane_type};
pub use inventory::{validate_ticket, SeatGrid};
pub use network::{validate_airport, validate_route};
pub use schedule::validate_flight;
