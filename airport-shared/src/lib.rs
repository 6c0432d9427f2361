pub mod labels;
pub mod models;

pub use models::booking::{NewTicket, Order, Ticket, User};
pub use models::fleet::{Airplane, AirplaneType, NewAirplane, NewAirplaneType};
pub use models::flight::{Crew, Flight, NewCrew, NewFlight};
pub use models::network::{Airport, NewAirport, NewRoute, Route};

/// Primary key type shared by every persisted entity.
pub type Id = i64;
