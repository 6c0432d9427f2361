use airport_shared::{
    Airplane, AirplaneType, Airport, Crew, Id, NewAirplane, NewAirplaneType, NewAirport, NewCrew,
    NewFlight, NewRoute, NewTicket, Order, Route, Ticket, User,
};
use async_trait::async_trait;

use crate::page::{Page, PageRequest};
use crate::search::{FlightFilter, TicketFilter};
use crate::views::{
    AirplaneView, FlightDetail, FlightRecord, FlightSummary, OrderSummary, RouteView, TicketView,
};
use crate::StoreResult;

/// Airports and the routes between them.
#[async_trait]
pub trait NetworkRepository: Send + Sync {
    async fn create_airport(&self, airport: &NewAirport) -> StoreResult<Airport>;

    async fn list_airports(&self, page: PageRequest) -> StoreResult<Page<Airport>>;

    async fn create_route(&self, route: &NewRoute) -> StoreResult<Route>;

    async fn list_routes(&self, page: PageRequest) -> StoreResult<Page<RouteView>>;
}

/// Airplane types and airplanes.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    async fn create_airplane_type(&self, airplane_type: &NewAirplaneType)
        -> StoreResult<AirplaneType>;

    async fn list_airplane_types(&self, page: PageRequest) -> StoreResult<Page<AirplaneType>>;

    async fn create_airplane(&self, airplane: &NewAirplane) -> StoreResult<Airplane>;

    async fn list_airplanes(&self, page: PageRequest) -> StoreResult<Page<AirplaneView>>;
}

/// Crews, flights and seat availability.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn create_crew(&self, crew: &NewCrew) -> StoreResult<Crew>;

    async fn list_crews(&self, page: PageRequest) -> StoreResult<Page<Crew>>;

    async fn get_crew(&self, id: Id) -> StoreResult<Option<Crew>>;

    async fn create_flight(&self, flight: &NewFlight) -> StoreResult<FlightRecord>;

    /// Flights matching `filter`, ordered by id, each with `tickets_available`
    /// computed from the tickets visible at read time.
    async fn list_flights(
        &self,
        filter: &FlightFilter,
        page: PageRequest,
    ) -> StoreResult<Page<FlightSummary>>;

    async fn get_flight(&self, id: Id) -> StoreResult<Option<FlightDetail>>;

    /// The airplane operating `flight`, used to validate seat coordinates.
    async fn flight_airplane(&self, flight: Id) -> StoreResult<Option<Airplane>>;
}

/// Users, orders and tickets.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_or_create_user(&self, username: &str, is_staff: bool) -> StoreResult<User>;

    /// Persist one order owned by `user` and one ticket per request as a single
    /// atomic unit. Implementations re-validate every seat against its flight's
    /// airplane inside the unit and report a taken seat as
    /// [`StoreError::DuplicateSeat`](crate::StoreError::DuplicateSeat).
    async fn insert_order(&self, user: Id, tickets: &[NewTicket]) -> StoreResult<Order>;

    /// Add one ticket to an existing order, under the same rules as `insert_order`.
    async fn insert_ticket(&self, order: Id, ticket: &NewTicket) -> StoreResult<Ticket>;

    async fn list_orders(&self, user: Id, page: PageRequest) -> StoreResult<Page<OrderSummary>>;

    /// `None` when the order does not exist or belongs to another user.
    async fn get_order(&self, user: Id, id: Id) -> StoreResult<Option<Order>>;

    /// Returns `false` when nothing was deleted. Tickets go with the order.
    async fn delete_order(&self, user: Id, id: Id) -> StoreResult<bool>;

    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> StoreResult<Page<TicketView>>;

    async fn get_ticket(&self, id: Id) -> StoreResult<Option<TicketView>>;

    async fn delete_ticket(&self, id: Id) -> StoreResult<bool>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store: NetworkRepository + FleetRepository + FlightRepository + OrderRepository {}

impl<T> Store for T where T: NetworkRepository + FleetRepository + FlightRepository + OrderRepository {}
