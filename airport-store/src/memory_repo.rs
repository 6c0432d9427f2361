//! In-process store used when no database is configured, and by tests.
//!
//! Every write takes the single table lock and runs all of its checks before
//! touching any table, so a rejected write leaves no trace.

use std::collections::{BTreeMap, HashMap, HashSet};

use airport_catalog::{validate_ticket, SeatGrid};
use airport_core::{
    AirplaneView, FleetRepository, FlightDetail, FlightFilter, FlightRecord, FlightRepository,
    FlightSummary, NetworkRepository, OrderRepository, OrderSummary, Page, PageRequest, RouteView,
    StoreError, StoreResult, TicketFilter, TicketView,
};
use airport_shared::{
    labels, Airplane, AirplaneType, Airport, Crew, Flight, Id, NewAirplane, NewAirplaneType,
    NewAirport, NewCrew, NewFlight, NewRoute, NewTicket, Order, Route, Ticket, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Rows keyed by id, ids handed out in increasing order and never reused.
struct Table<T> {
    rows: BTreeMap<Id, T>,
    last_id: Id,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert(&mut self, make: impl FnOnce(Id) -> T) -> T {
        self.last_id += 1;
        let row = make(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: Id) -> Option<&T> {
        self.rows.get(&id)
    }

    fn contains(&self, id: Id) -> bool {
        self.rows.contains_key(&id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

#[derive(Clone)]
struct OrderRow {
    id: Id,
    created: DateTime<Utc>,
    user: Id,
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    airports: Table<Airport>,
    routes: Table<Route>,
    airplane_types: Table<AirplaneType>,
    airplanes: Table<Airplane>,
    crews: Table<Crew>,
    flights: Table<Flight>,
    orders: Table<OrderRow>,
    tickets: Table<Ticket>,
    /// `(flight, row, seat) -> ticket`; the uniqueness index for seats.
    seats: HashMap<(Id, i32, i32), Id>,
}

impl Tables {
    fn airport_label(&self, id: Id) -> String {
        self.airports
            .get(id)
            .map(Airport::full_name)
            .unwrap_or_default()
    }

    fn route_cities(&self, route: &Route) -> (String, String) {
        let city = |id| {
            self.airports
                .get(id)
                .map(|a| a.closest_big_city.clone())
                .unwrap_or_default()
        };
        (city(route.source), city(route.destination))
    }

    fn route_label(&self, route: &Route) -> String {
        labels::route(
            &self.airport_label(route.source),
            &self.airport_label(route.destination),
        )
    }

    fn airplane_name(&self, id: Id) -> String {
        self.airplanes
            .get(id)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }

    fn flight_label(&self, flight: &Flight) -> String {
        let route = self
            .routes
            .get(flight.route)
            .map(|r| self.route_label(r))
            .unwrap_or_default();
        labels::flight(&route, &self.airplane_name(flight.airplane))
    }

    fn order_label(&self, order: &OrderRow) -> String {
        let username = self
            .users
            .get(order.user)
            .map(|u| u.username.as_str())
            .unwrap_or_default();
        labels::order(username, &order.created)
    }

    fn tickets_available(&self, flight: &Flight) -> i64 {
        let taken = self.seats.keys().filter(|(f, _, _)| *f == flight.id).count() as i64;
        self.airplanes
            .get(flight.airplane)
            .map(|a| SeatGrid::from(a).available(taken))
            .unwrap_or_default()
    }

    fn flight_summary(&self, flight: &Flight) -> FlightSummary {
        let route = self
            .routes
            .get(flight.route)
            .map(|r| self.route_label(r))
            .unwrap_or_default();
        FlightSummary {
            id: flight.id,
            route,
            airplane: self.airplane_name(flight.airplane),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crews: flight
                .crews
                .iter()
                .filter_map(|id| self.crews.get(*id))
                .map(Crew::full_name)
                .collect(),
            tickets_available: self.tickets_available(flight),
        }
    }

    fn ticket_view(&self, ticket: &Ticket) -> TicketView {
        TicketView {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            flight: self
                .flights
                .get(ticket.flight)
                .map(|f| self.flight_label(f))
                .unwrap_or_default(),
            order: self
                .orders
                .get(ticket.order)
                .map(|o| self.order_label(o))
                .unwrap_or_default(),
        }
    }

    fn ticket_label(&self, ticket: &Ticket) -> String {
        let view = self.ticket_view(ticket);
        labels::ticket(&view.flight, &view.order, view.row, view.seat)
    }

    /// Run every check `tickets` must pass before any of them is written.
    fn check_seats(&self, tickets: &[NewTicket]) -> StoreResult<()> {
        let mut requested = HashSet::with_capacity(tickets.len());
        for ticket in tickets {
            let flight = self
                .flights
                .get(ticket.flight)
                .ok_or_else(|| StoreError::not_found("flight", ticket.flight))?;
            let airplane = self
                .airplanes
                .get(flight.airplane)
                .ok_or_else(|| StoreError::not_found("airplane", flight.airplane))?;
            validate_ticket(ticket.row, ticket.seat, airplane)?;

            let key = (ticket.flight, ticket.row, ticket.seat);
            if self.seats.contains_key(&key) || !requested.insert(key) {
                return Err(StoreError::DuplicateSeat {
                    flight: ticket.flight,
                    row: ticket.row,
                    seat: ticket.seat,
                });
            }
        }
        Ok(())
    }

    fn issue(&mut self, order: Id, ticket: &NewTicket) -> Ticket {
        let issued = self.tickets.insert(|id| Ticket {
            id,
            row: ticket.row,
            seat: ticket.seat,
            flight: ticket.flight,
            order,
        });
        self.seats
            .insert((issued.flight, issued.row, issued.seat), issued.id);
        issued
    }

    fn remove_ticket(&mut self, id: Id) -> bool {
        match self.tickets.rows.remove(&id) {
            Some(ticket) => {
                self.seats.remove(&(ticket.flight, ticket.row, ticket.seat));
                true
            }
            None => false,
        }
    }

    fn order_tickets(&self, order: Id) -> Vec<Ticket> {
        self.tickets
            .values()
            .filter(|t| t.order == order)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NetworkRepository for MemoryStore {
    async fn create_airport(&self, airport: &NewAirport) -> StoreResult<Airport> {
        airport_catalog::validate_airport(airport)?;

        let mut tables = self.tables.write().await;
        if tables.airports.values().any(|a| a.name == airport.name) {
            return Err(StoreError::Conflict {
                entity: "airport",
                field: "name",
            });
        }
        Ok(tables.airports.insert(|id| Airport {
            id,
            name: airport.name.clone(),
            closest_big_city: airport.closest_big_city.clone(),
        }))
    }

    async fn list_airports(&self, page: PageRequest) -> StoreResult<Page<Airport>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.airports.values().cloned().collect()))
    }

    async fn create_route(&self, route: &NewRoute) -> StoreResult<Route> {
        airport_catalog::validate_route(route)?;

        let mut tables = self.tables.write().await;
        for (field, id) in [("source", route.source), ("destination", route.destination)] {
            if !tables.airports.contains(id) {
                return Err(StoreError::InvalidReference {
                    field,
                    entity: "airport",
                    id,
                });
            }
        }
        Ok(tables.routes.insert(|id| Route {
            id,
            source: route.source,
            destination: route.destination,
            distance: route.distance,
        }))
    }

    async fn list_routes(&self, page: PageRequest) -> StoreResult<Page<RouteView>> {
        let tables = self.tables.read().await;
        let routes: Vec<Route> = tables.routes.values().cloned().collect();
        Ok(page.slice(routes).map(|route| RouteView {
            id: route.id,
            source: tables.airport_label(route.source),
            destination: tables.airport_label(route.destination),
            distance: route.distance,
        }))
    }
}

#[async_trait]
impl FleetRepository for MemoryStore {
    async fn create_airplane_type(
        &self,
        airplane_type: &NewAirplaneType,
    ) -> StoreResult<AirplaneType> {
        airport_catalog::validate_airplane_type(airplane_type)?;

        let mut tables = self.tables.write().await;
        if tables
            .airplane_types
            .values()
            .any(|t| t.name == airplane_type.name)
        {
            return Err(StoreError::Conflict {
                entity: "airplane type",
                field: "name",
            });
        }
        Ok(tables.airplane_types.insert(|id| AirplaneType {
            id,
            name: airplane_type.name.clone(),
        }))
    }

    async fn list_airplane_types(&self, page: PageRequest) -> StoreResult<Page<AirplaneType>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.airplane_types.values().cloned().collect()))
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> StoreResult<Airplane> {
        airport_catalog::validate_airplane(airplane)?;

        let mut tables = self.tables.write().await;
        if tables.airplanes.values().any(|a| a.name == airplane.name) {
            return Err(StoreError::Conflict {
                entity: "airplane",
                field: "name",
            });
        }
        if !tables.airplane_types.contains(airplane.airplane_type) {
            return Err(StoreError::InvalidReference {
                field: "airplane_type",
                entity: "airplane type",
                id: airplane.airplane_type,
            });
        }
        Ok(tables.airplanes.insert(|id| Airplane {
            id,
            name: airplane.name.clone(),
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane.airplane_type,
        }))
    }

    async fn list_airplanes(&self, page: PageRequest) -> StoreResult<Page<AirplaneView>> {
        let tables = self.tables.read().await;
        let airplanes: Vec<Airplane> = tables.airplanes.values().cloned().collect();
        Ok(page.slice(airplanes).map(|airplane| AirplaneView {
            id: airplane.id,
            capacity: airplane.capacity(),
            airplane_type: tables
                .airplane_types
                .get(airplane.airplane_type)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            name: airplane.name,
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
        }))
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn create_crew(&self, crew: &NewCrew) -> StoreResult<Crew> {
        let mut tables = self.tables.write().await;
        Ok(tables.crews.insert(|id| Crew {
            id,
            first_name: crew.first_name.clone(),
            last_name: crew.last_name.clone(),
        }))
    }

    async fn list_crews(&self, page: PageRequest) -> StoreResult<Page<Crew>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.crews.values().cloned().collect()))
    }

    async fn get_crew(&self, id: Id) -> StoreResult<Option<Crew>> {
        Ok(self.tables.read().await.crews.get(id).cloned())
    }

    async fn create_flight(&self, flight: &NewFlight) -> StoreResult<FlightRecord> {
        airport_catalog::validate_flight(flight)?;

        let mut tables = self.tables.write().await;
        if !tables.routes.contains(flight.route) {
            return Err(StoreError::InvalidReference {
                field: "route",
                entity: "route",
                id: flight.route,
            });
        }
        if !tables.airplanes.contains(flight.airplane) {
            return Err(StoreError::InvalidReference {
                field: "airplane",
                entity: "airplane",
                id: flight.airplane,
            });
        }
        let crews = flight.crew_set();
        if let Some(missing) = crews.iter().find(|id| !tables.crews.contains(**id)) {
            return Err(StoreError::InvalidReference {
                field: "crews",
                entity: "crew",
                id: *missing,
            });
        }

        let created = tables.flights.insert(|id| Flight {
            id,
            route: flight.route,
            airplane: flight.airplane,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crews,
        });
        let tickets_available = tables.tickets_available(&created);

        Ok(FlightRecord {
            flight: created,
            tickets_available,
        })
    }

    async fn list_flights(
        &self,
        filter: &FlightFilter,
        page: PageRequest,
    ) -> StoreResult<Page<FlightSummary>> {
        let tables = self.tables.read().await;
        let matching: Vec<&Flight> = tables
            .flights
            .values()
            .filter(|flight| {
                let (source, destination) = tables
                    .routes
                    .get(flight.route)
                    .map(|r| tables.route_cities(r))
                    .unwrap_or_default();
                filter.matches(
                    &flight.departure_time,
                    &flight.arrival_time,
                    &source,
                    &destination,
                )
            })
            .collect();

        Ok(page.slice(matching).map(|flight| tables.flight_summary(flight)))
    }

    async fn get_flight(&self, id: Id) -> StoreResult<Option<FlightDetail>> {
        let tables = self.tables.read().await;
        let Some(flight) = tables.flights.get(id) else {
            return Ok(None);
        };

        let mut taken: Vec<(i32, i32)> = tables
            .seats
            .keys()
            .filter(|(f, _, _)| *f == id)
            .map(|(_, row, seat)| (*row, *seat))
            .collect();
        taken.sort_unstable();

        Ok(Some(FlightDetail {
            summary: tables.flight_summary(flight),
            taken_places: taken
                .into_iter()
                .map(|(row, seat)| labels::place(row, seat))
                .collect(),
        }))
    }

    async fn flight_airplane(&self, flight: Id) -> StoreResult<Option<Airplane>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights
            .get(flight)
            .and_then(|f| tables.airplanes.get(f.airplane))
            .cloned())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn get_or_create_user(&self, username: &str, is_staff: bool) -> StoreResult<User> {
        {
            let tables = self.tables.read().await;
            if let Some(user) = tables
                .users
                .values()
                .find(|u| u.username == username && u.is_staff == is_staff)
            {
                return Ok(user.clone());
            };
        }

        let mut tables = self.tables.write().await;
        if let Some(user) = tables
            .users
            .rows
            .values_mut()
            .find(|u| u.username == username)
        {
            user.is_staff = is_staff;
            return Ok(user.clone());
        }
        Ok(tables.users.insert(|id| User {
            id,
            username: username.to_string(),
            is_staff,
        }))
    }

    async fn insert_order(&self, user: Id, tickets: &[NewTicket]) -> StoreResult<Order> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains(user) {
            return Err(StoreError::not_found("user", user));
        }
        tables.check_seats(tickets)?;

        let order = tables.orders.insert(|id| OrderRow {
            id,
            created: Utc::now(),
            user,
        });
        let issued = tickets
            .iter()
            .map(|ticket| tables.issue(order.id, ticket))
            .collect();
        debug!(order_id = order.id, count = tickets.len(), "Order stored");

        Ok(Order {
            id: order.id,
            created: order.created,
            user,
            tickets: issued,
        })
    }

    async fn insert_ticket(&self, order: Id, ticket: &NewTicket) -> StoreResult<Ticket> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains(order) {
            return Err(StoreError::not_found("order", order));
        }
        tables.check_seats(std::slice::from_ref(ticket))?;
        Ok(tables.issue(order, ticket))
    }

    async fn list_orders(&self, user: Id, page: PageRequest) -> StoreResult<Page<OrderSummary>> {
        let tables = self.tables.read().await;
        let owned: Vec<&OrderRow> = tables.orders.values().filter(|o| o.user == user).collect();

        Ok(page.slice(owned).map(|order| OrderSummary {
            id: order.id,
            created: order.created,
            user: tables
                .users
                .get(order.user)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            tickets: tables
                .order_tickets(order.id)
                .iter()
                .map(|t| tables.ticket_label(t))
                .collect(),
        }))
    }

    async fn get_order(&self, user: Id, id: Id) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .get(id)
            .filter(|o| o.user == user)
            .map(|o| Order {
                id: o.id,
                created: o.created,
                user: o.user,
                tickets: tables.order_tickets(o.id),
            }))
    }

    async fn delete_order(&self, user: Id, id: Id) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.orders.get(id).is_some_and(|o| o.user == user) {
            return Ok(false);
        }
        for ticket in tables.order_tickets(id) {
            tables.remove_ticket(ticket.id);
        }
        tables.orders.rows.remove(&id);
        Ok(true)
    }

    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> StoreResult<Page<TicketView>> {
        let tables = self.tables.read().await;
        let matching: Vec<&Ticket> = tables
            .tickets
            .values()
            .filter(|ticket| {
                let Some(flight) = tables.flights.get(ticket.flight) else {
                    return false;
                };
                let (source, destination) = tables
                    .routes
                    .get(flight.route)
                    .map(|r| tables.route_cities(r))
                    .unwrap_or_default();
                filter.matches(flight.airplane, &source, &destination)
            })
            .collect();

        Ok(page.slice(matching).map(|ticket| tables.ticket_view(ticket)))
    }

    async fn get_ticket(&self, id: Id) -> StoreResult<Option<TicketView>> {
        let tables = self.tables.read().await;
        Ok(tables.tickets.get(id).map(|t| tables.ticket_view(t)))
    }

    async fn delete_ticket(&self, id: Id) -> StoreResult<bool> {
        Ok(self.tables.write().await.remove_ticket(id))
    }
}
