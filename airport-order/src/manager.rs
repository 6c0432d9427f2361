use std::collections::HashSet;

use airport_catalog::{validate_ticket, FieldErrors, ValidationError};
use airport_core::{FlightRepository, OrderRepository, OrderSummary, Page, PageRequest, StoreError};
use airport_shared::{Id, NewTicket, Order, Ticket, User};
use tracing::{info, warn};

/// Creates orders and their tickets as one unit.
///
/// Every seat is checked against its flight's airplane before anything is
/// written; the store repeats the check inside its transaction and owns the
/// seat uniqueness constraint.
pub struct OrderManager<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> OrderManager<'a, S>
where
    S: FlightRepository + OrderRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create an order owned by `user` with one ticket per request.
    pub async fn create_order(&self, user: &User, requests: &[NewTicket]) -> Result<Order, OrderError> {
        if requests.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut seen = HashSet::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            self.check_seat(index, request).await?;
            if !seen.insert((request.flight, request.row, request.seat)) {
                return Err(OrderError::DuplicateSeat {
                    flight: request.flight,
                    row: request.row,
                    seat: request.seat,
                });
            }
        }

        let order = self
            .store
            .insert_order(user.id, requests)
            .await
            .map_err(|e| {
                warn!("Order for {} rejected by store: {}", user.username, e);
                OrderError::from(e)
            })?;

        info!(
            "Order {} created for {} with {} ticket(s)",
            order.id,
            user.username,
            order.tickets.len()
        );
        Ok(order)
    }

    /// Add one ticket to an order that `user` already owns.
    pub async fn issue_ticket(&self, user: &User, order: Id, request: &NewTicket) -> Result<Ticket, OrderError> {
        if self.store.get_order(user.id, order).await?.is_none() {
            return Err(OrderError::NotFound { entity: "order", id: order });
        }
        self.check_seat(0, request).await?;

        let ticket = self.store.insert_ticket(order, request).await?;
        info!(
            "Ticket {} issued on flight {} (row:{} seat:{})",
            ticket.id, ticket.flight, ticket.row, ticket.seat
        );
        Ok(ticket)
    }

    pub async fn list_orders(&self, user: &User, page: PageRequest) -> Result<Page<OrderSummary>, OrderError> {
        Ok(self.store.list_orders(user.id, page).await?)
    }

    pub async fn get_order(&self, user: &User, id: Id) -> Result<Order, OrderError> {
        self.store
            .get_order(user.id, id)
            .await?
            .ok_or(OrderError::NotFound { entity: "order", id })
    }

    pub async fn delete_order(&self, user: &User, id: Id) -> Result<(), OrderError> {
        if self.store.delete_order(user.id, id).await? {
            info!("Order {} deleted by {}", id, user.username);
            Ok(())
        } else {
            Err(OrderError::NotFound { entity: "order", id })
        }
    }

    async fn check_seat(&self, index: usize, request: &NewTicket) -> Result<(), OrderError> {
        let airplane = self
            .store
            .flight_airplane(request.flight)
            .await?
            .ok_or(OrderError::NotFound {
                entity: "flight",
                id: request.flight,
            })?;

        validate_ticket(request.row, request.seat, &airplane).map_err(|e| OrderError::OutOfRange {
            index: Some(index),
            fields: e.fields().clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("An order must contain at least one ticket")]
    EmptyOrder,

    #[error("Seat out of range: {fields}")]
    OutOfRange {
        /// Position of the offending request, when known.
        index: Option<usize>,
        fields: FieldErrors,
    },

    #[error("Seat row:{row} seat:{seat} is already taken on flight {flight}")]
    DuplicateSeat { flight: Id, row: i32, seat: i32 },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSeat { flight, row, seat } => OrderError::DuplicateSeat { flight, row, seat },
            StoreError::NotFound { entity, id } => OrderError::NotFound { entity, id },
            StoreError::Validation(ValidationError::OutOfRange(fields)) => {
                OrderError::OutOfRange { index: None, fields }
            }
            other => OrderError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airport_core::{FleetRepository, FlightRepository, NetworkRepository, OrderRepository};
    use airport_shared::{NewAirplane, NewAirplaneType, NewAirport, NewFlight, NewRoute};
    use airport_store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    /// A 10x10 airplane on one flight. Returns the flight id.
    async fn seed(store: &MemoryStore) -> Id {
        let src = store
            .create_airport(&NewAirport { name: "Modlin".into(), closest_big_city: "Warsaw".into() })
            .await
            .unwrap();
        let dst = store
            .create_airport(&NewAirport { name: "Boryspil".into(), closest_big_city: "Kyiv".into() })
            .await
            .unwrap();
        let route = store
            .create_route(&NewRoute { source: src.id, destination: dst.id, distance: 1200 })
            .await
            .unwrap();
        let kind = store
            .create_airplane_type(&NewAirplaneType { name: "Passenger".into() })
            .await
            .unwrap();
        let airplane = store
            .create_airplane(&NewAirplane { name: "Boeing 777".into(), rows: 10, seats_in_row: 10, airplane_type: kind.id })
            .await
            .unwrap();
        store
            .create_flight(&NewFlight {
                route: route.id,
                airplane: airplane.id,
                departure_time: Utc.with_ymd_and_hms(2020, 10, 10, 8, 0, 0).unwrap(),
                arrival_time: Utc.with_ymd_and_hms(2020, 10, 11, 8, 0, 0).unwrap(),
                crews: vec![],
            })
            .await
            .unwrap()
            .flight
            .id
    }

    async fn tickets_available(store: &MemoryStore, flight: Id) -> i64 {
        store.get_flight(flight).await.unwrap().unwrap().summary.tickets_available
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let store = MemoryStore::new();
        let user = store.get_or_create_user("alice", false).await.unwrap();
        let err = OrderManager::new(&store).create_order(&user, &[]).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
    }

    #[tokio::test]
    async fn test_order_reduces_availability() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let user = store.get_or_create_user("alice", false).await.unwrap();
        assert_eq!(tickets_available(&store, flight).await, 100);

        let order = OrderManager::new(&store)
            .create_order(&user, &[NewTicket { row: 9, seat: 9, flight }])
            .await
            .unwrap();
        assert_eq!(order.tickets.len(), 1);
        assert_eq!(order.tickets[0].order, order.id);

        let detail = store.get_flight(flight).await.unwrap().unwrap();
        assert_eq!(detail.summary.tickets_available, 99);
        assert_eq!(detail.taken_places, vec!["row:9 seat:9".to_string()]);
    }

    #[tokio::test]
    async fn test_availability_tracks_every_seat_across_orders() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let alice = store.get_or_create_user("alice", false).await.unwrap();
        let bob = store.get_or_create_user("bob", false).await.unwrap();
        let manager = OrderManager::new(&store);

        let orders: [(&User, Vec<NewTicket>); 3] = [
            (&alice, vec![NewTicket { row: 1, seat: 1, flight }, NewTicket { row: 1, seat: 2, flight }]),
            (&bob, vec![
                NewTicket { row: 5, seat: 5, flight },
                NewTicket { row: 5, seat: 6, flight },
                NewTicket { row: 10, seat: 10, flight },
            ]),
            (&alice, vec![NewTicket { row: 2, seat: 1, flight }]),
        ];

        let mut booked = 0;
        for (user, seats) in &orders {
            manager.create_order(user, seats).await.unwrap();
            booked += seats.len() as i64;
            assert_eq!(tickets_available(&store, flight).await, 100 - booked);
        }
        assert_eq!(booked, 6);

        let detail = store.get_flight(flight).await.unwrap().unwrap();
        assert_eq!(detail.taken_places.len(), 6);
        assert!(detail.taken_places.contains(&"row:10 seat:10".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_ticket_rejects_whole_order() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let user = store.get_or_create_user("alice", false).await.unwrap();

        let err = OrderManager::new(&store)
            .create_order(
                &user,
                &[NewTicket { row: 1, seat: 1, flight }, NewTicket { row: 0, seat: 5, flight }],
            )
            .await
            .unwrap_err();
        match err {
            OrderError::OutOfRange { index, fields } => {
                assert_eq!(index, Some(1));
                assert!(fields.contains("row"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(tickets_available(&store, flight).await, 100);
        let orders = store.list_orders(user.id, PageRequest::default()).await.unwrap();
        assert_eq!(orders.count, 0);
    }

    #[tokio::test]
    async fn test_row_eleven_names_row_and_range() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let user = store.get_or_create_user("alice", false).await.unwrap();

        let err = OrderManager::new(&store)
            .create_order(&user, &[NewTicket { row: 11, seat: 1, flight }])
            .await
            .unwrap_err();
        let OrderError::OutOfRange { fields, .. } = err else {
            panic!("expected OutOfRange");
        };
        assert_eq!(
            fields.get("row"),
            Some("row number must be in available range: (1, rows): (1, 10)")
        );
    }

    #[tokio::test]
    async fn test_taken_seat_is_duplicate() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let alice = store.get_or_create_user("alice", false).await.unwrap();
        let bob = store.get_or_create_user("bob", false).await.unwrap();
        let manager = OrderManager::new(&store);

        manager.create_order(&alice, &[NewTicket { row: 3, seat: 4, flight }]).await.unwrap();
        let err = manager
            .create_order(&bob, &[NewTicket { row: 5, seat: 5, flight }, NewTicket { row: 3, seat: 4, flight }])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::DuplicateSeat { row: 3, seat: 4, .. }));

        // Bob's valid first seat was not kept.
        assert_eq!(tickets_available(&store, flight).await, 99);
        assert_eq!(store.list_orders(bob.id, PageRequest::default()).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_same_seat_twice_in_one_order_is_duplicate() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let user = store.get_or_create_user("alice", false).await.unwrap();

        let seat = NewTicket { row: 2, seat: 2, flight };
        let err = OrderManager::new(&store).create_order(&user, &[seat, seat]).await.unwrap_err();
        assert!(matches!(err, OrderError::DuplicateSeat { .. }));
        assert_eq!(tickets_available(&store, flight).await, 100);
    }

    #[tokio::test]
    async fn test_unknown_flight_not_found() {
        let store = MemoryStore::new();
        let user = store.get_or_create_user("alice", false).await.unwrap();
        let err = OrderManager::new(&store)
            .create_order(&user, &[NewTicket { row: 1, seat: 1, flight: 42 }])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound { entity: "flight", id: 42 }));
    }

    #[tokio::test]
    async fn test_concurrent_orders_for_same_seat_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let flight = seed(&store).await;

        let mut handles = Vec::new();
        for name in ["alice", "bob", "carol", "dave"] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let user = store.get_or_create_user(name, false).await.unwrap();
                OrderManager::new(store.as_ref())
                    .create_order(&user, &[NewTicket { row: 7, seat: 7, flight }])
                    .await
            }));
        }

        let mut won = 0;
        let mut duplicate = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(OrderError::DuplicateSeat { .. }) => duplicate += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(duplicate, 3);
        assert_eq!(tickets_available(&store, flight).await, 99);
    }

    #[tokio::test]
    async fn test_issue_ticket_requires_own_order() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let alice = store.get_or_create_user("alice", false).await.unwrap();
        let bob = store.get_or_create_user("bob", false).await.unwrap();
        let manager = OrderManager::new(&store);

        let order = manager.create_order(&alice, &[NewTicket { row: 1, seat: 1, flight }]).await.unwrap();

        let err = manager
            .issue_ticket(&bob, order.id, &NewTicket { row: 1, seat: 2, flight })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound { entity: "order", .. }));

        let ticket = manager
            .issue_ticket(&alice, order.id, &NewTicket { row: 1, seat: 2, flight })
            .await
            .unwrap();
        assert_eq!(ticket.order, order.id);
        assert_eq!(manager.get_order(&alice, order.id).await.unwrap().tickets.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_order_frees_seats() {
        let store = MemoryStore::new();
        let flight = seed(&store).await;
        let alice = store.get_or_create_user("alice", false).await.unwrap();
        let bob = store.get_or_create_user("bob", false).await.unwrap();
        let manager = OrderManager::new(&store);

        let order = manager.create_order(&alice, &[NewTicket { row: 1, seat: 1, flight }]).await.unwrap();
        assert!(matches!(
            manager.delete_order(&bob, order.id).await,
            Err(OrderError::NotFound { .. })
        ));
        manager.delete_order(&alice, order.id).await.unwrap();
        assert_eq!(tickets_available(&store, flight).await, 100);
    }
}
