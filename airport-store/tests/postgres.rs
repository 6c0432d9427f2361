//! Runs against a live PostgreSQL when `DATABASE_URL` is set; skipped otherwise.

use airport_core::{
    FleetRepository, FlightFilter, FlightRepository, NetworkRepository, OrderRepository,
    PageRequest, StoreError,
};
use airport_shared::{NewAirplane, NewAirplaneType, NewAirport, NewFlight, NewRoute, NewTicket};
use airport_store::app_config::DatabaseConfig;
use airport_store::PostgresStore;
use chrono::{TimeZone, Utc};

async fn connect() -> Option<PostgresStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url: Some(url.clone()),
        max_connections: 5,
        acquire_timeout_seconds: 3,
    };
    let store = PostgresStore::connect(&url, &config).await.unwrap();
    store.migrate().await.unwrap();
    Some(store)
}

#[tokio::test]
async fn test_booking_round_against_postgres() {
    let Some(store) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    // Unique names keep reruns against the same database independent.
    let tag = Utc::now().timestamp_micros();

    let src = store
        .create_airport(&NewAirport {
            name: format!("Modlin {}", tag),
            closest_big_city: "Warsaw".into(),
        })
        .await
        .unwrap();
    let dst = store
        .create_airport(&NewAirport {
            name: format!("Boryspil {}", tag),
            closest_big_city: format!("Kyiv{}", tag),
        })
        .await
        .unwrap();
    let route = store
        .create_route(&NewRoute {
            source: src.id,
            destination: dst.id,
            distance: 1200,
        })
        .await
        .unwrap();
    let kind = store
        .create_airplane_type(&NewAirplaneType {
            name: format!("Passenger {}", tag),
        })
        .await
        .unwrap();
    let airplane = store
        .create_airplane(&NewAirplane {
            name: format!("Boeing 777 {}", tag),
            rows: 10,
            seats_in_row: 10,
            airplane_type: kind.id,
        })
        .await
        .unwrap();
    let flight = store
        .create_flight(&NewFlight {
            route: route.id,
            airplane: airplane.id,
            departure_time: Utc.with_ymd_and_hms(2020, 10, 10, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2020, 10, 11, 8, 0, 0).unwrap(),
            crews: vec![],
        })
        .await
        .unwrap();
    assert_eq!(flight.tickets_available, 100);

    let alice = store
        .get_or_create_user(&format!("alice{}", tag), false)
        .await
        .unwrap();
    let seat = NewTicket {
        row: 3,
        seat: 4,
        flight: flight.flight.id,
    };
    store.insert_order(alice.id, &[seat]).await.unwrap();

    let err = store
        .insert_order(
            alice.id,
            &[
                NewTicket { row: 1, seat: 1, flight: flight.flight.id },
                seat,
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateSeat { row: 3, seat: 4, .. }));

    let detail = store.get_flight(flight.flight.id).await.unwrap().unwrap();
    assert_eq!(detail.summary.tickets_available, 99);
    assert_eq!(detail.taken_places, vec!["row:3 seat:4".to_string()]);

    let filter = FlightFilter {
        destination_city: Some(format!("kyiv{}", tag)),
        ..Default::default()
    };
    let flights = store.list_flights(&filter, PageRequest::default()).await.unwrap();
    assert_eq!(flights.count, 1);

    let orders = store.list_orders(alice.id, PageRequest::default()).await.unwrap();
    assert_eq!(orders.count, 1);
    assert_eq!(orders.results[0].tickets.len(), 1);
}

/// A fresh 10x10 flight with unique names. Returns the flight id.
async fn fresh_flight(store: &PostgresStore, tag: i64) -> i64 {
    let src = store
        .create_airport(&NewAirport {
            name: format!("Src {}", tag),
            closest_big_city: "Warsaw".into(),
        })
        .await
        .unwrap();
    let dst = store
        .create_airport(&NewAirport {
            name: format!("Dst {}", tag),
            closest_big_city: "Kyiv".into(),
        })
        .await
        .unwrap();
    let route = store
        .create_route(&NewRoute {
            source: src.id,
            destination: dst.id,
            distance: 1200,
        })
        .await
        .unwrap();
    let kind = store
        .create_airplane_type(&NewAirplaneType {
            name: format!("Type {}", tag),
        })
        .await
        .unwrap();
    let airplane = store
        .create_airplane(&NewAirplane {
            name: format!("Plane {}", tag),
            rows: 10,
            seats_in_row: 10,
            airplane_type: kind.id,
        })
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

#[tokio::test]
async fn test_overlapping_orders_in_opposite_seat_order_lose_with_duplicate_seat() {
    let Some(store) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    for round in 0..5 {
        let tag = Utc::now().timestamp_micros() * 10 + round;
        let flight = fresh_flight(&store, tag).await;
        let alice = store.get_or_create_user(&format!("alice{}", tag), false).await.unwrap();
        let bob = store.get_or_create_user(&format!("bob{}", tag), false).await.unwrap();

        let forward: Vec<NewTicket> = (1..=40)
            .map(|n| NewTicket { row: (n - 1) / 10 + 1, seat: (n - 1) % 10 + 1, flight })
            .collect();
        let backward: Vec<NewTicket> = forward.iter().rev().copied().collect();

        let (a, b) = (store.clone(), store.clone());
        let first = tokio::spawn(async move { a.insert_order(alice.id, &forward).await });
        let second = tokio::spawn(async move { b.insert_order(bob.id, &backward).await });
        let results = [first.await.unwrap(), second.await.unwrap()];

        let won = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(won, 1, "round {}: {:?}", round, results);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StoreError::DuplicateSeat { .. }))));

        let detail = store.get_flight(flight).await.unwrap().unwrap();
        assert_eq!(detail.summary.tickets_available, 60);
    }
}

#[tokio::test]
async fn test_get_or_create_user_reuses_row_and_tracks_role() {
    let Some(store) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let name = format!("carol{}", Utc::now().timestamp_micros());

    let first = store.get_or_create_user(&name, false).await.unwrap();
    let again = store.get_or_create_user(&name, false).await.unwrap();
    assert_eq!(first, again);

    let promoted = store.get_or_create_user(&name, true).await.unwrap();
    assert_eq!(promoted.id, first.id);
    assert!(promoted.is_staff);
}
