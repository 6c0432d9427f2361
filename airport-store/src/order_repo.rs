use std::collections::HashMap;

use airport_catalog::{validate_ticket, SeatGrid};
use airport_core::search::like_pattern;
use airport_core::{
    OrderRepository, OrderSummary, Page, PageRequest, StoreError, StoreResult, TicketFilter,
    TicketView,
};
use airport_shared::{labels, Id, NewTicket, Order, Ticket, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::database::{map_write_error, PostgresStore};

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Id,
    row_no: i32,
    seat_no: i32,
    flight_id: Id,
    order_id: Id,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            row: row.row_no,
            seat: row.seat_no,
            flight: row.flight_id,
            order: row.order_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TicketViewRow {
    id: Id,
    row_no: i32,
    seat_no: i32,
    source_name: String,
    source_city: String,
    destination_name: String,
    destination_city: String,
    airplane_name: String,
    order_id: Id,
    username: String,
    created: DateTime<Utc>,
}

impl TicketViewRow {
    fn flight_label(&self) -> String {
        let route = labels::route(
            &labels::airport(&self.source_name, &self.source_city),
            &labels::airport(&self.destination_name, &self.destination_city),
        );
        labels::flight(&route, &self.airplane_name)
    }
}

impl From<TicketViewRow> for TicketView {
    fn from(row: TicketViewRow) -> Self {
        TicketView {
            id: row.id,
            row: row.row_no,
            seat: row.seat_no,
            flight: row.flight_label(),
            order: labels::order(&row.username, &row.created),
        }
    }
}

const TICKET_VIEW_SELECT: &str = r#"
    SELECT t.id, t.row_no, t.seat_no,
           src.name AS source_name, src.closest_big_city AS source_city,
           dst.name AS destination_name, dst.closest_big_city AS destination_city,
           a.name AS airplane_name,
           o.id AS order_id, u.username, o.created
    FROM tickets t
    JOIN flights f ON f.id = t.flight_id
    JOIN routes r ON r.id = f.route_id
    JOIN airports src ON src.id = r.source_id
    JOIN airports dst ON dst.id = r.destination_id
    JOIN airplanes a ON a.id = f.airplane_id
    JOIN orders o ON o.id = t.order_id
    JOIN users u ON u.id = o.user_id
    WHERE TRUE"#;

fn push_ticket_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
    if let Some(airplanes) = &filter.airplanes {
        qb.push(" AND f.airplane_id = ANY(").push_bind(airplanes.clone()).push(")");
    }
    if let Some(city) = &filter.source_city {
        qb.push(" AND src.closest_big_city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(city) = &filter.destination_city {
        qb.push(" AND dst.closest_big_city ILIKE ").push_bind(like_pattern(city));
    }
}

/// Insert one ticket inside an open transaction.
///
/// The flight row is share-locked for the rest of the transaction and the seat
/// is validated against its airplane here, on the write path; the unique
/// index `tickets_flight_seat_key` settles races between concurrent buyers.
async fn insert_ticket_tx(conn: &mut PgConnection, order: Id, ticket: &NewTicket) -> StoreResult<Ticket> {
    let (rows, seats_in_row) = sqlx::query_as::<_, (i32, i32)>(
        r#"
        SELECT a.rows_count, a.seats_in_row
        FROM flights f
        JOIN airplanes a ON a.id = f.airplane_id
        WHERE f.id = $1
        FOR SHARE OF f
        "#,
    )
    .bind(ticket.flight)
    .fetch_optional(&mut *conn)
    .await
    .map_err(StoreError::backend)?
    .ok_or_else(|| StoreError::not_found("flight", ticket.flight))?;

    validate_ticket(ticket.row, ticket.seat, SeatGrid::new(rows, seats_in_row))?;

    let row = sqlx::query_as::<_, TicketRow>(
        r#"
        INSERT INTO tickets (row_no, seat_no, flight_id, order_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, row_no, seat_no, flight_id, order_id
        "#,
    )
    .bind(ticket.row)
    .bind(ticket.seat)
    .bind(ticket.flight)
    .bind(order)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        map_write_error(e, |kind, constraint| match (kind, constraint) {
            (ErrorKind::UniqueViolation, "tickets_flight_seat_key") => Some(StoreError::DuplicateSeat {
                flight: ticket.flight,
                row: ticket.row,
                seat: ticket.seat,
            }),
            (ErrorKind::ForeignKeyViolation, "tickets_order_id_fkey") => {
                Some(StoreError::not_found("order", order))
            }
            (ErrorKind::ForeignKeyViolation, "tickets_flight_id_fkey") => {
                Some(StoreError::not_found("flight", ticket.flight))
            }
            _ => None,
        })
    })?;

    Ok(row.into())
}

impl PostgresStore {
    async fn tickets_of(&self, orders: &[Id]) -> StoreResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, row_no, seat_no, flight_id, order_id
            FROM tickets
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(orders)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(Ticket::from).collect())
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn get_or_create_user(&self, username: &str, is_staff: bool) -> StoreResult<User> {
        let existing = sqlx::query_as::<_, (Id, String, bool)>(
            "SELECT id, username, is_staff FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        // Reads stay reads unless the token's role has changed.
        if let Some((id, username, current)) = existing {
            if current == is_staff {
                return Ok(User { id, username, is_staff });
            }
        }

        // DO UPDATE, unlike DO NOTHING, makes RETURNING yield the existing row.
        let (id, username, is_staff) = sqlx::query_as::<_, (Id, String, bool)>(
            r#"
            INSERT INTO users (username, is_staff)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT users_username_key
            DO UPDATE SET is_staff = EXCLUDED.is_staff
            RETURNING id, username, is_staff
            "#,
        )
        .bind(username)
        .bind(is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(User { id, username, is_staff })
    }

    async fn insert_order(&self, user: Id, tickets: &[NewTicket]) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let (id, created) = sqlx::query_as::<_, (Id, DateTime<Utc>)>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, created",
        )
        .bind(user)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(e, |kind, constraint| match (kind, constraint) {
                (ErrorKind::ForeignKeyViolation, "orders_user_id_fkey") => {
                    Some(StoreError::not_found("user", user))
                }
                _ => None,
            })
        })?;

        // Concurrent orders take seat index locks in one global order, so
        // overlapping orders collide as unique violations instead of deadlocking.
        let mut ordered = tickets.to_vec();
        ordered.sort_unstable_by_key(|t| (t.flight, t.row, t.seat));

        let mut issued = Vec::with_capacity(ordered.len());
        for ticket in &ordered {
            // Returning early drops `tx`, which rolls everything back.
            issued.push(insert_ticket_tx(&mut *tx, id, ticket).await?);
        }

        tx.commit().await.map_err(StoreError::backend)?;

        Ok(Order {
            id,
            created,
            user,
            tickets: issued,
        })
    }

    async fn insert_ticket(&self, order: Id, ticket: &NewTicket) -> StoreResult<Ticket> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        let issued = insert_ticket_tx(&mut *tx, order, ticket).await?;
        tx.commit().await.map_err(StoreError::backend)?;
        Ok(issued)
    }

    async fn list_orders(&self, user: Id, page: PageRequest) -> StoreResult<Page<OrderSummary>> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        let orders = sqlx::query_as::<_, (Id, DateTime<Utc>, String)>(
            r#"
            SELECT o.id, o.created, u.username
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.user_id = $1
            ORDER BY o.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let ids: Vec<Id> = orders.iter().map(|(id, _, _)| *id).collect();
        let mut tickets: HashMap<Id, Vec<String>> = HashMap::new();
        if !ids.is_empty() {
            let mut qb = QueryBuilder::<Postgres>::new(TICKET_VIEW_SELECT);
            qb.push(" AND t.order_id = ANY(").push_bind(ids).push(") ORDER BY t.id");
            let rows = qb
                .build_query_as::<TicketViewRow>()
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::backend)?;
            for row in rows {
                let order_id = row.order_id;
                let view = TicketView::from(row);
                tickets
                    .entry(order_id)
                    .or_default()
                    .push(labels::ticket(&view.flight, &view.order, view.row, view.seat));
            }
        }

        let results = orders
            .into_iter()
            .map(|(id, created, username)| OrderSummary {
                id,
                created,
                user: username,
                tickets: tickets.remove(&id).unwrap_or_default(),
            })
            .collect();

        Ok(Page { count, results })
    }

    async fn get_order(&self, user: Id, id: Id) -> StoreResult<Option<Order>> {
        let Some((id, created)) = sqlx::query_as::<_, (Id, DateTime<Utc>)>(
            "SELECT id, created FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?
        else {
            return Ok(None);
        };

        Ok(Some(Order {
            id,
            created,
            user,
            tickets: self.tickets_of(&[id]).await?,
        }))
    }

    async fn delete_order(&self, user: Id, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> StoreResult<Page<TicketView>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM (");
        count_qb.push(TICKET_VIEW_SELECT);
        push_ticket_filters(&mut count_qb, filter);
        count_qb.push(") AS matching");
        let count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        let mut qb = QueryBuilder::<Postgres>::new(TICKET_VIEW_SELECT);
        push_ticket_filters(&mut qb, filter);
        qb.push(" ORDER BY t.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb
            .build_query_as::<TicketViewRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(Page {
            count,
            results: rows.into_iter().map(TicketView::from).collect(),
        })
    }

    async fn get_ticket(&self, id: Id) -> StoreResult<Option<TicketView>> {
        let mut qb = QueryBuilder::<Postgres>::new(TICKET_VIEW_SELECT);
        qb.push(" AND t.id = ").push_bind(id);

        let row = qb
            .build_query_as::<TicketViewRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(row.map(TicketView::from))
    }

    async fn delete_ticket(&self, id: Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }
}
