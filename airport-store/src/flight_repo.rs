use std::collections::HashMap;

use airport_core::search::like_pattern;
use airport_core::{
    FlightDetail, FlightFilter, FlightRecord, FlightRepository, FlightSummary, Page, PageRequest,
    StoreError, StoreResult,
};
use airport_shared::{labels, Airplane, Crew, Flight, Id, NewCrew, NewFlight};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::{Postgres, QueryBuilder};

use crate::database::{map_write_error, PostgresStore};

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Id,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    source_name: String,
    source_city: String,
    destination_name: String,
    destination_city: String,
    airplane_name: String,
    tickets_available: i64,
}

#[derive(sqlx::FromRow)]
struct CrewRow {
    id: Id,
    first_name: String,
    last_name: String,
}

impl From<CrewRow> for Crew {
    fn from(row: CrewRow) -> Self {
        Crew {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

const FLIGHT_FROM: &str = r#"
    FROM flights f
    JOIN routes r ON r.id = f.route_id
    JOIN airports src ON src.id = r.source_id
    JOIN airports dst ON dst.id = r.destination_id
    JOIN airplanes a ON a.id = f.airplane_id
    WHERE TRUE"#;

// Availability is derived from the ticket count on every read.
const FLIGHT_COLUMNS: &str = r#"
    SELECT f.id, f.departure_time, f.arrival_time,
           src.name AS source_name, src.closest_big_city AS source_city,
           dst.name AS destination_name, dst.closest_big_city AS destination_city,
           a.name AS airplane_name,
           a.rows_count::BIGINT * a.seats_in_row::BIGINT
             - (SELECT COUNT(*) FROM tickets t WHERE t.flight_id = f.id) AS tickets_available"#;

fn push_flight_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &FlightFilter) {
    if let Some(date) = filter.departure_date {
        qb.push(" AND (f.departure_time AT TIME ZONE 'UTC')::date = ").push_bind(date);
    }
    if let Some(date) = filter.arrival_date {
        qb.push(" AND (f.arrival_time AT TIME ZONE 'UTC')::date = ").push_bind(date);
    }
    if let Some(city) = &filter.source_city {
        qb.push(" AND src.closest_big_city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some(city) = &filter.destination_city {
        qb.push(" AND dst.closest_big_city ILIKE ").push_bind(like_pattern(city));
    }
}

impl PostgresStore {
    /// Crew names per flight, in crew id order.
    async fn crew_names(&self, flights: &[Id]) -> StoreResult<HashMap<Id, Vec<String>>> {
        let rows = sqlx::query_as::<_, (Id, String, String)>(
            r#"
            SELECT fc.flight_id, c.first_name, c.last_name
            FROM flight_crews fc
            JOIN crews c ON c.id = fc.crew_id
            WHERE fc.flight_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(flights)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let mut names: HashMap<Id, Vec<String>> = HashMap::new();
        for (flight, first, last) in rows {
            names.entry(flight).or_default().push(format!("{} {}", first, last));
        }
        Ok(names)
    }

    async fn flight_summaries(&self, rows: Vec<FlightRow>) -> StoreResult<Vec<FlightSummary>> {
        let ids: Vec<Id> = rows.iter().map(|row| row.id).collect();
        let mut crews = self.crew_names(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let route = labels::route(
                    &labels::airport(&row.source_name, &row.source_city),
                    &labels::airport(&row.destination_name, &row.destination_city),
                );
                FlightSummary {
                    id: row.id,
                    route,
                    airplane: row.airplane_name,
                    departure_time: row.departure_time,
                    arrival_time: row.arrival_time,
                    crews: crews.remove(&row.id).unwrap_or_default(),
                    tickets_available: row.tickets_available,
                }
            })
            .collect())
    }
}

#[async_trait]
impl FlightRepository for PostgresStore {
    async fn create_crew(&self, crew: &NewCrew) -> StoreResult<Crew> {
        let row = sqlx::query_as::<_, CrewRow>(
            "INSERT INTO crews (first_name, last_name) VALUES ($1, $2) RETURNING id, first_name, last_name",
        )
        .bind(&crew.first_name)
        .bind(&crew.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.into())
    }

    async fn list_crews(&self, page: PageRequest) -> StoreResult<Page<Crew>> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM crews")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        let rows = sqlx::query_as::<_, CrewRow>(
            "SELECT id, first_name, last_name FROM crews ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Page {
            count,
            results: rows.into_iter().map(Crew::from).collect(),
        })
    }

    async fn get_crew(&self, id: Id) -> StoreResult<Option<Crew>> {
        let row = sqlx::query_as::<_, CrewRow>("SELECT id, first_name, last_name FROM crews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(row.map(Crew::from))
    }

    async fn create_flight(&self, flight: &NewFlight) -> StoreResult<FlightRecord> {
        airport_catalog::validate_flight(flight)?;

        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let (id, capacity) = sqlx::query_as::<_, (Id, i64)>(
            r#"
            INSERT INTO flights (route_id, airplane_id, departure_time, arrival_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id,
                (SELECT a.rows_count::BIGINT * a.seats_in_row::BIGINT FROM airplanes a WHERE a.id = $2)
            "#,
        )
        .bind(flight.route)
        .bind(flight.airplane)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(e, |kind, constraint| match (kind, constraint) {
                (ErrorKind::ForeignKeyViolation, "flights_route_id_fkey") => {
                    Some(StoreError::InvalidReference {
                        field: "route",
                        entity: "route",
                        id: flight.route,
                    })
                }
                (ErrorKind::ForeignKeyViolation, "flights_airplane_id_fkey") => {
                    Some(StoreError::InvalidReference {
                        field: "airplane",
                        entity: "airplane",
                        id: flight.airplane,
                    })
                }
                _ => None,
            })
        })?;

        let crews = flight.crew_set();
        for crew in &crews {
            sqlx::query("INSERT INTO flight_crews (flight_id, crew_id) VALUES ($1, $2)")
                .bind(id)
                .bind(*crew)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    map_write_error(e, |kind, constraint| match (kind, constraint) {
                        (ErrorKind::ForeignKeyViolation, "flight_crews_crew_id_fkey") => {
                            Some(StoreError::InvalidReference {
                                field: "crews",
                                entity: "crew",
                                id: *crew,
                            })
                        }
                        _ => None,
                    })
                })?;
        }

        tx.commit().await.map_err(StoreError::backend)?;

        Ok(FlightRecord {
            flight: Flight {
                id,
                route: flight.route,
                airplane: flight.airplane,
                departure_time: flight.departure_time,
                arrival_time: flight.arrival_time,
                crews,
            },
            tickets_available: capacity,
        })
    }

    async fn list_flights(
        &self,
        filter: &FlightFilter,
        page: PageRequest,
    ) -> StoreResult<Page<FlightSummary>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count_qb.push(FLIGHT_FROM);
        push_flight_filters(&mut count_qb, filter);
        let count = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        let mut qb = QueryBuilder::<Postgres>::new(FLIGHT_COLUMNS);
        qb.push(FLIGHT_FROM);
        push_flight_filters(&mut qb, filter);
        qb.push(" ORDER BY f.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb
            .build_query_as::<FlightRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(Page {
            count,
            results: self.flight_summaries(rows).await?,
        })
    }

    async fn get_flight(&self, id: Id) -> StoreResult<Option<FlightDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(FLIGHT_COLUMNS);
        qb.push(FLIGHT_FROM);
        qb.push(" AND f.id = ").push_bind(id);

        let Some(row) = qb
            .build_query_as::<FlightRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?
        else {
            return Ok(None);
        };

        let taken = sqlx::query_as::<_, (i32, i32)>(
            "SELECT row_no, seat_no FROM tickets WHERE flight_id = $1 ORDER BY row_no, seat_no",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let summary = self
            .flight_summaries(vec![row])
            .await?
            .pop()
            .ok_or_else(|| StoreError::not_found("flight", id))?;

        Ok(Some(FlightDetail {
            summary,
            taken_places: taken
                .into_iter()
                .map(|(row, seat)| labels::place(row, seat))
                .collect(),
        }))
    }

    async fn flight_airplane(&self, flight: Id) -> StoreResult<Option<Airplane>> {
        let row = sqlx::query_as::<_, (Id, String, i32, i32, Id)>(
            r#"
            SELECT a.id, a.name, a.rows_count, a.seats_in_row, a.airplane_type_id
            FROM flights f
            JOIN airplanes a ON a.id = f.airplane_id
            WHERE f.id = $1
            "#,
        )
        .bind(flight)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|(id, name, rows, seats_in_row, airplane_type)| Airplane {
            id,
            name,
            rows,
            seats_in_row,
            airplane_type,
        }))
    }
}
