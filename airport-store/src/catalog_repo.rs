use airport_core::{
    AirplaneView, FleetRepository, NetworkRepository, Page, PageRequest, RouteView, StoreError,
    StoreResult,
};
use airport_shared::{
    labels, Airplane, AirplaneType, Airport, Id, NewAirplane, NewAirplaneType, NewAirport, NewRoute,
    Route,
};
use async_trait::async_trait;
use sqlx::error::ErrorKind;

use crate::database::{map_write_error, PostgresStore};

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: Id,
    name: String,
    closest_big_city: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            name: row.name,
            closest_big_city: row.closest_big_city,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RouteViewRow {
    id: Id,
    distance: i32,
    source_name: String,
    source_city: String,
    destination_name: String,
    destination_city: String,
}

#[derive(sqlx::FromRow)]
struct AirplaneRow {
    id: Id,
    name: String,
    rows_count: i32,
    seats_in_row: i32,
    airplane_type_id: Id,
}

impl From<AirplaneRow> for Airplane {
    fn from(row: AirplaneRow) -> Self {
        Airplane {
            id: row.id,
            name: row.name,
            rows: row.rows_count,
            seats_in_row: row.seats_in_row,
            airplane_type: row.airplane_type_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneViewRow {
    id: Id,
    name: String,
    rows_count: i32,
    seats_in_row: i32,
    type_name: String,
}

impl PostgresStore {
    async fn count(&self, table: &'static str) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::backend)
    }
}

#[async_trait]
impl NetworkRepository for PostgresStore {
    async fn create_airport(&self, airport: &NewAirport) -> StoreResult<Airport> {
        airport_catalog::validate_airport(airport)?;

        let row = sqlx::query_as::<_, AirportRow>(
            "INSERT INTO airports (name, closest_big_city) VALUES ($1, $2) RETURNING id, name, closest_big_city",
        )
        .bind(&airport.name)
        .bind(&airport.closest_big_city)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, |kind, constraint| match (kind, constraint) {
                (ErrorKind::UniqueViolation, "airports_name_key") => Some(StoreError::Conflict {
                    entity: "airport",
                    field: "name",
                }),
                _ => None,
            })
        })?;

        Ok(row.into())
    }

    async fn list_airports(&self, page: PageRequest) -> StoreResult<Page<Airport>> {
        let count = self.count("airports").await?;
        let rows = sqlx::query_as::<_, AirportRow>(
            "SELECT id, name, closest_big_city FROM airports ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Page {
            count,
            results: rows.into_iter().map(Airport::from).collect(),
        })
    }

    async fn create_route(&self, route: &NewRoute) -> StoreResult<Route> {
        airport_catalog::validate_route(route)?;

        let id = sqlx::query_scalar::<_, Id>(
            "INSERT INTO routes (source_id, destination_id, distance) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(route.source)
        .bind(route.destination)
        .bind(route.distance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, |kind, constraint| match (kind, constraint) {
                (ErrorKind::ForeignKeyViolation, "routes_source_id_fkey") => {
                    Some(StoreError::InvalidReference {
                        field: "source",
                        entity: "airport",
                        id: route.source,
                    })
                }
                (ErrorKind::ForeignKeyViolation, "routes_destination_id_fkey") => {
                    Some(StoreError::InvalidReference {
                        field: "destination",
                        entity: "airport",
                        id: route.destination,
                    })
                }
                _ => None,
            })
        })?;

        Ok(Route {
            id,
            source: route.source,
            destination: route.destination,
            distance: route.distance,
        })
    }

    async fn list_routes(&self, page: PageRequest) -> StoreResult<Page<RouteView>> {
        let count = self.count("routes").await?;
        let rows = sqlx::query_as::<_, RouteViewRow>(
            r#"
            SELECT r.id, r.distance,
                   src.name AS source_name, src.closest_big_city AS source_city,
                   dst.name AS destination_name, dst.closest_big_city AS destination_city
            FROM routes r
            JOIN airports src ON src.id = r.source_id
            JOIN airports dst ON dst.id = r.destination_id
            ORDER BY r.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let results = rows
            .into_iter()
            .map(|row| RouteView {
                id: row.id,
                source: labels::airport(&row.source_name, &row.source_city),
                destination: labels::airport(&row.destination_name, &row.destination_city),
                distance: row.distance,
            })
            .collect();

        Ok(Page { count, results })
    }
}

#[async_trait]
impl FleetRepository for PostgresStore {
    async fn create_airplane_type(
        &self,
        airplane_type: &NewAirplaneType,
    ) -> StoreResult<AirplaneType> {
        airport_catalog::validate_airplane_type(airplane_type)?;

        let id = sqlx::query_scalar::<_, Id>("INSERT INTO airplane_types (name) VALUES ($1) RETURNING id")
            .bind(&airplane_type.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, |kind, constraint| match (kind, constraint) {
                    (ErrorKind::UniqueViolation, "airplane_types_name_key") => {
                        Some(StoreError::Conflict {
                            entity: "airplane type",
                            field: "name",
                        })
                    }
                    _ => None,
                })
            })?;

        Ok(AirplaneType {
            id,
            name: airplane_type.name.clone(),
        })
    }

    async fn list_airplane_types(&self, page: PageRequest) -> StoreResult<Page<AirplaneType>> {
        let count = self.count("airplane_types").await?;
        let rows = sqlx::query_as::<_, (Id, String)>(
            "SELECT id, name FROM airplane_types ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Page {
            count,
            results: rows
                .into_iter()
                .map(|(id, name)| AirplaneType { id, name })
                .collect(),
        })
    }

    async fn create_airplane(&self, airplane: &NewAirplane) -> StoreResult<Airplane> {
        airport_catalog::validate_airplane(airplane)?;

        let row = sqlx::query_as::<_, AirplaneRow>(
            r#"
            INSERT INTO airplanes (name, rows_count, seats_in_row, airplane_type_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, rows_count, seats_in_row, airplane_type_id
            "#,
        )
        .bind(&airplane.name)
        .bind(airplane.rows)
        .bind(airplane.seats_in_row)
        .bind(airplane.airplane_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, |kind, constraint| match (kind, constraint) {
                (ErrorKind::UniqueViolation, "airplanes_name_key") => Some(StoreError::Conflict {
                    entity: "airplane",
                    field: "name",
                }),
                (ErrorKind::ForeignKeyViolation, "airplanes_airplane_type_id_fkey") => {
                    Some(StoreError::InvalidReference {
                        field: "airplane_type",
                        entity: "airplane type",
                        id: airplane.airplane_type,
                    })
                }
                _ => None,
            })
        })?;

        Ok(row.into())
    }

    async fn list_airplanes(&self, page: PageRequest) -> StoreResult<Page<AirplaneView>> {
        let count = self.count("airplanes").await?;
        let rows = sqlx::query_as::<_, AirplaneViewRow>(
            r#"
            SELECT a.id, a.name, a.rows_count, a.seats_in_row, t.name AS type_name
            FROM airplanes a
            JOIN airplane_types t ON t.id = a.airplane_type_id
            ORDER BY a.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let results = rows
            .into_iter()
            .map(|row| AirplaneView {
                id: row.id,
                capacity: i64::from(row.rows_count) * i64::from(row.seats_in_row),
                name: row.name,
                rows: row.rows_count,
                seats_in_row: row.seats_in_row,
                airplane_type: row.type_name,
            })
            .collect();

        Ok(Page { count, results })
    }
}
