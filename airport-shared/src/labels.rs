//! Human-readable labels used wherever an entity is rendered by name
//! instead of by id (list views, ticket and order summaries).

use chrono::{DateTime, SecondsFormat, Utc};

pub fn airport(name: &str, closest_big_city: &str) -> String {
    format!("{} ({})", name, closest_big_city)
}

pub fn route(source: &str, destination: &str) -> String {
    format!("{} -> {}", source, destination)
}

pub fn flight(route: &str, airplane: &str) -> String {
    format!("{}: {}", route, airplane)
}

pub fn order(username: &str, created: &DateTime<Utc>) -> String {
    format!(
        "{}: {}",
        username,
        created.to_rfc3339_opts(SecondsFormat::Micros, false)
    )
}

pub fn ticket(flight: &str, order: &str, row: i32, seat: i32) -> String {
    format!("{}: {} (row:{} seats:{})", flight, order, row, seat)
}

pub fn place(row: i32, seat: i32) -> String {
    format!("row:{} seat:{}", row, seat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_route_label_uses_airport_labels() {
        let src = airport("Modlin", "Warsaw");
        let dst = airport("Boryspil", "Kyiv");
        assert_eq!(route(&src, &dst), "Modlin (Warsaw) -> Boryspil (Kyiv)");
    }

    #[test]
    fn test_ticket_label() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let order = order("alice", &created);
        assert_eq!(order, "alice: 2024-05-01T12:00:00.000000+00:00");

        let flight = flight("A (X) -> B (Y)", "Boeing");
        assert_eq!(
            ticket(&flight, &order, 9, 3),
            "A (X) -> B (Y): Boeing: alice: 2024-05-01T12:00:00.000000+00:00 (row:9 seats:3)"
        );
    }

    #[test]
    fn test_place() {
        assert_eq!(place(9, 9), "row:9 seat:9");
    }
}
