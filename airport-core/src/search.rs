use airport_shared::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Flight list filters. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FlightFilter {
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub source_city: Option<String>,
    pub destination_city: Option<String>,
}

impl FlightFilter {
    pub fn matches(
        &self,
        departure: &DateTime<Utc>,
        arrival: &DateTime<Utc>,
        source_city: &str,
        destination_city: &str,
    ) -> bool {
        self.departure_date.map_or(true, |d| departure.date_naive() == d)
            && self.arrival_date.map_or(true, |d| arrival.date_naive() == d)
            && city_matches(self.source_city.as_deref(), source_city)
            && city_matches(self.destination_city.as_deref(), destination_city)
    }
}

/// Ticket list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Keep tickets whose flight uses one of these airplanes.
    pub airplanes: Option<Vec<Id>>,
    pub source_city: Option<String>,
    pub destination_city: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, airplane: Id, source_city: &str, destination_city: &str) -> bool {
        self.airplanes
            .as_ref()
            .map_or(true, |ids| ids.contains(&airplane))
            && city_matches(self.source_city.as_deref(), source_city)
            && city_matches(self.destination_city.as_deref(), destination_city)
    }
}

/// Case-insensitive substring match. A missing needle matches everything.
pub fn city_matches(needle: Option<&str>, city: &str) -> bool {
    match needle {
        Some(needle) => city.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally by `ILIKE`.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_city_match_is_case_insensitive_substring() {
        assert!(city_matches(Some("kyiv"), "Kyiv"));
        assert!(city_matches(Some("YIV"), "Kyiv"));
        assert!(!city_matches(Some("Lviv"), "Kyiv"));
        assert!(city_matches(None, "anything"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Kyiv"), "%Kyiv%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_flight_filter_date_is_calendar_day() {
        let filter = FlightFilter {
            departure_date: NaiveDate::from_ymd_opt(2020, 10, 10),
            ..Default::default()
        };
        let late = Utc.with_ymd_and_hms(2020, 10, 10, 23, 59, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2020, 10, 11, 0, 0, 0).unwrap();
        assert!(filter.matches(&late, &next, "A", "B"));
        assert!(!filter.matches(&next, &next, "A", "B"));
    }

    #[test]
    fn test_flight_filter_deserializes_dates() {
        let filter: FlightFilter = serde_json::from_value(serde_json::json!({
            "departure_date": "2024-12-25",
            "source_city": "Kyiv"
        }))
        .unwrap();
        assert_eq!(filter.departure_date, NaiveDate::from_ymd_opt(2024, 12, 25));
        assert_eq!(filter.source_city.as_deref(), Some("Kyiv"));
    }
}
