use airport_shared::NewFlight;

use crate::errors::{FieldErrors, ValidationError};

/// A flight must land after it departs.
pub fn validate_flight(flight: &NewFlight) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    if flight.arrival_time <= flight.departure_time {
        errors.insert("arrival_time", "Arrival time must be later than departure time.");
    }
    ValidationError::check_invalid(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_arrival_before_departure_rejected() {
        let flight = NewFlight {
            route: 1,
            airplane: 1,
            departure_time: Utc.with_ymd_and_hms(2020, 10, 11, 0, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2020, 10, 10, 0, 0, 0).unwrap(),
            crews: vec![],
        };
        let err = validate_flight(&flight).unwrap_err();
        assert!(err.fields().contains("arrival_time"));
    }
}
