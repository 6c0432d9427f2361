use airport_shared::{NewAirport, NewRoute};

use crate::errors::{FieldErrors, ValidationError};

pub(crate) const MAX_NAME_LEN: usize = 100;

pub(crate) fn check_name(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, "This field may not be blank.");
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.insert(
            field,
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
        );
    }
}

pub fn validate_airport(airport: &NewAirport) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    check_name(&mut errors, "name", &airport.name);
    check_name(&mut errors, "closest_big_city", &airport.closest_big_city);
    ValidationError::check_invalid(errors)
}

/// A route must connect two different airports over a positive distance.
pub fn validate_route(route: &NewRoute) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    if route.source == route.destination {
        errors.insert("destination", "Destination must differ from source.");
    }
    if route.distance <= 0 {
        errors.insert("distance", "Distance must be a positive integer.");
    }
    ValidationError::check_invalid(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_to_itself_rejected() {
        let err = validate_route(&NewRoute {
            source: 1,
            destination: 1,
            distance: 100,
        })
        .unwrap_err();
        assert!(err.fields().contains("destination"));
    }

    #[test]
    fn test_route_needs_positive_distance() {
        let err = validate_route(&NewRoute {
            source: 1,
            destination: 2,
            distance: 0,
        })
        .unwrap_err();
        assert!(err.fields().contains("distance"));
        assert!(validate_route(&NewRoute {
            source: 1,
            destination: 2,
            distance: 1200,
        })
        .is_ok());
    }

    #[test]
    fn test_blank_airport_name_rejected() {
        let err = validate_airport(&NewAirport {
            name: "  ".to_string(),
            closest_big_city: "Kyiv".to_string(),
        })
        .unwrap_err();
        assert!(err.fields().contains("name"));
    }
}
