use airport_shared::{NewAirplane, NewAirplaneType};

use crate::errors::{FieldErrors, ValidationError};
use crate::network::check_name;

pub fn validate_airplane_type(airplane_type: &NewAirplaneType) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    check_name(&mut errors, "name", &airplane_type.name);
    ValidationError::check_invalid(errors)
}

/// Seat grid dimensions must be positive so that every flight has capacity.
pub fn validate_airplane(airplane: &NewAirplane) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    check_name(&mut errors, "name", &airplane.name);
    if airplane.rows <= 0 {
        errors.insert("rows", "Ensure this value is greater than or equal to 1.");
    }
    if airplane.seats_in_row <= 0 {
        errors.insert("seats_in_row", "Ensure this value is greater than or equal to 1.");
    }
    ValidationError::check_invalid(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_grid_rejected() {
        let err = validate_airplane(&NewAirplane {
            name: "Glider".to_string(),
            rows: 0,
            seats_in_row: -1,
            airplane_type: 1,
        })
        .unwrap_err();
        assert!(err.fields().contains("rows"));
        assert!(err.fields().contains("seats_in_row"));
    }
}
