use airport_shared::Airplane;
use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, ValidationError};

/// The seating grid of an airplane. Rows and seats are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    pub rows: i32,
    pub seats_in_row: i32,
}

impl SeatGrid {
    pub fn new(rows: i32, seats_in_row: i32) -> Self {
        Self { rows, seats_in_row }
    }

    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    /// Seats left once `taken` tickets are issued.
    pub fn available(&self, taken: i64) -> i64 {
        self.capacity() - taken
    }
}

impl From<&Airplane> for SeatGrid {
    fn from(airplane: &Airplane) -> Self {
        Self::new(airplane.rows, airplane.seats_in_row)
    }
}

/// Check that `(row, seat)` lies inside the airplane's grid.
///
/// Both coordinates are checked independently and every violation is
/// reported, keyed by field name. Seat uniqueness on a flight is a storage
/// constraint and is not checked here.
pub fn validate_ticket(
    row: i32,
    seat: i32,
    airplane: impl Into<SeatGrid>,
) -> Result<(), ValidationError> {
    let grid = airplane.into();
    let mut errors = FieldErrors::new();

    for (value, field, limit_name, limit) in [
        (row, "row", "rows", grid.rows),
        (seat, "seat", "seats_in_row", grid.seats_in_row),
    ] {
        if !(1..=limit).contains(&value) {
            errors.insert(
                field,
                format!(
                    "{} number must be in available range: (1, {}): (1, {})",
                    field, limit_name, limit
                ),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange(errors))
    }
}
