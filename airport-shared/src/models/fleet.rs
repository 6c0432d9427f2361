use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AirplaneType {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplaneType {
    pub name: String,
}

/// An airplane and its seating grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airplane {
    pub id: Id,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: Id,
}

impl Airplane {
    /// Total number of seats: `rows * seats_in_row`.
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplane {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: Id,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_rows_times_seats() {
        let airplane = Airplane {
            id: 1,
            name: "Boeing 777".to_string(),
            rows: 10,
            seats_in_row: 10,
            airplane_type: 1,
        };
        assert_eq!(airplane.capacity(), 100);
    }

    #[test]
    fn test_capacity_does_not_overflow_i32() {
        let airplane = Airplane {
            id: 1,
            name: "Huge".to_string(),
            rows: i32::MAX,
            seats_in_row: 2,
            airplane_type: 1,
        };
        assert_eq!(airplane.capacity(), i64::from(i32::MAX) * 2);
    }
}
