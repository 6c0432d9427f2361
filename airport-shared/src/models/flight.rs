use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Crew {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
}

/// A scheduled flight. Crew membership is a set; order is not meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: Id,
    pub route: Id,
    pub airplane: Id,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crews: Vec<Id>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub route: Id,
    pub airplane: Id,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default)]
    pub crews: Vec<Id>,
}

impl NewFlight {
    /// Crew ids sorted and deduplicated.
    pub fn crew_set(&self) -> Vec<Id> {
        let mut crews = self.crews.clone();
        crews.sort_unstable();
        crews.dedup();
        crews
    }
}
