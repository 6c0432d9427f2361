use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airport {
    pub id: Id,
    pub name: String,
    pub closest_big_city: String,
}

impl Airport {
    /// `"Modlin (Warsaw)"`
    pub fn full_name(&self) -> String {
        crate::labels::airport(&self.name, &self.closest_big_city)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirport {
    pub name: String,
    pub closest_big_city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub id: Id,
    pub source: Id,
    pub destination: Id,
    pub distance: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    pub source: Id,
    pub destination: Id,
    pub distance: i32,
}
