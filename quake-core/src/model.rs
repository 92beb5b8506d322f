use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single earthquake observation. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earthquake {
    id: i64,
    longitude: f64,
    latitude: f64,
    #[serde(rename = "mag")]
    magnitude: f64,
    #[serde(rename = "time")]
    timestamp: DateTime<Utc>,
    place: String,
}

impl Earthquake {
    pub fn new(
        id: i64,
        longitude: f64,
        latitude: f64,
        magnitude: f64,
        timestamp: DateTime<Utc>,
        place: impl Into<String>,
    ) -> Self {
        Self {
            id,
            longitude,
            latitude,
            magnitude,
            timestamp,
            place: place.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn place(&self) -> &str {
        &self.place
    }
}
