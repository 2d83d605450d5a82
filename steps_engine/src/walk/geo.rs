use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other`, in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_m(self, other)
    }

    /// The coordinate `metres` due north of this one.
    pub fn north_by(&self, metres: f64) -> Coordinate {
        Coordinate { lat: self.lat + (metres / EARTH_RADIUS_M).to_degrees(), lon: self.lon }
    }
}

/// A coordinate and the time it was received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coord: Coordinate,
    pub at: DateTime<Utc>,
}

impl Fix {
    pub fn new(coord: Coordinate, at: DateTime<Utc>) -> Self {
        Self { coord, at }
    }
}

pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
