use crate::models::{Event, GeoPoint, NearFilter};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Radius cutoff around a reference location.
///
/// Events without a coordinate are assigned a fixed sentinel distance and
/// run through the same inclusion test, so the filter stays total: a
/// generous radius admits them, a tight one rejects them.
pub struct SpatialFilter {
    near: NearFilter,
    sentinel_distance_km: f64,
}

impl SpatialFilter {
    pub fn new(near: NearFilter, sentinel_distance_km: f64) -> Self {
        Self {
            near,
            sentinel_distance_km,
        }
    }

    /// Distance from the reference location, sentinel for coordinate-less
    /// events.
    pub fn distance_km(&self, event: &Event) -> f64 {
        match event.coordinate {
            Some(coord) => haversine_km(self.near.location, coord),
            None => self.sentinel_distance_km,
        }
    }

    pub fn includes(&self, event: &Event) -> bool {
        self.distance_km(event) <= self.near.radius_km
    }
}
