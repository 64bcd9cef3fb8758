use crate::sdk::entities::Coord;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in decimal degrees.
///
/// Uses the haversine formula. Ranges are not validated here; callers are
/// expected to sanitize coordinates first.
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Same as [`haversine_km`], for two [`Coord`]s.
#[inline]
pub fn distance_km(a: Coord, b: Coord) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}
