const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Whether a reported point is physically plausible.
///
/// Rejects non-finite values, anything outside the lat/lng ranges, and the
/// `(0, 0)` sentinel that GPS modules and integrations emit before they have
/// a fix. No geofencing happens here; keeping the map near the stations is
/// the viewport's job.
pub fn is_valid(lat: f64, lng: f64) -> bool {
    if !lat.is_finite() || !lng.is_finite() {
        return false;
    }
    if lat.abs() > MAX_LATITUDE || lng.abs() > MAX_LONGITUDE {
        return false;
    }
    if lat == 0.0 && lng == 0.0 {
        return false;
    }
    true
}
