//! Great-circle path interpolation between two cities.

/// Number of packets animated along an active path.
pub const PACKET_COUNT: usize = 6;

/// A `[longitude, latitude]` pair in degrees.
pub type LonLat = [f64; 2];

fn to_unit_vector([lon, lat]: LonLat) -> [f64; 3] {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn from_unit_vector([x, y, z]: [f64; 3]) -> LonLat {
    let lat = z.clamp(-1.0, 1.0).asin();
    let lon = y.atan2(x);
    [lon.to_degrees(), lat.to_degrees()]
}

/// Central angle between two points, in radians.
pub fn central_angle(a: LonLat, b: LonLat) -> f64 {
    let (va, vb) = (to_unit_vector(a), to_unit_vector(b));
    let dot = va[0] * vb[0] + va[1] * vb[1] + va[2] * vb[2];
    dot.clamp(-1.0, 1.0).acos()
}

/// Mean Earth radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points.
pub fn distance_km(a: LonLat, b: LonLat) -> f64 {
    central_angle(a, b) * EARTH_RADIUS_KM
}

/// Point at fraction `t` (clamped to `[0, 1]`) along the great circle from
/// `a` to `b`.
pub fn great_circle_point(a: LonLat, b: LonLat, t: f64) -> LonLat {
    let t = t.clamp(0.0, 1.0);
    let omega = central_angle(a, b);
    if omega.abs() < 1e-12 {
        return a;
    }
    let (va, vb) = (to_unit_vector(a), to_unit_vector(b));
    let sin_omega = omega.sin();
    if sin_omega.abs() < 1e-12 {
        // Antipodal: any great circle works; fall back to linear blend.
        return [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];
    }
    let wa = ((1.0 - t) * omega).sin() / sin_omega;
    let wb = (t * omega).sin() / sin_omega;
    from_unit_vector([
        wa * va[0] + wb * vb[0],
        wa * va[1] + wb * vb[1],
        wa * va[2] + wb * vb[2],
    ])
}

/// Sample `segments + 1` evenly spaced points along the path.
pub fn great_circle_path(a: LonLat, b: LonLat, segments: usize) -> Vec<LonLat> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| great_circle_point(a, b, i as f64 / segments as f64))
        .collect()
}

/// Phase of packet `i` at `now_ms`, in `[0, 1)`.
pub fn packet_phase(i: usize, now_ms: u64) -> f64 {
    let period = 1200.0 + i as f64 * 173.0;
    (now_ms as f64 / period + i as f64 * 0.17).rem_euclid(1.0)
}

/// Positions of the animated packet storm along the path at `now_ms`.
pub fn packet_storm(a: LonLat, b: LonLat, now_ms: u64) -> Vec<LonLat> {
    (0..PACKET_COUNT)
        .map(|i| great_circle_point(a, b, packet_phase(i, now_ms)))
        .collect()
}
