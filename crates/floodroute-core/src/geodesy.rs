//! Geodesic math for route sampling and distance calculations.
//!
//! All functions are pure and stateless; angles at the API surface are in
//! degrees on WGS84 latitude/longitude.

use crate::error::GeodesyError;
use crate::models::Coordinate;
use serde::{Deserialize, Serialize};

/// Mean Earth radius for the spherical great-circle model.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// WGS84 ellipsoid, used only by the UTM conversion.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_E2: f64 = 0.006_694_379_990_14;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

// Latitude nudge applied when a ray-cast ties a polygon vertex exactly.
const VERTEX_TIE_EPS: f64 = 1e-12;

/// Great-circle distance between two points in meters (haversine formula).
///
/// Spherical Earth model, no altitude term. Error grows with distance but is
/// acceptable at route-segment scale (under ~50 km).
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial great-circle bearing from `from` to `to`.
///
/// Degrees in [0, 360), 0 = north, clockwise positive.
pub fn bearing_deg(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lambda = (to.lon - from.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Project a point `distance_m` along `bearing_deg` from `start`.
///
/// Standard spherical direct geodesic; the approximate inverse of
/// [`haversine_distance`] + [`bearing_deg`].
pub fn destination_point(start: Coordinate, distance_m: f64, bearing_deg: f64) -> Coordinate {
    if distance_m.abs() <= f64::EPSILON {
        return start;
    }

    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Linear interpolation between two points in lat/lon space.
///
/// Not a geodesic slerp: fine for the short spans produced by route
/// sampling, biased for long or near-pole spans. Known limitation.
pub fn interpolate(start: Coordinate, end: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        start.lat + (end.lat - start.lat) * fraction,
        start.lon + (end.lon - start.lon) * fraction,
    )
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Hemisphere of a UTM coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

/// A projected UTM position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoordinate {
    pub easting: f64,
    pub northing: f64,
    pub zone: u8,
    pub hemisphere: Hemisphere,
}

/// Convert a WGS84 coordinate to UTM easting/northing.
///
/// Snyder/USGS series expansion on the WGS84 ellipsoid, truncated to the
/// usual terms. Adequate for display and reporting, not survey-grade; the
/// truncation is part of the numeric contract and must not be extended.
pub fn to_utm(coord: Coordinate) -> UtmCoordinate {
    let zone = (((coord.lon + 180.0) / 6.0).floor() as i32 + 1) as u8;
    let lon_origin_deg = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

    let lat_rad = coord.lat.to_radians();
    let e2 = WGS84_E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let tan_lat = lat_rad.tan();

    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * (coord.lon - lon_origin_deg).to_radians();

    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin());

    let easting = UTM_K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + UTM_FALSE_EASTING;

    let mut northing = UTM_K0
        * (m + n
            * tan_lat
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    let hemisphere = if coord.lat < 0.0 {
        northing += UTM_FALSE_NORTHING_SOUTH;
        Hemisphere::South
    } else {
        Hemisphere::North
    };

    UtmCoordinate {
        easting,
        northing,
        zone,
        hemisphere,
    }
}

/// Six-parameter affine transform from pixel space to geographic space,
/// GDAL layout: `x = origin_x + col·pixel_width + row·row_rotation`,
/// `y = origin_y + col·col_rotation + row·pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

/// Map a coordinate to the raster pixel containing it.
///
/// Inverts the transform's 2×2 linear part; a zero determinant (degenerate
/// raster) is an error rather than NaN output.
pub fn geo_to_pixel(coord: Coordinate, transform: &GeoTransform) -> Result<(i64, i64), GeodesyError> {
    let det =
        transform.pixel_width * transform.pixel_height - transform.row_rotation * transform.col_rotation;
    if det.abs() < f64::EPSILON {
        return Err(GeodesyError::DegenerateTransform);
    }

    let dx = coord.lon - transform.origin_x;
    let dy = coord.lat - transform.origin_y;
    let col = (dx * transform.pixel_height - dy * transform.row_rotation) / det;
    let row = (dy * transform.pixel_width - dx * transform.col_rotation) / det;

    Ok((col.floor() as i64, row.floor() as i64))
}

/// Simplify a polyline with the Douglas-Peucker algorithm.
///
/// Keeps the point of maximum perpendicular deviation from each chord when
/// that deviation exceeds `tolerance_m`, otherwise collapses the span to its
/// endpoints. Runs on an explicit work stack so pathological polylines
/// cannot exhaust call depth. Inputs with fewer than 3 points are returned
/// unchanged.
pub fn simplify_path(points: &[Coordinate], tolerance_m: f64) -> Vec<Coordinate> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut spans = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = spans.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_deviation = 0.0;
        let mut max_index = first;
        for index in first + 1..last {
            let deviation = perpendicular_deviation_m(points[index], points[first], points[last]);
            if deviation > max_deviation {
                max_deviation = deviation;
                max_index = index;
            }
        }
        if max_deviation > tolerance_m {
            keep[max_index] = true;
            spans.push((first, max_index));
            spans.push((max_index, last));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Perpendicular deviation of `point` from the chord `start`..`end`.
///
/// Shoelace triangle area over the haversine base length; the area is taken
/// in a local projection anchored at the chord start.
fn perpendicular_deviation_m(point: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    let base_m = haversine_distance(start, end);
    if base_m < f64::EPSILON {
        return haversine_distance(point, start);
    }

    let ref_lat = start.lat;
    let meters_lat = meters_per_deg_lat(ref_lat);
    let meters_lon = meters_per_deg_lon(ref_lat);

    let ex = (end.lon - start.lon) * meters_lon;
    let ey = (end.lat - start.lat) * meters_lat;
    let px = (point.lon - start.lon) * meters_lon;
    let py = (point.lat - start.lat) * meters_lat;

    let area2 = (ex * py - ey * px).abs();
    area2 / base_m
}

/// Even-odd point-in-polygon test over an ordered vertex ring.
///
/// The ray is cast along latitude; a test latitude that exactly ties a
/// vertex is nudged by a tiny epsilon so edge-touching rays are not counted
/// twice. The directional bias this introduces is far below realistic vertex
/// spacing.
pub fn point_in_polygon(point: Coordinate, ring: &[Coordinate]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut lat = point.lat;
    if ring.iter().any(|vertex| vertex.lat == lat) {
        lat += VERTEX_TIE_EPS;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let yi = ring[i].lat;
        let xi = ring[i].lon;
        let yj = ring[j].lat;
        let xj = ring[j].lon;

        if ((yi > lat) != (yj > lat)) && (point.lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn haversine_symmetric_and_zero() {
        let a = Coordinate::new(33.6846, -117.8265);
        let b = Coordinate::new(34.0522, -118.2437);
        assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
        assert!(haversine_distance(a, a) < 0.001);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing_deg(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn destination_point_inverts_distance_and_bearing() {
        let start = Coordinate::new(33.6846, -117.8265);
        for distance_m in [100.0, 5_000.0, 100_000.0] {
            for bearing in [0.0, 37.0, 90.0, 135.5, 270.0] {
                let dest = destination_point(start, distance_m, bearing);
                let measured = haversine_distance(start, dest);
                assert!(
                    (measured - distance_m).abs() < 0.01,
                    "distance {distance_m} bearing {bearing}: got {measured}"
                );
            }
        }
    }

    #[test]
    fn interpolate_midpoint() {
        let mid = interpolate(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 4.0), 0.5);
        assert_eq!(mid, Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn utm_equator_prime_meridian() {
        // Known value: (0, 0) is zone 31N, easting ~166,021.44 m.
        let utm = to_utm(Coordinate::new(0.0, 0.0));
        assert_eq!(utm.zone, 31);
        assert_eq!(utm.hemisphere, Hemisphere::North);
        assert!((utm.easting - 166_021.44).abs() < 5.0, "easting {}", utm.easting);
        assert!(utm.northing.abs() < 1.0);
    }

    #[test]
    fn utm_central_meridian() {
        // On a zone's central meridian the easting is exactly the false easting.
        let utm = to_utm(Coordinate::new(45.0, 3.0));
        assert_eq!(utm.zone, 31);
        assert!((utm.easting - 500_000.0).abs() < 0.01);
    }

    #[test]
    fn utm_southern_hemisphere_offset() {
        let utm = to_utm(Coordinate::new(-0.001, 3.0));
        assert_eq!(utm.hemisphere, Hemisphere::South);
        assert!(utm.northing > 9_999_000.0, "northing {}", utm.northing);
    }

    #[test]
    fn geo_to_pixel_axis_aligned() {
        let transform = GeoTransform {
            origin_x: -122.5,
            pixel_width: 0.001,
            row_rotation: 0.0,
            origin_y: 37.8,
            col_rotation: 0.0,
            pixel_height: -0.001,
        };
        let (col, row) = geo_to_pixel(Coordinate::new(37.7895, -122.4895), &transform).unwrap();
        assert_eq!((col, row), (10, 10));
    }

    #[test]
    fn geo_to_pixel_degenerate_transform() {
        let transform = GeoTransform {
            origin_x: 0.0,
            pixel_width: 0.0,
            row_rotation: 0.0,
            origin_y: 0.0,
            col_rotation: 0.0,
            pixel_height: 0.0,
        };
        assert!(matches!(
            geo_to_pixel(Coordinate::new(1.0, 1.0), &transform),
            Err(GeodesyError::DegenerateTransform)
        ));
    }

    #[test]
    fn simplify_collapses_straight_line() {
        let line: Vec<Coordinate> = (0..5)
            .map(|i| Coordinate::new(33.0 + 0.001 * i as f64, -117.0))
            .collect();
        for tolerance in [0.0, 0.5, 10.0] {
            let simplified = simplify_path(&line, tolerance);
            assert_eq!(simplified, vec![line[0], line[4]], "tolerance {tolerance}");
        }
    }

    #[test]
    fn simplify_keeps_deviating_point() {
        let points = vec![
            Coordinate::new(33.0, -117.0),
            Coordinate::new(33.001, -117.005),
            Coordinate::new(33.002, -117.0),
        ];
        let simplified = simplify_path(&points, 10.0);
        assert_eq!(simplified.len(), 3);

        let flattened = simplify_path(&points, 1_000.0);
        assert_eq!(flattened, vec![points[0], points[2]]);
    }

    #[test]
    fn simplify_short_input_unchanged() {
        let points = vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)];
        assert_eq!(simplify_path(&points, 5.0), points);
    }

    #[test]
    fn point_in_unit_square() {
        let square = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ];
        assert!(point_in_polygon(Coordinate::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Coordinate::new(5.0, 5.0), &square));
    }

    #[test]
    fn point_in_polygon_vertex_latitude_tie() {
        let square = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ];
        // Test latitude exactly equals two vertex latitudes.
        assert!(point_in_polygon(Coordinate::new(0.0, 0.5), &square));
        assert!(!point_in_polygon(Coordinate::new(0.0, 2.0), &square));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let ring = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)];
        assert!(!point_in_polygon(Coordinate::new(0.5, 0.5), &ring));
    }
}
