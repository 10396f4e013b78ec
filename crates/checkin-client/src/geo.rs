//! Uniform sampling of points inside a circular geofence.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius in meters. Flattening is ignored, which is fine
/// for fences a few hundred meters wide.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Decimal places used when coordinates are sent to the API (~1.1 m).
pub const COORDINATE_DECIMALS: usize = 5;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Render a coordinate with the fixed precision the API expects.
    pub fn format_coordinate(value: f64) -> String {
        format!("{:.*}", COORDINATE_DECIMALS, value)
    }

    /// `lat`/`long` query parameters for the check-in request.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("lat", Self::format_coordinate(self.latitude)),
            ("long", Self::format_coordinate(self.longitude)),
        ]
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            Self::format_coordinate(self.latitude),
            Self::format_coordinate(self.longitude)
        )
    }
}

/// A disk around a center point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

impl GeoFence {
    pub fn new(center: GeoPoint, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Whether `point` lies inside the fence (with a centimeter of slack).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_to(point) <= self.radius_meters + 0.01
    }

    /// Draw a point uniformly from the fence's area.
    pub fn sample(&self) -> GeoPoint {
        sample(self.center, self.radius_meters)
    }
}

/// Uniform random point within `radius_meters` of `center`, using the thread RNG.
pub fn sample(center: GeoPoint, radius_meters: f64) -> GeoPoint {
    sample_with(&mut rand::rng(), center, radius_meters)
}

/// Uniform random point within `radius_meters` of `center`.
///
/// The distance is `sqrt(u) * radius` so that density is uniform over the
/// disk's area rather than concentrated at the center.
pub fn sample_with<R: Rng + ?Sized>(rng: &mut R, center: GeoPoint, radius_meters: f64) -> GeoPoint {
    let r: f64 = rng.random();
    let theta: f64 = rng.random();

    let distance = r.sqrt() * radius_meters;
    let angle = 2.0 * PI * theta;

    offset(center, distance, angle)
}

fn offset(center: GeoPoint, distance: f64, angle: f64) -> GeoPoint {
    let delta_lat = (distance / EARTH_RADIUS_METERS * angle.sin()).to_degrees();
    let delta_long = (distance / (EARTH_RADIUS_METERS * center.latitude.to_radians().cos())
        * angle.cos())
    .to_degrees();

    GeoPoint {
        latitude: (center.latitude + delta_lat).clamp(-90.0, 90.0),
        longitude: wrap_longitude(center.longitude + delta_long),
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const YOGYAKARTA: GeoPoint = GeoPoint {
        latitude: -7.770_717,
        longitude: 110.377_724,
    };

    #[test]
    fn test_zero_radius_returns_center() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sample_with(&mut rng, YOGYAKARTA, 0.0), YOGYAKARTA);
        }
        assert_eq!(sample(YOGYAKARTA, 0.0), YOGYAKARTA);
    }

    #[test]
    fn test_samples_stay_within_radius() {
        let mut rng = StdRng::seed_from_u64(42);
        let centers = [
            YOGYAKARTA,
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(60.17, 24.94),
            GeoPoint::new(-33.86, 151.21),
        ];

        for center in centers {
            for radius in [1.0, 50.0, 250.0, 5_000.0] {
                for _ in 0..2_000 {
                    let point = sample_with(&mut rng, center, radius);
                    let distance = center.distance_to(&point);
                    // Offsets use the center's latitude for the longitude
                    // scale, so wide fences drift by a fraction of a permille.
                    assert!(
                        distance <= radius * 1.001 + 1e-6,
                        "{point} is {distance} m from {center}, radius {radius}"
                    );
                    assert!(point.is_valid());
                }
            }
        }
    }

    #[test]
    fn test_samples_are_uniform_over_area() {
        let mut rng = StdRng::seed_from_u64(1234);
        let radius = 100.0;
        let n = 20_000;

        let mut inner = 0;
        let mut outer = 0;
        let mut quadrants = [0usize; 4];

        for _ in 0..n {
            let point = sample_with(&mut rng, YOGYAKARTA, radius);
            let d = YOGYAKARTA.distance_to(&point);
            if d <= radius * 0.5 {
                inner += 1;
            }
            if d >= radius * 0.75f64.sqrt() {
                outer += 1;
            }
            let north = point.latitude >= YOGYAKARTA.latitude;
            let east = point.longitude >= YOGYAKARTA.longitude;
            quadrants[(north as usize) * 2 + east as usize] += 1;
        }

        // Each region covers a quarter of the disk's area.
        let share = |count: usize| count as f64 / n as f64;
        assert!((share(inner) - 0.25).abs() < 0.02, "inner share {}", share(inner));
        assert!((share(outer) - 0.25).abs() < 0.02, "outer share {}", share(outer));
        for q in quadrants {
            assert!((share(q) - 0.25).abs() < 0.02, "quadrant share {}", share(q));
        }
    }

    #[test]
    fn test_fence_contains_its_samples() {
        let fence = GeoFence::new(YOGYAKARTA, 80.0);
        for _ in 0..500 {
            assert!(fence.contains(&fence.sample()));
        }
        assert!(!fence.contains(&GeoPoint::new(-7.78, 110.38)));
    }

    #[test]
    fn test_format_coordinate_rounds() {
        assert_eq!(GeoPoint::format_coordinate(-7.770_717_9), "-7.77072");
        assert_eq!(GeoPoint::format_coordinate(110.0), "110.00000");
        assert_eq!(
            YOGYAKARTA.query_pairs(),
            [
                ("lat", "-7.77072".to_string()),
                ("long", "110.37772".to_string())
            ]
        );
        assert_eq!(YOGYAKARTA.to_string(), "-7.77072, 110.37772");
    }

    #[test]
    fn test_longitude_wraps_at_antimeridian() {
        let center = GeoPoint::new(0.0, 179.9999);
        // Due east, 1 km: about 0.009 degrees past the antimeridian.
        let point = offset(center, 1_000.0, 0.0);
        assert!(point.longitude < -179.99 && point.longitude >= -180.0);
        assert!(point.is_valid());
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude on the equatorial sphere.
        let d = GeoPoint::new(0.0, 0.0).distance_to(&GeoPoint::new(1.0, 0.0));
        assert!((d - 111_319.49).abs() < 0.1, "{d}");
    }
}
