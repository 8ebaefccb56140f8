//! Great-circle geometry for location queries.

use serde::{Deserialize, Serialize};

use super::error::{QualityError, QualityResult};

/// Mean Earth radius used for every distance computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Search radius applied when a query does not specify one.
pub const DEFAULT_RADIUS_KM: f64 = 1.0;

/// Slack added to bounding boxes so floating-point noise never drops a point
/// that lies exactly on the search circle.
const BOX_MARGIN_DEG: f64 = 1e-6;

/// A validated WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// # Errors
    /// `InvalidArgument` if either coordinate is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> QualityResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(QualityError::invalid_argument(
                "latitude",
                format!("must be a finite number within [-90, 90], got {}", latitude),
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(QualityError::invalid_argument(
                "longitude",
                format!(
                    "must be a finite number within [-180, 180], got {}",
                    longitude
                ),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine distance in kilometres between two points given in degrees.
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A strictly positive, finite radius in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRadius(f64);

impl SearchRadius {
    pub fn new(km: f64) -> QualityResult<Self> {
        if km.is_finite() && km > 0.0 {
            Ok(Self(km))
        } else {
            Err(QualityError::invalid_argument(
                "radius",
                format!("must be a positive finite number of kilometres, got {}", km),
            ))
        }
    }

    /// `None` means "not specified" and yields [`DEFAULT_RADIUS_KM`]; a
    /// supplied but invalid value is an error.
    pub fn from_optional(km: Option<f64>) -> QualityResult<Self> {
        match km {
            None => Ok(Self(DEFAULT_RADIUS_KM)),
            Some(v) => Self::new(v),
        }
    }

    pub fn km(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_RADIUS_KM)
    }
}

/// Axis-aligned lat/lng box that contains a search circle.
///
/// Used to prefilter readings in the store before the exact Haversine check.
/// When the circle touches a pole or crosses the antimeridian the longitude
/// range is widened to the full [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, radius: SearchRadius) -> Self {
        let angular = radius.km() / EARTH_RADIUS_KM;
        let delta_lat = angular.to_degrees() + BOX_MARGIN_DEG;

        let min_lat = center.latitude - delta_lat;
        let max_lat = center.latitude + delta_lat;

        if min_lat <= -90.0 || max_lat >= 90.0 {
            return Self {
                min_lat: min_lat.max(-90.0),
                max_lat: max_lat.min(90.0),
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
            return Self {
                min_lat,
                max_lat,
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        let delta_lng = ratio.asin().to_degrees() + BOX_MARGIN_DEG;
        let min_lng = center.longitude - delta_lng;
        let max_lng = center.longitude + delta_lng;

        if min_lng < -180.0 || max_lng > 180.0 {
            return Self {
                min_lat,
                max_lat,
                min_lng: -180.0,
                max_lng: 180.0,
            };
        }

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lng..=self.max_lng).contains(&longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(28.6, 77.2).is_ok());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());

        let err = GeoPoint::new(90.5, 0.0).unwrap_err();
        assert_eq!(err.field(), Some("latitude"));
        let err = GeoPoint::new(0.0, f64::NAN).unwrap_err();
        assert_eq!(err.field(), Some("longitude"));
        assert!(GeoPoint::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = point(28.6139, 77.2090);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // one degree of latitude along a meridian
        let d = haversine_distance_km(0.0, 0.0, 1.0, 0.0);
        let expected = EARTH_RADIUS_KM * 1.0f64.to_radians();
        assert!((d - expected).abs() < 1e-6, "d = {}", d);

        // Delhi to Mumbai, roughly 1150 km
        let d = haversine_distance_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((1100.0..1200.0).contains(&d), "d = {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_search_radius() {
        assert_eq!(SearchRadius::from_optional(None).unwrap().km(), 1.0);
        assert_eq!(SearchRadius::from_optional(Some(15.0)).unwrap().km(), 15.0);
        assert!(SearchRadius::from_optional(Some(0.0)).is_err());
        assert!(SearchRadius::from_optional(Some(-2.0)).is_err());
        assert!(SearchRadius::from_optional(Some(f64::NAN)).is_err());
        assert_eq!(
            SearchRadius::new(f64::INFINITY).unwrap_err().field(),
            Some("radius")
        );
    }

    #[test]
    fn test_bounding_box_regular() {
        let center = point(28.6, 77.2);
        let bbox = BoundingBox::around(center, SearchRadius::new(10.0).unwrap());
        assert!(bbox.min_lat < 28.6 && bbox.max_lat > 28.6);
        assert!(bbox.min_lng > 76.0 && bbox.max_lng < 78.5);
        assert!(bbox.contains(28.6, 77.2));
        assert!(!bbox.contains(29.6, 77.2));
    }

    #[test]
    fn test_bounding_box_near_pole_spans_all_longitudes() {
        let bbox = BoundingBox::around(point(89.99, 10.0), SearchRadius::new(5.0).unwrap());
        assert_eq!(bbox.min_lng, -180.0);
        assert_eq!(bbox.max_lng, 180.0);
        assert_eq!(bbox.max_lat, 90.0);
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        let bbox = BoundingBox::around(point(0.0, 179.99), SearchRadius::new(50.0).unwrap());
        assert_eq!(bbox.min_lng, -180.0);
        assert_eq!(bbox.max_lng, 180.0);
        assert!(bbox.contains(0.0, -179.9));
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0..90.0f64, lng1 in -180.0..180.0f64,
            lat2 in -90.0..90.0f64, lng2 in -180.0..180.0f64,
        ) {
            let ab = haversine_distance_km(lat1, lng1, lat2, lng2);
            let ba = haversine_distance_km(lat2, lng2, lat1, lng1);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab >= 0.0);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }

        #[test]
        fn prop_points_inside_circle_are_inside_box(
            lat in -80.0..80.0f64, lng in -170.0..170.0f64,
            radius in 0.1..200.0f64,
            bearing in 0.0..360.0f64, frac in 0.0..1.0f64,
        ) {
            let center = GeoPoint::new(lat, lng).unwrap();
            let bbox = BoundingBox::around(center, SearchRadius::new(radius).unwrap());

            // destination point at distance radius*frac along bearing
            let d = radius * frac / EARTH_RADIUS_KM;
            let lat1 = lat.to_radians();
            let brg = bearing.to_radians();
            let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * brg.cos()).asin();
            let lng2 = lng.to_radians()
                + (brg.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());

            let plat = lat2.to_degrees();
            let plng = (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
            prop_assert!(bbox.contains(plat, plng), "{:?} misses ({}, {})", bbox, plat, plng);
        }
    }
}
