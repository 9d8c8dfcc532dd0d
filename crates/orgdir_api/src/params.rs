//! Caller parameter validation.
//!
//! Ranges mirror the public query surface: `maxDepth` 1..=10, `limit`
//! 1..=100, non-empty name query, WGS84 coordinates, positive radius and
//! ordered bounds.

use crate::error::{ApiError, ApiResult};
use orgdir_core::{BoundingBox, GeoPoint};

pub const MAX_DEPTH_RANGE: (u32, u32) = (1, 10);
pub const SEARCH_LIMIT_RANGE: (u32, u32) = (1, 100);

pub(crate) fn max_depth(value: Option<u32>) -> ApiResult<Option<u32>> {
    optional_in_range("max_depth", value, MAX_DEPTH_RANGE)
}

pub(crate) fn search_limit(value: Option<u32>) -> ApiResult<Option<u32>> {
    optional_in_range("limit", value, SEARCH_LIMIT_RANGE)
}

pub(crate) fn name_query(value: &str) -> ApiResult<&str> {
    if value.is_empty() {
        return Err(ApiError::invalid("query", "must contain at least 1 character"));
    }
    Ok(value)
}

pub(crate) fn point(latitude: f64, longitude: f64) -> ApiResult<GeoPoint> {
    Ok(GeoPoint::new(
        coordinate("latitude", latitude, 90.0)?,
        coordinate("longitude", longitude, 180.0)?,
    ))
}

pub(crate) fn radius(value: f64) -> ApiResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ApiError::invalid(
            "radius_meters",
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

pub(crate) fn bounds(
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
) -> ApiResult<BoundingBox> {
    let bbox = BoundingBox::new(
        coordinate("min_latitude", min_latitude, 90.0)?,
        coordinate("max_latitude", max_latitude, 90.0)?,
        coordinate("min_longitude", min_longitude, 180.0)?,
        coordinate("max_longitude", max_longitude, 180.0)?,
    );
    if bbox.min_latitude > bbox.max_latitude {
        return Err(ApiError::invalid(
            "min_latitude",
            "must be <= max_latitude",
        ));
    }
    if bbox.min_longitude > bbox.max_longitude {
        return Err(ApiError::invalid(
            "min_longitude",
            "must be <= max_longitude",
        ));
    }
    Ok(bbox)
}

fn coordinate(name: &'static str, value: f64, limit: f64) -> ApiResult<f64> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::invalid(
            name,
            format!("must be within [-{limit}, {limit}], got {value}"),
        ))
    }
}

fn optional_in_range(
    name: &'static str,
    value: Option<u32>,
    (min, max): (u32, u32),
) -> ApiResult<Option<u32>> {
    match value {
        Some(value) if !(min..=max).contains(&value) => Err(ApiError::invalid(
            name,
            format!("must be within [{min}, {max}], got {value}"),
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::{bounds, max_depth, name_query, point, radius, search_limit};

    #[test]
    fn depth_and_limit_ranges_are_inclusive() {
        assert_eq!(max_depth(None).unwrap(), None);
        assert_eq!(max_depth(Some(1)).unwrap(), Some(1));
        assert_eq!(max_depth(Some(10)).unwrap(), Some(10));
        assert!(max_depth(Some(0)).is_err());
        assert!(max_depth(Some(11)).is_err());

        assert_eq!(search_limit(Some(100)).unwrap(), Some(100));
        assert!(search_limit(Some(0)).is_err());
        assert!(search_limit(Some(101)).is_err());
    }

    #[test]
    fn name_query_rejects_only_empty_input() {
        assert!(name_query("").is_err());
        assert_eq!(name_query(" ").unwrap(), " ");
    }

    #[test]
    fn coordinates_and_radius_are_checked() {
        assert!(point(90.0, -180.0).is_ok());
        assert!(point(90.1, 0.0).is_err());
        assert!(point(0.0, f64::NAN).is_err());
        assert!(radius(0.0).is_err());
        assert!(radius(f64::INFINITY).is_err());
        assert_eq!(radius(0.5).unwrap(), 0.5);
    }

    #[test]
    fn bounds_must_be_ordered() {
        assert!(bounds(55.7, 55.8, 37.5, 37.7).is_ok());
        assert!(bounds(55.7, 55.7, 37.5, 37.5).is_ok());

        let err = bounds(55.8, 55.7, 37.5, 37.7).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("min_latitude"));
        assert!(bounds(55.7, 55.8, 37.7, 37.5).is_err());
    }
}
