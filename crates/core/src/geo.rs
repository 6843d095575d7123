//! GPS point type and its EWKB column encoding.
//!
//! Points are stored as a 4-byte little-endian SRID followed by a standard
//! WKB point with `X` = latitude and `Y` = longitude, the axis order existing
//! rows use. Decoding accepts either WKB byte order; encoding always writes
//! little endian with SRID 4326.

use serde::{Deserialize, Deserializer, Serialize};

/// SRID for WGS 84 latitude/longitude.
pub const SRID_WGS84: u32 = 4326;

/// WKB geometry type code for a 2D point.
const WKB_POINT: u32 = 1;

/// Encoded size: SRID (4) + byte order (1) + type (4) + two doubles (16).
pub const EWKB_POINT_LEN: usize = 25;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WkbError {
    #[error("geometry must be 25 bytes, got {0}")]
    Length(usize),

    #[error("unknown WKB byte order marker {0}")]
    ByteOrder(u8),

    #[error("expected WKB point (type 1), got type {0}")]
    GeometryType(u32),
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(deserialize_with = "number_or_string")]
    pub latitude: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates lie within WGS 84 bounds.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Encode as SRID-prefixed little-endian WKB.
    pub fn to_ewkb(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(EWKB_POINT_LEN);
        buf.extend_from_slice(&SRID_WGS84.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&WKB_POINT.to_le_bytes());
        buf.extend_from_slice(&self.latitude.to_le_bytes());
        buf.extend_from_slice(&self.longitude.to_le_bytes());
        buf
    }

    /// Decode an SRID-prefixed WKB point. The SRID itself is not checked.
    pub fn from_ewkb(bytes: &[u8]) -> Result<Self, WkbError> {
        if bytes.len() != EWKB_POINT_LEN {
            return Err(WkbError::Length(bytes.len()));
        }
        let wkb = &bytes[4..];
        let little_endian = match wkb[0] {
            0 => false,
            1 => true,
            other => return Err(WkbError::ByteOrder(other)),
        };

        let read_u32 = |b: &[u8]| {
            let arr = [b[0], b[1], b[2], b[3]];
            if little_endian {
                u32::from_le_bytes(arr)
            } else {
                u32::from_be_bytes(arr)
            }
        };
        let read_f64 = |b: &[u8]| {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&b[..8]);
            if little_endian {
                f64::from_le_bytes(arr)
            } else {
                f64::from_be_bytes(arr)
            }
        };

        let geometry_type = read_u32(&wkb[1..5]);
        if geometry_type != WKB_POINT {
            return Err(WkbError::GeometryType(geometry_type));
        }

        Ok(Self {
            latitude: read_f64(&wkb[5..13]),
            longitude: read_f64(&wkb[13..21]),
        })
    }
}

/// Accept a coordinate given either as a JSON number or a numeric string,
/// as form inputs submit them.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(n) => Ok(n),
        Coordinate::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{s}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn ewkb_layout_is_srid_then_little_endian_point() {
        let bytes = GeoPoint::new(52.52, 13.405).to_ewkb();
        assert_eq!(bytes.len(), EWKB_POINT_LEN);
        assert_eq!(&bytes[0..4], &4326u32.to_le_bytes());
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..9], &1u32.to_le_bytes());
        assert_eq!(&bytes[9..17], &52.52f64.to_le_bytes());
        assert_eq!(&bytes[17..25], &13.405f64.to_le_bytes());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let point = GeoPoint::new(-33.8688, 151.2093);
        assert_eq!(GeoPoint::from_ewkb(&point.to_ewkb()), Ok(point));
    }

    #[test]
    fn decodes_big_endian_wkb() {
        let mut bytes = 4326u32.to_le_bytes().to_vec();
        bytes.push(0);
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&45.25f64.to_be_bytes());
        bytes.extend_from_slice(&10.5f64.to_be_bytes());

        let point = GeoPoint::from_ewkb(&bytes).unwrap();
        assert_eq!(point.latitude, 45.25);
        assert_eq!(point.longitude, 10.5);
    }

    #[test]
    fn decodes_existing_rows_with_latitude_first() {
        let mut bytes = 4326u32.to_le_bytes().to_vec();
        bytes.push(1);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&52.52f64.to_le_bytes());
        bytes.extend_from_slice(&13.405f64.to_le_bytes());

        let point = GeoPoint::from_ewkb(&bytes).unwrap();
        assert_eq!(point.latitude, 52.52);
        assert_eq!(point.longitude, 13.405);
    }

    #[test]
    fn rejects_malformed_geometry() {
        assert_matches!(GeoPoint::from_ewkb(&[0u8; 10]), Err(WkbError::Length(10)));

        let mut bad_order = GeoPoint::new(1.0, 2.0).to_ewkb();
        bad_order[4] = 7;
        assert_matches!(GeoPoint::from_ewkb(&bad_order), Err(WkbError::ByteOrder(7)));

        let mut line = GeoPoint::new(1.0, 2.0).to_ewkb();
        line[5..9].copy_from_slice(&2u32.to_le_bytes());
        assert_matches!(GeoPoint::from_ewkb(&line), Err(WkbError::GeometryType(2)));
    }

    #[test]
    fn json_accepts_numbers_and_numeric_strings() {
        let from_numbers: GeoPoint =
            serde_json::from_str(r#"{"latitude": 48.1, "longitude": 11.5}"#).unwrap();
        let from_strings: GeoPoint =
            serde_json::from_str(r#"{"latitude": "48.1", "longitude": " 11.5 "}"#).unwrap();
        assert_eq!(from_numbers, from_strings);

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude": "north", "longitude": 1}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn bounds_check() {
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.1, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
    }
}
