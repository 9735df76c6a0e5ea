// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Basic identifiers and geographic types shared by certificates and SPDUs.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Provider Service Identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Psid(pub u32);

impl Psid {
    /// Basic Safety Message.
    pub const BSM: Psid = Psid(0x20);
    /// WAVE Service Advertisement.
    pub const WSA: Psid = Psid(0x87);
    /// Certificate revocation list distribution.
    pub const CRL: Psid = Psid(0x0100);
}

impl fmt::Display for Psid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Low-order 8 bytes of a certificate's SHA-256 hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashedId8(pub [u8; 8]);

/// Low-order 10 bytes of a certificate's SHA-256 hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashedId10(pub [u8; 10]);

impl HashedId8 {
    /// Takes the low-order 8 bytes of a 32-byte hash.
    pub fn from_hash(hash: &[u8; 32]) -> Self {
        let mut id = [0u8; 8];
        id.copy_from_slice(&hash[24..]);
        HashedId8(id)
    }

    /// H1: the low-order byte, used as the EE cache bucket index.
    pub fn h1(&self) -> u8 {
        self.0[7]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl HashedId10 {
    /// Takes the low-order 10 bytes of a 32-byte hash.
    pub fn from_hash(hash: &[u8; 32]) -> Self {
        let mut id = [0u8; 10];
        id.copy_from_slice(&hash[22..]);
        HashedId10(id)
    }
}

impl TryFrom<&[u8]> for HashedId8 {
    type Error = crate::error::Error;

    fn try_from(bytes: &[u8]) -> crate::error::Result<Self> {
        let id: [u8; 8] = bytes.try_into().map_err(|_| {
            crate::error::Error::Codec(crate::error::CodecError::InvalidLength {
                field: "HashedId8",
                expected: 8,
                found: bytes.len(),
            })
        })?;
        Ok(HashedId8(id))
    }
}

impl fmt::Display for HashedId8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Position in 1/10 micro-degrees with elevation in decimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreeDLocation {
    pub latitude: i32,
    pub longitude: i32,
    pub elevation: u16,
}

/// 2D position in 1/10 micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TwoDLocation {
    pub latitude: i32,
    pub longitude: i32,
}

impl From<ThreeDLocation> for TwoDLocation {
    fn from(loc: ThreeDLocation) -> Self {
        TwoDLocation {
            latitude: loc.latitude,
            longitude: loc.longitude,
        }
    }
}

/// Rectangle given by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectangularRegion {
    pub north_west: TwoDLocation,
    pub south_east: TwoDLocation,
}

/// Geographic validity region of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeographicRegion {
    Circular { center: TwoDLocation, radius_m: u16 },
    Rectangular(Vec<RectangularRegion>),
    /// Country codes; resolving them needs a country map this crate does not carry,
    /// so identified regions accept every location.
    Identified(Vec<u16>),
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const TENTH_MICRO_DEG: f64 = 10_000_000.0;

impl GeographicRegion {
    /// Whether `loc` lies inside the region.
    pub fn contains(&self, loc: &TwoDLocation) -> bool {
        match self {
            GeographicRegion::Circular { center, radius_m } => {
                distance_m(center, loc) <= f64::from(*radius_m)
            }
            GeographicRegion::Rectangular(rects) => rects.iter().any(|r| {
                loc.latitude <= r.north_west.latitude
                    && loc.latitude >= r.south_east.latitude
                    && loc.longitude >= r.north_west.longitude
                    && loc.longitude <= r.south_east.longitude
            }),
            GeographicRegion::Identified(_) => true,
        }
    }
}

/// Haversine great-circle distance in metres.
fn distance_m(a: &TwoDLocation, b: &TwoDLocation) -> f64 {
    let lat1 = (a.latitude as f64 / TENTH_MICRO_DEG).to_radians();
    let lat2 = (b.latitude as f64 / TENTH_MICRO_DEG).to_radians();
    let dlat = lat2 - lat1;
    let dlon = ((b.longitude as f64 - a.longitude as f64) / TENTH_MICRO_DEG).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
