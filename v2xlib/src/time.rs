// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Time utilities for certificate validity and SPDU header fields.
//!
//! Both representations count from the 1609.2 epoch, 2004-01-01T00:00:00Z.
//! Leap seconds are not modelled:
//! - [`Time32`] counts seconds and is used for certificate validity periods
//! - [`Time64`] counts microseconds and is used for SPDU generation/expiry times

use core::fmt;
use core::ops::{Add, Sub};
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unix timestamp (seconds) of 2004-01-01T00:00:00Z.
pub const EPOCH_2004_UNIX_SECS: u64 = 1_072_915_200;

/// Seconds since the 1609.2 epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Time32(pub u32);

/// Microseconds since the 1609.2 epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Time64(pub u64);

impl Time32 {
    /// Latest representable time.
    pub const MAX: Time32 = Time32(u32::MAX);

    /// Converts to microsecond resolution.
    pub fn to_time64(self) -> Time64 {
        Time64(self.0 as u64 * 1_000_000)
    }

    /// Adds a number of seconds, saturating at [`Time32::MAX`].
    pub fn saturating_add_secs(self, secs: u32) -> Time32 {
        Time32(self.0.saturating_add(secs))
    }

    /// Current wall-clock time.
    pub fn now() -> Result<Time32> {
        Ok(Time64::now()?.to_time32())
    }
}

impl Time64 {
    /// Truncates to second resolution, saturating at [`Time32::MAX`].
    pub fn to_time32(self) -> Time32 {
        let secs = self.0 / 1_000_000;
        Time32(u32::try_from(secs).unwrap_or(u32::MAX))
    }

    /// Builds a Time64 from a Unix duration. Instants before 2004 are rejected.
    pub fn from_unix_duration(since_unix: Duration) -> Result<Time64> {
        let epoch = Duration::from_secs(EPOCH_2004_UNIX_SECS);
        let since_epoch = since_unix
            .checked_sub(epoch)
            .ok_or_else(|| Error::internal("time precedes the 2004 epoch"))?;
        let micros = u64::try_from(since_epoch.as_micros())
            .map_err(|_| Error::internal("time out of Time64 range"))?;
        Ok(Time64(micros))
    }

    /// Current wall-clock time.
    pub fn now() -> Result<Time64> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| Error::internal("system clock before Unix epoch"))?;
        Self::from_unix_duration(now)
    }
}

impl Add<Duration> for Time64 {
    type Output = Time64;

    fn add(self, rhs: Duration) -> Time64 {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Time64(self.0.saturating_add(micros))
    }
}

impl Sub<Duration> for Time64 {
    type Output = Time64;

    fn sub(self, rhs: Duration) -> Time64 {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Time64(self.0.saturating_sub(micros))
    }
}

impl fmt::Display for Time32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl fmt::Display for Time64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion() {
        let t = Time32(100);
        assert_eq!(t.to_time64(), Time64(100_000_000));
        assert_eq!(Time64(100_999_999).to_time32(), Time32(100));
    }

    #[test]
    fn test_time64_saturates_into_time32() {
        assert_eq!(Time64(u64::MAX).to_time32(), Time32::MAX);
    }

    #[test]
    fn test_from_unix_duration() {
        let t = Time64::from_unix_duration(Duration::from_secs(EPOCH_2004_UNIX_SECS + 5)).unwrap();
        assert_eq!(t, Time64(5_000_000));
        assert!(Time64::from_unix_duration(Duration::from_secs(0)).is_err());
    }

    #[test]
    fn test_duration_arithmetic() {
        let t = Time64(1_000_000);
        assert_eq!(t + Duration::from_millis(500), Time64(1_500_000));
        assert_eq!(t - Duration::from_secs(5), Time64(0));
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(Time64::now().unwrap().0 > 0);
    }
}
