// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Runtime configuration for a [`crate::V2xSecurity`] context.
//!
//! Every field has a default, so a JSON document only needs to name what it changes:
//!
//! ```json
//! { "scc_max_certs": 8, "backend": { "kind": "PointEngine", "max_in_flight": 4 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ParamError, Result};

/// Signature backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// Synchronous verification and reconstruction in software
    #[default]
    Software,
    /// Accelerator that verifies against compressed or uncompressed keys
    VerifyEngine,
    /// Accelerator that needs uncompressed points, so y is recovered first
    PointEngine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Operations outstanding at the accelerator before the request thread waits
    pub max_in_flight: usize,
    /// Bounded wait used by the wait-handler thread between completions
    pub wait_timeout_ms: u64,
    /// Artificial latency added by the emulated device per operation
    pub device_latency_us: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            kind: BackendKind::Software,
            max_in_flight: 8,
            wait_timeout_ms: 100,
            device_latency_us: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct V2xConfig {
    pub scc_max_certs: usize,
    pub ee_cache_max_entries: usize,
    pub ee_cache_max_per_bucket: usize,
    /// How long a committed EE entry stays cached, independent of its validity
    pub ee_cache_retention_secs: u64,
    pub request_queue_capacity: usize,
    pub backend: BackendConfig,
}

impl Default for V2xConfig {
    fn default() -> Self {
        V2xConfig {
            scc_max_certs: 16,
            ee_cache_max_entries: 1024,
            ee_cache_max_per_bucket: 16,
            ee_cache_retention_secs: 3600,
            request_queue_capacity: 256,
            backend: BackendConfig::default(),
        }
    }
}

impl V2xConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: V2xConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(ParamError::InvalidConfig(msg.into()).into()) };

        if self.scc_max_certs == 0 {
            return invalid("scc_max_certs must be non-zero");
        }
        if self.ee_cache_max_entries == 0 || self.ee_cache_max_per_bucket == 0 {
            return invalid("EE cache limits must be non-zero");
        }
        if self.ee_cache_max_per_bucket > self.ee_cache_max_entries {
            return invalid("ee_cache_max_per_bucket exceeds ee_cache_max_entries");
        }
        if self.request_queue_capacity == 0 {
            return invalid("request_queue_capacity must be non-zero");
        }
        if self.backend.max_in_flight == 0 {
            return invalid("backend.max_in_flight must be non-zero");
        }
        if self.backend.wait_timeout_ms == 0 {
            return invalid("backend.wait_timeout_ms must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults_are_valid() {
        assert!(V2xConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            V2xConfig::from_json(r#"{ "scc_max_certs": 8, "backend": { "kind": "PointEngine" } }"#)
                .unwrap();
        assert_eq!(config.scc_max_certs, 8);
        assert_eq!(config.backend.kind, BackendKind::PointEngine);
        assert_eq!(config.backend.max_in_flight, 8);
        assert_eq!(config.ee_cache_max_entries, 1024);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = V2xConfig::from_json(r#"{ "ee_cache_max_per_bucket": 2048 }"#).unwrap_err();
        assert!(matches!(err, Error::Param(ParamError::InvalidConfig(_))));

        let err = V2xConfig::from_json("not json").unwrap_err();
        assert_eq!(err.code(), -4);
    }

    #[test]
    fn test_round_trip_json() {
        let config = V2xConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(V2xConfig::from_json(&json).unwrap(), config);
    }
}
