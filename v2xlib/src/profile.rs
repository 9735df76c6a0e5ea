// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Security profiles and the certificate holder.
//!
//! A [`SecurityProfile`] says, per PSID, what a sender puts in the header and what a
//! receiver checks. The [`CertificateHolder`] owns the local signing keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cert::{Certificate, IssuedCertificate};
use crate::crypto::PrivateKey;
use crate::error::{ProfileError, Result};
use crate::time::Time64;
use crate::types::{HashedId8, Psid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityProfile {
    pub psid: Psid,

    // sending
    /// Expiry written into the header is generation time plus this lifetime
    pub spdu_lifetime_ms: u64,
    /// Minimum gap between envelopes carrying the full signer certificate
    pub cert_interval_ms: u64,
    pub include_generation_time: bool,
    pub include_expiry_time: bool,
    pub include_generation_location: bool,

    // receiving
    pub verify_signatures: bool,
    pub check_expiry: bool,
    pub check_generation_time: bool,
    /// Tolerated clock skew for generation times ahead of the receive time
    pub max_future_skew_ms: u64,
    pub check_generation_location: bool,
}

impl Default for SecurityProfile {
    fn default() -> Self {
        SecurityProfile {
            psid: Psid(0),
            spdu_lifetime_ms: 30_000,
            cert_interval_ms: 450,
            include_generation_time: true,
            include_expiry_time: true,
            include_generation_location: false,
            verify_signatures: true,
            check_expiry: true,
            check_generation_time: true,
            max_future_skew_ms: 2_000,
            check_generation_location: false,
        }
    }
}

impl SecurityProfile {
    pub fn new(psid: Psid) -> Self {
        SecurityProfile {
            psid,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct ProfileSlot {
    profile: SecurityProfile,
    last_cert_sent: Option<Time64>,
}

/// Profiles keyed by PSID, with the per-profile certificate-inclusion clock.
#[derive(Debug, Default)]
pub struct ProfileStore {
    slots: spin::Mutex<HashMap<Psid, ProfileSlot>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON array of profiles.
    pub fn from_json(json: &str) -> Result<Self> {
        let profiles: Vec<SecurityProfile> = serde_json::from_str(json)?;
        let store = Self::new();
        for profile in profiles {
            store.register(profile);
        }
        Ok(store)
    }

    /// Adds or replaces the profile for its PSID.
    pub fn register(&self, profile: SecurityProfile) {
        log::debug!("Security profile registered for PSID {}", profile.psid);
        self.slots.lock().insert(
            profile.psid,
            ProfileSlot {
                profile,
                last_cert_sent: None,
            },
        );
    }

    pub fn get(&self, psid: Psid) -> Result<SecurityProfile> {
        self.slots
            .lock()
            .get(&psid)
            .map(|s| s.profile.clone())
            .ok_or_else(|| ProfileError::NoSecProfile(psid.0).into())
    }

    pub fn last_cert_sent(&self, psid: Psid) -> Option<Time64> {
        self.slots.lock().get(&psid).and_then(|s| s.last_cert_sent)
    }

    pub fn record_cert_sent(&self, psid: Psid, at: Time64) {
        if let Some(slot) = self.slots.lock().get_mut(&psid) {
            slot.last_cert_sent = Some(at);
        }
    }

    /// Forgets when the certificate was last sent, so the next envelope carries it.
    pub fn reset_cert_sent(&self, psid: Psid) {
        if let Some(slot) = self.slots.lock().get_mut(&psid) {
            slot.last_cert_sent = None;
        }
    }
}

/// Key and certificate used for one signature.
#[derive(Debug, Clone)]
pub struct SigningMaterial {
    pub private_key: PrivateKey,
    pub certificate: Certificate,
    pub h8: HashedId8,
    /// End of the certificate's validity
    pub expiry: Time64,
}

/// Source of local signing material.
pub trait CertificateHolder: Send + Sync {
    fn signing_material(&self, psid: Psid, gen_time: Time64) -> Result<SigningMaterial>;
}

/// Holder backed by a fixed list of certificates; the newest usable one signs.
#[derive(Default)]
pub struct StaticCertificateHolder {
    certificates: spin::RwLock<Vec<IssuedCertificate>>,
}

impl StaticCertificateHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, issued: IssuedCertificate) {
        self.certificates.write().push(issued);
    }

    pub fn remove(&self, h8: &HashedId8) -> bool {
        let mut certs = self.certificates.write();
        let before = certs.len();
        certs.retain(|c| c.certificate.h8() != *h8);
        certs.len() != before
    }
}

impl CertificateHolder for StaticCertificateHolder {
    fn signing_material(&self, psid: Psid, gen_time: Time64) -> Result<SigningMaterial> {
        let at = gen_time.to_time32();
        self.certificates
            .read()
            .iter()
            .rev()
            .find(|c| c.certificate.contents.permits(psid) && c.certificate.contents.is_valid_at(at))
            .map(|c| SigningMaterial {
                private_key: c.private_key.clone(),
                certificate: c.certificate.clone(),
                h8: c.certificate.h8(),
                expiry: c.certificate.contents.valid_end.to_time64(),
            })
            .ok_or_else(|| ProfileError::NoSigningMaterial(psid.0).into())
    }
}
