// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Certificates and the two stores that hold them.
//!
//! - [`SccStore`]: trust anchors and authority certificates, validated on insertion
//! - [`EeCertCache`]: signer certificates seen on received envelopes
//! - [`CertificateBuilder`]: issues certificates under a local key, for provisioning
//!   and tests

pub mod common;
mod ee_cache;
mod issue;
mod scc;

pub use self::common::*;
pub use self::ee_cache::*;
pub use self::issue::*;
pub use self::scc::*;

use crate::config::V2xConfig;
use crate::crypto::{signing_input, CertHash, SIGNATURE_LEN};
use crate::types::HashedId8;

/// A decoded certificate together with the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub contents: CertCommonContents,
    /// Canonical encoding of the to-be-signed fields
    pub tbs_bytes: Vec<u8>,
    /// Issuer signature; implicit certificates carry none
    pub signature: Option<[u8; SIGNATURE_LEN]>,
    /// Full encoding, the input to the certificate hash
    pub encoded: Vec<u8>,
}

impl Certificate {
    pub fn hash(&self) -> CertHash {
        CertHash::of(&self.encoded)
    }

    pub fn h8(&self) -> HashedId8 {
        self.hash().h8()
    }

    /// Signature input for this certificate given its issuer's encoding.
    ///
    /// Self-signed certificates pass an empty issuer.
    pub fn signing_input(&self, issuer_encoded: &[u8]) -> Vec<u8> {
        signing_input(&self.tbs_bytes, issuer_encoded)
    }
}

/// SCC store and EE cache, guarded together by one lock.
#[derive(Debug)]
pub struct TrustStore {
    pub scc: SccStore,
    pub ee: EeCertCache,
}

impl TrustStore {
    pub fn new(config: &V2xConfig) -> Self {
        TrustStore {
            scc: SccStore::new(config.scc_max_certs),
            ee: EeCertCache::new(config.ee_cache_max_entries, config.ee_cache_max_per_bucket),
        }
    }
}
