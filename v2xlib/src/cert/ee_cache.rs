// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! End-entity certificate cache.
//!
//! 256 buckets indexed by H1, the low byte of the certificate hash. Both the table
//! and each bucket have a fixed limit; a full cache refuses new entries rather than
//! evicting old ones, so callers are expected to run [`EeCertCache::remove_expired`]
//! on a schedule.

use super::{Certificate, SccHandle, SccStore};
use crate::crl::RevocationList;
use crate::crypto::{CertHash, UNCOMPRESSED_POINT_LEN};
use crate::error::{Result, TrustError};
use crate::time::Time64;
use crate::types::HashedId8;

const BUCKETS: usize = 256;

#[derive(Debug, Clone)]
pub struct EeCertEntry {
    pub certificate: Certificate,
    pub hash: CertHash,
    pub h8: HashedId8,
    /// Uncompressed verification key; reconstructed for implicit certificates
    pub verify_key: [u8; UNCOMPRESSED_POINT_LEN],
    /// Set lazily, re-resolved when the issuer is swept
    pub issuer: Option<SccHandle>,
    pub cache_expiry: Time64,
    revoked: bool,
}

impl EeCertEntry {
    pub fn new(
        certificate: Certificate,
        verify_key: [u8; UNCOMPRESSED_POINT_LEN],
        cache_expiry: Time64,
    ) -> Self {
        let hash = certificate.hash();
        EeCertEntry {
            h8: hash.h8(),
            hash,
            certificate,
            verify_key,
            issuer: None,
            cache_expiry,
            revoked: false,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    fn is_expired_at(&self, t: Time64) -> bool {
        self.certificate.contents.valid_end.to_time64() < t || self.cache_expiry < t
    }
}

#[derive(Debug)]
pub struct EeCertCache {
    buckets: Vec<Vec<EeCertEntry>>,
    len: usize,
    max_entries: usize,
    max_per_bucket: usize,
}

impl EeCertCache {
    pub fn new(max_entries: usize, max_per_bucket: usize) -> Self {
        EeCertCache {
            buckets: (0..BUCKETS).map(|_| Vec::new()).collect(),
            len: 0,
            max_entries,
            max_per_bucket,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_len(&self, h1: u8) -> usize {
        self.buckets[h1 as usize].len()
    }

    pub fn find_by_hash8(&self, h8: &HashedId8) -> Option<&EeCertEntry> {
        self.buckets[h8.h1() as usize].iter().find(|e| e.h8 == *h8)
    }

    pub fn find_by_hash8_mut(&mut self, h8: &HashedId8) -> Option<&mut EeCertEntry> {
        self.buckets[h8.h1() as usize]
            .iter_mut()
            .find(|e| e.h8 == *h8)
    }

    /// Appends `entry`; a refusal leaves the cache unchanged.
    pub fn insert(&mut self, entry: EeCertEntry) -> Result<()> {
        if self.len >= self.max_entries {
            log::warn!("EE cache full ({} entries)", self.len);
            return Err(TrustError::TooManyCertsInTable.into());
        }
        let bucket = &mut self.buckets[entry.h8.h1() as usize];
        if bucket.len() >= self.max_per_bucket {
            log::warn!("EE cache bucket {:#04x} full", entry.h8.h1());
            return Err(TrustError::TooManyCertsInBucket.into());
        }
        if bucket.iter().any(|e| e.hash == entry.hash) {
            return Err(TrustError::SameCertInTable.into());
        }

        log::debug!("EE certificate {} cached", entry.h8);
        bucket.push(entry);
        self.len += 1;
        Ok(())
    }

    /// Links `entry` to its issuer in the SCC store unless the existing link is alive.
    pub fn resolve_chain(entry: &mut EeCertEntry, scc: &SccStore) -> Result<SccHandle> {
        if let Some(handle) = entry.issuer {
            if scc.contains(handle) {
                return Ok(handle);
            }
        }
        let handle = entry
            .certificate
            .contents
            .issuer_digest()
            .and_then(|h8| scc.find_by_hash8(&h8))
            .ok_or_else(|| {
                log::error!("No SCC issuer for EE certificate {}", entry.h8);
                TrustError::ConstructCertChain
            })?;
        entry.issuer = Some(handle);
        Ok(handle)
    }

    /// Marks `entry` revoked if the list says so. The flag is never cleared.
    pub fn update_revocation(entry: &mut EeCertEntry, crl: &dyn RevocationList) -> bool {
        if !entry.revoked && crl.is_revoked(&entry.certificate.contents.id, &entry.hash.h10()) {
            log::debug!("EE certificate {} is revoked", entry.h8);
            entry.revoked = true;
        }
        entry.revoked
    }

    /// Re-runs the revocation check over every entry; returns how many are revoked.
    pub fn refresh_revocation(&mut self, crl: &dyn RevocationList) -> usize {
        self.buckets
            .iter_mut()
            .flat_map(|b| b.iter_mut())
            .map(|e| Self::update_revocation(e, crl))
            .filter(|revoked| *revoked)
            .count()
    }

    /// Removes entries whose validity or cache expiry precede `t`.
    pub fn remove_expired(&mut self, t: Time64) -> usize {
        let mut removed = 0;
        for bucket in self.buckets.iter_mut() {
            let before = bucket.len();
            bucket.retain(|e| !e.is_expired_at(t));
            removed += before - bucket.len();
        }
        self.len -= removed;
        if removed > 0 {
            log::debug!("Removed {} expired EE certificates, {} remain", removed, self.len);
        }
        removed
    }

    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }
}
