// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Service Certificate Chain store.
//!
//! Entries live in an arena addressed by [`SccHandle`]s. A handle records the slot
//! generation it was issued for, so a handle to a swept entry stops resolving instead
//! of aliasing whatever reuses the slot. Issuer links are such handles, which keeps
//! the chain a lookup-only structure: removing an issuer never touches its subjects.

use super::{CertRole, Certificate, VerificationKeyIndicator};
use crate::codec::SpduCodec;
use crate::crypto::{verify_p256, CertHash, SIGNATURE_LEN, UNCOMPRESSED_POINT_LEN};
use crate::error::{Result, TrustError};
use crate::time::Time32;
use crate::types::HashedId8;

/// Weak reference to an SCC entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SccHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
pub struct SccEntry {
    pub certificate: Certificate,
    pub hash: CertHash,
    pub h8: HashedId8,
    /// Uncompressed verification key
    pub public_key: [u8; UNCOMPRESSED_POINT_LEN],
    /// `None` for the self-signed root
    pub issuer: Option<SccHandle>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<SccEntry>,
}

#[derive(Debug)]
pub struct SccStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live handles in insertion order
    order: Vec<SccHandle>,
    max_certs: usize,
    registration_authority: Option<SccHandle>,
    pseudonym_ca: Option<SccHandle>,
}

impl SccStore {
    pub fn new(max_certs: usize) -> Self {
        SccStore {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            max_certs,
            registration_authority: None,
            pseudonym_ca: None,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Decodes and inserts a certificate.
    pub fn add_certificate(&mut self, codec: &dyn SpduCodec, bytes: &[u8]) -> Result<SccHandle> {
        let certificate = codec.decode_certificate(bytes)?;
        self.insert(certificate)
    }

    /// Validates `certificate` against the store and appends it.
    ///
    /// Issuers must already be present. Nothing is modified on failure.
    pub fn insert(&mut self, certificate: Certificate) -> Result<SccHandle> {
        if self.len() >= self.max_certs {
            log::warn!("SCC store full ({} entries)", self.len());
            return Err(TrustError::TooManyCertsInTable.into());
        }

        let hash = CertHash::of(&certificate.encoded);
        if self.iter().any(|(_, e)| e.hash == hash) {
            return Err(TrustError::SameCertInTable.into());
        }

        let contents = &certificate.contents;
        contents.check_validity_window()?;

        let (public_key, issuer) = match contents.issuer_digest() {
            None => {
                if !contents.crl_series.is_root() {
                    log::error!(
                        "Self-signed certificate with CRL series {}",
                        contents.crl_series
                    );
                    return Err(TrustError::InvalidCertCrlSeries(contents.crl_series.0).into());
                }
                let (public_key, signature) = direct_key(&certificate)?;
                verify_p256(&public_key, &certificate.signing_input(&[]), &signature)?;
                (public_key, None)
            }
            Some(issuer_h8) => {
                let issuer_handle = self.find_by_hash8(&issuer_h8).ok_or_else(|| {
                    log::error!("Issuer {} not in SCC store", issuer_h8);
                    TrustError::NoIssuerCert
                })?;
                let issuer = self.get(issuer_handle).ok_or(TrustError::NoIssuerCert)?;

                if !contents.crl_series.is_authority() {
                    return Err(TrustError::InvalidCertCrlSeries(contents.crl_series.0).into());
                }
                if !contents.nested_in(&issuer.certificate.contents) {
                    log::error!("Validity window not nested in issuer {}", issuer_h8);
                    return Err(TrustError::InvalidCertValidTime.into());
                }
                let (public_key, signature) = direct_key(&certificate)?;
                verify_p256(
                    &issuer.public_key,
                    &certificate.signing_input(&issuer.certificate.encoded),
                    &signature,
                )?;
                (public_key, Some(issuer_handle))
            }
        };

        let role = contents.role();
        let entry = SccEntry {
            h8: hash.h8(),
            hash,
            public_key,
            issuer,
            certificate,
        };
        let handle = self.alloc(entry);
        self.order.push(handle);

        match role {
            CertRole::RegistrationAuthority => self.registration_authority = Some(handle),
            CertRole::PseudonymCa => self.pseudonym_ca = Some(handle),
            _ => {}
        }

        log::debug!("SCC certificate {:?} added, {} entries", role, self.len());
        Ok(handle)
    }

    fn alloc(&mut self, entry: SccEntry) -> SccHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            SccHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            SccHandle {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    pub fn get(&self, handle: SccHandle) -> Option<&SccEntry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    pub fn contains(&self, handle: SccHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Linear scan for a certificate by HashedId8.
    pub fn find_by_hash8(&self, h8: &HashedId8) -> Option<SccHandle> {
        self.iter().find(|(_, e)| e.h8 == *h8).map(|(h, _)| h)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SccHandle, &SccEntry)> + '_ {
        self.order
            .iter()
            .filter_map(move |h| self.get(*h).map(|e| (*h, e)))
    }

    pub fn registration_authority(&self) -> Option<&SccEntry> {
        self.registration_authority.and_then(|h| self.get(h))
    }

    pub fn pseudonym_ca(&self) -> Option<&SccEntry> {
        self.pseudonym_ca.and_then(|h| self.get(h))
    }

    /// Removes every entry whose validity ends before `t`. Returns the number removed.
    pub fn remove_expired(&mut self, t: Time32) -> usize {
        let expired: Vec<SccHandle> = self
            .iter()
            .filter(|(_, e)| e.certificate.contents.is_expired_at(t))
            .map(|(h, _)| h)
            .collect();

        for handle in &expired {
            let slot = &mut self.slots[handle.index as usize];
            slot.entry = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index);

            if self.registration_authority == Some(*handle) {
                self.registration_authority = None;
            }
            if self.pseudonym_ca == Some(*handle) {
                self.pseudonym_ca = None;
            }
        }
        self.order.retain(|h| !expired.contains(h));

        if !expired.is_empty() {
            log::debug!(
                "Removed {} expired SCC certificates, {} remain",
                expired.len(),
                self.len()
            );
        }
        expired.len()
    }

    /// Handles from `handle` up to the root, stopping at the first link that no
    /// longer resolves.
    pub fn chain_of(&self, handle: SccHandle) -> Vec<SccHandle> {
        let mut chain = Vec::new();
        let mut next = Some(handle);
        while let Some(h) = next {
            // links only point at earlier entries, so a longer walk means corruption
            if chain.len() > self.len() {
                break;
            }
            let Some(entry) = self.get(h) else {
                break;
            };
            chain.push(h);
            next = entry.issuer;
        }
        chain
    }

    /// Whether every link from `handle` to a self-signed root is present and valid at `t`.
    pub fn is_chain_valid(&self, handle: SccHandle, t: Time32) -> bool {
        let chain = self.chain_of(handle);
        let Some(last) = chain.last().and_then(|h| self.get(*h)) else {
            return false;
        };
        last.certificate.contents.is_self_signed()
            && chain.iter().all(|h| {
                self.get(*h)
                    .map_or(false, |e| e.certificate.contents.is_valid_at(t))
            })
    }
}

/// Key and signature of an explicit certificate. Authorities never use implicit keys.
fn direct_key(
    certificate: &Certificate,
) -> Result<([u8; UNCOMPRESSED_POINT_LEN], [u8; SIGNATURE_LEN])> {
    let VerificationKeyIndicator::Key(point) = &certificate.contents.verify_key else {
        return Err(TrustError::InvalidVerificationKeyIndicatorType.into());
    };
    let signature = certificate
        .signature
        .ok_or(TrustError::InvalidVerificationKeyIndicatorType)?;
    Ok((point.to_uncompressed()?, signature))
}
