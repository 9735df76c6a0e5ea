// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Revocation lookup.
//!
//! Loading and distributing revocation lists is outside this crate; the pipeline only
//! asks [`RevocationList::is_revoked`] once, when a new signer is committed to the EE
//! cache.

use std::collections::HashSet;

use crate::cert::CertId;
use crate::types::HashedId10;

pub trait RevocationList: Send + Sync {
    fn is_revoked(&self, id: &CertId, h10: &HashedId10) -> bool;
}

/// In-memory revocation entries: hash-based (H10) and linkage-value based.
#[derive(Default)]
pub struct MemoryCrl {
    hashes: spin::RwLock<HashSet<HashedId10>>,
    linkage_values: spin::RwLock<HashSet<[u8; 9]>>,
}

impl MemoryCrl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke_hash(&self, h10: HashedId10) {
        log::debug!("Revocation entry added for hash {:02x?}", h10.0);
        self.hashes.write().insert(h10);
    }

    pub fn revoke_linkage_value(&self, linkage_value: [u8; 9]) {
        log::debug!("Revocation entry added for linkage value");
        self.linkage_values.write().insert(linkage_value);
    }

    pub fn len(&self) -> usize {
        self.hashes.read().len() + self.linkage_values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RevocationList for MemoryCrl {
    fn is_revoked(&self, id: &CertId, h10: &HashedId10) -> bool {
        if self.hashes.read().contains(h10) {
            return true;
        }
        match id {
            CertId::LinkageData { linkage_value, .. } => {
                self.linkage_values.read().contains(linkage_value)
            }
            _ => false,
        }
    }
}
