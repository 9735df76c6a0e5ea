// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Fields shared by authority and end-entity certificates.

use core::fmt;

use crate::crypto::EccP256Point;
use crate::error::{Result, TrustError};
use crate::time::Time32;
use crate::types::{GeographicRegion, HashedId8, Psid, TwoDLocation};

/// How the certificate conveys its verification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertType {
    Explicit,
    Implicit,
}

/// Certificate identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertId {
    None,
    Name(String),
    BinaryId(Vec<u8>),
    /// Pseudonym identity matched against linkage-based revocation entries
    LinkageData { i_cert: u16, linkage_value: [u8; 9] },
}

/// Reference to the issuing certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerRef {
    SelfSigned,
    Digest(HashedId8),
}

/// CRL series classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrlSeries(pub u16);

impl CrlSeries {
    pub const PSEUDONYM: CrlSeries = CrlSeries(1);
    pub const APPLICATION: CrlSeries = CrlSeries(2);
    pub const IDENTIFICATION: CrlSeries = CrlSeries(3);
    pub const ENROLLMENT: CrlSeries = CrlSeries(4);

    pub const ROOT_CA: CrlSeries = CrlSeries(0x100);
    pub const INTERMEDIATE_CA: CrlSeries = CrlSeries(0x101);
    pub const ENROLLMENT_CA: CrlSeries = CrlSeries(0x102);
    pub const PSEUDONYM_CA: CrlSeries = CrlSeries(0x103);
    pub const REGISTRATION_AUTHORITY: CrlSeries = CrlSeries(0x104);
    pub const CRL_GENERATOR: CrlSeries = CrlSeries(0x105);

    /// Series allowed for issuer-signed certificates in the SCC store.
    pub fn is_authority(self) -> bool {
        (Self::INTERMEDIATE_CA.0..=Self::CRL_GENERATOR.0).contains(&self.0)
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT_CA
    }
}

impl fmt::Display for CrlSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Position of a certificate in the PKI, derived from its CRL series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertRole {
    Root,
    Intermediate,
    EnrollmentCa,
    PseudonymCa,
    RegistrationAuthority,
    CrlGenerator,
    EndEntity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationKeyIndicator {
    Key(EccP256Point),
    ReconstructionValue(EccP256Point),
}

/// Parsed to-be-signed certificate contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertCommonContents {
    pub cert_type: CertType,
    pub id: CertId,
    pub issuer: IssuerRef,
    pub valid_start: Time32,
    pub valid_end: Time32,
    pub crl_series: CrlSeries,
    pub region: Option<GeographicRegion>,
    pub app_permissions: Vec<Psid>,
    pub verify_key: VerificationKeyIndicator,
}

impl CertCommonContents {
    pub fn check_validity_window(&self) -> Result<()> {
        if self.valid_start > self.valid_end {
            log::error!(
                "Certificate validity start {} after end {}",
                self.valid_start,
                self.valid_end
            );
            return Err(TrustError::InvalidCertValidTime.into());
        }
        Ok(())
    }

    /// `issuer.valid_start <= valid_start <= valid_end <= issuer.valid_end`
    pub fn nested_in(&self, issuer: &CertCommonContents) -> bool {
        issuer.valid_start <= self.valid_start
            && self.valid_start <= self.valid_end
            && self.valid_end <= issuer.valid_end
    }

    pub fn is_expired_at(&self, t: Time32) -> bool {
        self.valid_end < t
    }

    pub fn is_valid_at(&self, t: Time32) -> bool {
        self.valid_start <= t && t <= self.valid_end
    }

    pub fn is_self_signed(&self) -> bool {
        self.issuer == IssuerRef::SelfSigned
    }

    pub fn issuer_digest(&self) -> Option<HashedId8> {
        match self.issuer {
            IssuerRef::SelfSigned => None,
            IssuerRef::Digest(h8) => Some(h8),
        }
    }

    /// An empty permission list grants every PSID.
    pub fn permits(&self, psid: Psid) -> bool {
        self.app_permissions.is_empty() || self.app_permissions.contains(&psid)
    }

    /// Whether `loc` falls inside the certificate's region; no region means anywhere.
    pub fn covers(&self, loc: &TwoDLocation) -> bool {
        self.region.as_ref().map_or(true, |r| r.contains(loc))
    }

    pub fn role(&self) -> CertRole {
        match self.crl_series {
            CrlSeries::ROOT_CA => CertRole::Root,
            CrlSeries::INTERMEDIATE_CA => CertRole::Intermediate,
            CrlSeries::ENROLLMENT_CA => CertRole::EnrollmentCa,
            CrlSeries::PSEUDONYM_CA => CertRole::PseudonymCa,
            CrlSeries::REGISTRATION_AUTHORITY => CertRole::RegistrationAuthority,
            CrlSeries::CRL_GENERATOR => CertRole::CrlGenerator,
            _ => CertRole::EndEntity,
        }
    }
}
