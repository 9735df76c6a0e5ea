// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Envelope and certificate encoding.
//!
//! The rest of the crate only sees the decoded model defined here and the
//! [`SpduCodec`] contract; [`DerCodec`] is the bundled implementation.

mod der_codec;

pub use self::der_codec::DerCodec;

use crate::cert::{CertCommonContents, Certificate};
use crate::crypto::SIGNATURE_LEN;
use crate::error::Result;
use crate::time::Time64;
use crate::types::{HashedId8, Psid, ThreeDLocation};

/// Supported envelope protocol version.
pub const PROTOCOL_VERSION: u8 = 3;

/// Supported certificate format version.
pub const CERT_VERSION: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub psid: Psid,
    pub generation_time: Option<Time64>,
    pub expiry_time: Option<Time64>,
    pub generation_location: Option<ThreeDLocation>,
}

impl HeaderInfo {
    pub fn new(psid: Psid) -> Self {
        HeaderInfo {
            psid,
            generation_time: None,
            expiry_time: None,
            generation_location: None,
        }
    }
}

/// The signed portion of a signed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToBeSignedData {
    pub payload: Vec<u8>,
    pub header: HeaderInfo,
}

/// How a signed envelope identifies its signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerId {
    Digest(HashedId8),
    /// Full encoding of the signer certificate
    Certificate(Vec<u8>),
    SelfSigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData {
    pub tbs: ToBeSignedData,
    /// Canonical encoding of `tbs`, the bytes covered by the signature
    pub tbs_bytes: Vec<u8>,
    pub signer: SignerId,
    pub signature: [u8; SIGNATURE_LEN],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spdu {
    Unsecured(Vec<u8>),
    Signed(SignedData),
}

/// Encoder/decoder for envelopes and certificates.
pub trait SpduCodec: Send + Sync {
    fn encode_unsecured(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Encoding of the signed portion, as covered by the signature.
    fn encode_tbs_data(&self, tbs: &ToBeSignedData) -> Result<Vec<u8>>;

    fn encode_signed(
        &self,
        tbs: &ToBeSignedData,
        signer: &SignerId,
        signature: &[u8; SIGNATURE_LEN],
    ) -> Result<Vec<u8>>;

    fn decode_spdu(&self, bytes: &[u8]) -> Result<Spdu>;

    /// Encoding of the to-be-signed certificate fields.
    fn encode_tbs_certificate(&self, contents: &CertCommonContents) -> Result<Vec<u8>>;

    /// Full certificate encoding; `signature` is absent for implicit certificates.
    fn encode_certificate(
        &self,
        contents: &CertCommonContents,
        signature: Option<&[u8; SIGNATURE_LEN]>,
    ) -> Result<Vec<u8>>;

    fn decode_certificate(&self, bytes: &[u8]) -> Result<Certificate>;
}
