// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Hashing, point handling, signing and key reconstruction.
//!
//! Verification itself is routed through a [`backend::SignatureBackend`] so the
//! processing pipeline can hand it to an accelerator; the helpers here are the
//! software primitives the backends and the construct path share.

pub mod backend;
pub mod ecqv;

use p256::ecdsa::signature::Signer;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use ring::digest;

use crate::error::{Error, Result, SignatureError};
use crate::types::{HashedId10, HashedId8};

/// Length of an uncompressed SEC1 P-256 point (0x04 || x || y).
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// Length of an r || s P-256 signature.
pub const SIGNATURE_LEN: usize = 64;

/// SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let d = digest::digest(&digest::SHA256, data);
    let mut out = [0u8; 32];
    out.copy_from_slice(d.as_ref());
    out
}

/// Certificate hash and its HashedId8/HashedId10 suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertHash {
    pub full: [u8; 32],
}

impl CertHash {
    pub fn of(cert_bytes: &[u8]) -> Self {
        CertHash {
            full: sha256(cert_bytes),
        }
    }

    pub fn h8(&self) -> HashedId8 {
        HashedId8::from_hash(&self.full)
    }

    pub fn h10(&self) -> HashedId10 {
        HashedId10::from_hash(&self.full)
    }
}

/// ECDSA input for data signed by `signer`: `H(tbs) || H(signer encoding)`.
///
/// For self-signed certificates and SPDUs without a certificate the signer encoding
/// is empty. The backend hashes this input once more as part of ECDSA-SHA256.
pub fn signing_input(tbs: &[u8], signer: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(64);
    input.extend_from_slice(&sha256(tbs));
    input.extend_from_slice(&sha256(signer));
    input
}

/// A P-256 point in one of its 1609.2 representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EccP256Point {
    CompressedY0([u8; 32]),
    CompressedY1([u8; 32]),
    Uncompressed { x: [u8; 32], y: [u8; 32] },
}

impl EccP256Point {
    /// Parses a SEC1 encoding (0x02/0x03 compressed or 0x04 uncompressed).
    pub fn from_sec1(bytes: &[u8]) -> Result<Self> {
        let invalid = || Error::invalid_public_key(alloc_fmt("SEC1 point", bytes.len()));
        match bytes.first() {
            Some(0x02) | Some(0x03) if bytes.len() == 33 => {
                let mut x = [0u8; 32];
                x.copy_from_slice(&bytes[1..]);
                if bytes[0] == 0x02 {
                    Ok(EccP256Point::CompressedY0(x))
                } else {
                    Ok(EccP256Point::CompressedY1(x))
                }
            }
            Some(0x04) if bytes.len() == UNCOMPRESSED_POINT_LEN => {
                let mut x = [0u8; 32];
                let mut y = [0u8; 32];
                x.copy_from_slice(&bytes[1..33]);
                y.copy_from_slice(&bytes[33..]);
                Ok(EccP256Point::Uncompressed { x, y })
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_sec1(&self) -> Vec<u8> {
        match self {
            EccP256Point::CompressedY0(x) => [&[0x02u8][..], x].concat(),
            EccP256Point::CompressedY1(x) => [&[0x03u8][..], x].concat(),
            EccP256Point::Uncompressed { x, y } => [&[0x04u8][..], x, y].concat(),
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, EccP256Point::Uncompressed { .. })
    }

    /// Uncompressed SEC1 encoding, recovering y for compressed points.
    ///
    /// Fails if the point is not on the curve.
    pub fn to_uncompressed(&self) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        let key = p256::PublicKey::from_sec1_bytes(&self.to_sec1())
            .map_err(|_| Error::invalid_public_key("point not on P-256"))?;
        let encoded = key.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_POINT_LEN];
        out.copy_from_slice(encoded.as_bytes());
        Ok(out)
    }
}

fn alloc_fmt(what: &str, len: usize) -> String {
    format!("invalid {} of {} bytes", what, len)
}

/// Private signing key held by the certificate holder.
#[derive(Clone)]
pub struct PrivateKey {
    scalar: [u8; 32],
}

impl PrivateKey {
    /// Wraps a big-endian P-256 scalar; rejects zero and out-of-range values.
    pub fn from_bytes(scalar: &[u8]) -> Result<Self> {
        p256::SecretKey::from_slice(scalar)
            .map_err(|_| Error::Signature(SignatureError::SigningFailed("invalid private key".into())))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(scalar);
        Ok(PrivateKey { scalar: out })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.scalar
    }

    /// Uncompressed public key for this scalar.
    pub fn public_key(&self) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        let secret = p256::SecretKey::from_slice(&self.scalar)
            .map_err(|_| Error::Signature(SignatureError::SigningFailed("invalid private key".into())))?;
        let encoded = secret.public_key().to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_POINT_LEN];
        out.copy_from_slice(encoded.as_bytes());
        Ok(out)
    }

    /// ECDSA P-256 / SHA-256 over `message`, returned as r || s.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
        let field = p256::FieldBytes::clone_from_slice(&self.scalar);
        let key = p256::ecdsa::SigningKey::from_bytes(&field)
            .map_err(|e| Error::Signature(SignatureError::SigningFailed(e.to_string())))?;
        let signature: p256::ecdsa::Signature = key
            .try_sign(message)
            .map_err(|e| Error::Signature(SignatureError::SigningFailed(e.to_string())))?;
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&signature.to_bytes());
        Ok(out)
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Verifies an r || s ECDSA P-256 / SHA-256 signature with ring.
pub fn verify_p256(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_FIXED};

    log::trace!("Verifying P-256 signature over {} bytes", message.len());

    if signature.len() != SIGNATURE_LEN {
        return Err(Error::Signature(SignatureError::InvalidSignatureLength {
            expected: SIGNATURE_LEN,
            found: signature.len(),
        }));
    }
    if public_key.len() != UNCOMPRESSED_POINT_LEN {
        return Err(Error::invalid_public_key(alloc_fmt(
            "uncompressed key",
            public_key.len(),
        )));
    }

    let pk = UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public_key);
    pk.verify(message, signature).map_err(|_| {
        log::error!("Signature verification failed");
        Error::signature_failed()
    })?;

    log::trace!("Signature verification successful");
    Ok(())
}
