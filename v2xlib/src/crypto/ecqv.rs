// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Elliptic Curve Qu-Vanstone implicit certificate key reconstruction (P-256).
//!
//! With reconstruction value `P`, issuer key `Q_CA` and
//! `e = SHA-256(H(tbs) || H(issuer))` reduced mod n:
//! - verifier side: `Q_U = e * P + Q_CA`
//! - issuer side, for a request secret `k` with `P = k * G`: `d_U = e * k + d_CA`

use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, PublicKey, Scalar, SecretKey, U256};

use super::{sha256, EccP256Point, PrivateKey, UNCOMPRESSED_POINT_LEN};
use crate::error::{Error, Result, SignatureError};

fn hash_scalar(digest_input: &[u8]) -> Scalar {
    let digest = sha256(digest_input);
    <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::clone_from_slice(&digest))
}

/// Reconstructs the implicit certificate's public key.
///
/// `issuer_key` is the SEC1 encoding of the issuer's verification key and
/// `digest_input` is `H(tbs) || H(issuer certificate)`.
pub fn reconstruct_public_key(
    reconstruction_value: &EccP256Point,
    issuer_key: &[u8],
    digest_input: &[u8],
) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
    let p = PublicKey::from_sec1_bytes(&reconstruction_value.to_sec1()).map_err(|_| {
        log::error!("Reconstruction value is not a P-256 point");
        Error::Signature(SignatureError::ReconstructionFailed)
    })?;
    let q_ca = PublicKey::from_sec1_bytes(issuer_key)
        .map_err(|_| Error::invalid_public_key("issuer key is not a P-256 point"))?;

    let e = hash_scalar(digest_input);
    let q_u = p.to_projective() * e + q_ca.to_projective();

    let key = PublicKey::from_affine(q_u.to_affine())
        .map_err(|_| Error::Signature(SignatureError::ReconstructionFailed))?;
    let encoded = key.to_encoded_point(false);
    let mut out = [0u8; UNCOMPRESSED_POINT_LEN];
    out.copy_from_slice(encoded.as_bytes());

    log::trace!("Reconstructed implicit certificate key");
    Ok(out)
}

/// Reconstruction value `k * G` for a request secret `k`.
pub fn reconstruction_value(request_secret: &PrivateKey) -> Result<EccP256Point> {
    let secret = SecretKey::from_slice(request_secret.as_bytes())
        .map_err(|_| Error::Signature(SignatureError::ReconstructionFailed))?;
    let encoded = secret.public_key().to_encoded_point(true);
    EccP256Point::from_sec1(encoded.as_bytes())
}

/// Private key of an implicit certificate issued with `P = k * G`.
pub fn reconstruct_private_key(
    request_secret: &PrivateKey,
    issuer_private: &PrivateKey,
    digest_input: &[u8],
) -> Result<PrivateKey> {
    let k = SecretKey::from_slice(request_secret.as_bytes())
        .map_err(|_| Error::Signature(SignatureError::ReconstructionFailed))?;
    let d_ca = SecretKey::from_slice(issuer_private.as_bytes())
        .map_err(|_| Error::Signature(SignatureError::ReconstructionFailed))?;

    let e = hash_scalar(digest_input);
    let d_u: Scalar = e * *k.to_nonzero_scalar() + *d_ca.to_nonzero_scalar();
    PrivateKey::from_bytes(&d_u.to_repr())
}
