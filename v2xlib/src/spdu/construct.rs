// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Building outgoing envelopes.

use core::time::Duration;

use crate::codec::{HeaderInfo, SignerId, SpduCodec, ToBeSignedData};
use crate::crypto::signing_input;
use crate::error::{ParamError, Result};
use crate::profile::{CertificateHolder, ProfileStore, SecurityProfile, SigningMaterial};
use crate::time::Time64;
use crate::types::{Psid, ThreeDLocation};

/// How the signer is identified in a signed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignerIdType {
    Digest,
    Certificate,
    /// Full certificate once per profile interval, digest otherwise
    #[default]
    Auto,
}

#[derive(Debug, Clone)]
pub struct ConstructParams {
    pub psid: Psid,
    pub gen_time: Time64,
    pub signer_id_type: SignerIdType,
    pub gen_location: Option<ThreeDLocation>,
    /// Set when the certificate holder switched certificates since the last envelope
    pub cmh_change: bool,
}

impl ConstructParams {
    pub fn new(psid: Psid, gen_time: Time64) -> Self {
        ConstructParams {
            psid,
            gen_time,
            signer_id_type: SignerIdType::Auto,
            gen_location: None,
            cmh_change: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructedSpdu {
    pub bytes: Vec<u8>,
    /// Validity end of the certificate that signed the envelope
    pub cmh_expiry: Time64,
}

pub fn construct_unsecured(codec: &dyn SpduCodec, payload: &[u8]) -> Result<Vec<u8>> {
    codec.encode_unsecured(payload)
}

/// Signs `payload` with the holder's current material for `params.psid`.
pub fn construct_signed(
    codec: &dyn SpduCodec,
    profiles: &ProfileStore,
    holder: &dyn CertificateHolder,
    payload: &[u8],
    params: &ConstructParams,
) -> Result<ConstructedSpdu> {
    if params.psid.0 == 0 {
        return Err(ParamError::InvalidPsid(params.psid.0).into());
    }
    let profile = profiles.get(params.psid)?;
    if profile.include_generation_location && params.gen_location.is_none() {
        return Err(ParamError::MissingLocation.into());
    }

    let material = holder.signing_material(params.psid, params.gen_time)?;

    let last_cert_sent = if params.cmh_change {
        None
    } else {
        profiles.last_cert_sent(params.psid)
    };
    let signer = select_signer(&profile, &material, params, last_cert_sent);

    let tbs = ToBeSignedData {
        payload: payload.to_vec(),
        header: header(&profile, params),
    };
    let tbs_bytes = codec.encode_tbs_data(&tbs)?;
    let signature = material
        .private_key
        .sign(&signing_input(&tbs_bytes, &material.certificate.encoded))?;
    let bytes = codec.encode_signed(&tbs, &signer, &signature)?;

    // signer clock only moves once the envelope exists
    if params.cmh_change {
        log::debug!("Certificate change for PSID {}, resetting signer clock", params.psid);
        profiles.reset_cert_sent(params.psid);
    }
    if let SignerId::Certificate(_) = signer {
        profiles.record_cert_sent(params.psid, params.gen_time);
    }

    log::trace!(
        "Signed {} byte SPDU for PSID {} with {}",
        bytes.len(),
        params.psid,
        material.h8
    );
    Ok(ConstructedSpdu {
        bytes,
        cmh_expiry: material.expiry,
    })
}

fn select_signer(
    profile: &SecurityProfile,
    material: &SigningMaterial,
    params: &ConstructParams,
    last_cert_sent: Option<Time64>,
) -> SignerId {
    let with_certificate = match params.signer_id_type {
        SignerIdType::Digest => false,
        SignerIdType::Certificate => true,
        SignerIdType::Auto => match last_cert_sent {
            None => true,
            Some(last) => {
                let interval = Duration::from_millis(profile.cert_interval_ms);
                last + interval <= params.gen_time
            }
        },
    };
    if with_certificate {
        SignerId::Certificate(material.certificate.encoded.clone())
    } else {
        SignerId::Digest(material.h8)
    }
}

fn header(profile: &SecurityProfile, params: &ConstructParams) -> HeaderInfo {
    let mut header = HeaderInfo::new(params.psid);
    if profile.include_generation_time {
        header.generation_time = Some(params.gen_time);
    }
    if profile.include_expiry_time {
        header.expiry_time = Some(params.gen_time + Duration::from_millis(profile.spdu_lifetime_ms));
    }
    if profile.include_generation_location {
        header.generation_location = params.gen_location;
    }
    header
}
