// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Stage handlers run by the request thread.
//!
//! A handler consumes the unit's current [`Stage`] and either advances it or hands it
//! back to be parked until the backend ticket it just created resolves. The result of
//! that ticket lands in [`WorkUnit::completion`] and is consumed by the same handler
//! when the unit comes back.

use core::time::Duration;
use std::sync::atomic::Ordering;

use bytes::Bytes;

use super::work::{ImplicitSigner, PendingSigner, Stage, VerifyJob, VerifyState, WorkUnit};
use super::Shared;
use crate::cert::{CertCommonContents, EeCertCache, EeCertEntry, TrustStore, VerificationKeyIndicator};
use crate::codec::{HeaderInfo, SignedData, SignerId, Spdu};
use crate::crypto::backend::{CryptoOp, CryptoOutput, Submission};
use crate::crypto::{signing_input, EccP256Point};
use crate::error::{Error, ProfileError, RelevanceError, Result, TrustError};
use crate::profile::SecurityProfile;
use crate::spdu::{ProcessParams, SpduKind};
use crate::time::Time32;
use crate::types::Psid;

/// Where a unit goes after [`drive`].
pub(crate) enum Next {
    Deliver,
    Park,
}

enum Step {
    Advance(Stage),
    Park(Stage),
}

/// Runs stages until the unit is ready for delivery or waits on a ticket.
pub(crate) fn drive(shared: &Shared, unit: &mut WorkUnit) -> Next {
    loop {
        let stage = core::mem::replace(&mut unit.stage, Stage::Deliver);
        log::trace!("SPDU tag {} entering {} stage", unit.params.tag, stage.name());
        let step = match stage {
            Stage::Parse => parse(shared, unit).map(Step::Advance),
            Stage::RecoverY(signer) => recover_y(shared, unit, signer),
            Stage::Reconstruct(signer) => reconstruct(shared, unit, signer),
            Stage::Verify(state) => verify(shared, unit, state),
            Stage::Deliver => return Next::Deliver,
        };
        match step {
            Ok(Step::Advance(next)) => unit.stage = next,
            Ok(Step::Park(current)) => {
                unit.stage = current;
                return Next::Park;
            }
            Err(err) => {
                unit.fail(err);
                return Next::Deliver;
            }
        }
    }
}

/// Hands `op` to the backend unless its result is already waiting.
///
/// `None` means the backend issued a ticket and the unit has to park.
fn run(shared: &Shared, unit: &mut WorkUnit, op: CryptoOp) -> Option<Result<CryptoOutput>> {
    if let Some(done) = unit.completion.take() {
        return Some(done);
    }
    match shared.backend.submit(op) {
        Submission::Complete(result) => Some(result),
        Submission::Pending(ticket) => {
            unit.ticket = Some(ticket);
            shared.in_flight.fetch_add(1, Ordering::SeqCst);
            None
        }
    }
}

fn unexpected(output: CryptoOutput) -> Error {
    Error::internal(format!("unexpected backend output {:?}", output))
}

fn parse(shared: &Shared, unit: &mut WorkUnit) -> Result<Stage> {
    let signed = match shared.codec.decode_spdu(&unit.raw)? {
        Spdu::Unsecured(payload) => {
            unit.parsed.kind = Some(SpduKind::Unsecured);
            unit.parsed.payload = Bytes::from(payload);
            return Ok(Stage::Deliver);
        }
        Spdu::Signed(signed) => signed,
    };

    let header = &signed.tbs.header;
    unit.parsed.kind = Some(SpduKind::Signed);
    unit.parsed.psid = Some(header.psid);
    unit.parsed.generation_time = header.generation_time;
    unit.parsed.expiry_time = header.expiry_time;
    unit.parsed.generation_location = header.generation_location;
    unit.parsed.payload = Bytes::copy_from_slice(&signed.tbs.payload);

    let profile = shared.profiles.get(header.psid)?;
    if let Some(expected) = unit.params.expected_psid {
        if expected != header.psid {
            return Err(ProfileError::PsidMismatch {
                expected: expected.0,
                found: header.psid.0,
            }
            .into());
        }
    }
    if !profile.verify_signatures {
        log::trace!("PSID {} does not require verification", header.psid);
        return Ok(Stage::Deliver);
    }
    check_relevance(&profile, header, &unit.params)?;

    resolve_signer(shared, unit, &profile, signed)
}

fn check_relevance(profile: &SecurityProfile, header: &HeaderInfo, params: &ProcessParams) -> Result<()> {
    if profile.check_expiry {
        let lifetime = Duration::from_millis(profile.spdu_lifetime_ms);
        let expiry = header
            .expiry_time
            .or_else(|| header.generation_time.map(|t| t + lifetime));
        if matches!(expiry, Some(expiry) if expiry < params.receive_time) {
            return Err(RelevanceError::SpduExpired.into());
        }
    }
    if profile.check_generation_time {
        let latest = params.receive_time + Duration::from_millis(profile.max_future_skew_ms);
        if matches!(header.generation_time, Some(generated) if generated > latest) {
            return Err(RelevanceError::SpduFromFuture.into());
        }
    }
    Ok(())
}

/// Checks that apply to the signer certificate however it was found.
fn check_signer(
    contents: &CertCommonContents,
    profile: &SecurityProfile,
    header: &HeaderInfo,
    params: &ProcessParams,
) -> Result<()> {
    let psid: Psid = header.psid;
    if !contents.permits(psid) {
        return Err(TrustError::PsidNotPermitted(psid.0).into());
    }
    let generated_at: Time32 = header
        .generation_time
        .unwrap_or(params.receive_time)
        .to_time32();
    if !contents.is_valid_at(generated_at) {
        return Err(TrustError::CertNotValidAtGenerationTime.into());
    }
    if profile.check_generation_location {
        if let Some(loc) = header.generation_location.or(params.receiver_location) {
            if !contents.covers(&loc.into()) {
                return Err(RelevanceError::OutsideValidityRegion.into());
            }
        }
    }
    Ok(())
}

fn resolve_signer(
    shared: &Shared,
    unit: &mut WorkUnit,
    profile: &SecurityProfile,
    signed: SignedData,
) -> Result<Stage> {
    let header = &signed.tbs.header;
    let (h8, included) = match &signed.signer {
        SignerId::Digest(h8) => (*h8, None),
        SignerId::Certificate(bytes) => {
            let cert = shared.codec.decode_certificate(bytes)?;
            (cert.h8(), Some(cert))
        }
        SignerId::SelfSigned => return Err(TrustError::UnsupportedSignerType.into()),
    };
    unit.parsed.signer = Some(h8);

    let mut trust = shared.trust.lock();
    let TrustStore { scc, ee } = &mut *trust;

    if let Some(entry) = ee.find_by_hash8_mut(&h8) {
        if entry.is_revoked() {
            log::error!("Signer {} is revoked", h8);
            return Err(Error::SignerRevoked);
        }
        EeCertCache::resolve_chain(entry, scc)?;
        check_signer(&entry.certificate.contents, profile, header, &unit.params)?;
        log::trace!("Signer {} found in EE cache", h8);
        let job = VerifyJob {
            key: EccP256Point::from_sec1(&entry.verify_key)?,
            message: signing_input(&signed.tbs_bytes, &entry.certificate.encoded),
            signature: signed.signature,
        };
        return Ok(Stage::Verify(VerifyState::new([job], None)));
    }

    if let Some(entry) = scc.find_by_hash8(&h8).and_then(|handle| scc.get(handle)) {
        check_signer(&entry.certificate.contents, profile, header, &unit.params)?;
        log::trace!("Signer {} found in SCC store", h8);
        let job = VerifyJob {
            key: EccP256Point::from_sec1(&entry.public_key)?,
            message: signing_input(&signed.tbs_bytes, &entry.certificate.encoded),
            signature: signed.signature,
        };
        return Ok(Stage::Verify(VerifyState::new([job], None)));
    }

    let Some(cert) = included else {
        log::error!("Signer {} unknown and no certificate included", h8);
        return Err(TrustError::SignerCertNotFound.into());
    };

    let issuer_handle = cert
        .contents
        .issuer_digest()
        .and_then(|digest| scc.find_by_hash8(&digest))
        .ok_or_else(|| {
            log::error!("No SCC issuer for signer {}", h8);
            TrustError::ConstructCertChain
        })?;
    let issuer = scc
        .get(issuer_handle)
        .ok_or(TrustError::ConstructCertChain)?;
    if !cert.contents.nested_in(&issuer.certificate.contents) {
        return Err(TrustError::InvalidCertValidTime.into());
    }
    check_signer(&cert.contents, profile, header, &unit.params)?;

    let message = signing_input(&signed.tbs_bytes, &cert.encoded);
    let digest_input = cert.signing_input(&issuer.certificate.encoded);
    log::trace!("First sighting of signer {} ({:?})", h8, cert.contents.cert_type);

    match cert.contents.verify_key.clone() {
        VerificationKeyIndicator::Key(point) => {
            let verify_key = point.to_uncompressed()?;
            let cert_signature = cert
                .signature
                .ok_or_else(|| Error::invalid_encoding("explicit certificate without signature"))?;
            let jobs = [
                VerifyJob {
                    key: EccP256Point::from_sec1(&issuer.public_key)?,
                    message: digest_input,
                    signature: cert_signature,
                },
                VerifyJob {
                    key: EccP256Point::from_sec1(&verify_key)?,
                    message,
                    signature: signed.signature,
                },
            ];
            let pending = PendingSigner {
                certificate: cert,
                verify_key,
                issuer: issuer_handle,
            };
            Ok(Stage::Verify(VerifyState::new(jobs, Some(pending))))
        }
        VerificationKeyIndicator::ReconstructionValue(reconstruction_value) => {
            let recover = shared.backend.needs_uncompressed_points()
                && reconstruction_value.is_compressed();
            let signer = ImplicitSigner {
                reconstruction_value,
                issuer_key: issuer.public_key,
                digest_input,
                message,
                signature: signed.signature,
                certificate: cert,
                issuer: issuer_handle,
            };
            if recover {
                Ok(Stage::RecoverY(signer))
            } else {
                Ok(Stage::Reconstruct(signer))
            }
        }
    }
}

fn recover_y(shared: &Shared, unit: &mut WorkUnit, mut signer: ImplicitSigner) -> Result<Step> {
    let op = CryptoOp::RecoverY {
        point: signer.reconstruction_value.clone(),
    };
    let Some(result) = run(shared, unit, op) else {
        return Ok(Step::Park(Stage::RecoverY(signer)));
    };
    match result? {
        CryptoOutput::Point(point) => {
            signer.reconstruction_value = point;
            Ok(Step::Advance(Stage::Reconstruct(signer)))
        }
        other => Err(unexpected(other)),
    }
}

fn reconstruct(shared: &Shared, unit: &mut WorkUnit, signer: ImplicitSigner) -> Result<Step> {
    let op = signer.reconstruct_op();
    let Some(result) = run(shared, unit, op) else {
        return Ok(Step::Park(Stage::Reconstruct(signer)));
    };
    match result? {
        CryptoOutput::PublicKey(key) => Ok(Step::Advance(Stage::Verify(signer.into_verify(key)?))),
        other => Err(unexpected(other)),
    }
}

fn verify(shared: &Shared, unit: &mut WorkUnit, mut state: VerifyState) -> Result<Step> {
    while let Some(job) = state.jobs.front() {
        let op = job.to_op();
        let Some(result) = run(shared, unit, op) else {
            return Ok(Step::Park(Stage::Verify(state)));
        };
        match result {
            Ok(CryptoOutput::Verified) => {}
            Ok(other) => return Err(unexpected(other)),
            Err(err) => {
                log::error!("Signature verification failed for SPDU tag {}: {}", unit.params.tag, err);
                return Err(err);
            }
        }
        state.jobs.pop_front();
    }
    if let Some(pending) = state.pending {
        commit(shared, unit, pending)?;
    }
    Ok(Step::Advance(Stage::Deliver))
}

/// Caches a freshly verified signer and applies the revocation verdict.
fn commit(shared: &Shared, unit: &WorkUnit, pending: PendingSigner) -> Result<()> {
    let h8 = pending.certificate.h8();
    let mut trust = shared.trust.lock();
    let cached = trust.ee.find_by_hash8(&h8).map(EeCertEntry::is_revoked);
    let (revoked, inserted) = match cached {
        Some(revoked) => {
            log::debug!("Signer {} already cached, reusing entry", h8);
            (revoked, Ok(()))
        }
        None => {
            let cache_expiry =
                unit.params.receive_time + Duration::from_secs(shared.ee_retention_secs);
            let mut entry = EeCertEntry::new(pending.certificate, pending.verify_key, cache_expiry);
            entry.issuer = Some(pending.issuer);
            let revoked = EeCertCache::update_revocation(&mut entry, shared.crl.as_ref());
            (revoked, trust.ee.insert(entry))
        }
    };
    if revoked {
        log::error!("Signer {} is revoked", h8);
        return Err(Error::SignerRevoked);
    }
    inserted
}
