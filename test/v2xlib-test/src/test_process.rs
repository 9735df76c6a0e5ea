// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use std::sync::Arc;
use std::time::Duration;

use v2xlib::cert::{CertId, CrlSeries};
use v2xlib::codec::{HeaderInfo, SignerId, ToBeSignedData};
use v2xlib::crypto::backend::{EmulatedAccelerator, HardwareBackend};
use v2xlib::crypto::signing_input;
use v2xlib::error::{PipelineError, ProfileError, RelevanceError, TrustError};
use v2xlib::types::{GeographicRegion, ThreeDLocation, TwoDLocation};
use v2xlib::{
    BackendKind, CertificateBuilder, ConstructParams, DerCodec, Error, IssuedCertificate,
    ProcessParams, Psid, SecurityProfile, SignerIdType, SpduCodec, SpduKind, Time32, Time64,
    V2xConfig,
};

use crate::common::{key, now, Chain, Harness};

const ALL_BACKENDS: [BackendKind; 3] = [
    BackendKind::Software,
    BackendKind::VerifyEngine,
    BackendKind::PointEngine,
];

/// Signs without going through the holder, so any certificate can be used.
fn sign_raw(signer: &IssuedCertificate, psid: Psid, gen_time: Time64, with_cert: bool) -> Vec<u8> {
    let mut header = HeaderInfo::new(psid);
    header.generation_time = Some(gen_time);
    let tbs = ToBeSignedData {
        payload: b"raw".to_vec(),
        header,
    };
    let tbs_bytes = DerCodec.encode_tbs_data(&tbs).unwrap();
    let signature = signer
        .private_key
        .sign(&signing_input(&tbs_bytes, &signer.certificate.encoded))
        .unwrap();
    let signer_id = if with_cert {
        SignerId::Certificate(signer.certificate.encoded.clone())
    } else {
        SignerId::Digest(signer.certificate.h8())
    };
    DerCodec.encode_signed(&tbs, &signer_id, &signature).unwrap()
}

#[test]
fn test_explicit_signer_all_backends() {
    for kind in ALL_BACKENDS {
        let h = Harness::new(kind);
        let ee = h.chain.pseudonym("ee", 0, 10_000);
        h.holder.add(ee.clone());

        let (status, parsed) = h.check(&h.sign(b"bsm", SignerIdType::Certificate));
        assert!(status.is_ok(), "{:?}: {:?}", kind, status);
        assert_eq!(parsed.kind, Some(SpduKind::Signed));
        assert_eq!(parsed.psid, Some(Psid::BSM));
        assert_eq!(parsed.signer, Some(ee.certificate.h8()));
        assert_eq!(&parsed.payload[..], b"bsm");
        assert_eq!(h.ctx.ee_cache_len(), 1);

        let (status, _) = h.check(&h.sign(b"bsm", SignerIdType::Digest));
        assert!(status.is_ok(), "{:?}: {:?}", kind, status);
        assert_eq!(h.ctx.ee_cache_len(), 1);
    }
}

#[test]
fn test_implicit_signer_all_backends() {
    for kind in ALL_BACKENDS {
        let h = Harness::new(kind);
        let ee = h.chain.implicit_pseudonym("implicit", 0, 10_000);
        h.holder.add(ee);

        let (status, _) = h.check(&h.sign(b"bsm", SignerIdType::Certificate));
        assert!(status.is_ok(), "{:?}: {:?}", kind, status);
        assert_eq!(h.ctx.ee_cache_len(), 1);

        let (status, _) = h.check(&h.sign(b"bsm", SignerIdType::Digest));
        assert!(status.is_ok(), "{:?}: {:?}", kind, status);
    }
}

#[test]
fn test_cache_is_idempotent() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    let spdu = h.sign(b"bsm", SignerIdType::Certificate);
    for _ in 0..3 {
        assert!(h.check(&spdu).0.is_ok());
    }
    assert_eq!(h.ctx.ee_cache_len(), 1);
}

#[test]
fn test_revoked_signer_twice() {
    let h = Harness::new(BackendKind::Software);
    let ee = h.chain.pseudonym("revoked", 0, 10_000);
    h.crl.revoke_hash(ee.certificate.hash().h10());
    h.holder.add(ee);

    let (status, _) = h.check(&h.sign(b"bsm", SignerIdType::Certificate));
    assert!(matches!(status, Err(Error::SignerRevoked)));
    assert_eq!(h.ctx.ee_cache_len(), 1);

    let (status, _) = h.check(&h.sign(b"bsm", SignerIdType::Digest));
    assert!(matches!(status, Err(Error::SignerRevoked)));
    assert_eq!(status.unwrap_err().code(), -80);
}

#[test]
fn test_revocation_refresh_after_commit() {
    let h = Harness::new(BackendKind::Software);
    let ee = h.chain.pseudonym("later", 0, 10_000);
    let h10 = ee.certificate.hash().h10();
    h.holder.add(ee);

    assert!(h.check(&h.sign(b"bsm", SignerIdType::Certificate)).0.is_ok());
    h.crl.revoke_hash(h10);
    // cached entries are not re-evaluated until asked
    assert!(h.check(&h.sign(b"bsm", SignerIdType::Digest)).0.is_ok());
    assert_eq!(h.ctx.refresh_revocation(), 1);
    assert!(matches!(
        h.check(&h.sign(b"bsm", SignerIdType::Digest)).0,
        Err(Error::SignerRevoked)
    ));
}

#[test]
fn test_full_cache_refuses_new_signer() {
    let mut config = V2xConfig::default();
    config.ee_cache_max_entries = 1;
    config.ee_cache_max_per_bucket = 1;
    let h = Harness::with_config(config);
    let first = h.chain.pseudonym("first", 0, 10_000);
    let second = h.chain.pseudonym("second", 0, 10_000);

    assert!(h.check(&sign_raw(&first, Psid::BSM, now(), true)).0.is_ok());
    assert_eq!(h.ctx.ee_cache_len(), 1);

    let (status, parsed) = h.check(&sign_raw(&second, Psid::BSM, now(), true));
    assert!(matches!(
        status,
        Err(Error::Trust(TrustError::TooManyCertsInTable))
    ));
    assert_eq!(parsed.signer, Some(second.certificate.h8()));
    assert_eq!(h.ctx.ee_cache_len(), 1);

    // the refused signer stays unknown, the cached one keeps working
    assert!(matches!(
        h.check(&sign_raw(&second, Psid::BSM, now(), false)).0,
        Err(Error::Trust(TrustError::SignerCertNotFound))
    ));
    assert!(h.check(&sign_raw(&first, Psid::BSM, now(), false)).0.is_ok());
}

#[test]
fn test_linkage_revoked_signer() {
    let h = Harness::new(BackendKind::VerifyEngine);
    let linkage_value = [7u8; 9];
    let ee = CertificateBuilder::new(
        CertId::LinkageData {
            i_cert: 3,
            linkage_value,
        },
        CrlSeries::PSEUDONYM,
        Time32(0),
        Time32(10_000),
    )
    .permissions(vec![Psid::BSM])
    .explicit(&DerCodec, &key("linked"), &h.chain.pca)
    .unwrap();
    let other = h.chain.pseudonym("unlinked", 0, 10_000);
    h.crl.revoke_linkage_value(linkage_value);

    assert!(matches!(
        h.check(&sign_raw(&ee, Psid::BSM, now(), true)).0,
        Err(Error::SignerRevoked)
    ));
    assert!(matches!(
        h.check(&sign_raw(&ee, Psid::BSM, now(), false)).0,
        Err(Error::SignerRevoked)
    ));
    assert!(h.check(&sign_raw(&other, Psid::BSM, now(), true)).0.is_ok());
}

#[test]
fn test_missing_issuer() {
    let h = Harness::new(BackendKind::Software);
    let stranger = Chain::build_named("stranger").pseudonym("ee", 0, 10_000);
    h.holder.add(stranger);

    let (status, parsed) = h.check(&h.sign(b"bsm", SignerIdType::Certificate));
    assert!(matches!(
        status,
        Err(Error::Trust(TrustError::ConstructCertChain))
    ));
    assert!(parsed.signer.is_some());
    assert_eq!(h.ctx.ee_cache_len(), 0);
}

#[test]
fn test_unknown_digest() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    assert!(matches!(
        h.check(&h.sign(b"bsm", SignerIdType::Digest)).0,
        Err(Error::Trust(TrustError::SignerCertNotFound))
    ));
}

#[test]
fn test_signer_window_outside_issuer() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 500, 850_000));
    assert!(matches!(
        h.check(&h.sign(b"bsm", SignerIdType::Certificate)).0,
        Err(Error::Trust(TrustError::InvalidCertValidTime))
    ));
    assert_eq!(h.ctx.ee_cache_len(), 0);
}

#[test]
fn test_signer_not_valid_at_generation() {
    let h = Harness::new(BackendKind::Software);
    let ee = h.chain.pseudonym("future", 2_000, 5_000);
    assert!(matches!(
        h.check(&sign_raw(&ee, Psid::BSM, now(), true)).0,
        Err(Error::Trust(TrustError::CertNotValidAtGenerationTime))
    ));
}

#[test]
fn test_psid_not_permitted() {
    let h = Harness::new(BackendKind::Software);
    h.ctx.profiles().register(SecurityProfile::new(Psid::WSA));
    let ee = h.chain.pseudonym("bsm-only", 0, 10_000);
    assert!(matches!(
        h.check(&sign_raw(&ee, Psid::WSA, now(), true)).0,
        Err(Error::Trust(TrustError::PsidNotPermitted(0x87)))
    ));
}

#[test]
fn test_expected_psid_mismatch() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    let mut params = ProcessParams::new(now());
    params.expected_psid = Some(Psid::WSA);
    h.ctx
        .process_spdu(&h.sign(b"bsm", SignerIdType::Certificate), params)
        .unwrap();
    assert!(matches!(
        h.verdict().0,
        Err(Error::Profile(ProfileError::PsidMismatch {
            expected: 0x87,
            found: 0x20
        }))
    ));
}

#[test]
fn test_bad_signature() {
    let h = Harness::new(BackendKind::Software);
    let ee = h.chain.pseudonym("ee", 0, 10_000);
    let other = h.chain.pseudonym("other", 0, 10_000);
    // signed by one key, claiming the other's certificate
    let forged = IssuedCertificate {
        certificate: ee.certificate.clone(),
        private_key: other.private_key.clone(),
    };
    let (status, _) = h.check(&sign_raw(&forged, Psid::BSM, now(), true));
    assert_eq!(status.unwrap_err().code(), -40);
    assert_eq!(h.ctx.ee_cache_len(), 0);
}

#[test]
fn test_spdu_relevance() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    let spdu = h.sign(b"bsm", SignerIdType::Certificate);

    let late = ProcessParams::new(now() + Duration::from_secs(31));
    h.ctx.process_spdu(&spdu, late).unwrap();
    assert!(matches!(
        h.verdict().0,
        Err(Error::Relevance(RelevanceError::SpduExpired))
    ));

    let early = ProcessParams::new(Time64(now().0 - 3_000_000));
    h.ctx.process_spdu(&spdu, early).unwrap();
    assert!(matches!(
        h.verdict().0,
        Err(Error::Relevance(RelevanceError::SpduFromFuture))
    ));
}

#[test]
fn test_generation_location_region() {
    let h = Harness::new(BackendKind::Software);
    h.ctx.profiles().register(SecurityProfile {
        include_generation_location: true,
        check_generation_location: true,
        ..SecurityProfile::new(Psid::BSM)
    });
    let region = GeographicRegion::Circular {
        center: TwoDLocation {
            latitude: 0,
            longitude: 0,
        },
        radius_m: 1_000,
    };
    let ee = CertificateBuilder::new(CertId::None, CrlSeries::PSEUDONYM, Time32(0), Time32(10_000))
        .region(region)
        .explicit(&DerCodec, &key("regional"), &h.chain.pca)
        .unwrap();
    h.holder.add(ee);

    let sign_at = |latitude: i32| {
        let mut params = ConstructParams::new(Psid::BSM, now());
        params.signer_id_type = SignerIdType::Certificate;
        params.gen_location = Some(ThreeDLocation {
            latitude,
            longitude: 0,
            elevation: 0,
        });
        h.ctx.construct_spdu(b"bsm", &params).unwrap().bytes
    };

    // 1/10 micro-degree units: 10_000 is about 111 m, 1_000_000 about 11 km
    assert!(h.check(&sign_at(10_000)).0.is_ok());
    assert!(matches!(
        h.check(&sign_at(1_000_000)).0,
        Err(Error::Relevance(RelevanceError::OutsideValidityRegion))
    ));
}

#[test]
fn test_unsecured_round_trip() {
    let h = Harness::new(BackendKind::Software);
    let spdu = h.ctx.construct_unsecured(b"plain").unwrap();
    let (status, parsed) = h.check(&spdu);
    assert!(status.is_ok());
    assert_eq!(parsed.kind, Some(SpduKind::Unsecured));
    assert_eq!(&parsed.payload[..], b"plain");
    assert_eq!(parsed.signer, None);
}

#[test]
fn test_malformed_envelope() {
    let h = Harness::new(BackendKind::Software);
    let (status, parsed) = h.check(b"\x30\x03\x02\x01\x07");
    assert_eq!(status.unwrap_err().code(), -10);
    assert_eq!(parsed.kind, None);
}

#[test]
fn test_tag_is_returned() {
    let h = Harness::new(BackendKind::VerifyEngine);
    let spdu = h.ctx.construct_unsecured(b"tagged").unwrap();
    let mut params = ProcessParams::new(now());
    params.tag = 77;
    h.ctx.process_spdu(&spdu, params).unwrap();
    assert_eq!(h.verdict().1.tag, 77);
}

#[test]
fn test_ee_expiry_sweep() {
    let mut config = V2xConfig::default();
    config.ee_cache_retention_secs = 60;
    let h = Harness::with_config(config);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    assert!(h.check(&h.sign(b"bsm", SignerIdType::Certificate)).0.is_ok());

    assert_eq!(h.ctx.remove_expired_ee_cert_cache(now()), 0);
    assert_eq!(h.ctx.ee_cache_len(), 1);
    assert_eq!(
        h.ctx
            .remove_expired_ee_cert_cache(now() + Duration::from_secs(61)),
        1
    );
    assert_eq!(h.ctx.ee_cache_len(), 0);
}

#[test]
fn test_cache_survives_issuer_sweep() {
    let h = Harness::new(BackendKind::Software);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    assert!(h.check(&h.sign(b"bsm", SignerIdType::Certificate)).0.is_ok());

    // sweeping the authorities leaves the cached signer without a chain
    assert_eq!(h.ctx.remove_expired_scc_cert(Time32(800_001)), 4);
    assert!(matches!(
        h.check(&h.sign(b"bsm", SignerIdType::Digest)).0,
        Err(Error::Trust(TrustError::ConstructCertChain))
    ));

    h.ctx.add_scc_cert(&h.chain.pca.certificate.encoded).unwrap();
    assert!(h.check(&h.sign(b"bsm", SignerIdType::Digest)).0.is_ok());
}

#[test]
fn test_accelerator_offline() {
    let mut config = V2xConfig::default();
    config.backend.kind = BackendKind::VerifyEngine;
    let backend = Arc::new(HardwareBackend::new(
        BackendKind::VerifyEngine,
        EmulatedAccelerator::spawn(true, Duration::ZERO).unwrap(),
        4,
    ));
    let h = Harness::with_backend(config, backend.clone());
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    let spdu = h.sign(b"bsm", SignerIdType::Certificate);

    backend.device().set_offline(true);
    let (status, _) = h.check(&spdu);
    assert!(matches!(
        status,
        Err(Error::Pipeline(PipelineError::AcceleratorRequest(_)))
    ));
    assert_eq!(h.ctx.ee_cache_len(), 0);

    backend.device().set_offline(false);
    assert!(h.check(&spdu).0.is_ok());
}

#[test]
fn test_request_queue_full() {
    let mut config = V2xConfig::default();
    config.request_queue_capacity = 1;
    config.backend.kind = BackendKind::VerifyEngine;
    config.backend.max_in_flight = 1;
    config.backend.device_latency_us = 100_000;
    let h = Harness::with_config(config);
    h.holder.add(h.chain.pseudonym("ee", 0, 10_000));
    let spdu = h.sign(b"bsm", SignerIdType::Certificate);

    let mut accepted = 0;
    let mut refused = 0;
    for _ in 0..10 {
        match h.process(&spdu) {
            Ok(()) => accepted += 1,
            Err(Error::Pipeline(PipelineError::QueueFull)) => refused += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    assert!(accepted >= 1);
    assert!(refused >= 1);
    for _ in 0..accepted {
        assert!(h.verdict().0.is_ok());
    }
}

#[test]
fn test_shutdown_refuses_work() {
    let h = Harness::new(BackendKind::PointEngine);
    h.ctx.shutdown();
    assert!(matches!(
        h.process(b"\x30\x00"),
        Err(Error::Pipeline(PipelineError::NotRunning))
    ));
}
