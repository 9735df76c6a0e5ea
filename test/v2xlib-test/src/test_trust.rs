// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use v2xlib::cert::{CertId, CrlSeries};
use v2xlib::error::TrustError;
use v2xlib::{BackendKind, CertificateBuilder, DerCodec, Error, Time32, V2xConfig};

use crate::common::{key, Chain, Harness};

#[test]
fn test_full_chain_in_order() {
    let h = Harness::new(BackendKind::Software);
    assert_eq!(h.ctx.scc_len(), 6);
}

#[test]
fn test_issuer_must_precede_subject() {
    let h = Harness::new(BackendKind::Software);
    let other = Chain::build_named("other");

    assert!(matches!(
        h.ctx.add_scc_cert(&other.ica.certificate.encoded),
        Err(Error::Trust(TrustError::NoIssuerCert))
    ));
    h.ctx.add_scc_cert(&other.root.certificate.encoded).unwrap();
    h.ctx.add_scc_cert(&other.ica.certificate.encoded).unwrap();
    assert_eq!(h.ctx.scc_len(), 8);
}

#[test]
fn test_duplicate_rejected() {
    let h = Harness::new(BackendKind::Software);
    assert!(matches!(
        h.ctx.add_scc_cert(&h.chain.pca.certificate.encoded),
        Err(Error::Trust(TrustError::SameCertInTable))
    ));
    assert_eq!(h.ctx.scc_len(), 6);
}

#[test]
fn test_capacity_refusal() {
    let mut config = V2xConfig::default();
    config.scc_max_certs = 6;
    let h = Harness::with_config(config);
    let other = Chain::build_named("other");
    assert!(matches!(
        h.ctx.add_scc_cert(&other.root.certificate.encoded),
        Err(Error::Trust(TrustError::TooManyCertsInTable))
    ));
    assert_eq!(h.ctx.scc_len(), 6);
}

#[test]
fn test_window_must_nest_in_issuer() {
    let h = Harness::new(BackendKind::Software);
    let outside = CertificateBuilder::new(
        CertId::Name("late-ca".into()),
        CrlSeries::PSEUDONYM_CA,
        Time32(10),
        Time32(950_000),
    )
    .explicit(&DerCodec, &key("late-ca"), &h.chain.ica)
    .unwrap();
    assert!(matches!(
        h.ctx.add_scc_cert(&outside.certificate.encoded),
        Err(Error::Trust(TrustError::InvalidCertValidTime))
    ));
}

#[test]
fn test_end_entity_series_refused() {
    let h = Harness::new(BackendKind::Software);
    let ee = h.chain.pseudonym("ee", 0, 10_000);
    assert!(matches!(
        h.ctx.add_scc_cert(&ee.certificate.encoded),
        Err(Error::Trust(TrustError::InvalidCertCrlSeries(1)))
    ));
}

#[test]
fn test_scc_expiry_sweep() {
    let h = Harness::new(BackendKind::Software);
    assert_eq!(h.ctx.remove_expired_scc_cert(Time32(800_000)), 0);
    // everything below the intermediate ends at 800_000
    assert_eq!(h.ctx.remove_expired_scc_cert(Time32(800_001)), 4);
    assert_eq!(h.ctx.scc_len(), 2);
    assert_eq!(h.ctx.remove_expired_scc_cert(Time32(1_000_001)), 2);
    assert_eq!(h.ctx.scc_len(), 0);
}
