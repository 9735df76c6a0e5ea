// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Shared fixtures: a full authority chain, deterministic keys and a context whose
//! verdicts can be awaited from the test thread.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use v2xlib::cert::{CertId, CrlSeries};
use v2xlib::crypto::backend::SignatureBackend;
use v2xlib::crypto::PrivateKey;
use v2xlib::{
    BackendKind, CertificateBuilder, ConstructParams, DerCodec, IssuedCertificate, MemoryCrl,
    ParsedSpdu, ProcessParams, ProfileStore, Psid, Result, SecurityProfile, SignerIdType,
    StaticCertificateHolder, Time32, Time64, V2xConfig, V2xSecurity,
};

/// Receive time used by the scenarios; inside every certificate window below.
pub const NOW_SECS: u32 = 1_000;

pub fn now() -> Time64 {
    Time32(NOW_SECS).to_time64()
}

/// Private key derived from `label`, stable across runs.
pub fn key(label: &str) -> PrivateKey {
    let digest = ring::digest::digest(&ring::digest::SHA256, label.as_bytes());
    PrivateKey::from_bytes(digest.as_ref()).expect("label hashes to a valid scalar")
}

/// Root, intermediate and the four authorities below it.
pub struct Chain {
    pub root: IssuedCertificate,
    pub ica: IssuedCertificate,
    pub eca: IssuedCertificate,
    pub pca: IssuedCertificate,
    pub ra: IssuedCertificate,
    pub crlg: IssuedCertificate,
}

fn authority(
    name: &str,
    series: CrlSeries,
    start: u32,
    end: u32,
    issuer: &IssuedCertificate,
) -> IssuedCertificate {
    CertificateBuilder::new(CertId::Name(name.into()), series, Time32(start), Time32(end))
        .explicit(&DerCodec, &key(name), issuer)
        .expect("authority certificate")
}

impl Chain {
    pub fn build() -> Self {
        Self::build_named("root")
    }

    /// A chain whose keys all derive from `prefix`, unrelated to other prefixes.
    pub fn build_named(prefix: &str) -> Self {
        let label = |name: &str| format!("{}-{}", prefix, name);
        let root = CertificateBuilder::new(
            CertId::Name(label("root")),
            CrlSeries::ROOT_CA,
            Time32(0),
            Time32(1_000_000),
        )
        .self_signed(&DerCodec, &key(&label("root")))
        .expect("root certificate");
        let ica = authority(&label("ica"), CrlSeries::INTERMEDIATE_CA, 0, 900_000, &root);
        let eca = authority(&label("eca"), CrlSeries::ENROLLMENT_CA, 0, 800_000, &ica);
        let pca = authority(&label("pca"), CrlSeries::PSEUDONYM_CA, 0, 800_000, &ica);
        let ra = authority(&label("ra"), CrlSeries::REGISTRATION_AUTHORITY, 0, 800_000, &ica);
        let crlg = authority(&label("crlg"), CrlSeries::CRL_GENERATOR, 0, 800_000, &ica);
        Chain {
            root,
            ica,
            eca,
            pca,
            ra,
            crlg,
        }
    }

    /// Encodings in an order where every issuer precedes its subjects.
    pub fn in_order(&self) -> Vec<&[u8]> {
        [&self.root, &self.ica, &self.eca, &self.pca, &self.ra, &self.crlg]
            .into_iter()
            .map(|c| c.certificate.encoded.as_slice())
            .collect()
    }

    /// Explicit pseudonym certificate under the pseudonym CA.
    pub fn pseudonym(&self, label: &str, start: u32, end: u32) -> IssuedCertificate {
        CertificateBuilder::new(CertId::None, CrlSeries::PSEUDONYM, Time32(start), Time32(end))
            .permissions(vec![Psid::BSM])
            .explicit(&DerCodec, &key(label), &self.pca)
            .expect("pseudonym certificate")
    }

    /// Implicit pseudonym certificate under the pseudonym CA.
    pub fn implicit_pseudonym(&self, label: &str, start: u32, end: u32) -> IssuedCertificate {
        CertificateBuilder::new(CertId::None, CrlSeries::PSEUDONYM, Time32(start), Time32(end))
            .permissions(vec![Psid::BSM])
            .implicit(&DerCodec, &key(label), &self.pca)
            .expect("implicit pseudonym certificate")
    }
}

pub type Verdict = (Result<()>, ParsedSpdu);

/// A context loaded with a [`Chain`], a BSM profile and a verdict channel.
pub struct Harness {
    pub ctx: V2xSecurity,
    pub chain: Chain,
    pub holder: Arc<StaticCertificateHolder>,
    pub crl: Arc<MemoryCrl>,
    verdicts: mpsc::Receiver<Verdict>,
}

impl Harness {
    pub fn new(kind: BackendKind) -> Self {
        let mut config = V2xConfig::default();
        config.backend.kind = kind;
        Self::with_config(config)
    }

    pub fn with_config(config: V2xConfig) -> Self {
        Self::assemble(config, None)
    }

    pub fn with_backend(config: V2xConfig, backend: Arc<dyn SignatureBackend>) -> Self {
        Self::assemble(config, Some(backend))
    }

    fn assemble(config: V2xConfig, backend: Option<Arc<dyn SignatureBackend>>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let profiles = Arc::new(ProfileStore::new());
        profiles.register(SecurityProfile::new(Psid::BSM));
        let holder = Arc::new(StaticCertificateHolder::new());
        let crl = Arc::new(MemoryCrl::new());

        let ctx = match backend {
            Some(backend) => V2xSecurity::with_backend(
                config,
                Arc::new(DerCodec),
                profiles,
                holder.clone(),
                crl.clone(),
                backend,
            ),
            None => V2xSecurity::new(
                config,
                Arc::new(DerCodec),
                profiles,
                holder.clone(),
                crl.clone(),
            ),
        }
        .expect("context");

        let chain = Chain::build();
        for encoded in chain.in_order() {
            ctx.add_scc_cert(encoded).expect("chain certificate");
        }

        let (tx, verdicts) = mpsc::channel();
        let tx = spin::Mutex::new(tx);
        ctx.register_process_callback(move |status, parsed| {
            let _ = tx.lock().send((status, parsed));
        });

        log::info!(
            "Harness ready: {:?} backend, {} SCC certificates",
            ctx.backend_kind(),
            ctx.scc_len()
        );
        Harness {
            ctx,
            chain,
            holder,
            crl,
            verdicts,
        }
    }

    /// Signs `payload` for BSM at [`now`].
    pub fn sign(&self, payload: &[u8], signer_id_type: SignerIdType) -> Vec<u8> {
        let mut params = ConstructParams::new(Psid::BSM, now());
        params.signer_id_type = signer_id_type;
        self.ctx
            .construct_spdu(payload, &params)
            .expect("signed SPDU")
            .bytes
    }

    pub fn process(&self, spdu: &[u8]) -> Result<()> {
        self.ctx.process_spdu(spdu, ProcessParams::new(now()))
    }

    /// Waits for the next verdict.
    pub fn verdict(&self) -> Verdict {
        let verdict = self
            .verdicts
            .recv_timeout(Duration::from_secs(10))
            .expect("verdict within timeout");
        log::debug!("SPDU tag {} verdict {:?}", verdict.1.tag, verdict.0);
        verdict
    }

    /// Processes `spdu` and waits for its verdict.
    pub fn check(&self, spdu: &[u8]) -> Verdict {
        self.process(spdu).expect("SPDU accepted");
        self.verdict()
    }
}
