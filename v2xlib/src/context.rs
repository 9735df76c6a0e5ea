// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The library context.
//!
//! [`V2xSecurity`] owns the trust stores, the processing pipeline and the
//! collaborators both paths use. Everything is reached through it; dropping it stops
//! the pipeline threads.

use std::sync::Arc;

use bytes::Bytes;

use crate::cert::{SccHandle, TrustStore};
use crate::codec::SpduCodec;
use crate::config::{BackendKind, V2xConfig};
use crate::crl::RevocationList;
use crate::crypto::backend::{backend_from_config, SignatureBackend};
use crate::error::Result;
use crate::profile::{CertificateHolder, ProfileStore};
use crate::spdu::construct::{self, ConstructParams, ConstructedSpdu};
use crate::spdu::process::{Pipeline, PipelineDeps};
use crate::spdu::{ParsedSpdu, ProcessParams};
use crate::time::{Time32, Time64};

pub struct V2xSecurity {
    codec: Arc<dyn SpduCodec>,
    profiles: Arc<ProfileStore>,
    holder: Arc<dyn CertificateHolder>,
    crl: Arc<dyn RevocationList>,
    trust: Arc<spin::Mutex<TrustStore>>,
    pipeline: Pipeline,
}

impl V2xSecurity {
    /// Creates a context with the backend named in `config.backend`.
    pub fn new(
        config: V2xConfig,
        codec: Arc<dyn SpduCodec>,
        profiles: Arc<ProfileStore>,
        holder: Arc<dyn CertificateHolder>,
        crl: Arc<dyn RevocationList>,
    ) -> Result<Self> {
        config.validate()?;
        let backend = backend_from_config(&config.backend)?;
        Self::with_backend(config, codec, profiles, holder, crl, backend)
    }

    /// Creates a context around a caller-supplied backend.
    pub fn with_backend(
        config: V2xConfig,
        codec: Arc<dyn SpduCodec>,
        profiles: Arc<ProfileStore>,
        holder: Arc<dyn CertificateHolder>,
        crl: Arc<dyn RevocationList>,
        backend: Arc<dyn SignatureBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let trust = Arc::new(spin::Mutex::new(TrustStore::new(&config)));
        let pipeline = Pipeline::start(
            &config,
            PipelineDeps {
                codec: codec.clone(),
                profiles: profiles.clone(),
                crl: crl.clone(),
                trust: trust.clone(),
                backend,
            },
        )?;
        log::info!("V2X security context created");
        Ok(V2xSecurity {
            codec,
            profiles,
            holder,
            crl,
            trust,
            pipeline,
        })
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.pipeline.backend_kind()
    }

    /// Wraps `payload` in a signed envelope.
    pub fn construct_spdu(&self, payload: &[u8], params: &ConstructParams) -> Result<ConstructedSpdu> {
        construct::construct_signed(
            self.codec.as_ref(),
            &self.profiles,
            self.holder.as_ref(),
            payload,
            params,
        )
    }

    pub fn construct_unsecured(&self, payload: &[u8]) -> Result<Vec<u8>> {
        construct::construct_unsecured(self.codec.as_ref(), payload)
    }

    /// Queues a received envelope. `Ok` means accepted; the verdict arrives through
    /// the process callback.
    pub fn process_spdu(&self, spdu: &[u8], params: ProcessParams) -> Result<()> {
        self.pipeline.submit(Bytes::copy_from_slice(spdu), params)
    }

    /// Replaces the process callback. It runs on the pipeline's result thread.
    pub fn register_process_callback<F>(&self, callback: F)
    where
        F: Fn(Result<()>, ParsedSpdu) + Send + Sync + 'static,
    {
        self.pipeline.set_callback(Arc::new(callback));
    }

    /// Validates and stores a trust-anchor or authority certificate.
    pub fn add_scc_cert(&self, encoded: &[u8]) -> Result<SccHandle> {
        let certificate = self.codec.decode_certificate(encoded)?;
        self.trust.lock().scc.insert(certificate)
    }

    pub fn remove_expired_ee_cert_cache(&self, t: Time64) -> usize {
        self.trust.lock().ee.remove_expired(t)
    }

    pub fn remove_expired_scc_cert(&self, t: Time32) -> usize {
        self.trust.lock().scc.remove_expired(t)
    }

    /// Re-checks every cached signer against the revocation list.
    pub fn refresh_revocation(&self) -> usize {
        self.trust.lock().ee.refresh_revocation(self.crl.as_ref())
    }

    pub fn scc_len(&self) -> usize {
        self.trust.lock().scc.len()
    }

    pub fn ee_cache_len(&self) -> usize {
        self.trust.lock().ee.len()
    }

    /// Stops the pipeline. Later submissions fail with `NotRunning`.
    pub fn shutdown(&self) {
        self.pipeline.shutdown();
    }
}

impl Drop for V2xSecurity {
    fn drop(&mut self) {
        self.shutdown();
    }
}
