// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Asynchronous processing of received envelopes.
//!
//! ```text
//!  process_spdu ──► requests ──► [request thread] ──► results ──► [result thread] ──► callback
//!                      ▲               │
//!                      │          ticket pending
//!                      │               ▼
//!                      └── [wait thread] ◄── waiting
//! ```
//!
//! The request thread runs the stages of a unit until it is either finished or has
//! handed an operation to an accelerator. Parked units sit in the wait queue until
//! their ticket resolves, then re-enter the request queue at the front. The wait
//! thread only exists for accelerator backends.

mod queue;
mod stages;
mod work;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::Bytes;

use self::queue::WorkQueue;
use self::stages::Next;
use self::work::WorkUnit;
use super::{ParsedSpdu, ProcessParams};
use crate::cert::TrustStore;
use crate::codec::SpduCodec;
use crate::config::{BackendKind, V2xConfig};
use crate::crl::RevocationList;
use crate::crypto::backend::{CompletionNotifier, SignatureBackend};
use crate::error::{ParamError, PipelineError, Result};
use crate::profile::ProfileStore;

/// Receives the verdict and what was parsed for each processed envelope.
pub type ProcessCallback = dyn Fn(Result<()>, ParsedSpdu) + Send + Sync;

/// Collaborators the pipeline works with.
pub(crate) struct PipelineDeps {
    pub codec: Arc<dyn SpduCodec>,
    pub profiles: Arc<ProfileStore>,
    pub crl: Arc<dyn RevocationList>,
    pub trust: Arc<spin::Mutex<TrustStore>>,
    pub backend: Arc<dyn SignatureBackend>,
}

/// State shared by the pipeline threads.
pub(crate) struct Shared {
    pub codec: Arc<dyn SpduCodec>,
    pub profiles: Arc<ProfileStore>,
    pub crl: Arc<dyn RevocationList>,
    pub trust: Arc<spin::Mutex<TrustStore>>,
    pub backend: Arc<dyn SignatureBackend>,
    pub ee_retention_secs: u64,
    pub wait_timeout: Duration,
    pub running: AtomicBool,
    /// Accelerator operations outstanding
    pub in_flight: AtomicUsize,
    pub requests: WorkQueue<WorkUnit>,
    pub results: WorkQueue<WorkUnit>,
    pub waiting: Arc<WorkQueue<WorkUnit>>,
    callback: spin::RwLock<Option<Arc<ProcessCallback>>>,
}

pub(crate) struct Pipeline {
    shared: Arc<Shared>,
    threads: spin::Mutex<Vec<JoinHandle<()>>>,
}

impl Pipeline {
    pub fn start(config: &V2xConfig, deps: PipelineDeps) -> Result<Self> {
        let waiting = Arc::new(WorkQueue::new("wait", usize::MAX));
        let shared = Arc::new(Shared {
            codec: deps.codec,
            profiles: deps.profiles,
            crl: deps.crl,
            trust: deps.trust,
            backend: deps.backend,
            ee_retention_secs: config.ee_cache_retention_secs,
            wait_timeout: Duration::from_millis(config.backend.wait_timeout_ms),
            running: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            requests: WorkQueue::new("request", config.request_queue_capacity),
            results: WorkQueue::new("result", usize::MAX),
            waiting: waiting.clone(),
            callback: spin::RwLock::new(None),
        });

        // the notifier holds the wait queue only, so the backend never owns the pipeline
        shared
            .backend
            .attach_notifier(CompletionNotifier::new(move || waiting.notify()));

        let pipeline = Pipeline {
            shared,
            threads: spin::Mutex::new(Vec::new()),
        };
        pipeline.spawn("v2x-request", request_loop)?;
        pipeline.spawn("v2x-result", result_loop)?;
        if pipeline.shared.backend.kind() != BackendKind::Software {
            pipeline.spawn("v2x-wait", wait_loop)?;
        }
        log::debug!(
            "Processing pipeline started with {:?} backend",
            pipeline.shared.backend.kind()
        );
        Ok(pipeline)
    }

    fn spawn(&self, name: &str, body: fn(Arc<Shared>)) -> Result<()> {
        let shared = self.shared.clone();
        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || body(shared))
            .map_err(|e| PipelineError::ThreadSpawn(e.to_string()))?;
        self.threads.lock().push(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.shared.backend.kind()
    }

    pub fn set_callback(&self, callback: Arc<ProcessCallback>) {
        *self.shared.callback.write() = Some(callback);
    }

    /// Queues `raw` for processing. Acceptance says nothing about the verdict.
    pub fn submit(&self, raw: Bytes, params: ProcessParams) -> Result<()> {
        if !self.is_running() {
            return Err(PipelineError::NotRunning.into());
        }
        if raw.is_empty() {
            return Err(ParamError::EmptyInput.into());
        }
        log::trace!("SPDU tag {} queued ({} bytes)", params.tag, raw.len());
        self.shared.requests.try_push(WorkUnit::new(raw, params))
    }

    /// Stops and joins the threads. Units still queued are dropped without a verdict.
    pub fn shutdown(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let shared = &self.shared;
        shared.requests.notify();
        shared.results.notify();
        shared.waiting.notify();

        let threads: Vec<JoinHandle<()>> = self.threads.lock().drain(..).collect();
        for handle in threads {
            if handle.join().is_err() {
                log::error!("Pipeline thread panicked");
            }
        }
        shared.backend.shutdown();

        let dropped =
            shared.requests.drain().len() + shared.waiting.drain().len() + shared.results.drain().len();
        if dropped > 0 {
            log::debug!("Pipeline stopped with {} undelivered units", dropped);
        } else {
            log::debug!("Pipeline stopped");
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn request_loop(shared: Arc<Shared>) {
    let cap = shared.backend.max_in_flight();
    let below_cap = || shared.in_flight.load(Ordering::SeqCst) < cap;
    while let Some(mut unit) = shared.requests.pop_wait(&shared.running, &below_cap) {
        match stages::drive(&shared, &mut unit) {
            Next::Deliver => shared.results.push_back(unit),
            Next::Park => shared.waiting.push_back(unit),
        }
    }
}

fn result_loop(shared: Arc<Shared>) {
    while let Some(unit) = shared.results.pop_wait(&shared.running, || true) {
        let callback = shared.callback.read().clone();
        match callback {
            Some(callback) => callback(unit.status, unit.parsed),
            None => log::warn!(
                "No process callback registered, verdict for SPDU tag {} dropped",
                unit.params.tag
            ),
        }
    }
}

fn wait_loop(shared: Arc<Shared>) {
    while shared.running.load(Ordering::SeqCst) {
        let ready = shared
            .waiting
            .take_ready(&shared.running, shared.wait_timeout, WorkUnit::poll_ticket);
        for unit in ready {
            shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            log::trace!("SPDU tag {} resumed after accelerator completion", unit.params.tag);
            shared.requests.push_front(unit);
        }
    }
}
