// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Hardware offload backends.
//!
//! [`HardwareBackend`] turns every operation into a request to an
//! [`AcceleratorDevice`] and returns a [`Ticket`] immediately. The device answers
//! through the ticket's [`Completer`], which also fires the notifier the pipeline
//! attached, so the wait handler knows to look for finished units.
//!
//! [`EmulatedAccelerator`] stands in for the silicon: a worker thread that receives
//! requests over a channel and performs them in software.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::mpsc;
use std::thread::JoinHandle;

use super::{execute, CompletionNotifier, Completer, CryptoOp, SignatureBackend, Submission, Ticket};
use crate::config::BackendKind;
use crate::error::{Error, PipelineError, Result};

/// Request interface of an offload engine.
pub trait AcceleratorDevice: Send + Sync {
    /// Whether the engine works on compressed points directly.
    fn accepts_compressed_points(&self) -> bool;

    /// Queues `op`; the device answers through `completer`.
    ///
    /// An error means the request never reached the device.
    fn enqueue(&self, op: CryptoOp, completer: Completer) -> Result<()>;

    fn close(&self);
}

/// Backend that offloads every operation to an accelerator.
pub struct HardwareBackend<D: AcceleratorDevice> {
    kind: BackendKind,
    device: D,
    max_in_flight: usize,
    notifier: spin::Mutex<Option<CompletionNotifier>>,
}

impl<D: AcceleratorDevice> HardwareBackend<D> {
    pub fn new(kind: BackendKind, device: D, max_in_flight: usize) -> Self {
        HardwareBackend {
            kind,
            device,
            max_in_flight,
            notifier: spin::Mutex::new(None),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: AcceleratorDevice> SignatureBackend for HardwareBackend<D> {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    fn needs_uncompressed_points(&self) -> bool {
        !self.device.accepts_compressed_points()
    }

    fn submit(&self, op: CryptoOp) -> Submission {
        log::trace!("Submitting {} to {:?} accelerator", op.name(), self.kind);
        let notifier = self.notifier.lock().clone();
        let (completer, ticket) = Ticket::channel(notifier);
        match self.device.enqueue(op, completer) {
            Ok(()) => Submission::Pending(ticket),
            Err(e) => {
                log::error!("Accelerator request failed: {}", e);
                Submission::Complete(Err(e))
            }
        }
    }

    fn attach_notifier(&self, notifier: CompletionNotifier) {
        *self.notifier.lock() = Some(notifier);
    }

    fn shutdown(&self) {
        self.device.close();
    }
}

type Request = (CryptoOp, Completer);

/// Software model of an offload engine running on its own thread.
pub struct EmulatedAccelerator {
    accepts_compressed: bool,
    requests: spin::Mutex<Option<mpsc::Sender<Request>>>,
    worker: spin::Mutex<Option<JoinHandle<()>>>,
    offline: AtomicBool,
}

impl EmulatedAccelerator {
    /// Starts the device thread. `latency` is added to every operation.
    pub fn spawn(accepts_compressed: bool, latency: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Request>();
        let worker = std::thread::Builder::new()
            .name("v2x-accelerator".into())
            .spawn(move || Self::run(rx, accepts_compressed, latency))
            .map_err(|e| Error::Pipeline(PipelineError::ThreadSpawn(e.to_string())))?;

        Ok(EmulatedAccelerator {
            accepts_compressed,
            requests: spin::Mutex::new(Some(tx)),
            worker: spin::Mutex::new(Some(worker)),
            offline: AtomicBool::new(false),
        })
    }

    fn run(rx: mpsc::Receiver<Request>, accepts_compressed: bool, latency: Duration) {
        // ends once every sender is dropped
        while let Ok((op, completer)) = rx.recv() {
            if !latency.is_zero() {
                std::thread::sleep(latency);
            }
            let result = if !accepts_compressed && op.has_compressed_point() {
                Err(Error::accelerator("engine requires uncompressed points"))
            } else {
                execute(op)
            };
            completer.complete(result);
        }
        log::debug!("Accelerator worker stopped");
    }

    /// While offline, requests are refused at submission.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl AcceleratorDevice for EmulatedAccelerator {
    fn accepts_compressed_points(&self) -> bool {
        self.accepts_compressed
    }

    fn enqueue(&self, op: CryptoOp, completer: Completer) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::accelerator("device offline"));
        }
        let guard = self.requests.lock();
        let tx = guard
            .as_ref()
            .ok_or_else(|| Error::accelerator("device closed"))?;
        tx.send((op, completer))
            .map_err(|_| Error::accelerator("device worker gone"))
    }

    fn close(&self) {
        self.requests.lock().take();
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                log::error!("Accelerator worker panicked");
            }
        }
    }
}

impl Drop for EmulatedAccelerator {
    fn drop(&mut self) {
        self.close();
    }
}
