// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Signature verification and key reconstruction backends.
//!
//! The processing pipeline never calls into a crypto library directly; it hands a
//! [`CryptoOp`] to the configured [`SignatureBackend`] and gets back either a finished
//! result or a [`Ticket`] that resolves once the accelerator answers. Three backends
//! exist and are chosen from [`BackendConfig`] at startup:
//!
//! | kind           | completes        | compressed points        |
//! |----------------|------------------|--------------------------|
//! | `Software`     | synchronously    | handled in software      |
//! | `VerifyEngine` | through a ticket | accepted by the device   |
//! | `PointEngine`  | through a ticket | must be recovered first  |

mod accelerator;
mod software;

pub use self::accelerator::*;
pub use self::software::*;

use std::sync::Arc;

use futures::channel::oneshot;

use super::{ecqv, verify_p256, EccP256Point, SIGNATURE_LEN, UNCOMPRESSED_POINT_LEN};
use crate::config::{BackendConfig, BackendKind};
use crate::error::{Error, Result};

/// One unit of work for a backend.
#[derive(Debug, Clone)]
pub enum CryptoOp {
    /// ECDSA P-256 / SHA-256 verification of `signature` over `message`
    Verify {
        key: EccP256Point,
        message: Vec<u8>,
        signature: [u8; SIGNATURE_LEN],
    },
    /// Implicit certificate public key reconstruction
    Reconstruct {
        reconstruction_value: EccP256Point,
        issuer_key: Vec<u8>,
        digest_input: Vec<u8>,
    },
    /// Recovery of the y coordinate of a compressed point
    RecoverY { point: EccP256Point },
}

impl CryptoOp {
    /// Whether any point carried by the operation is compressed.
    pub fn has_compressed_point(&self) -> bool {
        match self {
            CryptoOp::Verify { key, .. } => key.is_compressed(),
            CryptoOp::Reconstruct {
                reconstruction_value,
                ..
            } => reconstruction_value.is_compressed(),
            CryptoOp::RecoverY { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CryptoOp::Verify { .. } => "verify",
            CryptoOp::Reconstruct { .. } => "reconstruct",
            CryptoOp::RecoverY { .. } => "recover-y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoOutput {
    Verified,
    PublicKey([u8; UNCOMPRESSED_POINT_LEN]),
    Point(EccP256Point),
}

/// Outcome of handing an operation to a backend.
#[derive(Debug)]
pub enum Submission {
    Complete(Result<CryptoOutput>),
    Pending(Ticket),
}

/// Wakes whoever waits on accelerator completions.
#[derive(Clone)]
pub struct CompletionNotifier(Arc<dyn Fn() + Send + Sync>);

impl CompletionNotifier {
    pub fn new<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        CompletionNotifier(Arc::new(f))
    }

    pub fn notify(&self) {
        (self.0)()
    }
}

impl core::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CompletionNotifier")
    }
}

/// Receiving half of an outstanding accelerator operation.
#[derive(Debug)]
pub struct Ticket {
    rx: oneshot::Receiver<Result<CryptoOutput>>,
}

/// Sending half, owned by the device until the operation finishes.
#[derive(Debug)]
pub struct Completer {
    tx: oneshot::Sender<Result<CryptoOutput>>,
    notifier: Option<CompletionNotifier>,
}

impl Ticket {
    pub fn channel(notifier: Option<CompletionNotifier>) -> (Completer, Ticket) {
        let (tx, rx) = oneshot::channel();
        (Completer { tx, notifier }, Ticket { rx })
    }

    /// Takes the result if the operation has finished.
    ///
    /// A completer dropped without answering resolves to an accelerator error.
    pub fn try_take(&mut self) -> Option<Result<CryptoOutput>> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(Error::accelerator("operation dropped by device"))),
        }
    }
}

impl Completer {
    pub fn complete(self, result: Result<CryptoOutput>) {
        // receiver gone means the unit was torn down during shutdown
        let _ = self.tx.send(result);
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }
}

/// Verification / reconstruction strategy used by the processing pipeline.
pub trait SignatureBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Cap on operations outstanding at once; unbounded for synchronous backends.
    fn max_in_flight(&self) -> usize {
        usize::MAX
    }

    /// Whether reconstruction values must be decompressed before use.
    fn needs_uncompressed_points(&self) -> bool {
        false
    }

    fn submit(&self, op: CryptoOp) -> Submission;

    /// Registers the wake-up used when a pending ticket completes.
    fn attach_notifier(&self, _notifier: CompletionNotifier) {}

    /// Stops any device worker. Outstanding tickets resolve to an error.
    fn shutdown(&self) {}
}

/// Runs an operation in software.
pub(crate) fn execute(op: CryptoOp) -> Result<CryptoOutput> {
    log::trace!("Executing {} in software", op.name());
    match op {
        CryptoOp::Verify {
            key,
            message,
            signature,
        } => {
            let key = key.to_uncompressed()?;
            verify_p256(&key, &message, &signature)?;
            Ok(CryptoOutput::Verified)
        }
        CryptoOp::Reconstruct {
            reconstruction_value,
            issuer_key,
            digest_input,
        } => {
            let key =
                ecqv::reconstruct_public_key(&reconstruction_value, &issuer_key, &digest_input)?;
            Ok(CryptoOutput::PublicKey(key))
        }
        CryptoOp::RecoverY { point } => {
            let full = point.to_uncompressed()?;
            Ok(CryptoOutput::Point(EccP256Point::from_sec1(&full)?))
        }
    }
}

/// Builds the backend named by the configuration.
pub fn backend_from_config(config: &BackendConfig) -> Result<Arc<dyn SignatureBackend>> {
    log::debug!("Selecting {:?} signature backend", config.kind);
    let latency = std::time::Duration::from_micros(config.device_latency_us);
    let backend: Arc<dyn SignatureBackend> = match config.kind {
        BackendKind::Software => Arc::new(SoftwareBackend),
        BackendKind::VerifyEngine => Arc::new(HardwareBackend::new(
            BackendKind::VerifyEngine,
            EmulatedAccelerator::spawn(true, latency)?,
            config.max_in_flight,
        )),
        BackendKind::PointEngine => Arc::new(HardwareBackend::new(
            BackendKind::PointEngine,
            EmulatedAccelerator::spawn(false, latency)?,
            config.max_in_flight,
        )),
    };
    Ok(backend)
}
