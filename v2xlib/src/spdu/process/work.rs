// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use std::collections::VecDeque;

use bytes::Bytes;

use crate::cert::{Certificate, SccHandle};
use crate::crypto::backend::{CryptoOp, CryptoOutput, Ticket};
use crate::crypto::{EccP256Point, SIGNATURE_LEN, UNCOMPRESSED_POINT_LEN};
use crate::error::{Error, Result};
use crate::spdu::{ParsedSpdu, ProcessParams};

/// One received envelope travelling through the pipeline.
///
/// A unit is owned by exactly one queue or thread at a time.
pub(crate) struct WorkUnit {
    pub raw: Bytes,
    pub params: ProcessParams,
    pub parsed: ParsedSpdu,
    pub stage: Stage,
    /// Outstanding accelerator operation while parked in the wait queue
    pub ticket: Option<Ticket>,
    /// Result of the last operation, consumed by the stage that submitted it
    pub completion: Option<Result<CryptoOutput>>,
    pub status: Result<()>,
}

impl WorkUnit {
    pub fn new(raw: Bytes, params: ProcessParams) -> Self {
        WorkUnit {
            raw,
            parsed: ParsedSpdu {
                tag: params.tag,
                ..ParsedSpdu::default()
            },
            params,
            stage: Stage::Parse,
            ticket: None,
            completion: None,
            status: Ok(()),
        }
    }

    /// Moves a finished ticket's result into the completion slot.
    pub fn poll_ticket(&mut self) -> bool {
        match self.ticket.as_mut().and_then(Ticket::try_take) {
            Some(result) => {
                self.ticket = None;
                self.completion = Some(result);
                true
            }
            None => false,
        }
    }

    pub fn fail(&mut self, err: Error) {
        log::debug!(
            "SPDU tag {} failed in {} stage: {}",
            self.params.tag,
            self.stage.name(),
            err
        );
        self.status = Err(err);
        self.stage = Stage::Deliver;
    }
}

pub(crate) enum Stage {
    Parse,
    /// Decompress the reconstruction value for a device that cannot
    RecoverY(ImplicitSigner),
    Reconstruct(ImplicitSigner),
    Verify(VerifyState),
    Deliver,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::RecoverY(_) => "recover-y",
            Stage::Reconstruct(_) => "reconstruct",
            Stage::Verify(_) => "verify",
            Stage::Deliver => "deliver",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VerifyJob {
    pub key: EccP256Point,
    pub message: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
}

impl VerifyJob {
    pub fn to_op(&self) -> CryptoOp {
        CryptoOp::Verify {
            key: self.key.clone(),
            message: self.message.clone(),
            signature: self.signature,
        }
    }
}

/// A first-seen signer certificate, committed to the EE cache once every
/// signature of the envelope verified.
#[derive(Debug)]
pub(crate) struct PendingSigner {
    pub certificate: Certificate,
    pub verify_key: [u8; UNCOMPRESSED_POINT_LEN],
    pub issuer: SccHandle,
}

#[derive(Debug)]
pub(crate) struct VerifyState {
    /// Remaining jobs; the front one is in flight while the unit is parked
    pub jobs: VecDeque<VerifyJob>,
    pub pending: Option<PendingSigner>,
}

impl VerifyState {
    pub fn new(jobs: impl IntoIterator<Item = VerifyJob>, pending: Option<PendingSigner>) -> Self {
        VerifyState {
            jobs: jobs.into_iter().collect(),
            pending,
        }
    }
}

/// A first-seen implicit signer whose key still has to be reconstructed.
#[derive(Debug)]
pub(crate) struct ImplicitSigner {
    pub reconstruction_value: EccP256Point,
    pub issuer_key: [u8; UNCOMPRESSED_POINT_LEN],
    pub digest_input: Vec<u8>,
    /// Envelope signature input and value, verified with the reconstructed key
    pub message: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
    pub certificate: Certificate,
    pub issuer: SccHandle,
}

impl ImplicitSigner {
    pub fn reconstruct_op(&self) -> CryptoOp {
        CryptoOp::Reconstruct {
            reconstruction_value: self.reconstruction_value.clone(),
            issuer_key: self.issuer_key.to_vec(),
            digest_input: self.digest_input.clone(),
        }
    }

    pub fn into_verify(self, key: [u8; UNCOMPRESSED_POINT_LEN]) -> Result<VerifyState> {
        let job = VerifyJob {
            key: EccP256Point::from_sec1(&key)?,
            message: self.message,
            signature: self.signature,
        };
        Ok(VerifyState::new(
            [job],
            Some(PendingSigner {
                certificate: self.certificate,
                verify_key: key,
                issuer: self.issuer,
            }),
        ))
    }
}
