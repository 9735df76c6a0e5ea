// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Software backend: ring verification and p256 reconstruction, always synchronous.

use super::{execute, CryptoOp, SignatureBackend, Submission};
use crate::config::BackendKind;

/// Software cryptographic backend.
pub struct SoftwareBackend;

impl SignatureBackend for SoftwareBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn submit(&self, op: CryptoOp) -> Submission {
        let result = execute(op);
        if result.is_err() {
            log::error!("Software crypto operation failed");
        }
        Submission::Complete(result)
    }
}
