// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Secured envelope (SPDU) construction and processing.

pub mod construct;
pub mod process;

pub use self::construct::*;

use bytes::Bytes;

use crate::time::Time64;
use crate::types::{HashedId8, Psid, ThreeDLocation};

/// Caller context for one received envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessParams {
    pub receive_time: Time64,
    /// Used for the region check when the envelope carries no generation location
    pub receiver_location: Option<ThreeDLocation>,
    pub expected_psid: Option<Psid>,
    /// Opaque value handed back with the verdict
    pub tag: u64,
}

impl ProcessParams {
    pub fn new(receive_time: Time64) -> Self {
        ProcessParams {
            receive_time,
            receiver_location: None,
            expected_psid: None,
            tag: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpduKind {
    Unsecured,
    Signed,
}

/// What processing learned about an envelope, delivered with the verdict.
///
/// Fields stay empty when decoding failed before reaching them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSpdu {
    pub kind: Option<SpduKind>,
    pub payload: Bytes,
    pub psid: Option<Psid>,
    pub generation_time: Option<Time64>,
    pub expiry_time: Option<Time64>,
    pub generation_location: Option<ThreeDLocation>,
    pub signer: Option<HashedId8>,
    pub tag: u64,
}
