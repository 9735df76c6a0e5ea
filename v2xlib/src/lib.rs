// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! V2X secured envelope (SPDU) library
//!
//! Builds signed and unsecured envelopes in the style of IEEE 1609.2 and verifies
//! received ones asynchronously against a trust store of service certificate chains
//! (SCC) and a cache of end-entity (EE) signer certificates.
//!
//! # Features
//! - Signed envelope construction with digest / certificate / automatic signer choice
//! - Explicit and implicit (ECQV) signer certificates
//! - Verification in software or through a hardware accelerator selected at startup
//! - Revocation lookup when a signer is first cached
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use v2xlib::{
//!     DerCodec, MemoryCrl, ProcessParams, ProfileStore, StaticCertificateHolder, Time64,
//!     V2xConfig, V2xSecurity,
//! };
//!
//! # fn example(spdu: &[u8]) -> v2xlib::Result<()> {
//! let ctx = V2xSecurity::new(
//!     V2xConfig::default(),
//!     Arc::new(DerCodec),
//!     Arc::new(ProfileStore::new()),
//!     Arc::new(StaticCertificateHolder::new()),
//!     Arc::new(MemoryCrl::new()),
//! )?;
//! ctx.register_process_callback(|verdict, parsed| {
//!     log::info!("SPDU tag {}: {:?}", parsed.tag, verdict);
//! });
//! ctx.process_spdu(spdu, ProcessParams::new(Time64::now()?))?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod cert;
pub mod codec;
pub mod config;
pub mod context;
pub mod crl;
pub mod crypto;
pub mod error;
pub mod profile;
pub mod spdu;
pub mod time;
pub mod types;

pub use cert::{Certificate, CertificateBuilder, IssuedCertificate, SccHandle};
pub use codec::{DerCodec, SpduCodec};
pub use config::{BackendConfig, BackendKind, V2xConfig};
pub use context::V2xSecurity;
pub use crl::{MemoryCrl, RevocationList};
pub use error::{Error, Result};
pub use profile::{CertificateHolder, ProfileStore, SecurityProfile, StaticCertificateHolder};
pub use spdu::{
    ConstructParams, ConstructedSpdu, ParsedSpdu, ProcessParams, SignerIdType, SpduKind,
};
pub use time::{Time32, Time64};
pub use types::{HashedId8, Psid};
