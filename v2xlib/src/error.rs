// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Error types for SPDU processing and trust-store management.
//!
//! Every variant maps to a stable negative result code (see [`Error::code`]) so that
//! the verdict delivered through the processing callback can be forwarded unchanged
//! to callers that only understand integer status values.

use core::fmt;

/// Result type alias for v2xlib operations
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Caller supplied an invalid argument
    Param(ParamError),

    /// Envelope or certificate could not be encoded/decoded
    Codec(CodecError),

    /// Errors from the DER layer (from der crate)
    Asn1(der::Error),

    /// SCC store / EE cache / chain-of-trust failures
    Trust(TrustError),

    /// Cryptographic verification or key reconstruction failures
    Signature(SignatureError),

    /// Security profile / certificate-holder failures
    Profile(ProfileError),

    /// SPDU relevance checks (expiry, generation time, region)
    Relevance(RelevanceError),

    /// Processing pipeline failures
    Pipeline(PipelineError),

    /// Signature verified but the signer certificate is revoked
    SignerRevoked,

    /// Internal error (should not occur in normal operation)
    Internal(String),
}

/// Parameter validation failures, reported synchronously
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// PSID value is reserved or out of range
    InvalidPsid(u32),

    /// Profile requires a generation location and none was supplied
    MissingLocation,

    /// Empty envelope buffer submitted for processing
    EmptyInput,

    /// Configuration value rejected
    InvalidConfig(String),
}

/// Encoding/decoding failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed encoding
    InvalidEncoding(String),

    /// Protocol version other than the supported one
    UnsupportedVersion(u8),

    /// None or more than one alternative present in a CHOICE
    InvalidChoice(&'static str),

    /// Fixed-size field has the wrong length
    InvalidLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Trust store and chain-of-trust failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// SCC store or EE cache table at capacity
    TooManyCertsInTable,

    /// EE cache bucket at capacity
    TooManyCertsInBucket,

    /// Identical certificate already stored
    SameCertInTable,

    /// Issuer of an issuer-signed certificate is not in the SCC store
    NoIssuerCert,

    /// CRL series not allowed for the certificate's position in the chain
    InvalidCertCrlSeries(u16),

    /// Validity window malformed or not nested in the issuer's window
    InvalidCertValidTime,

    /// Certificate carries a reconstruction value where a key is required
    InvalidVerificationKeyIndicatorType,

    /// Issuer of an EE certificate could not be located in the SCC store
    ConstructCertChain,

    /// Signer digest is not known to the EE cache or SCC store
    SignerCertNotFound,

    /// Signer identifier alternative not usable for verification
    UnsupportedSignerType,

    /// Signer certificate does not grant the SPDU's PSID
    PsidNotPermitted(u32),

    /// Signer certificate not valid at the SPDU generation time
    CertNotValidAtGenerationTime,
}

/// Cryptographic failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature verification failed
    VerificationFailed,

    /// Public key or point cannot be used
    InvalidPublicKey(String),

    /// Invalid signature length
    InvalidSignatureLength { expected: usize, found: usize },

    /// Implicit certificate key reconstruction failed
    ReconstructionFailed,

    /// Signing failed
    SigningFailed(String),
}

/// Security profile and certificate-holder failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No security profile registered for the PSID
    NoSecProfile(u32),

    /// Certificate holder has no usable signing material for the PSID
    NoSigningMaterial(u32),

    /// SPDU PSID differs from the PSID the caller expected
    PsidMismatch { expected: u32, found: u32 },
}

/// SPDU relevance failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelevanceError {
    /// Expiry time precedes the receive time
    SpduExpired,

    /// Generation time is too far ahead of the receive time
    SpduFromFuture,

    /// Generation location lies outside the signer certificate's region
    OutsideValidityRegion,
}

/// Processing pipeline failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Request queue at capacity
    QueueFull,

    /// Pipeline has been shut down
    NotRunning,

    /// Hardware accelerator rejected or dropped a request
    AcceleratorRequest(String),

    /// Worker thread could not be spawned
    ThreadSpawn(String),
}

impl Error {
    /// Stable negative result code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::Param(e) => match e {
                ParamError::InvalidPsid(_) => -1,
                ParamError::MissingLocation => -2,
                ParamError::EmptyInput => -3,
                ParamError::InvalidConfig(_) => -4,
            },
            Error::Codec(_) | Error::Asn1(_) => -10,
            Error::Trust(e) => match e {
                TrustError::TooManyCertsInTable => -20,
                TrustError::TooManyCertsInBucket => -21,
                TrustError::SameCertInTable => -22,
                TrustError::NoIssuerCert => -23,
                TrustError::InvalidCertCrlSeries(_) => -24,
                TrustError::InvalidCertValidTime => -25,
                TrustError::InvalidVerificationKeyIndicatorType => -26,
                TrustError::ConstructCertChain => -27,
                TrustError::SignerCertNotFound => -28,
                TrustError::UnsupportedSignerType => -29,
                TrustError::PsidNotPermitted(_) => -30,
                TrustError::CertNotValidAtGenerationTime => -31,
            },
            Error::Signature(e) => match e {
                SignatureError::VerificationFailed => -40,
                SignatureError::InvalidPublicKey(_) => -41,
                SignatureError::InvalidSignatureLength { .. } => -42,
                SignatureError::ReconstructionFailed => -43,
                SignatureError::SigningFailed(_) => -44,
            },
            Error::Profile(e) => match e {
                ProfileError::NoSecProfile(_) => -50,
                ProfileError::NoSigningMaterial(_) => -51,
                ProfileError::PsidMismatch { .. } => -52,
            },
            Error::Relevance(e) => match e {
                RelevanceError::SpduExpired => -60,
                RelevanceError::SpduFromFuture => -61,
                RelevanceError::OutsideValidityRegion => -62,
            },
            Error::Pipeline(e) => match e {
                PipelineError::QueueFull => -70,
                PipelineError::NotRunning => -71,
                PipelineError::AcceleratorRequest(_) => -72,
                PipelineError::ThreadSpawn(_) => -73,
            },
            Error::SignerRevoked => -80,
            Error::Internal(_) => -99,
        }
    }

    /// Create a codec error for malformed input
    pub fn invalid_encoding<S: Into<String>>(msg: S) -> Self {
        Error::Codec(CodecError::InvalidEncoding(msg.into()))
    }

    /// Create a signature verification failure
    pub fn signature_failed() -> Self {
        Error::Signature(SignatureError::VerificationFailed)
    }

    /// Create an invalid public key error
    pub fn invalid_public_key<S: Into<String>>(msg: S) -> Self {
        Error::Signature(SignatureError::InvalidPublicKey(msg.into()))
    }

    /// Create an accelerator request failure
    pub fn accelerator<S: Into<String>>(msg: S) -> Self {
        Error::Pipeline(PipelineError::AcceleratorRequest(msg.into()))
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<TrustError> for Error {
    fn from(err: TrustError) -> Self {
        Error::Trust(err)
    }
}

impl From<SignatureError> for Error {
    fn from(err: SignatureError) -> Self {
        Error::Signature(err)
    }
}

impl From<ProfileError> for Error {
    fn from(err: ProfileError) -> Self {
        Error::Profile(err)
    }
}

impl From<RelevanceError> for Error {
    fn from(err: RelevanceError) -> Self {
        Error::Relevance(err)
    }
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        Error::Pipeline(err)
    }
}

impl From<ParamError> for Error {
    fn from(err: ParamError) -> Self {
        Error::Param(err)
    }
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        Error::Codec(err)
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::Asn1(err)
    }
}

impl From<ring::error::Unspecified> for Error {
    fn from(_: ring::error::Unspecified) -> Self {
        Error::Signature(SignatureError::VerificationFailed)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Param(ParamError::InvalidConfig(err.to_string()))
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Param(e) => write!(f, "Invalid parameter: {}", e),
            Error::Codec(e) => write!(f, "Codec error: {}", e),
            Error::Asn1(e) => write!(f, "ASN.1 error: {}", e),
            Error::Trust(e) => write!(f, "Trust error: {}", e),
            Error::Signature(e) => write!(f, "Signature error: {}", e),
            Error::Profile(e) => write!(f, "Profile error: {}", e),
            Error::Relevance(e) => write!(f, "Relevance check failed: {}", e),
            Error::Pipeline(e) => write!(f, "Pipeline error: {}", e),
            Error::SignerRevoked => write!(f, "Signer certificate has been revoked"),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::InvalidPsid(psid) => write!(f, "invalid PSID {:#x}", psid),
            ParamError::MissingLocation => write!(f, "generation location required"),
            ParamError::EmptyInput => write!(f, "empty input buffer"),
            ParamError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidEncoding(msg) => write!(f, "invalid encoding: {}", msg),
            CodecError::UnsupportedVersion(v) => write!(f, "unsupported protocol version {}", v),
            CodecError::InvalidChoice(name) => write!(f, "invalid {} choice", name),
            CodecError::InvalidLength {
                field,
                expected,
                found,
            } => write!(
                f,
                "invalid {} length: expected {}, found {}",
                field, expected, found
            ),
        }
    }
}

impl fmt::Display for TrustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustError::TooManyCertsInTable => write!(f, "too many certificates in table"),
            TrustError::TooManyCertsInBucket => write!(f, "too many certificates in bucket"),
            TrustError::SameCertInTable => write!(f, "same certificate already in table"),
            TrustError::NoIssuerCert => write!(f, "issuer certificate not found"),
            TrustError::InvalidCertCrlSeries(series) => {
                write!(f, "invalid certificate CRL series {}", series)
            }
            TrustError::InvalidCertValidTime => write!(f, "invalid certificate validity period"),
            TrustError::InvalidVerificationKeyIndicatorType => {
                write!(f, "invalid verification key indicator type")
            }
            TrustError::ConstructCertChain => write!(f, "cannot construct certificate chain"),
            TrustError::SignerCertNotFound => write!(f, "signer certificate not found"),
            TrustError::UnsupportedSignerType => write!(f, "unsupported signer identifier"),
            TrustError::PsidNotPermitted(psid) => {
                write!(f, "PSID {:#x} not permitted by signer certificate", psid)
            }
            TrustError::CertNotValidAtGenerationTime => {
                write!(f, "signer certificate not valid at generation time")
            }
        }
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::VerificationFailed => write!(f, "Signature verification failed"),
            SignatureError::InvalidPublicKey(msg) => write!(f, "Invalid public key: {}", msg),
            SignatureError::InvalidSignatureLength { expected, found } => {
                write!(
                    f,
                    "Invalid signature length: expected {}, found {}",
                    expected, found
                )
            }
            SignatureError::ReconstructionFailed => write!(f, "Public key reconstruction failed"),
            SignatureError::SigningFailed(msg) => write!(f, "Signing failed: {}", msg),
        }
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NoSecProfile(psid) => write!(f, "no security profile for PSID {:#x}", psid),
            ProfileError::NoSigningMaterial(psid) => {
                write!(f, "no signing material for PSID {:#x}", psid)
            }
            ProfileError::PsidMismatch { expected, found } => {
                write!(f, "PSID mismatch: expected {:#x}, found {:#x}", expected, found)
            }
        }
    }
}

impl fmt::Display for RelevanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelevanceError::SpduExpired => write!(f, "SPDU expired"),
            RelevanceError::SpduFromFuture => write!(f, "SPDU generated in the future"),
            RelevanceError::OutsideValidityRegion => {
                write!(f, "generation location outside certificate region")
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::QueueFull => write!(f, "request queue full"),
            PipelineError::NotRunning => write!(f, "pipeline not running"),
            PipelineError::AcceleratorRequest(msg) => write!(f, "accelerator request failed: {}", msg),
            PipelineError::ThreadSpawn(msg) => write!(f, "failed to spawn worker: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
