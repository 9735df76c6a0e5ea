// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! DER encoding of 1609.2-shaped envelopes and certificates.
//!
//! CHOICE types are modelled as a SEQUENCE of EXPLICIT context-specific OPTIONAL
//! alternatives, of which exactly one must be present:
//!
//! ```asn1
//! Ieee1609Dot2Data ::= SEQUENCE {
//!     protocolVersion  INTEGER (3),
//!     content          Content
//! }
//! Content ::= SEQUENCE {  -- CHOICE
//!     unsecuredData    [0] OCTET STRING OPTIONAL,
//!     signedData       [1] SignedData OPTIONAL
//! }
//! SignedData ::= SEQUENCE {
//!     hashId           INTEGER (0),   -- sha256
//!     tbsData          ToBeSignedData,
//!     signer           SignerIdentifier,
//!     signature        OCTET STRING (SIZE (64))
//! }
//! SignerIdentifier ::= SEQUENCE {  -- CHOICE
//!     digest           [0] OCTET STRING (SIZE (8)) OPTIONAL,
//!     certificate      [1] Certificate OPTIONAL,
//!     self             [2] NULL OPTIONAL
//! }
//! Certificate ::= SEQUENCE {
//!     version          INTEGER (3),
//!     type             INTEGER { explicit(0), implicit(1) },
//!     issuer           IssuerIdentifier,
//!     toBeSigned       ToBeSignedCertificate,
//!     signature        [0] OCTET STRING (SIZE (64)) OPTIONAL
//! }
//! ```
//!
//! DER is canonical, so re-encoding a decoded `toBeSigned` reproduces the signed bytes.

use der::asn1::{Null, OctetString};
use der::{Decode, Encode, Sequence};

use super::{
    HeaderInfo, SignedData, SignerId, Spdu, SpduCodec, ToBeSignedData, CERT_VERSION,
    PROTOCOL_VERSION,
};
use crate::cert::{
    CertCommonContents, CertId, CertType, Certificate, CrlSeries, IssuerRef,
    VerificationKeyIndicator,
};
use crate::crypto::{EccP256Point, SIGNATURE_LEN};
use crate::error::{CodecError, Error, Result};
use crate::time::{Time32, Time64};
use crate::types::{
    GeographicRegion, HashedId8, Psid, RectangularRegion, ThreeDLocation, TwoDLocation,
};

const HASH_ID_SHA256: u8 = 0;
const LINKAGE_VALUE_LEN: usize = 9;

// ============================================================================
// Envelope schema
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct Ieee1609Dot2DataDer {
    protocol_version: u8,
    content: ContentDer,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct ContentDer {
    #[asn1(context_specific = "0", optional = "true")]
    unsecured_data: Option<OctetString>,

    #[asn1(context_specific = "1", optional = "true")]
    signed_data: Option<SignedDataDer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct SignedDataDer {
    hash_id: u8,
    tbs_data: ToBeSignedDataDer,
    signer: SignerIdentifierDer,
    signature: OctetString,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct ToBeSignedDataDer {
    payload: OctetString,
    header_info: HeaderInfoDer,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct HeaderInfoDer {
    psid: u32,

    #[asn1(context_specific = "0", optional = "true")]
    generation_time: Option<u64>,

    #[asn1(context_specific = "1", optional = "true")]
    expiry_time: Option<u64>,

    #[asn1(context_specific = "2", optional = "true")]
    generation_location: Option<ThreeDLocationDer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct ThreeDLocationDer {
    latitude: i32,
    longitude: i32,
    elevation: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct SignerIdentifierDer {
    #[asn1(context_specific = "0", optional = "true")]
    digest: Option<OctetString>,

    #[asn1(context_specific = "1", optional = "true")]
    certificate: Option<CertificateDer>,

    #[asn1(context_specific = "2", optional = "true")]
    self_signed: Option<Null>,
}

// ============================================================================
// Certificate schema
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct CertificateDer {
    version: u8,
    cert_type: u8,
    issuer: IssuerIdentifierDer,
    to_be_signed: ToBeSignedCertificateDer,

    #[asn1(context_specific = "0", optional = "true")]
    signature: Option<OctetString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct IssuerIdentifierDer {
    #[asn1(context_specific = "0", optional = "true")]
    sha256_and_digest: Option<OctetString>,

    #[asn1(context_specific = "1", optional = "true")]
    self_signed: Option<Null>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct ToBeSignedCertificateDer {
    id: CertificateIdDer,
    crl_series: u16,
    validity_period: ValidityPeriodDer,

    #[asn1(context_specific = "0", optional = "true")]
    region: Option<GeographicRegionDer>,

    #[asn1(context_specific = "1", optional = "true")]
    app_permissions: Option<Vec<u32>>,

    verify_key_indicator: VerificationKeyIndicatorDer,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct CertificateIdDer {
    #[asn1(context_specific = "0", optional = "true")]
    linkage_data: Option<LinkageDataDer>,

    /// UTF-8 host name
    #[asn1(context_specific = "1", optional = "true")]
    name: Option<OctetString>,

    #[asn1(context_specific = "2", optional = "true")]
    binary_id: Option<OctetString>,

    #[asn1(context_specific = "3", optional = "true")]
    none: Option<Null>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct LinkageDataDer {
    i_cert: u16,
    linkage_value: OctetString,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct ValidityPeriodDer {
    start: u32,
    duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct GeographicRegionDer {
    #[asn1(context_specific = "0", optional = "true")]
    circular: Option<CircularRegionDer>,

    #[asn1(context_specific = "1", optional = "true")]
    rectangular: Option<Vec<RectangularRegionDer>>,

    #[asn1(context_specific = "2", optional = "true")]
    identified: Option<Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct CircularRegionDer {
    latitude: i32,
    longitude: i32,
    radius: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct RectangularRegionDer {
    nw_latitude: i32,
    nw_longitude: i32,
    se_latitude: i32,
    se_longitude: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Sequence)]
struct VerificationKeyIndicatorDer {
    #[asn1(context_specific = "0", optional = "true")]
    verification_key: Option<OctetString>,

    #[asn1(context_specific = "1", optional = "true")]
    reconstruction_value: Option<OctetString>,
}

// ============================================================================
// Conversions
// ============================================================================

fn exactly_one(present: &[bool], name: &'static str) -> Result<()> {
    if present.iter().filter(|p| **p).count() != 1 {
        return Err(CodecError::InvalidChoice(name).into());
    }
    Ok(())
}

fn octets(bytes: &[u8]) -> Result<OctetString> {
    OctetString::new(bytes).map_err(Error::Asn1)
}

fn signature_from(bytes: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    bytes.try_into().map_err(|_| {
        CodecError::InvalidLength {
            field: "signature",
            expected: SIGNATURE_LEN,
            found: bytes.len(),
        }
        .into()
    })
}

fn point_from(bytes: &[u8]) -> Result<EccP256Point> {
    EccP256Point::from_sec1(bytes).map_err(|_| Error::invalid_encoding("malformed EC point"))
}

fn location_to_der(loc: &ThreeDLocation) -> ThreeDLocationDer {
    ThreeDLocationDer {
        latitude: loc.latitude,
        longitude: loc.longitude,
        elevation: loc.elevation,
    }
}

fn header_to_der(header: &HeaderInfo) -> HeaderInfoDer {
    HeaderInfoDer {
        psid: header.psid.0,
        generation_time: header.generation_time.map(|t| t.0),
        expiry_time: header.expiry_time.map(|t| t.0),
        generation_location: header.generation_location.as_ref().map(location_to_der),
    }
}

fn header_from_der(der: &HeaderInfoDer) -> HeaderInfo {
    HeaderInfo {
        psid: Psid(der.psid),
        generation_time: der.generation_time.map(Time64),
        expiry_time: der.expiry_time.map(Time64),
        generation_location: der.generation_location.as_ref().map(|l| ThreeDLocation {
            latitude: l.latitude,
            longitude: l.longitude,
            elevation: l.elevation,
        }),
    }
}

fn tbs_data_to_der(tbs: &ToBeSignedData) -> Result<ToBeSignedDataDer> {
    Ok(ToBeSignedDataDer {
        payload: octets(&tbs.payload)?,
        header_info: header_to_der(&tbs.header),
    })
}

fn region_to_der(region: &GeographicRegion) -> GeographicRegionDer {
    let mut der = GeographicRegionDer {
        circular: None,
        rectangular: None,
        identified: None,
    };
    match region {
        GeographicRegion::Circular { center, radius_m } => {
            der.circular = Some(CircularRegionDer {
                latitude: center.latitude,
                longitude: center.longitude,
                radius: *radius_m,
            })
        }
        GeographicRegion::Rectangular(rects) => {
            der.rectangular = Some(
                rects
                    .iter()
                    .map(|r| RectangularRegionDer {
                        nw_latitude: r.north_west.latitude,
                        nw_longitude: r.north_west.longitude,
                        se_latitude: r.south_east.latitude,
                        se_longitude: r.south_east.longitude,
                    })
                    .collect(),
            )
        }
        GeographicRegion::Identified(codes) => der.identified = Some(codes.clone()),
    }
    der
}

fn region_from_der(der: &GeographicRegionDer) -> Result<GeographicRegion> {
    exactly_one(
        &[
            der.circular.is_some(),
            der.rectangular.is_some(),
            der.identified.is_some(),
        ],
        "GeographicRegion",
    )?;
    if let Some(c) = &der.circular {
        return Ok(GeographicRegion::Circular {
            center: TwoDLocation {
                latitude: c.latitude,
                longitude: c.longitude,
            },
            radius_m: c.radius,
        });
    }
    if let Some(rects) = &der.rectangular {
        return Ok(GeographicRegion::Rectangular(
            rects
                .iter()
                .map(|r| RectangularRegion {
                    north_west: TwoDLocation {
                        latitude: r.nw_latitude,
                        longitude: r.nw_longitude,
                    },
                    south_east: TwoDLocation {
                        latitude: r.se_latitude,
                        longitude: r.se_longitude,
                    },
                })
                .collect(),
        ));
    }
    Ok(GeographicRegion::Identified(
        der.identified.clone().unwrap_or_default(),
    ))
}

fn id_to_der(id: &CertId) -> Result<CertificateIdDer> {
    let mut der = CertificateIdDer {
        linkage_data: None,
        name: None,
        binary_id: None,
        none: None,
    };
    match id {
        CertId::None => der.none = Some(Null),
        CertId::Name(name) => der.name = Some(octets(name.as_bytes())?),
        CertId::BinaryId(bytes) => der.binary_id = Some(octets(bytes)?),
        CertId::LinkageData {
            i_cert,
            linkage_value,
        } => {
            der.linkage_data = Some(LinkageDataDer {
                i_cert: *i_cert,
                linkage_value: octets(linkage_value)?,
            })
        }
    }
    Ok(der)
}

fn id_from_der(der: &CertificateIdDer) -> Result<CertId> {
    exactly_one(
        &[
            der.linkage_data.is_some(),
            der.name.is_some(),
            der.binary_id.is_some(),
            der.none.is_some(),
        ],
        "CertificateId",
    )?;
    if let Some(linkage) = &der.linkage_data {
        let value = linkage.linkage_value.as_bytes();
        let linkage_value: [u8; LINKAGE_VALUE_LEN] = value.try_into().map_err(|_| {
            Error::from(CodecError::InvalidLength {
                field: "linkage value",
                expected: LINKAGE_VALUE_LEN,
                found: value.len(),
            })
        })?;
        return Ok(CertId::LinkageData {
            i_cert: linkage.i_cert,
            linkage_value,
        });
    }
    if let Some(name) = &der.name {
        let name = String::from_utf8(name.as_bytes().to_vec())
            .map_err(|_| Error::invalid_encoding("certificate name is not UTF-8"))?;
        return Ok(CertId::Name(name));
    }
    if let Some(binary) = &der.binary_id {
        return Ok(CertId::BinaryId(binary.as_bytes().to_vec()));
    }
    Ok(CertId::None)
}

fn tbs_cert_to_der(contents: &CertCommonContents) -> Result<ToBeSignedCertificateDer> {
    contents.check_validity_window()?;
    let duration_secs = contents.valid_end.0 - contents.valid_start.0;

    let verify_key_indicator = match &contents.verify_key {
        VerificationKeyIndicator::Key(point) => VerificationKeyIndicatorDer {
            verification_key: Some(octets(&point.to_sec1())?),
            reconstruction_value: None,
        },
        VerificationKeyIndicator::ReconstructionValue(point) => VerificationKeyIndicatorDer {
            verification_key: None,
            reconstruction_value: Some(octets(&point.to_sec1())?),
        },
    };

    Ok(ToBeSignedCertificateDer {
        id: id_to_der(&contents.id)?,
        crl_series: contents.crl_series.0,
        validity_period: ValidityPeriodDer {
            start: contents.valid_start.0,
            duration_secs,
        },
        region: contents.region.as_ref().map(region_to_der),
        app_permissions: if contents.app_permissions.is_empty() {
            None
        } else {
            Some(contents.app_permissions.iter().map(|p| p.0).collect())
        },
        verify_key_indicator,
    })
}

fn cert_to_der(
    contents: &CertCommonContents,
    signature: Option<&[u8; SIGNATURE_LEN]>,
) -> Result<CertificateDer> {
    let issuer = match contents.issuer {
        IssuerRef::SelfSigned => IssuerIdentifierDer {
            sha256_and_digest: None,
            self_signed: Some(Null),
        },
        IssuerRef::Digest(h8) => IssuerIdentifierDer {
            sha256_and_digest: Some(octets(h8.as_bytes())?),
            self_signed: None,
        },
    };
    let cert_type = match contents.cert_type {
        CertType::Explicit => 0,
        CertType::Implicit => 1,
    };
    Ok(CertificateDer {
        version: CERT_VERSION,
        cert_type,
        issuer,
        to_be_signed: tbs_cert_to_der(contents)?,
        signature: signature.map(|s| octets(s)).transpose()?,
    })
}

fn cert_from_der(der: &CertificateDer, encoded: Vec<u8>) -> Result<Certificate> {
    if der.version != CERT_VERSION {
        return Err(CodecError::UnsupportedVersion(der.version).into());
    }

    let cert_type = match der.cert_type {
        0 => CertType::Explicit,
        1 => CertType::Implicit,
        _ => return Err(Error::invalid_encoding("unknown certificate type")),
    };

    exactly_one(
        &[
            der.issuer.sha256_and_digest.is_some(),
            der.issuer.self_signed.is_some(),
        ],
        "IssuerIdentifier",
    )?;
    let issuer = match &der.issuer.sha256_and_digest {
        Some(digest) => IssuerRef::Digest(HashedId8::try_from(digest.as_bytes())?),
        None => IssuerRef::SelfSigned,
    };

    let tbs = &der.to_be_signed;
    let vki = &tbs.verify_key_indicator;
    exactly_one(
        &[
            vki.verification_key.is_some(),
            vki.reconstruction_value.is_some(),
        ],
        "VerificationKeyIndicator",
    )?;
    let verify_key = match (&vki.verification_key, &vki.reconstruction_value) {
        (Some(key), _) => VerificationKeyIndicator::Key(point_from(key.as_bytes())?),
        (None, Some(rv)) => VerificationKeyIndicator::ReconstructionValue(point_from(rv.as_bytes())?),
        (None, None) => return Err(CodecError::InvalidChoice("VerificationKeyIndicator").into()),
    };

    // explicit certificates carry a key and a signature, implicit ones neither
    let signature = match (cert_type, &der.signature, &verify_key) {
        (CertType::Explicit, Some(sig), VerificationKeyIndicator::Key(_)) => {
            Some(signature_from(sig.as_bytes())?)
        }
        (CertType::Implicit, None, VerificationKeyIndicator::ReconstructionValue(_)) => None,
        _ => {
            return Err(Error::invalid_encoding(
                "certificate type inconsistent with key indicator or signature",
            ))
        }
    };

    let start = Time32(tbs.validity_period.start);
    let contents = CertCommonContents {
        cert_type,
        id: id_from_der(&tbs.id)?,
        issuer,
        valid_start: start,
        valid_end: start.saturating_add_secs(tbs.validity_period.duration_secs),
        crl_series: CrlSeries(tbs.crl_series),
        region: tbs.region.as_ref().map(region_from_der).transpose()?,
        app_permissions: tbs
            .app_permissions
            .as_ref()
            .map(|p| p.iter().copied().map(Psid).collect())
            .unwrap_or_default(),
        verify_key,
    };

    Ok(Certificate {
        contents,
        tbs_bytes: tbs.to_der()?,
        signature,
        encoded,
    })
}

/// DER implementation of [`SpduCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DerCodec;

impl SpduCodec for DerCodec {
    fn encode_unsecured(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let data = Ieee1609Dot2DataDer {
            protocol_version: PROTOCOL_VERSION,
            content: ContentDer {
                unsecured_data: Some(octets(payload)?),
                signed_data: None,
            },
        };
        Ok(data.to_der()?)
    }

    fn encode_tbs_data(&self, tbs: &ToBeSignedData) -> Result<Vec<u8>> {
        Ok(tbs_data_to_der(tbs)?.to_der()?)
    }

    fn encode_signed(
        &self,
        tbs: &ToBeSignedData,
        signer: &SignerId,
        signature: &[u8; SIGNATURE_LEN],
    ) -> Result<Vec<u8>> {
        let signer = match signer {
            SignerId::Digest(h8) => SignerIdentifierDer {
                digest: Some(octets(h8.as_bytes())?),
                certificate: None,
                self_signed: None,
            },
            SignerId::Certificate(bytes) => SignerIdentifierDer {
                digest: None,
                certificate: Some(CertificateDer::from_der(bytes)?),
                self_signed: None,
            },
            SignerId::SelfSigned => SignerIdentifierDer {
                digest: None,
                certificate: None,
                self_signed: Some(Null),
            },
        };

        let data = Ieee1609Dot2DataDer {
            protocol_version: PROTOCOL_VERSION,
            content: ContentDer {
                unsecured_data: None,
                signed_data: Some(SignedDataDer {
                    hash_id: HASH_ID_SHA256,
                    tbs_data: tbs_data_to_der(tbs)?,
                    signer,
                    signature: octets(signature)?,
                }),
            },
        };
        Ok(data.to_der()?)
    }

    fn decode_spdu(&self, bytes: &[u8]) -> Result<Spdu> {
        let data = Ieee1609Dot2DataDer::from_der(bytes)?;
        if data.protocol_version != PROTOCOL_VERSION {
            return Err(CodecError::UnsupportedVersion(data.protocol_version).into());
        }

        let content = data.content;
        exactly_one(
            &[
                content.unsecured_data.is_some(),
                content.signed_data.is_some(),
            ],
            "Content",
        )?;

        let signed = match (content.unsecured_data, content.signed_data) {
            (Some(payload), None) => return Ok(Spdu::Unsecured(payload.as_bytes().to_vec())),
            (None, Some(signed)) => signed,
            _ => return Err(CodecError::InvalidChoice("Content").into()),
        };

        if signed.hash_id != HASH_ID_SHA256 {
            return Err(Error::invalid_encoding("unsupported hash algorithm"));
        }

        let s = &signed.signer;
        exactly_one(
            &[
                s.digest.is_some(),
                s.certificate.is_some(),
                s.self_signed.is_some(),
            ],
            "SignerIdentifier",
        )?;
        let signer = if let Some(digest) = &s.digest {
            SignerId::Digest(HashedId8::try_from(digest.as_bytes())?)
        } else if let Some(cert) = &s.certificate {
            SignerId::Certificate(cert.to_der()?)
        } else {
            SignerId::SelfSigned
        };

        let tbs = ToBeSignedData {
            payload: signed.tbs_data.payload.as_bytes().to_vec(),
            header: header_from_der(&signed.tbs_data.header_info),
        };

        Ok(Spdu::Signed(SignedData {
            tbs,
            tbs_bytes: signed.tbs_data.to_der()?,
            signer,
            signature: signature_from(signed.signature.as_bytes())?,
        }))
    }

    fn encode_tbs_certificate(&self, contents: &CertCommonContents) -> Result<Vec<u8>> {
        Ok(tbs_cert_to_der(contents)?.to_der()?)
    }

    fn encode_certificate(
        &self,
        contents: &CertCommonContents,
        signature: Option<&[u8; SIGNATURE_LEN]>,
    ) -> Result<Vec<u8>> {
        Ok(cert_to_der(contents, signature)?.to_der()?)
    }

    fn decode_certificate(&self, bytes: &[u8]) -> Result<Certificate> {
        let der = CertificateDer::from_der(bytes)?;
        cert_from_der(&der, bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::common::tests::contents;
    use crate::error::CodecError;

    #[test]
    fn test_unsecured() {
        let bytes = DerCodec.encode_unsecured(b"hello").unwrap();
        assert_eq!(
            DerCodec.decode_spdu(&bytes).unwrap(),
            Spdu::Unsecured(b"hello".to_vec())
        );
    }

    #[test]
    fn test_signed_preserves_tbs_bytes() {
        let tbs = ToBeSignedData {
            payload: vec![1, 2, 3],
            header: HeaderInfo {
                psid: Psid::BSM,
                generation_time: Some(Time64(42)),
                expiry_time: None,
                generation_location: Some(ThreeDLocation {
                    latitude: -5,
                    longitude: 7,
                    elevation: 9,
                }),
            },
        };
        let signer = SignerId::Digest(HashedId8([9; 8]));
        let bytes = DerCodec.encode_signed(&tbs, &signer, &[7; 64]).unwrap();

        let Spdu::Signed(signed) = DerCodec.decode_spdu(&bytes).unwrap() else {
            panic!("expected signed data");
        };
        assert_eq!(signed.tbs, tbs);
        assert_eq!(signed.signer, signer);
        assert_eq!(signed.tbs_bytes, DerCodec.encode_tbs_data(&tbs).unwrap());
    }

    #[test]
    fn test_certificate_decode() {
        let mut c = contents(100, 200, CrlSeries::PSEUDONYM);
        c.issuer = IssuerRef::Digest(HashedId8([3; 8]));
        c.id = CertId::LinkageData {
            i_cert: 4,
            linkage_value: [5; 9],
        };
        c.app_permissions = vec![Psid::BSM, Psid::WSA];
        c.region = Some(GeographicRegion::Identified(vec![840]));

        let bytes = DerCodec.encode_certificate(&c, Some(&[1; 64])).unwrap();
        let cert = DerCodec.decode_certificate(&bytes).unwrap();
        assert_eq!(cert.contents, c);
        assert_eq!(cert.encoded, bytes);
        assert_eq!(cert.signature, Some([1; 64]));
        assert_eq!(cert.tbs_bytes, DerCodec.encode_tbs_certificate(&c).unwrap());
    }

    #[test]
    fn test_explicit_certificate_requires_signature() {
        let c = contents(0, 10, CrlSeries::ROOT_CA);
        let bytes = DerCodec.encode_certificate(&c, None).unwrap();
        assert!(matches!(
            DerCodec.decode_certificate(&bytes),
            Err(Error::Codec(CodecError::InvalidEncoding(_)))
        ));
    }

    #[test]
    fn test_rejects_wrong_version_and_garbage() {
        let mut data = Ieee1609Dot2DataDer {
            protocol_version: 2,
            content: ContentDer {
                unsecured_data: Some(octets(b"x").unwrap()),
                signed_data: None,
            },
        };
        let bytes = data.to_der().unwrap();
        assert!(matches!(
            DerCodec.decode_spdu(&bytes),
            Err(Error::Codec(CodecError::UnsupportedVersion(2)))
        ));

        data.protocol_version = PROTOCOL_VERSION;
        data.content.unsecured_data = None;
        let bytes = data.to_der().unwrap();
        assert!(matches!(
            DerCodec.decode_spdu(&bytes),
            Err(Error::Codec(CodecError::InvalidChoice("Content")))
        ));

        assert!(matches!(
            DerCodec.decode_spdu(&[0x30, 0x05, 0x01]),
            Err(Error::Asn1(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_validity_on_encode() {
        let c = contents(20, 10, CrlSeries::ROOT_CA);
        assert!(DerCodec.encode_certificate(&c, Some(&[0; 64])).is_err());
    }
}
