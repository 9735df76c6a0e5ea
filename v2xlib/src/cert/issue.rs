// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Certificate issuance under a locally held key.

use super::{
    CertCommonContents, CertId, CertType, Certificate, CrlSeries, IssuerRef,
    VerificationKeyIndicator,
};
use crate::codec::SpduCodec;
use crate::crypto::{ecqv, EccP256Point, PrivateKey};
use crate::error::Result;
use crate::time::Time32;
use crate::types::{GeographicRegion, Psid};

/// A certificate and the private key that goes with it.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub certificate: Certificate,
    pub private_key: PrivateKey,
}

/// Builds certificates from to-be-signed fields.
///
/// No trust rules are applied here; a certificate built with an inconsistent
/// window or CRL series is refused later by the store that receives it.
#[derive(Debug, Clone)]
pub struct CertificateBuilder {
    id: CertId,
    crl_series: CrlSeries,
    valid_start: Time32,
    valid_end: Time32,
    region: Option<GeographicRegion>,
    app_permissions: Vec<Psid>,
}

impl CertificateBuilder {
    pub fn new(id: CertId, crl_series: CrlSeries, valid_start: Time32, valid_end: Time32) -> Self {
        CertificateBuilder {
            id,
            crl_series,
            valid_start,
            valid_end,
            region: None,
            app_permissions: Vec::new(),
        }
    }

    pub fn region(mut self, region: GeographicRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn permissions(mut self, psids: Vec<Psid>) -> Self {
        self.app_permissions = psids;
        self
    }

    fn contents(
        &self,
        cert_type: CertType,
        issuer: IssuerRef,
        verify_key: VerificationKeyIndicator,
    ) -> CertCommonContents {
        CertCommonContents {
            cert_type,
            id: self.id.clone(),
            issuer,
            valid_start: self.valid_start,
            valid_end: self.valid_end,
            crl_series: self.crl_series,
            region: self.region.clone(),
            app_permissions: self.app_permissions.clone(),
            verify_key,
        }
    }

    fn key_indicator(key: &PrivateKey) -> Result<VerificationKeyIndicator> {
        Ok(VerificationKeyIndicator::Key(EccP256Point::from_sec1(
            &key.public_key()?,
        )?))
    }

    /// Explicit certificate signed by its own key.
    pub fn self_signed(&self, codec: &dyn SpduCodec, key: &PrivateKey) -> Result<IssuedCertificate> {
        let contents = self.contents(
            CertType::Explicit,
            IssuerRef::SelfSigned,
            Self::key_indicator(key)?,
        );
        let tbs = codec.encode_tbs_certificate(&contents)?;
        let signature = key.sign(&crate::crypto::signing_input(&tbs, &[]))?;
        let encoded = codec.encode_certificate(&contents, Some(&signature))?;
        Ok(IssuedCertificate {
            certificate: codec.decode_certificate(&encoded)?,
            private_key: key.clone(),
        })
    }

    /// Explicit certificate for `subject_key`, signed by `issuer`.
    pub fn explicit(
        &self,
        codec: &dyn SpduCodec,
        subject_key: &PrivateKey,
        issuer: &IssuedCertificate,
    ) -> Result<IssuedCertificate> {
        let contents = self.contents(
            CertType::Explicit,
            IssuerRef::Digest(issuer.certificate.h8()),
            Self::key_indicator(subject_key)?,
        );
        let tbs = codec.encode_tbs_certificate(&contents)?;
        let input = crate::crypto::signing_input(&tbs, &issuer.certificate.encoded);
        let signature = issuer.private_key.sign(&input)?;
        let encoded = codec.encode_certificate(&contents, Some(&signature))?;
        Ok(IssuedCertificate {
            certificate: codec.decode_certificate(&encoded)?,
            private_key: subject_key.clone(),
        })
    }

    /// Implicit certificate for a request secret `k`; the subject's private key is
    /// derived from `k` and the issuer's key.
    pub fn implicit(
        &self,
        codec: &dyn SpduCodec,
        request_secret: &PrivateKey,
        issuer: &IssuedCertificate,
    ) -> Result<IssuedCertificate> {
        let contents = self.contents(
            CertType::Implicit,
            IssuerRef::Digest(issuer.certificate.h8()),
            VerificationKeyIndicator::ReconstructionValue(ecqv::reconstruction_value(
                request_secret,
            )?),
        );
        let tbs = codec.encode_tbs_certificate(&contents)?;
        let digest_input = crate::crypto::signing_input(&tbs, &issuer.certificate.encoded);
        let private_key =
            ecqv::reconstruct_private_key(request_secret, &issuer.private_key, &digest_input)?;
        let encoded = codec.encode_certificate(&contents, None)?;
        Ok(IssuedCertificate {
            certificate: codec.decode_certificate(&encoded)?,
            private_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DerCodec;
    use crate::crypto::tests::test_key;
    use crate::crypto::verify_p256;

    fn root() -> IssuedCertificate {
        CertificateBuilder::new(
            CertId::Name("root".into()),
            CrlSeries::ROOT_CA,
            Time32(0),
            Time32(1000),
        )
        .self_signed(&DerCodec, &test_key("root"))
        .unwrap()
    }

    #[test]
    fn test_self_signed_verifies_with_own_key() {
        let root = root();
        let cert = &root.certificate;
        assert!(cert.contents.is_self_signed());
        let key = root.private_key.public_key().unwrap();
        assert!(verify_p256(&key, &cert.signing_input(&[]), &cert.signature.unwrap()).is_ok());
    }

    #[test]
    fn test_explicit_verifies_with_issuer_key() {
        let root = root();
        let ica = CertificateBuilder::new(
            CertId::Name("ica".into()),
            CrlSeries::INTERMEDIATE_CA,
            Time32(10),
            Time32(900),
        )
        .explicit(&DerCodec, &test_key("ica"), &root)
        .unwrap();

        assert_eq!(
            ica.certificate.contents.issuer,
            IssuerRef::Digest(root.certificate.h8())
        );
        let issuer_key = root.private_key.public_key().unwrap();
        let input = ica.certificate.signing_input(&root.certificate.encoded);
        assert!(verify_p256(&issuer_key, &input, &ica.certificate.signature.unwrap()).is_ok());
    }

    #[test]
    fn test_implicit_key_reconstructs() {
        let root = root();
        let ee = CertificateBuilder::new(
            CertId::None,
            CrlSeries::PSEUDONYM,
            Time32(10),
            Time32(20),
        )
        .permissions(vec![Psid::BSM])
        .implicit(&DerCodec, &test_key("k"), &root)
        .unwrap();

        let VerificationKeyIndicator::ReconstructionValue(rv) = &ee.certificate.contents.verify_key
        else {
            panic!("expected reconstruction value");
        };
        assert!(ee.certificate.signature.is_none());
        let q = ecqv::reconstruct_public_key(
            rv,
            &root.private_key.public_key().unwrap(),
            &ee.certificate.signing_input(&root.certificate.encoded),
        )
        .unwrap();
        assert_eq!(q, ee.private_key.public_key().unwrap());
    }
}
