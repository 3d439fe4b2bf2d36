// Copyright 2021 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
////////////////////////////////////////////////////////////////////////////////

//! ES256 verification of COSE_Sign1 messages against a [`TrustStore`].

use crate::{
    iana, CoseSign1, HcertError, Label, Result, SignatureFailure, TaggedCborSerializable,
    TrustStore,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::ecdsa::{signature::hazmat::PrehashVerifier, Signature};
use sha2::{Digest, Sha256};


/// Length of a raw `r || s` ES256 signature.
pub const ES256_SIGNATURE_LEN: usize = 64;

fn check_algorithm(sign1: &CoseSign1) -> Result<()> {
    match (&sign1.protected.header.alg, sign1.protected.header.algorithm()) {
        (_, Some(iana::Algorithm::ES256)) => Ok(()),
        (_, Some(alg)) => Err(HcertError::UnsupportedAlgorithm(format!(
            "{alg:?}, expected ES256"
        ))),
        (Some(Label::Int(i)), None) => Err(HcertError::UnsupportedAlgorithm(format!(
            "unregistered value {i}, expected ES256"
        ))),
        (Some(Label::Text(t)), None) => Err(HcertError::UnsupportedAlgorithm(format!(
            "'{t}', expected ES256"
        ))),
        (None, _) => Err(HcertError::UnsupportedAlgorithm(
            "no alg in protected header".to_owned(),
        )),
    }
}

/// Verify a parsed COSE_Sign1 message, returning its payload on success.
///
/// The protected header must name ES256.  Candidate keys are those registered under the message's
/// key identifier (see [`CoseSign1::key_id`]); the first that verifies the signature over the
/// SHA-256 digest of the `Sig_structure` is accepted.
pub fn verify_sign1(sign1: CoseSign1, trust: &TrustStore) -> Result<Vec<u8>> {
    check_algorithm(&sign1)?;
    if sign1.signature.len() != ES256_SIGNATURE_LEN {
        return Err(HcertError::MalformedEnvelope(format!(
            "signature: {} bytes, expected {ES256_SIGNATURE_LEN} for ES256",
            sign1.signature.len()
        )));
    }

    let kid = sign1.key_id();
    let candidates = trust.lookup(kid);
    let fail = |reason| HcertError::SignatureInvalid {
        kid: kid.to_vec(),
        reason,
    };

    sign1.verify_signature(b"", |sig, tbs| {
        if candidates.is_empty() {
            tracing::debug!(kid = %BASE64.encode(kid), "no trusted key for kid");
            return Err(fail(SignatureFailure::NoTrustedKey));
        }
        let signature =
            Signature::from_slice(sig).map_err(|_| fail(SignatureFailure::MalformedSignature))?;
        let digest = Sha256::digest(tbs);
        for (i, key) in candidates.iter().enumerate() {
            match key.verify_prehash(&digest, &signature) {
                Ok(()) => {
                    tracing::debug!(kid = %BASE64.encode(kid), candidate = i, "signature verified");
                    return Ok(());
                }
                Err(_) => tracing::trace!(kid = %BASE64.encode(kid), candidate = i, "key rejected"),
            }
        }
        tracing::debug!(
            kid = %BASE64.encode(kid),
            candidates = candidates.len(),
            "no trusted key verified signature"
        );
        Err(fail(SignatureFailure::NoKeyVerified {
            candidates: candidates.len(),
        }))
    })?;
    Ok(sign1.payload)
}

/// Parse tagged COSE_Sign1 `data` and verify it, returning the payload on success.
pub fn verify_cose_sign1(data: &[u8], trust: &TrustStore) -> Result<Vec<u8>> {
    verify_sign1(CoseSign1::from_tagged_slice(data)?, trust)
}
