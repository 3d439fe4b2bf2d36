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

//! Fixtures for building signed health certificates in tests.

use crate::{
    base45, iana, CborSerializable, CoseSign1, CoseSign1Builder, CovidPass, Cwt, Header,
    HeaderBuilder, Person, TaggedCborSerializable, TrustEntry, TrustStore,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::{write::ZlibEncoder, Compression};
use p256::{
    ecdsa::{signature::Signer, Signature, SigningKey, VerifyingKey},
    pkcs8::EncodePublicKey,
};
use std::io::Write;

pub const KID_A: &[u8] = &[0xd9, 0x19, 0x37, 0x5f, 0xc1, 0xe7, 0xb6, 0xb2];
pub const KID_B: &[u8] = &[0x25, 0x7f, 0x1c, 0x95, 0x3a, 0x00, 0x77, 0x41];

/// Issued 2021-06-18T07:06:40Z.
pub const ISSUED_AT: u64 = 1_624_000_000;
/// Expires 2022-06-23T16:00:00Z.
pub const EXPIRATION: u64 = 1_656_000_000;

/// zlib-compress `data`.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Deterministic P-256 signing key.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).unwrap()
}

/// Base64 DER SubjectPublicKeyInfo for the public half of `key`.
pub fn public_key_b64(key: &SigningKey) -> String {
    let der = VerifyingKey::from(key).to_public_key_der().unwrap();
    BASE64.encode(der.as_bytes())
}

/// JSON key-list document trusting each `(kid, key)` pair.
pub fn key_list_json(keys: &[(&[u8], &SigningKey)]) -> String {
    let records: Vec<_> = keys
        .iter()
        .map(|(kid, key)| {
            serde_json::json!({
                "kid": BASE64.encode(kid),
                "publicKey": public_key_b64(key),
            })
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// Trust store holding each `(kid, key)` pair.
pub fn trust_store_for(keys: &[(&[u8], &SigningKey)]) -> TrustStore {
    TrustStore::from_entries(keys.iter().map(|(kid, key)| TrustEntry {
        kid: kid.to_vec(),
        public_key: VerifyingKey::from(*key),
    }))
}

/// Raw `r || s` ES256 signature over `data`.
pub fn sign(key: &SigningKey, data: &[u8]) -> Vec<u8> {
    let sig: Signature = key.sign(data);
    sig.to_bytes().to_vec()
}

/// Protected header naming ES256 and, if non-empty, `kid`.
pub fn es256_header(kid: &[u8]) -> Header {
    let builder = HeaderBuilder::new().algorithm(iana::Algorithm::ES256);
    if kid.is_empty() {
        builder.build()
    } else {
        builder.key_id(kid.to_vec()).build()
    }
}

/// COSE_Sign1 over `payload` with the given protected header, signed by `key`.
pub fn signed_sign1(key: &SigningKey, protected: Header, payload: Vec<u8>) -> CoseSign1 {
    let mut sign1 = CoseSign1Builder::new()
        .protected(protected)
        .payload(payload)
        .build();
    let tbs = sign1.tbs_data(b"").unwrap();
    sign1.signature = sign(key, &tbs);
    sign1
}

/// Barcode text for a COSE_Sign1 message: `HC1:` + Base45(zlib(tagged CBOR)).
pub fn barcode(sign1: CoseSign1) -> String {
    format!(
        "HC1:{}",
        base45::encode(&zlib(&sign1.to_tagged_vec().unwrap()))
    )
}

pub fn sample_person() -> Person {
    Person {
        given_name: Some("Gabriele".to_owned()),
        standardized_given_name: Some("GABRIELE".to_owned()),
        family_name: Some("Musterfrau-Gößinger".to_owned()),
        standardized_family_name: "MUSTERFRAU<GOESSINGER".to_owned(),
    }
}

pub fn sample_cwt() -> Cwt {
    Cwt {
        issuer: "AT".to_owned(),
        expiration: EXPIRATION,
        issued_at: ISSUED_AT,
        certificate: CovidPass {
            person: sample_person(),
            date_of_birth: "1998-02-26".to_owned(),
            version: "1.3.0".to_owned(),
            ..Default::default()
        },
    }
}

/// Barcode for `cwt`, signed by `key` and labelled with `kid`.
pub fn signed_barcode(key: &SigningKey, kid: &[u8], cwt: Cwt) -> String {
    barcode(signed_sign1(key, es256_header(kid), cwt.to_vec().unwrap()))
}
