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

use super::*;
use crate::{
    cbor::value::Value,
    common::AsCborValue,
    iana,
    util::{
        expect_err,
        testing::{
            barcode, es256_header, key_list_json, sample_cwt, signed_barcode, signed_sign1,
            signing_key, trust_store_for, zlib, KID_A, KID_B,
        },
    },
    ErrorKind, HcertError, HeaderBuilder, SignatureFailure,
};

fn hc1(data: &[u8]) -> String {
    format!("HC1:{}", base45::encode(data))
}

#[test]
fn test_decode() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let text = signed_barcode(&key, KID_A, sample_cwt());
    assert!(text.starts_with("HC1:"));

    let cwt = decode(&text, &trust).unwrap();
    assert_eq!(cwt, sample_cwt());
    assert_eq!(cwt.issuer, "AT");
    assert_eq!(cwt.certificate.person.standardized_family_name, "MUSTERFRAU<GOESSINGER");
    assert_eq!(cwt.certificate.date_of_birth, "1998-02-26");
}

#[test]
fn test_decoder_from_key_list() {
    let (k1, k2) = (signing_key(0x11), signing_key(0x22));
    let decoder = Decoder::from_key_list_json(&key_list_json(&[(KID_A, &k1), (KID_B, &k2)]))
        .unwrap();
    assert_eq!(decoder.trust_store().len(), 2);
    assert_eq!(decoder.options(), &DecodeOptions::default());

    let cwt = decoder.decode(&signed_barcode(&k2, KID_B, sample_cwt())).unwrap();
    assert_eq!(cwt, sample_cwt());

    expect_err(
        Decoder::from_key_list_json("[{}]"),
        "invalid key list document",
    );
}

#[test]
fn test_decode_scheme_prefix() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let text = signed_barcode(&key, KID_A, sample_cwt());
    let bare = text.strip_prefix("HC1:").unwrap();

    // The prefix is optional.
    assert_eq!(decode(bare, &trust).unwrap(), sample_cwt());

    let options = DecodeOptionsBuilder::new().no_scheme_prefix().build();
    assert_eq!(options.scheme_prefix, None);
    let decoder = Decoder::with_options(trust.clone(), options);
    assert_eq!(decoder.decode(bare).unwrap(), sample_cwt());

    let options = DecodeOptionsBuilder::new()
        .scheme_prefix("HC2".to_owned())
        .build();
    let decoder = Decoder::with_options(trust, options);
    assert_eq!(decoder.decode(&format!("HC2:{bare}")).unwrap(), sample_cwt());
}

#[test]
fn test_decode_uncompressed() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let sign1 = signed_sign1(&key, es256_header(KID_A), sample_cwt().to_vec().unwrap());
    let text = hc1(&sign1.to_tagged_vec().unwrap());
    assert_eq!(decode(&text, &trust).unwrap(), sample_cwt());
}

#[test]
fn test_decode_kid_collision() {
    let (k1, k2) = (signing_key(0x11), signing_key(0x22));
    let trust = trust_store_for(&[(KID_A, &k1), (KID_A, &k2)]);
    for key in [&k1, &k2] {
        let text = signed_barcode(key, KID_A, sample_cwt());
        assert_eq!(decode(&text, &trust).unwrap(), sample_cwt());
    }
}

#[test]
fn test_decode_signature_bit_flips() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let sign1 = signed_sign1(&key, es256_header(KID_A), sample_cwt().to_vec().unwrap());
    for bit in 0..crate::ES256_SIGNATURE_LEN * 8 {
        let mut tampered = sign1.clone();
        tampered.signature[bit / 8] ^= 1 << (bit % 8);
        let err = decode(&barcode(tampered), &trust).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid, "bit {}", bit);
    }
}

#[test]
fn test_decode_untrusted() {
    let (k1, k2) = (signing_key(0x11), signing_key(0x22));
    let trust = trust_store_for(&[(KID_A, &k1)]);

    // Signed by a key not in the store, under a trusted kid.
    let result = decode(&signed_barcode(&k2, KID_A, sample_cwt()), &trust);
    match result {
        Err(HcertError::SignatureInvalid { kid, reason }) => {
            assert_eq!(kid, KID_A);
            assert_eq!(reason, SignatureFailure::NoKeyVerified { candidates: 1 });
        }
        other => panic!("unexpected result {other:?}"),
    }

    // Unknown kid, and no kid at all.
    let no_kid: &[u8] = &[];
    for kid in [KID_B, no_kid] {
        let result = decode(&signed_barcode(&k1, kid, sample_cwt()), &trust);
        match result {
            Err(HcertError::SignatureInvalid { reason, .. }) => {
                assert_eq!(reason, SignatureFailure::NoTrustedKey)
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}

#[test]
fn test_decode_missing_expiration() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let mut claims = match sample_cwt().to_cbor_value().unwrap() {
        Value::Map(m) => m,
        v => panic!("unexpected claims {v:?}"),
    };
    claims.retain(|(k, _)| *k != Value::from(iana::CwtClaimName::Exp as i64));
    let mut payload = Vec::new();
    crate::cbor::ser::into_writer(&Value::Map(claims), &mut payload).unwrap();

    let text = barcode(signed_sign1(&key, es256_header(KID_A), payload));
    let result = decode(&text, &trust);
    assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::PayloadSchema);
    expect_err(result, "missing claim exp");
}

#[test]
fn test_decode_cose_tag() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let sign1 = signed_sign1(&key, es256_header(KID_A), sample_cwt().to_vec().unwrap());

    let untagged = hc1(&zlib(&sign1.clone().to_vec().unwrap()));
    let result = decode(&untagged, &trust);
    assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::UnsupportedCoseTag);
    expect_err(result, "untagged item");

    let mut data = Vec::new();
    crate::cbor::ser::into_writer(
        &Value::Tag(
            iana::CborTag::Cwt as u64,
            Box::new(sign1.to_cbor_value().unwrap()),
        ),
        &mut data,
    )
    .unwrap();
    let result = decode(&hc1(&zlib(&data)), &trust);
    assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::UnsupportedCoseTag);
    expect_err(result, "61, expected 18");
}

#[test]
fn test_decode_algorithm() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let protected = HeaderBuilder::new()
        .algorithm(iana::Algorithm::ES512)
        .key_id(KID_A.to_vec())
        .build();
    let text = barcode(signed_sign1(&key, protected, sample_cwt().to_vec().unwrap()));
    let result = decode(&text, &trust);
    assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::UnsupportedAlgorithm);
    expect_err(result, "ES512, expected ES256");
}

#[test]
fn test_decode_stage_failures() {
    let trust = TrustStore::default();
    let tests = vec![
        ("HC1:".to_owned(), ErrorKind::Base45Format),
        ("HC1:bb8".to_owned(), ErrorKind::Base45Format),
        ("HC1:BB8B".to_owned(), ErrorKind::Base45Format),
        (hc1(&[0x78]), ErrorKind::Compression),
        (hc1(&hex::decode("789cffff").unwrap()), ErrorKind::Compression),
        (hc1(&[0xa2]), ErrorKind::CborFormat),
        (hc1(&zlib(&[0xd2, 0x84])), ErrorKind::CborFormat),
        (hc1(&[0xa0]), ErrorKind::UnsupportedCoseTag),
        (hc1(&hex::decode("d283400140").unwrap()), ErrorKind::MalformedEnvelope),
        (
            hc1(&hex::decode("d28443a10126a0f640").unwrap()),
            ErrorKind::MalformedEnvelope,
        ),
        (
            hc1(&hex::decode("d28443a10127a04040").unwrap()),
            ErrorKind::UnsupportedAlgorithm,
        ),
    ];
    for (i, (text, kind)) in tests.into_iter().enumerate() {
        let err = decode(&text, &trust).unwrap_err();
        assert_eq!(err.kind(), kind, "case {}: {}", i, err);
    }
}

#[test]
fn test_decode_inflate_bound() {
    let key = signing_key(0x11);
    let trust = trust_store_for(&[(KID_A, &key)]);
    let text = signed_barcode(&key, KID_A, sample_cwt());

    let options = DecodeOptionsBuilder::new().max_inflated_len(64).build();
    let decoder = Decoder::with_options(trust, options);
    let result = decoder.decode(&text);
    assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::Compression);
    expect_err(result, "inflated payload exceeds 64 bytes");
}

#[test]
fn test_decoder_is_shareable() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<Decoder>();

    let key = signing_key(0x11);
    let decoder = std::sync::Arc::new(Decoder::new(trust_store_for(&[(KID_A, &key)])));
    let text = signed_barcode(&key, KID_A, sample_cwt());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let decoder = decoder.clone();
            let text = text.clone();
            std::thread::spawn(move || decoder.decode(&text).map(|cwt| cwt.issuer))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "AT");
    }
}
