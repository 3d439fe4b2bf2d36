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

//! COSE_Sign1 functionality.

use crate::{
    cbor,
    cbor::value::Value,
    common::{in_envelope, AsCborValue},
    iana,
    util::{cbor_type_name, ValueTryAs},
    HcertError, Header, ProtectedHeader, Result,
};


/// Context string for the `Sig_structure` of a COSE_Sign1 message (RFC 9052 section 4.4).
pub const SIGNATURE1_CONTEXT: &str = "Signature1";

/// Structure representing a message with a single signature.
///
/// ```cddl
/// COSE_Sign1 = [
///     Headers,
///     payload : bstr / nil,
///     signature : bstr
/// ]
/// ```
///
/// Detached payloads (`nil`) are not supported.  The unprotected header may be carried either as a
/// map or as a bstr wrapping a map; a `nil` unprotected header is treated as empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoseSign1 {
    pub protected: ProtectedHeader,
    pub unprotected: Header,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl crate::CborSerializable for CoseSign1 {}

impl crate::TaggedCborSerializable for CoseSign1 {
    const TAG: u64 = iana::CborTag::CoseSign1 as u64;
}

fn unprotected_header(value: Value) -> Result<Header> {
    match value {
        v @ Value::Map(_) => Header::from_cbor_value(v).map_err(in_envelope("unprotected header")),
        Value::Bytes(b) => Header::from_embedded(&b, "unprotected header"),
        Value::Null => Ok(Header::default()),
        v => Err(HcertError::MalformedEnvelope(format!(
            "unprotected header: got {}, expected map / bstr encoded map / nil",
            cbor_type_name(&v)
        ))),
    }
}

impl AsCborValue for CoseSign1 {
    fn from_cbor_value(value: Value) -> Result<Self> {
        let mut a = value.try_as_array().map_err(in_envelope("COSE_Sign1"))?;
        if a.len() != 4 {
            return Err(HcertError::MalformedEnvelope(format!(
                "COSE_Sign1: array with {} items, expected 4",
                a.len()
            )));
        }

        // Remove array elements in reverse order to avoid shifts.
        Ok(Self {
            signature: a
                .remove(3)
                .try_as_bytes()
                .map_err(in_envelope("signature"))?,
            payload: match a.remove(2) {
                Value::Bytes(b) => b,
                Value::Null => {
                    return Err(HcertError::MalformedEnvelope(
                        "payload: detached payload not supported".to_owned(),
                    ))
                }
                v => {
                    return Err(HcertError::MalformedEnvelope(format!(
                        "payload: got {}, expected bstr",
                        cbor_type_name(&v)
                    )))
                }
            },
            unprotected: unprotected_header(a.remove(1))?,
            protected: ProtectedHeader::from_cbor_bstr(a.remove(0))?,
        })
    }

    fn to_cbor_value(self) -> Result<Value> {
        Ok(Value::Array(vec![
            self.protected.cbor_bstr()?,
            self.unprotected.to_cbor_value()?,
            Value::Bytes(self.payload),
            Value::Bytes(self.signature),
        ]))
    }
}

impl CoseSign1 {
    /// Key identifier for the signer.  A key identifier in the protected header takes precedence
    /// over one in the unprotected header; with neither present the result is empty.
    pub fn key_id(&self) -> &[u8] {
        self.protected
            .header
            .key_id
            .as_deref()
            .or(self.unprotected.key_id.as_deref())
            .unwrap_or(&[])
    }

    /// Verify the `signature` value using the provided `verify` function, feeding it the
    /// `signature` value and the to-be-signed data (in that order).
    pub fn verify_signature<F>(&self, external_aad: &[u8], verify: F) -> Result<()>
    where
        F: FnOnce(&[u8], &[u8]) -> Result<()>,
    {
        let tbs = self.tbs_data(external_aad)?;
        verify(&self.signature, &tbs)
    }

    /// Construct the to-be-signed data for this object.  The protected header is included exactly
    /// as received.
    pub fn tbs_data(&self, external_aad: &[u8]) -> Result<Vec<u8>> {
        sig_structure_data(
            &self.protected.to_signed_bytes()?,
            external_aad,
            &self.payload,
        )
    }
}

/// Create a binary blob that will be signed.
///
/// ```cddl
///  Sig_structure = [
///      context : "Signature1",
///      body_protected : empty_or_serialized_map,
///      external_aad : bstr,
///      payload : bstr
///  ]
/// ```
pub fn sig_structure_data(body: &[u8], aad: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let arr = Value::Array(vec![
        Value::Text(SIGNATURE1_CONTEXT.to_owned()),
        Value::Bytes(body.to_vec()),
        Value::Bytes(aad.to_vec()),
        Value::Bytes(payload.to_vec()),
    ]);
    let mut data = Vec::new();
    cbor::ser::into_writer(&arr, &mut data)?;
    Ok(data)
}

/// Builder for [`CoseSign1`] objects.
#[derive(Debug, Default)]
pub struct CoseSign1Builder(CoseSign1);

impl CoseSign1Builder {
    builder! {CoseSign1}
    builder_set! {unprotected: Header}
    builder_set! {payload: Vec<u8>}
    builder_set! {signature: Vec<u8>}

    /// Set the protected header.
    #[must_use]
    pub fn protected(mut self, hdr: Header) -> Self {
        self.0.protected = ProtectedHeader {
            original_data: None,
            header: hdr,
        };
        self
    }
}
