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

//! COSE Headers functionality.

use crate::{
    cbor::value::Value,
    common::{in_envelope, read_to_value, AsCborValue},
    iana,
    iana::EnumI64,
    util::cbor_type_error,
    CborSerializable, HcertError, Label, Result,
};
use std::collections::{btree_map::Entry, BTreeMap};


/// Structure representing a common COSE header map.
///
/// ```cddl
///   header_map = {
///       Generic_Headers,
///       * label => values
///   }
///
///   Generic_Headers = (
///       ? 1 => int / tstr,  ; algorithm identifier
///       ? 4 => bstr,        ; key identifier
///       ...
///   )
///  ```
///
/// The algorithm is held as the raw [`Label`] found on the wire, so that an unrecognized value can
/// be reported rather than failing the parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    /// Cryptographic algorithm to use
    pub alg: Option<Label>,
    /// Key identifier, if present.
    pub key_id: Option<Vec<u8>>,
    /// Any additional header values.
    pub rest: BTreeMap<Label, Value>,
}

impl Header {
    /// Indicate whether the `Header` is empty.
    pub fn is_empty(&self) -> bool {
        self.alg.is_none() && self.key_id.is_none() && self.rest.is_empty()
    }

    /// Return the registered algorithm named by the header, if any.
    pub fn algorithm(&self) -> Option<iana::Algorithm> {
        match &self.alg {
            Some(Label::Int(i)) => iana::Algorithm::from_i64(*i),
            _ => None,
        }
    }

    /// Parse a header from the contents of a bstr that wraps a CBOR map.  A zero-length bstr is an
    /// empty header.  Undecodable CBOR is a [`HcertError::CborFormat`] error; CBOR of the wrong
    /// shape is a [`HcertError::MalformedEnvelope`] error naming `context`.
    pub(crate) fn from_embedded(data: &[u8], context: &'static str) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::default());
        }
        let value = read_to_value(data)?;
        Self::from_cbor_value(value).map_err(in_envelope(context))
    }
}

impl crate::CborSerializable for Header {}

const ALG: i64 = iana::HeaderParameter::Alg as i64;
const KID: i64 = iana::HeaderParameter::Kid as i64;

impl AsCborValue for Header {
    fn from_cbor_value(value: Value) -> Result<Self> {
        let m = match value {
            Value::Map(m) => m,
            v => return cbor_type_error(&v, "map"),
        };

        let mut headers = Self::default();
        for (l, value) in m.into_iter() {
            // The `ciborium` CBOR library does not police duplicate map keys, so do it here.
            let label = Label::from_cbor_value(l)?;
            match label {
                Label::Int(ALG) if headers.alg.is_none() => {
                    headers.alg = Some(Label::from_cbor_value(value).map_err(|e| {
                        HcertError::UnsupportedAlgorithm(format!("unusable alg value: {e}"))
                    })?);
                }
                Label::Int(KID) if headers.key_id.is_none() => match value {
                    Value::Bytes(kid) => headers.key_id = Some(kid),
                    v => return cbor_type_error(&v, "bstr kid"),
                },
                Label::Int(ALG) | Label::Int(KID) => {
                    return Err(HcertError::CborFormat("duplicate map key".to_owned()))
                }
                label => match headers.rest.entry(label) {
                    Entry::Occupied(_) => {
                        return Err(HcertError::CborFormat("duplicate map key".to_owned()))
                    }
                    Entry::Vacant(ve) => {
                        ve.insert(value);
                    }
                },
            }
        }
        Ok(headers)
    }

    fn to_cbor_value(self) -> Result<Value> {
        let mut map = Vec::<(Value, Value)>::new();
        if let Some(alg) = self.alg {
            map.push((Value::from(ALG), alg.to_cbor_value()?));
        }
        if let Some(kid) = self.key_id {
            map.push((Value::from(KID), Value::Bytes(kid)));
        }
        for (label, value) in self.rest {
            map.push((label.to_cbor_value()?, value));
        }
        Ok(Value::Map(map))
    }
}

/// Header containing protected data, together with the exact bytes it was parsed from.
///
/// Signatures cover `original_data`, never a re-encoding of `header`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProtectedHeader {
    /// If this structure was created by parsing serialized data, this field
    /// holds the serialized bstr contents exactly as received.
    pub original_data: Option<Vec<u8>>,
    /// Parsed header information.
    pub header: Header,
}

impl ProtectedHeader {
    /// Constructor from a [`Value`] holding a `bstr` that wraps a serialized map.
    pub fn from_cbor_bstr(val: Value) -> Result<Self> {
        let data = match val {
            Value::Bytes(b) => b,
            v => {
                return cbor_type_error(&v, "bstr encoded map")
                    .map_err(in_envelope("protected header"))
            }
        };
        let header = Header::from_embedded(&data, "protected header")?;
        Ok(ProtectedHeader {
            original_data: Some(data),
            header,
        })
    }

    /// The bytes the signature covers: the received bytes if available, otherwise a fresh
    /// serialization (empty for an empty header).
    pub fn to_signed_bytes(&self) -> Result<Vec<u8>> {
        if let Some(data) = &self.original_data {
            Ok(data.clone())
        } else if self.header.is_empty() {
            Ok(Vec::new())
        } else {
            self.header.clone().to_vec()
        }
    }

    /// Convert this header to a `bstr` encoded map, as a [`Value`], consuming the object along the
    /// way.
    pub fn cbor_bstr(self) -> Result<Value> {
        Ok(Value::Bytes(self.to_signed_bytes()?))
    }
}

/// Builder for [`Header`] objects.
#[derive(Debug, Default)]
pub struct HeaderBuilder(Header);

impl HeaderBuilder {
    builder! {Header}

    /// Set the algorithm.
    #[must_use]
    pub fn algorithm(mut self, alg: iana::Algorithm) -> Self {
        self.0.alg = Some(Label::Int(alg.to_i64()));
        self
    }

    /// Set the key identifier.
    #[must_use]
    pub fn key_id(mut self, kid: Vec<u8>) -> Self {
        self.0.key_id = Some(kid);
        self
    }

    /// Set a header label:value pair.
    #[must_use]
    pub fn value(mut self, label: i64, value: Value) -> Self {
        self.0.rest.insert(Label::Int(label), value);
        self
    }
}
