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

//! Common types.

use crate::{cbor, cbor::value::Value, util::cbor_type_error};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use core::{cmp::Ordering, convert::TryInto};


/// Marker structure indicating that the EOF was encountered when reading CBOR data.
#[derive(Debug)]
pub struct EndOfFile;

/// Reason a signature check failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignatureFailure {
    /// The trust store holds no key under the message's key identifier.
    NoTrustedKey,
    /// Keys exist for the key identifier, but none of them verified the signature.
    NoKeyVerified { candidates: usize },
    /// The signature bytes do not hold a valid `r || s` scalar pair.
    MalformedSignature,
}

impl core::fmt::Display for SignatureFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SignatureFailure::NoTrustedKey => write!(f, "no trust entry for kid"),
            SignatureFailure::NoKeyVerified { candidates } => {
                write!(f, "{candidates} trust entries for kid, none verified")
            }
            SignatureFailure::MalformedSignature => write!(f, "signature is not a valid r||s pair"),
        }
    }
}

/// Error type for failures in decoding and verifying health certificates.
#[derive(Debug, thiserror::Error)]
pub enum HcertError {
    /// Text is not valid Base45.
    #[error("base45 format error: {0}")]
    Base45Format(String),
    /// Compressed payload could not be inflated within the configured bound.
    #[error("compression error: {0}")]
    Compression(String),
    /// Malformed CBOR at some decode site.
    #[error("CBOR format error: {0}")]
    CborFormat(String),
    /// Outer CBOR item is not tagged as COSE_Sign1 (tag value, or `None` if untagged).
    #[error("unsupported COSE tag: {}", tag_name(.0))]
    UnsupportedCoseTag(Option<u64>),
    /// COSE_Sign1 structure does not have the expected shape.
    #[error("malformed COSE_Sign1 envelope: {0}")]
    MalformedEnvelope(String),
    /// Protected header names a missing or unsupported algorithm.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// No trusted key verified the signature.
    #[error("signature invalid for kid '{}': {reason}", BASE64.encode(.kid))]
    SignatureInvalid {
        kid: Vec<u8>,
        reason: SignatureFailure,
    },
    /// Verified payload does not match the CWT / certificate schema.
    #[error("payload schema error: {0}")]
    PayloadSchema(String),
    /// A key-list record could not be loaded.
    #[error("key store load error: {0}")]
    KeyStoreLoad(String),
}

fn tag_name(tag: &Option<u64>) -> String {
    match tag {
        Some(t) => format!("{t}, expected 18"),
        None => "untagged item".to_owned(),
    }
}

/// Fieldless discriminant of [`HcertError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    Base45Format,
    Compression,
    CborFormat,
    UnsupportedCoseTag,
    MalformedEnvelope,
    UnsupportedAlgorithm,
    SignatureInvalid,
    PayloadSchema,
    KeyStoreLoad,
}

impl HcertError {
    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HcertError::Base45Format(_) => ErrorKind::Base45Format,
            HcertError::Compression(_) => ErrorKind::Compression,
            HcertError::CborFormat(_) => ErrorKind::CborFormat,
            HcertError::UnsupportedCoseTag(_) => ErrorKind::UnsupportedCoseTag,
            HcertError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            HcertError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            HcertError::SignatureInvalid { .. } => ErrorKind::SignatureInvalid,
            HcertError::PayloadSchema(_) => ErrorKind::PayloadSchema,
            HcertError::KeyStoreLoad(_) => ErrorKind::KeyStoreLoad,
        }
    }
}

/// Re-label a CBOR shape mismatch found inside the COSE envelope as a malformed envelope.
pub(crate) fn in_envelope(context: &'static str) -> impl Fn(HcertError) -> HcertError {
    move |e| match e {
        HcertError::CborFormat(msg) => HcertError::MalformedEnvelope(format!("{context}: {msg}")),
        e => e,
    }
}

/// Re-label a CBOR shape mismatch found inside the verified payload as a schema violation.
pub(crate) fn in_payload(context: &'static str) -> impl Fn(HcertError) -> HcertError {
    move |e| match e {
        HcertError::CborFormat(msg) => HcertError::PayloadSchema(format!("{context}: {msg}")),
        e => e,
    }
}

/// Crate-specific Result type
pub type Result<T, E = HcertError> = core::result::Result<T, E>;

impl<T> core::convert::From<cbor::de::Error<T>> for HcertError {
    fn from(e: cbor::de::Error<T>) -> Self {
        // Make sure we use our [`EndOfFile`] marker.
        use cbor::de::Error::{Io, RecursionLimitExceeded, Semantic, Syntax};
        let e = match e {
            Io(_) => Io(EndOfFile),
            Syntax(x) => Syntax(x),
            Semantic(a, b) => Semantic(a, b),
            RecursionLimitExceeded => RecursionLimitExceeded,
        };
        HcertError::CborFormat(format!("decode CBOR failure: {e}"))
    }
}

impl<T> core::convert::From<cbor::ser::Error<T>> for HcertError {
    fn from(_e: cbor::ser::Error<T>) -> Self {
        HcertError::CborFormat("encode CBOR failure".to_owned())
    }
}

impl core::convert::From<core::num::TryFromIntError> for HcertError {
    fn from(_: core::num::TryFromIntError) -> Self {
        HcertError::CborFormat("out of range integer value".to_owned())
    }
}

/// Read a CBOR [`Value`] from a byte slice, failing if any extra data remains after the `Value` has
/// been read.
pub(crate) fn read_to_value(mut slice: &[u8]) -> Result<Value> {
    let value = cbor::de::from_reader(&mut slice)?;
    if slice.is_empty() {
        Ok(value)
    } else {
        Err(HcertError::CborFormat(format!(
            "{} bytes of extraneous data after CBOR item",
            slice.len()
        )))
    }
}

/// Trait for types that can be converted to/from a [`Value`].
pub trait AsCborValue: Sized {
    /// Convert a [`Value`] into an instance of the type.
    fn from_cbor_value(value: Value) -> Result<Self>;
    /// Convert the object into a [`Value`], consuming it along the way.
    fn to_cbor_value(self) -> Result<Value>;
}

/// Extension trait that adds serialization/deserialization methods.
pub trait CborSerializable: AsCborValue {
    /// Create an object instance from serialized CBOR data in a slice.  This method will fail (with
    /// `HcertError::CborFormat`) if there is additional CBOR data after the object.
    fn from_slice(slice: &[u8]) -> Result<Self> {
        Self::from_cbor_value(read_to_value(slice)?)
    }

    /// Serialize this object to a vector, consuming it along the way.
    fn to_vec(self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        cbor::ser::into_writer(&self.to_cbor_value()?, &mut data)?;
        Ok(data)
    }
}

/// Extension trait that adds tagged serialization/deserialization methods.
pub trait TaggedCborSerializable: AsCborValue {
    /// The associated tag value.
    const TAG: u64;

    /// Create an object instance from serialized CBOR data in a slice, expecting an initial
    /// tag value.
    fn from_tagged_slice(slice: &[u8]) -> Result<Self> {
        match read_to_value(slice)? {
            Value::Tag(t, v) if t == Self::TAG => Self::from_cbor_value(*v),
            Value::Tag(t, _) => Err(HcertError::UnsupportedCoseTag(Some(t))),
            _ => Err(HcertError::UnsupportedCoseTag(None)),
        }
    }

    /// Serialize this object to a vector, including initial tag, consuming the object along the
    /// way.
    fn to_tagged_vec(self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        cbor::ser::into_writer(
            &Value::Tag(Self::TAG, Box::new(self.to_cbor_value()?)),
            &mut data,
        )?;
        Ok(data)
    }
}

/// A COSE label may be either a signed integer value or a string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl CborSerializable for Label {}

/// Manual implementation of [`Ord`] to ensure that CBOR canonical ordering is respected.
///
/// Note that this uses the ordering given by RFC 8949 section 4.2.1 (lexicographic ordering of
/// encoded form).
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Label::Int(i1), Label::Int(i2)) => match (i1.signum() < 0, i2.signum() < 0) {
                (true, true) => i2.cmp(i1),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => i1.cmp(i2),
            },
            (Label::Int(_i1), Label::Text(_t2)) => Ordering::Less,
            (Label::Text(_t1), Label::Int(_i2)) => Ordering::Greater,
            (Label::Text(t1), Label::Text(t2)) => t1.len().cmp(&t2.len()).then(t1.cmp(t2)),
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsCborValue for Label {
    fn from_cbor_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(Label::Int(i.try_into()?)),
            Value::Text(t) => Ok(Label::Text(t)),
            v => cbor_type_error(&v, "int/tstr"),
        }
    }
    fn to_cbor_value(self) -> Result<Value> {
        Ok(match self {
            Label::Int(i) => Value::from(i),
            Label::Text(t) => Value::Text(t),
        })
    }
}
