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

//! Common internal utilities.

use crate::{cbor::value::Value, common::read_to_value, HcertError, Result};


#[cfg(test)]
pub(crate) mod testing;

/// Name of the CBOR major type (or simple value) held by a [`Value`].
pub(crate) fn cbor_type_name(v: &Value) -> &'static str {
    match v {
        Value::Integer(i) => {
            if i128::from(*i) < 0 {
                "nint"
            } else {
                "uint"
            }
        }
        Value::Float(_) => "float",
        Value::Bytes(_) => "bstr",
        Value::Text(_) => "tstr",
        Value::Bool(_) => "bool",
        Value::Null => "null",
        Value::Tag(_, _) => "tag",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        _ => "other",
    }
}

/// Return an error indicating that an unexpected CBOR type was encountered.
pub(crate) fn cbor_type_error<T>(v: &Value, want: &'static str) -> Result<T> {
    Err(HcertError::CborFormat(format!(
        "got {}, expected {}",
        cbor_type_name(v),
        want
    )))
}

/// Trait which augments the [`Value`] type with methods for convenient conversions to contained
/// types which throw an [`HcertError`] if the Value is not of the expected type.
pub(crate) trait ValueTryAs
where
    Self: Sized,
{
    /// Extractor for [`Value::Array`]
    fn try_as_array(self) -> Result<Vec<Self>>;

    /// Extractor for [`Value::Map`]
    fn try_as_map(self) -> Result<Vec<(Self, Self)>>;

    /// Extractor for [`Value::Bytes`]
    fn try_as_bytes(self) -> Result<Vec<u8>>;

    /// Extractor for [`Value::Text`]
    fn try_as_string(self) -> Result<String>;

    /// Extractor for [`Value::Bytes`] holding a nested CBOR item.
    fn try_as_embedded_cbor(self) -> Result<Self>;
}

impl ValueTryAs for Value {
    fn try_as_array(self) -> Result<Vec<Self>> {
        match self {
            Value::Array(a) => Ok(a),
            v => cbor_type_error(&v, "array"),
        }
    }

    fn try_as_map(self) -> Result<Vec<(Self, Self)>> {
        match self {
            Value::Map(a) => Ok(a),
            v => cbor_type_error(&v, "map"),
        }
    }

    fn try_as_bytes(self) -> Result<Vec<u8>> {
        match self {
            Value::Bytes(b) => Ok(b),
            v => cbor_type_error(&v, "bstr"),
        }
    }

    fn try_as_string(self) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            v => cbor_type_error(&v, "tstr"),
        }
    }

    fn try_as_embedded_cbor(self) -> Result<Self> {
        read_to_value(&self.try_as_bytes()?)
    }
}

/// Check for an expected error.
#[cfg(test)]
pub fn expect_err<T: core::fmt::Debug, E: core::fmt::Debug + core::fmt::Display>(
    result: Result<T, E>,
    err_msg: &str,
) {
    match result {
        Ok(v) => panic!("expected error containing '{err_msg}', got success {v:?}"),
        Err(err) => assert!(
            format!("{err}").contains(err_msg),
            "unexpected error '{err}', doesn't contain '{err_msg}' (Debug: {err:?})"
        ),
    }
}

// Macros to reduce boilerplate when creating `SomethingBuilder` structures.

/// Add `new()` and `build()` methods to the builder.
macro_rules! builder {
    ( $otype: ty ) => {
        /// Constructor for builder.
        pub fn new() -> Self {
            Self(<$otype>::default())
        }
        /// Build the completed object.
        pub fn build(self) -> $otype {
            self.0
        }
    };
}

/// Add a setter function for a field to the builder.
macro_rules! builder_set {
    ( $name:ident: $ftype:ty ) => {
        /// Set the associated field.
        #[must_use]
        pub fn $name(mut self, $name: $ftype) -> Self {
            self.0.$name = $name;
            self
        }
    };
}

/// Add a setter function for an optional field to the builder.
macro_rules! builder_set_optional {
    ( $name:ident: $ftype:ty ) => {
        /// Set the associated field.
        #[must_use]
        pub fn $name(mut self, $name: $ftype) -> Self {
            self.0.$name = Some($name);
            self
        }
    };
}
