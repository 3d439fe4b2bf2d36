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

//! EU Digital COVID Certificate content (the `hcert` claim).
//!
//! Field names follow the eHealth Network DCC JSON schema.  Only the holder's standardized family
//! name, date of birth and schema version are mandatory; name variants and the vaccination, test
//! and recovery entries are decoded best-effort, dropping anything of an unexpected type.

use crate::{
    cbor::value::Value,
    common::{in_payload, AsCborValue},
    util::{cbor_type_error, ValueTryAs},
    HcertError, Result,
};
use serde::{Deserialize, Deserializer, Serialize};


fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> core::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Text(t) => Some(t),
        _ => None,
    })
}

fn lenient_uint<'de, D: Deserializer<'de>>(d: D) -> core::result::Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Integer(i) => u64::try_from(i).ok(),
        _ => None,
    })
}

fn lenient_entries<'de, D, T>(d: D) -> core::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(a) => a.iter().filter_map(|v| v.deserialized().ok()).collect(),
        _ => Vec::new(),
    })
}

/// Certificate holder's name (`nam`).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Person {
    /// Given name (`gn`).
    #[serde(
        rename = "gn",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub given_name: Option<String>,
    /// Standardized given name, ICAO 9303 transliteration (`gnt`).
    #[serde(
        rename = "gnt",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub standardized_given_name: Option<String>,
    /// Family name (`fn`).
    #[serde(
        rename = "fn",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub family_name: Option<String>,
    /// Standardized family name (`fnt`).
    #[serde(rename = "fnt")]
    pub standardized_family_name: String,
}

impl Person {
    /// Standardized given name (if any) and family name, separated by a space.
    pub fn display_name(&self) -> String {
        match &self.standardized_given_name {
            Some(given) => format!("{given} {}", self.standardized_family_name),
            None => self.standardized_family_name.clone(),
        }
    }
}

/// Vaccination entry (`v`).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Vaccination {
    #[serde(
        rename = "tg",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub disease: Option<String>,
    #[serde(
        rename = "vp",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vaccine: Option<String>,
    #[serde(
        rename = "mp",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub product: Option<String>,
    #[serde(
        rename = "ma",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub manufacturer: Option<String>,
    #[serde(
        rename = "dn",
        default,
        deserialize_with = "lenient_uint",
        skip_serializing_if = "Option::is_none"
    )]
    pub dose_number: Option<u64>,
    #[serde(
        rename = "sd",
        default,
        deserialize_with = "lenient_uint",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_doses: Option<u64>,
    #[serde(
        rename = "dt",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        rename = "co",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        rename = "is",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(
        rename = "ci",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_id: Option<String>,
}

/// Test entry (`t`).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TestResult {
    #[serde(
        rename = "tg",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub disease: Option<String>,
    #[serde(
        rename = "tt",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_type: Option<String>,
    #[serde(
        rename = "nm",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "ma",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub device: Option<String>,
    #[serde(
        rename = "sc",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub sample_collected: Option<String>,
    #[serde(
        rename = "tr",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<String>,
    #[serde(
        rename = "tc",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub testing_centre: Option<String>,
    #[serde(
        rename = "co",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        rename = "is",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(
        rename = "ci",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_id: Option<String>,
}

/// Recovery entry (`r`).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Recovery {
    #[serde(
        rename = "tg",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub disease: Option<String>,
    #[serde(
        rename = "fr",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_positive: Option<String>,
    #[serde(
        rename = "co",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        rename = "is",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(
        rename = "df",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_from: Option<String>,
    #[serde(
        rename = "du",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_until: Option<String>,
    #[serde(
        rename = "ci",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_id: Option<String>,
}

/// Health certificate content.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CovidPass {
    #[serde(rename = "nam")]
    pub person: Person,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(
        rename = "v",
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub vaccinations: Vec<Vaccination>,
    #[serde(
        rename = "t",
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tests: Vec<TestResult>,
    #[serde(
        rename = "r",
        default,
        deserialize_with = "lenient_entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub recoveries: Vec<Recovery>,
}

impl CovidPass {
    /// Decode from the value held under the `hcert` claim: either a bstr of CBOR or the map itself.
    pub fn from_claim_value(value: Value) -> Result<Self> {
        match value {
            v @ Value::Bytes(_) => Self::from_cbor_value(
                v.try_as_embedded_cbor()
                    .map_err(in_payload("certificate data"))?,
            ),
            v => Self::from_cbor_value(v),
        }
    }
}

impl AsCborValue for CovidPass {
    fn from_cbor_value(value: Value) -> Result<Self> {
        if !matches!(value, Value::Map(_)) {
            return cbor_type_error(&value, "map").map_err(in_payload("certificate"));
        }
        value
            .deserialized()
            .map_err(|e| HcertError::PayloadSchema(format!("certificate: {e}")))
    }

    fn to_cbor_value(self) -> Result<Value> {
        Value::serialized(&self)
            .map_err(|e| HcertError::CborFormat(format!("encode certificate failure: {e}")))
    }
}
