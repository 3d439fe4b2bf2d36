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

//! CBOR Web Token functionality for health certificate payloads.

use crate::{
    cbor::value::Value,
    common::{in_payload, AsCborValue},
    iana,
    iana::EnumI64,
    util::{cbor_type_name, ValueTryAs},
    CovidPass, HcertError, Result,
};
use chrono::{DateTime, Utc};


/// Claims set of a verified health certificate.
///
/// All four claims are mandatory; a payload lacking any of them is rejected as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cwt {
    /// Issuing country or authority (claim 1).
    pub issuer: String,
    /// Expiration time, seconds since UNIX epoch (claim 4).
    pub expiration: u64,
    /// Issued-at time, seconds since UNIX epoch (claim 6).
    pub issued_at: u64,
    /// Health certificate (claim -260, entry 1).
    pub certificate: CovidPass,
}

impl crate::CborSerializable for Cwt {}

const ISS: i64 = iana::CwtClaimName::Iss as i64;
const EXP: i64 = iana::CwtClaimName::Exp as i64;
const IAT: i64 = iana::CwtClaimName::Iat as i64;
const HCERT: i64 = iana::CwtClaimName::Hcert as i64;

/// Claim keys are integers, but some issuers emit them in decimal text form.
fn claim_key(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => i64::try_from(*i).ok(),
        Value::Text(t) => t.parse().ok(),
        _ => None,
    }
}

fn timestamp(name: &str, value: Value) -> Result<u64> {
    match value {
        Value::Integer(i) => u64::try_from(i)
            .map_err(|_| HcertError::PayloadSchema(format!("{name}: negative timestamp"))),
        // Saturates at the u64 bounds.
        Value::Float(f) if f.is_finite() && f >= 0.0 => Ok(f.trunc() as u64),
        Value::Float(f) => Err(HcertError::PayloadSchema(format!(
            "{name}: unusable timestamp {f}"
        ))),
        v => Err(HcertError::PayloadSchema(format!(
            "{name}: got {}, expected uint/float",
            cbor_type_name(&v)
        ))),
    }
}

fn certificate(value: Value) -> Result<CovidPass> {
    let m = value.try_as_map().map_err(in_payload("hcert"))?;
    let want = iana::HcertClaim::EuDgcV1.to_i64();
    match m.into_iter().find(|(k, _)| claim_key(k) == Some(want)) {
        Some((_, v)) => CovidPass::from_claim_value(v),
        None => Err(HcertError::PayloadSchema(format!(
            "hcert: no entry {want}"
        ))),
    }
}

fn set_once<T>(slot: &mut Option<T>, name: &str, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(HcertError::PayloadSchema(format!("duplicate claim {name}")));
    }
    *slot = Some(value);
    Ok(())
}

fn required<T>(slot: Option<T>, name: &str) -> Result<T> {
    slot.ok_or_else(|| HcertError::PayloadSchema(format!("missing claim {name}")))
}

impl AsCborValue for Cwt {
    fn from_cbor_value(value: Value) -> Result<Self> {
        let m = value.try_as_map().map_err(in_payload("claims set"))?;

        let mut issuer = None;
        let mut expiration = None;
        let mut issued_at = None;
        let mut cert = None;
        for (k, value) in m.into_iter() {
            match claim_key(&k) {
                Some(ISS) => set_once(
                    &mut issuer,
                    "iss",
                    value.try_as_string().map_err(in_payload("iss"))?,
                )?,
                Some(EXP) => set_once(&mut expiration, "exp", timestamp("exp", value)?)?,
                Some(IAT) => set_once(&mut issued_at, "iat", timestamp("iat", value)?)?,
                Some(HCERT) => set_once(&mut cert, "hcert", certificate(value)?)?,
                _ => {}
            }
        }

        Ok(Self {
            issuer: required(issuer, "iss")?,
            expiration: required(expiration, "exp")?,
            issued_at: required(issued_at, "iat")?,
            certificate: required(cert, "hcert")?,
        })
    }

    fn to_cbor_value(self) -> Result<Value> {
        let mut cert = Vec::new();
        crate::cbor::ser::into_writer(&self.certificate.to_cbor_value()?, &mut cert)?;
        Ok(Value::Map(vec![
            (Value::from(ISS), Value::Text(self.issuer)),
            (Value::from(EXP), Value::from(self.expiration)),
            (Value::from(IAT), Value::from(self.issued_at)),
            (
                Value::from(HCERT),
                Value::Map(vec![(
                    Value::from(iana::HcertClaim::EuDgcV1.to_i64()),
                    Value::Bytes(cert),
                )]),
            ),
        ]))
    }
}

fn instant(secs: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

impl Cwt {
    /// Expiration time as an instant, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        instant(self.expiration)
    }

    /// Issued-at time as an instant, if representable.
    pub fn issued_at_instant(&self) -> Option<DateTime<Utc>> {
        instant(self.issued_at)
    }

    /// Indicate whether the certificate is valid at `now`.  See [`crate::is_valid`].
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        crate::is_valid(self, now)
    }

    /// Indicate whether the certificate is valid according to the system clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
