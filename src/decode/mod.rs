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

//! Barcode decoding pipeline.

use crate::{
    base45, compress, verify_sign1, CborSerializable, CoseSign1, Cwt, Result,
    TaggedCborSerializable, TrustStore,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

#[cfg(test)]
mod tests;

/// Scheme prefix carried by EU digital COVID certificate barcodes.
pub const HC1_SCHEME: &str = "HC1";

/// Tunable parts of the decoding pipeline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    /// Scheme tag stripped (along with a following `:`) before Base45 decoding, if present.
    pub scheme_prefix: Option<String>,
    /// Upper bound on the size of an inflated payload.
    pub max_inflated_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scheme_prefix: Some(HC1_SCHEME.to_owned()),
            max_inflated_len: compress::DEFAULT_MAX_INFLATED_LEN,
        }
    }
}

/// Builder for [`DecodeOptions`] objects.
#[derive(Debug, Default)]
pub struct DecodeOptionsBuilder(DecodeOptions);

impl DecodeOptionsBuilder {
    builder! {DecodeOptions}
    builder_set_optional! {scheme_prefix: String}
    builder_set! {max_inflated_len: usize}

    /// Decode barcode text as-is, without stripping any scheme prefix.
    #[must_use]
    pub fn no_scheme_prefix(mut self) -> Self {
        self.0.scheme_prefix = None;
        self
    }
}

/// Health certificate decoder bound to a trust store.
///
/// A `Decoder` is immutable once built, and may be shared between threads.
#[derive(Clone, Debug)]
pub struct Decoder {
    trust: TrustStore,
    options: DecodeOptions,
}

impl Decoder {
    /// Create a decoder with default options.
    pub fn new(trust: TrustStore) -> Self {
        Self::with_options(trust, DecodeOptions::default())
    }

    /// Create a decoder with the given options.
    pub fn with_options(trust: TrustStore, options: DecodeOptions) -> Self {
        Self { trust, options }
    }

    /// Create a decoder with default options, trusting the keys in a JSON key-list document.
    pub fn from_key_list_json(json: &str) -> Result<Self> {
        Ok(Self::new(TrustStore::from_json(json)?))
    }

    /// Trust store consulted for signature verification.
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust
    }

    /// Options applied to every barcode.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode and verify a barcode.
    pub fn decode(&self, barcode: &str) -> Result<Cwt> {
        decode_with(barcode, &self.trust, &self.options)
    }
}

/// Decode and verify a barcode with default options.
///
/// The stages run in order (scheme stripping, Base45, inflate, COSE_Sign1 parsing, signature
/// verification, claims parsing) and the first failure is returned unchanged.
pub fn decode(barcode: &str, trust: &TrustStore) -> Result<Cwt> {
    decode_with(barcode, trust, &DecodeOptions::default())
}

fn decode_with(barcode: &str, trust: &TrustStore, options: &DecodeOptions) -> Result<Cwt> {
    let text = match &options.scheme_prefix {
        Some(scheme) => base45::strip_scheme(barcode, scheme),
        None => barcode,
    };
    let data = base45::decode(text)?;
    tracing::debug!(symbols = text.len(), bytes = data.len(), "base45 decoded");

    let compressed = data.first() == Some(&compress::ZLIB_MAGIC);
    let data = compress::maybe_inflate(data, options.max_inflated_len)?;
    tracing::debug!(compressed, bytes = data.len(), "payload ready");

    let sign1 = CoseSign1::from_tagged_slice(&data)?;
    tracing::debug!(
        kid = %BASE64.encode(sign1.key_id()),
        payload = sign1.payload.len(),
        "parsed COSE_Sign1"
    );

    let payload = verify_sign1(sign1, trust)?;
    let cwt = Cwt::from_slice(&payload)?;
    tracing::debug!(
        issuer = %cwt.issuer,
        exp = cwt.expiration,
        iat = cwt.issued_at,
        "decoded health certificate"
    );
    Ok(cwt)
}
