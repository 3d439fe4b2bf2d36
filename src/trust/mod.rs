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

//! Trusted signer keys, indexed by key identifier.
//!
//! A trust store is built once from a key-list document and is read-only afterwards, so it can be
//! shared between threads without locking.

use crate::{HcertError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use p256::{ecdsa::VerifyingKey, pkcs8::DecodePublicKey};
use serde::Deserialize;
use std::collections::HashMap;


/// One record of a key-list document, as published by a trust-list service.
///
/// ```json
/// { "kid": "<base64 key identifier>", "publicKey": "<base64 DER SubjectPublicKeyInfo>" }
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct KeyListEntry {
    pub kid: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// A decoded trust-list record.
#[derive(Clone, Debug, PartialEq)]
pub struct TrustEntry {
    pub kid: Vec<u8>,
    pub public_key: VerifyingKey,
}

impl TrustEntry {
    /// Decode a key-list record.  Both fields are base64; the key must be a DER-encoded P-256
    /// SubjectPublicKeyInfo.
    pub fn from_key_list_entry(entry: &KeyListEntry) -> Result<Self> {
        let kid = BASE64
            .decode(&entry.kid)
            .map_err(|e| HcertError::KeyStoreLoad(format!("kid is not base64: {e}")))?;
        let der = BASE64.decode(&entry.public_key).map_err(|e| {
            HcertError::KeyStoreLoad(format!(
                "public key for kid '{}' is not base64: {e}",
                entry.kid
            ))
        })?;
        let public_key = VerifyingKey::from_public_key_der(&der).map_err(|e| {
            HcertError::KeyStoreLoad(format!(
                "public key for kid '{}' is not a P-256 key: {e}",
                entry.kid
            ))
        })?;
        Ok(Self { kid, public_key })
    }
}

/// Immutable mapping from key identifier to the candidate public keys registered under it.
///
/// Key identifiers are short hash prefixes, so several issuers may share one; all of their keys
/// are kept, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TrustStore {
    keys: HashMap<Vec<u8>, Vec<VerifyingKey>>,
    entries: usize,
}

impl TrustStore {
    /// Build a trust store from decoded entries.
    pub fn from_entries<I: IntoIterator<Item = TrustEntry>>(entries: I) -> Self {
        let mut store = Self::default();
        for entry in entries {
            store.keys.entry(entry.kid).or_default().push(entry.public_key);
            store.entries += 1;
        }
        tracing::debug!(
            entries = store.entries,
            kids = store.keys.len(),
            "built trust store"
        );
        store
    }

    /// Build a trust store from key-list records.  Any record that fails to decode aborts the
    /// whole build.
    pub fn build(records: &[KeyListEntry]) -> Result<Self> {
        let entries = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                TrustEntry::from_key_list_entry(r).map_err(|e| match e {
                    HcertError::KeyStoreLoad(msg) => {
                        HcertError::KeyStoreLoad(format!("record {i}: {msg}"))
                    }
                    e => e,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_entries(entries))
    }

    /// Build a trust store from a JSON key-list document (an array of [`KeyListEntry`] objects).
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<KeyListEntry> = serde_json::from_str(json)
            .map_err(|e| HcertError::KeyStoreLoad(format!("invalid key list document: {e}")))?;
        Self::build(&records)
    }

    /// Return every key registered under exactly `kid`, in insertion order.
    pub fn lookup(&self, kid: &[u8]) -> &[VerifyingKey] {
        self.keys.get(kid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entries (keys) in the store.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Number of distinct key identifiers in the store.
    pub fn kid_count(&self) -> usize {
        self.keys.len()
    }

    /// Indicate whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
