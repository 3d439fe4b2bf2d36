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

//! Decoding and verification of EU digital health certificate barcodes.
//!
//! A barcode holds `HC1:` followed by the [Base45][B45] encoding of a zlib-compressed
//! [COSE_Sign1][COSE] message, whose payload is a [CWT][CWT] claims set carrying the certificate.
//! Decoding runs each of those layers in turn, checks the ES256 signature against a
//! [`TrustStore`] of issuer keys, and yields a [`Cwt`].
//!
//! Builds on the [`ciborium`](https://docs.rs/ciborium) crate for underlying CBOR support.
//!
//! ## Usage
//!
//! ```no_run
//! // Key list as published by a trust-list service: [{"kid": "...", "publicKey": "..."}]
//! let keys = std::fs::read_to_string("keys.json")?;
//! let decoder = hcert::Decoder::from_key_list_json(&keys)?;
//!
//! let barcode = std::fs::read_to_string("barcode.txt")?;
//! match decoder.decode(barcode.trim()) {
//!     Ok(cwt) => println!(
//!         "{} ({}), issued by {}, valid now: {}",
//!         cwt.certificate.person.display_name(),
//!         cwt.certificate.date_of_birth,
//!         cwt.issuer,
//!         cwt.is_valid()
//!     ),
//!     Err(e) => println!("rejected ({:?}): {e}", e.kind()),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [B45]: https://datatracker.ietf.org/doc/rfc9285/
//! [COSE]: https://datatracker.ietf.org/doc/rfc9052/
//! [CWT]: https://datatracker.ietf.org/doc/rfc8392/

#![deny(rustdoc::broken_intra_doc_links)]

/// Re-export of the `ciborium` crate used for underlying CBOR encoding.
pub use ciborium as cbor;

#[macro_use]
pub(crate) mod util;

#[macro_use]
pub mod iana;

pub mod base45;
pub mod compress;

mod common;
pub use common::*;
mod header;
pub use header::*;
mod sign;
pub use sign::*;
mod trust;
pub use trust::*;
mod verify;
pub use verify::*;
mod cert;
pub use cert::*;
mod cwt;
pub use cwt::*;
mod validity;
pub use validity::*;
mod decode;
pub use decode::*;
