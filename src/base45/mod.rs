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

//! Base45 text encoding, as used for QR-code payloads.
//!
//! See [RFC 9285](https://www.rfc-editor.org/rfc/rfc9285): each pair of bytes maps to three
//! symbols (least significant symbol first) and a trailing single byte maps to two symbols.

use crate::{HcertError, Result};


/// The 45-symbol alphabet; a symbol's value is its index.
pub const CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

const BASE: u32 = 45;

fn symbol_value(c: char, pos: usize) -> Result<u32> {
    let idx = u8::try_from(c)
        .ok()
        .and_then(|b| CHARSET.iter().position(|&s| s == b));
    match idx {
        Some(i) => Ok(i as u32),
        None => Err(HcertError::Base45Format(format!(
            "invalid symbol {c:?} at position {pos}"
        ))),
    }
}

/// Remove a leading `scheme` tag (e.g. `HC1`), then a single `:` separator, if present.
pub fn strip_scheme<'a>(text: &'a str, scheme: &str) -> &'a str {
    let text = text.strip_prefix(scheme).unwrap_or(text);
    text.strip_prefix(':').unwrap_or(text)
}

/// Decode Base45 `text` into bytes.
///
/// Fails on empty input, on any symbol outside [`CHARSET`], on a trailing group of a single symbol,
/// and on a three-symbol group whose value does not fit in two bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(HcertError::Base45Format("empty input".to_owned()));
    }
    let values = text
        .chars()
        .enumerate()
        .map(|(pos, c)| symbol_value(c, pos))
        .collect::<Result<Vec<u32>>>()?;

    let mut out = Vec::with_capacity(values.len() / 3 * 2 + 1);
    for (n, group) in values.chunks(3).enumerate() {
        match *group {
            [c0, c1, c2] => {
                let v = c0 + BASE * c1 + BASE * BASE * c2;
                if v > 0xffff {
                    return Err(HcertError::Base45Format(format!(
                        "group {n} value {v} exceeds 65535"
                    )));
                }
                out.push((v / 256) as u8);
                out.push((v % 256) as u8);
            }
            // Only the low byte of a trailing pair is kept.
            [c0, c1] => out.push(((c0 + BASE * c1) % 256) as u8),
            _ => {
                return Err(HcertError::Base45Format(format!(
                    "dangling symbol at position {}",
                    values.len() - 1
                )))
            }
        }
    }
    Ok(out)
}

/// Encode `data` as Base45 text.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(2) * 3);
    let mut push = |v: u32| out.push(CHARSET[v as usize] as char);
    for pair in data.chunks(2) {
        match *pair {
            [hi, lo] => {
                let v = (u32::from(hi) << 8) | u32::from(lo);
                push(v % BASE);
                push(v / BASE % BASE);
                push(v / (BASE * BASE));
            }
            [b] => {
                let v = u32::from(b);
                push(v % BASE);
                push(v / BASE);
            }
            _ => {}
        }
    }
    out
}
