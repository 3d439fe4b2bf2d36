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

//! Optional zlib decompression of the decoded barcode bytes.

use crate::{HcertError, Result};
use flate2::{Decompress, FlushDecompress, Status};

#[cfg(test)]
mod tests;

/// First byte of a zlib stream using the deflate method with a 32 KiB window.
pub const ZLIB_MAGIC: u8 = 0x78;

/// Default bound on the inflated size of a payload.
pub const DEFAULT_MAX_INFLATED_LEN: usize = 32 * 1024;

/// Inflate `data` if it starts with a zlib header, otherwise return it unchanged.
///
/// The two-byte zlib header is skipped and the remainder is inflated as a raw deflate stream into
/// at most `max_len` bytes. The zlib trailer (Adler-32 checksum), if present, is not checked.
pub fn maybe_inflate(data: Vec<u8>, max_len: usize) -> Result<Vec<u8>> {
    if data.first() != Some(&ZLIB_MAGIC) {
        return Ok(data);
    }
    let stream = data.get(2..).ok_or_else(|| {
        HcertError::Compression("zlib header truncated".to_owned())
    })?;

    let mut inflater = Decompress::new(false);
    // One spare byte of room distinguishes "exactly max_len" from "more than max_len".
    let mut out = Vec::with_capacity(max_len.saturating_add(1));
    let status = inflater
        .decompress_vec(stream, &mut out, FlushDecompress::Finish)
        .map_err(|e| HcertError::Compression(format!("corrupt deflate stream: {e}")))?;

    match status {
        _ if out.len() > max_len => Err(HcertError::Compression(format!(
            "inflated payload exceeds {max_len} bytes"
        ))),
        Status::StreamEnd => Ok(out),
        _ => Err(HcertError::Compression(format!(
            "deflate stream truncated after {} input bytes",
            inflater.total_in()
        ))),
    }
}
