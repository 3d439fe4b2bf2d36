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

use super::*;
use crate::{
    util::{expect_err, testing::zlib},
    ErrorKind,
};

#[test]
fn test_passthrough() {
    let tests = vec!["", "d28443a10126", "00", "7f78"];
    for (i, data) in tests.iter().enumerate() {
        let data = hex::decode(data).unwrap();
        let got = maybe_inflate(data.clone(), DEFAULT_MAX_INFLATED_LEN).unwrap();
        assert_eq!(got, data, "case {}", i);
    }
}

#[test]
fn test_inflate() {
    let tests = vec![
        b"hello, health certificate".to_vec(),
        vec![0xd2; 1000],
        (0..=255u8).cycle().take(DEFAULT_MAX_INFLATED_LEN).collect(),
    ];
    for (i, data) in tests.iter().enumerate() {
        let compressed = zlib(data);
        assert_eq!(compressed[0], ZLIB_MAGIC, "case {}", i);
        let got = maybe_inflate(compressed, DEFAULT_MAX_INFLATED_LEN).unwrap();
        assert_eq!(got, *data, "case {}", i);
    }
}

#[test]
fn test_inflate_fail() {
    let too_big = zlib(&vec![0u8; DEFAULT_MAX_INFLATED_LEN + 1]);
    let tests = vec![
        (vec![0x78], "zlib header truncated"),
        (hex::decode("789cffff").unwrap(), "corrupt deflate stream"),
        (vec![0x78, 0x9c], "truncated"),
        (too_big, "exceeds 32768 bytes"),
    ];
    for (data, err_msg) in tests.into_iter() {
        let result = maybe_inflate(data, DEFAULT_MAX_INFLATED_LEN);
        expect_err(result, err_msg);
    }
}

#[test]
fn test_inflate_truncated_stream() {
    let data: Vec<u8> = (0..4000u32).map(|i| (i * 7 % 251) as u8).collect();
    let compressed = zlib(&data);
    let cut = compressed[..compressed.len() / 2].to_vec();
    let err = maybe_inflate(cut, DEFAULT_MAX_INFLATED_LEN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compression);
}

#[test]
fn test_inflate_custom_bound() {
    let data = vec![0x41u8; 100];
    assert_eq!(maybe_inflate(zlib(&data), 100).unwrap(), data);
    let err = maybe_inflate(zlib(&data), 99).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Compression);
}
