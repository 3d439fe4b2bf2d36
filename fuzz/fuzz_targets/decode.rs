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

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let trust = hcert::TrustStore::default();
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = hcert::decode(text, &trust);
    }
    // Also feed the raw bytes in as if they had already been Base45-decoded.
    let text = format!("HC1:{}", hcert::base45::encode(data));
    let _ = hcert::decode(&text, &trust);
});
