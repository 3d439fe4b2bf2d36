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

//! Validity window evaluation.

use crate::Cwt;
use chrono::{DateTime, Utc};


/// Indicate whether `cwt` is valid at `now`.
///
/// Valid means `now` falls before the expiration instant and, if the issued-at time converts to an
/// instant, at or after it.  An issued-at time outside the representable range is ignored; an
/// expiration time outside that range makes the certificate invalid.
pub fn is_valid(cwt: &Cwt, now: DateTime<Utc>) -> bool {
    let Some(expires) = cwt.expires_at() else {
        tracing::debug!(exp = cwt.expiration, "unrepresentable expiration time");
        return false;
    };
    if now >= expires {
        return false;
    }
    match cwt.issued_at_instant() {
        Some(issued) => now >= issued,
        None => {
            tracing::debug!(iat = cwt.issued_at, "ignoring unrepresentable issued-at time");
            true
        }
    }
}
