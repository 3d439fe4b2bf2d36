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

//! Example program decoding a health certificate barcode.
//!
//! ```sh
//! RUST_LOG=hcert=debug cargo run --example decode -- keys.json < barcode.txt
//! ```
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: decode <key-list.json> < barcode.txt")?;
    let decoder = hcert::Decoder::from_key_list_json(&std::fs::read_to_string(path)?)?;
    println!(
        "Loaded {} keys under {} kids.",
        decoder.trust_store().len(),
        decoder.trust_store().kid_count()
    );

    let mut barcode = String::new();
    std::io::stdin().read_to_string(&mut barcode)?;
    let cwt = match decoder.decode(barcode.trim()) {
        Ok(cwt) => cwt,
        Err(e) => {
            println!("Rejected ({:?}): {e}", e.kind());
            return Err(e.into());
        }
    };

    let cert = &cwt.certificate;
    println!("Name:          {}", cert.person.display_name());
    println!("Date of birth: {}", cert.date_of_birth);
    println!("Issuer:        {}", cwt.issuer);
    if let Some(issued) = cwt.issued_at_instant() {
        println!("Issued:        {issued}");
    }
    if let Some(expires) = cwt.expires_at() {
        println!("Expires:       {expires}");
    }
    for v in &cert.vaccinations {
        println!(
            "Vaccination:   dose {}/{} on {}",
            v.dose_number.unwrap_or_default(),
            v.total_doses.unwrap_or_default(),
            v.date.as_deref().unwrap_or("?")
        );
    }
    for t in &cert.tests {
        println!(
            "Test:          {} sampled {}",
            t.result.as_deref().unwrap_or("?"),
            t.sample_collected.as_deref().unwrap_or("?")
        );
    }
    for r in &cert.recoveries {
        println!(
            "Recovery:      valid {} to {}",
            r.valid_from.as_deref().unwrap_or("?"),
            r.valid_until.as_deref().unwrap_or("?")
        );
    }
    println!("Valid now:     {}", cwt.is_valid());
    Ok(())
}
