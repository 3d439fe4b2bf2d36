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

//! Enumerations for IANA-managed values, restricted to those that appear in health certificates.
//!
//! Sources:
//! - <https://www.iana.org/assignments/cose/cose.xhtml>
//! - <https://www.iana.org/assignments/cbor-tags/cbor-tags.xhtml>
//! - <https://www.iana.org/assignments/cwt/cwt.xhtml>
//! - eHealth Network, "Electronic Health Certificate Container Format", section 3.3.1


/// Trait indicating an enum that can be constructed from `i64` values.
pub trait EnumI64: Sized + Eq {
    fn from_i64(i: i64) -> Option<Self>;
    fn to_i64(&self) -> i64;
}

/// Generate an enum with associated values, plus a `from_i64` method.
macro_rules! iana_registry {
    ( $(#[$attr:meta])* $enum_name:ident {$($(#[$fattr:meta])* $name:ident: $val:expr,)* } ) => {
        #[allow(non_camel_case_types)]
        $(#[$attr])*
        #[non_exhaustive]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum $enum_name {
            $($(#[$fattr])* $name = $val,)*
        }
        impl EnumI64 for $enum_name {
            fn from_i64(i: i64) -> Option<Self> {
                match i {
                    $(x if x == Self::$name as i64 => Some(Self::$name),)*
                    _ => None,
                }
            }
            #[inline]
            fn to_i64(&self) -> i64 {
                *self as i64
            }
        }
    }
}

iana_registry! {
    /// IANA-registered COSE header parameters used by COSE_Sign1 health certificates.
    HeaderParameter {
        /// Cryptographic algorithm to use
        ///
        /// Associated value of type int / tstr
        Alg: 1,
        /// Key identifier
        ///
        /// Associated value of type bstr
        Kid: 4,
    }
}

iana_registry! {
    /// IANA-registered COSE signature algorithms.
    ///
    /// Only [`Algorithm::ES256`] is accepted for verification; the remaining values are listed so
    /// that rejections can name what was found.
    Algorithm {
        /// RSASSA-PKCS1-v1_5 using SHA-256
        RS256: -257,
        /// RSASSA-PSS w/ SHA-512
        PS512: -39,
        /// RSASSA-PSS w/ SHA-384
        PS384: -38,
        /// RSASSA-PSS w/ SHA-256
        PS256: -37,
        /// ECDSA w/ SHA-512
        ES512: -36,
        /// ECDSA w/ SHA-384
        ES384: -35,
        /// EdDSA
        EdDSA: -8,
        /// ECDSA w/ SHA-256
        ES256: -7,
    }
}

iana_registry! {
    /// IANA-registered CBOR tags relevant to health certificates.
    CborTag {
        /// COSE Single Signer Data Object
        CoseSign1: 18,
        /// CBOR Web Token (CWT)
        Cwt: 61,
    }
}

iana_registry! {
    /// CBOR Web Token (CWT) Claims carried by health certificates.
    CwtClaimName {
        /// Health certificate ("hcert": map).
        Hcert: -260,
        /// Issuer ("iss": tstr).
        Iss: 1,
        /// Expiration Time, as seconds since UNIX epoch ("exp": int/float)
        Exp: 4,
        /// Issued at, as seconds since UNIX epoch ("iat": int/float)
        Iat: 6,
    }
}

iana_registry! {
    /// Keys inside the `hcert` claim map.
    HcertClaim {
        /// EU Digital COVID Certificate, schema version 1.
        EuDgcV1: 1,
    }
}
