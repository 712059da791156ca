/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! CloudFront's URL-safe base64 variant.
//!
//! This is standard (padded) base64 with three characters swapped out:
//! `+` becomes `-`, `=` becomes `_`, and `/` becomes `~`. It is *not* the RFC 4648
//! URL-safe alphabet, so `base64_simd::URL_SAFE` cannot be used here.

use crate::error::SigningError;

/// Encodes `data` with CloudFront's URL-safe base64 alphabet.
pub fn url_safe_encode(data: impl AsRef<[u8]>) -> String {
    base64_simd::STANDARD
        .encode_to_string(data.as_ref())
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

/// Reverses [`url_safe_encode`].
pub fn url_safe_decode(encoded: &str) -> Result<Vec<u8>, SigningError> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();
    base64_simd::STANDARD
        .decode_to_vec(standard.as_bytes())
        .map_err(|_| SigningError::invalid_input("value is not CloudFront base64"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    #[test]
    fn substitutes_reserved_characters() {
        // 0xfb 0xff encodes to "+/8=" in standard base64
        assert_eq!(url_safe_encode([0xfb_u8, 0xff]), "-~8_");
        assert_eq!(url_safe_decode("-~8_").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn encodes_policy_text() {
        assert_eq!(url_safe_encode("{}"), "e30_");
    }

    #[test]
    fn rejects_garbage() {
        assert!(url_safe_decode("not base64!").is_err());
    }

    proptest! {
        #[test]
        fn output_has_no_reserved_characters(data in vec(any::<u8>(), 0..256)) {
            let encoded = url_safe_encode(&data);
            prop_assert!(!encoded.contains('+'));
            prop_assert!(!encoded.contains('='));
            prop_assert!(!encoded.contains('/'));
        }

        #[test]
        fn decode_recovers_input(data in vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(url_safe_decode(&url_safe_encode(&data)).unwrap(), data);
        }

        #[test]
        fn distinct_inputs_encode_distinctly(
            a in vec(any::<u8>(), 0..64),
            b in vec(any::<u8>(), 0..64),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(url_safe_encode(&a), url_safe_encode(&b));
        }
    }
}
