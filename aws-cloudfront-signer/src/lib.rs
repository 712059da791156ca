/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Signed URLs and signed cookies for Amazon CloudFront.
//!
//! A grant is a policy document (which resource, until when) signed with the RSA private key
//! of a CloudFront key pair. The policy and signature are CloudFront-base64 encoded and
//! attached to either the URL query string or three cookies.
//!
//! ```no_run
//! use aws_cloudfront_signer::{sign_url, PrivateKey, SigningRequest};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), aws_cloudfront_signer::error::SigningError> {
//! let request = SigningRequest::builder()
//!     .resource_url("https://d111111abcdef8.cloudfront.net/video.mp4")
//!     .key_pair_id("APKAEXAMPLE")
//!     .private_key(PrivateKey::from_pem_file("private_key.pem")?)
//!     .expires_in(Duration::from_secs(3600))
//!     .build()?;
//! let url = sign_url(request)?;
//! # let _ = url;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod encoding;
/// Error types for CloudFront signing operations.
pub mod error;
mod key;
pub mod policy;
mod sign;

pub use encoding::{url_safe_decode, url_safe_encode};
pub use key::{sign, PrivateKey};
pub use policy::{build_canned_policy, Policy, PolicyBuilder};
pub use sign::{
    make_signed_cookies, make_signed_url, PolicyParam, SignedCookies, SignedUrl, SigningRequest,
    SigningRequestBuilder, COOKIE_KEY_PAIR_ID, COOKIE_POLICY, COOKIE_SIGNATURE,
};

/// Sign a CloudFront URL with canned or custom policy
pub fn sign_url(request: SigningRequest) -> Result<SignedUrl, error::SigningError> {
    request.sign_url()
}

/// Generate the three CloudFront signed cookies
pub fn sign_cookies(request: SigningRequest) -> Result<SignedCookies, error::SigningError> {
    request.sign_cookies()
}
