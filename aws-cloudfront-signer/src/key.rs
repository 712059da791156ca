/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::SigningError;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use std::fmt;
use std::path::Path;

/// Signs `policy` with the PEM-encoded RSA key stored at `private_key_path`.
///
/// The key is read on every call and dropped before returning.
pub fn sign(policy: &[u8], private_key_path: impl AsRef<Path>) -> Result<Vec<u8>, SigningError> {
    PrivateKey::from_pem_file(private_key_path)?.sign(policy)
}

/// RSA private key used to sign CloudFront policies.
#[derive(Clone)]
pub struct PrivateKey(Box<RsaPrivateKey>);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(** redacted **)")
    }
}

impl PrivateKey {
    /// Loads a private key from PEM-encoded bytes.
    ///
    /// Accepts PKCS#1 (`BEGIN RSA PRIVATE KEY`) and PKCS#8 (`BEGIN PRIVATE KEY`) encodings.
    pub fn from_pem(bytes: &[u8]) -> Result<Self, SigningError> {
        let pem_str = std::str::from_utf8(bytes).map_err(SigningError::key_load)?;

        let key = if pem_str.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem_str).map_err(SigningError::key_load)?
        } else if pem_str.contains("BEGIN PRIVATE KEY") {
            RsaPrivateKey::from_pkcs8_pem(pem_str).map_err(SigningError::key_load)?
        } else {
            return Err(SigningError::key_load(
                "unsupported key format, expected an RSA key in PKCS#1 or PKCS#8 PEM",
            ));
        };
        Ok(PrivateKey(Box::new(key)))
    }

    /// Reads and parses a PEM key file.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, SigningError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading CloudFront private key");
        let bytes = std::fs::read(path).map_err(SigningError::key_load)?;
        Self::from_pem(&bytes)
    }

    /// The public half, for verifying signatures.
    pub fn to_public_key(&self) -> RsaPublicKey {
        self.0.to_public_key()
    }

    /// RSASSA-PKCS1-v1_5 over SHA-1, the only scheme CloudFront verifies for RSA key pairs.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let digest = Sha1::digest(message);
        self.0
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(SigningError::signature)
    }
}
