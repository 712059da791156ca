/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::config::AccessConfig;
use crate::error::AccessError;
use crate::os_shim_internal::Fs;
use aws_cloudfront_signer::PrivateKey;
use std::path::PathBuf;

/// A CloudFront key pair ID and the location of its private key.
///
/// The key itself is read on every [`load`](KeyPairSource::load) and never cached.
#[derive(Debug, Clone)]
pub struct KeyPairSource {
    key_pair_id: String,
    private_key_file: PathBuf,
    fs: Fs,
}

impl KeyPairSource {
    /// Creates a key source reading through `fs`.
    pub fn new(
        key_pair_id: impl Into<String>,
        private_key_file: impl Into<PathBuf>,
        fs: Fs,
    ) -> Self {
        Self {
            key_pair_id: key_pair_id.into(),
            private_key_file: private_key_file.into(),
            fs,
        }
    }

    /// Takes the key pair ID and key path from `config`.
    pub fn from_config(config: &AccessConfig, fs: Fs) -> Result<Self, AccessError> {
        Ok(Self::new(
            config.require_key_pair_id()?,
            config.require_private_key_file()?,
            fs,
        ))
    }

    /// The value sent as `Key-Pair-Id`.
    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// Reads and parses the private key.
    pub fn load(&self) -> Result<PrivateKey, AccessError> {
        tracing::debug!(
            key_pair_id = %self.key_pair_id,
            path = %self.private_key_file.display(),
            "loading signing key"
        );
        let pem = self
            .fs
            .read_to_end(&self.private_key_file)
            .map_err(|err| AccessError::KeyLoad(err.into()))?;
        Ok(PrivateKey::from_pem(&pem)?)
    }
}
