/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_cloudfront_signer::error::{ErrorKind, SigningError};
use thiserror::Error;

/// Boxed error returned by collaborator clients.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to issue a signed URL or signed cookies.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A configuration value required for this operation is not set.
    #[error("required configuration value `{0}` is not set")]
    ConfigMissing(&'static str),

    /// A configuration value is set but unusable.
    #[error("configuration value `{name}` has invalid value `{value}`")]
    InvalidConfig {
        /// The environment variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The private key file is missing, unreadable, or does not hold an RSA key.
    #[error("failed to load private key")]
    KeyLoad(#[source] BoxError),

    /// The signing primitive rejected its input.
    #[error("failed to sign policy")]
    Signature(#[source] SigningError),

    /// The resource identifier is empty or malformed.
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// The policy could not be built, e.g. the expiry is not in the future.
    #[error("invalid policy")]
    InvalidPolicy(#[source] SigningError),

    /// The object store or distribution API could not be reached.
    #[error("failed to access {service}")]
    RemoteAccess {
        /// Which collaborator failed.
        service: &'static str,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },
}

impl From<SigningError> for AccessError {
    fn from(err: SigningError) -> Self {
        match err.kind() {
            ErrorKind::KeyLoad => AccessError::KeyLoad(err.into()),
            ErrorKind::InvalidResource => AccessError::InvalidResource(err.to_string()),
            ErrorKind::InvalidPolicy | ErrorKind::InvalidInput => AccessError::InvalidPolicy(err),
            _ => AccessError::Signature(err),
        }
    }
}
