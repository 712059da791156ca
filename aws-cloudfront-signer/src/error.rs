/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// The category of a [`SigningError`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The private key file was missing, unreadable, or did not contain a usable RSA key.
    KeyLoad,
    /// The policy could not be built (missing fields, expiry in the past, bad activation date).
    InvalidPolicy,
    /// The resource identifier was empty or malformed.
    InvalidResource,
    /// An input other than the resource or policy was rejected.
    InvalidInput,
    /// The RSA primitive refused to sign.
    Signature,
}

/// Error type for CloudFront signing operations
#[derive(Debug)]
pub struct SigningError {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
    message: Option<Cow<'static, str>>,
}

impl SigningError {
    pub(crate) fn new(
        kind: ErrorKind,
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            source,
            message,
        }
    }

    pub(crate) fn key_load(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::KeyLoad, Some(source.into()), None)
    }

    /// A policy error with the given message, for callers that compute expiry themselves.
    pub fn invalid_policy(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidPolicy, None, Some(message.into()))
    }

    pub(crate) fn invalid_resource(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidResource, None, Some(message.into()))
    }

    pub(crate) fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidInput, None, Some(message.into()))
    }

    pub(crate) fn signature(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::Signature, Some(source.into()), None)
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::KeyLoad => write!(f, "failed to load private key")?,
            ErrorKind::InvalidPolicy => write!(f, "invalid policy")?,
            ErrorKind::InvalidResource => write!(f, "invalid resource")?,
            ErrorKind::InvalidInput => write!(f, "invalid input")?,
            ErrorKind::Signature => write!(f, "signing operation failed")?,
        }
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl StdError for SigningError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ErrorKind> for SigningError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }
}
