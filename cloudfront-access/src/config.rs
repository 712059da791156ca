/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Settings consumed by the dispatcher and the status report.
//!
//! Every value is optional at construction time so that the status report can show which
//! ones are missing. Operations that need a value ask for it through the `require_*`
//! accessors, which fail with [`AccessError::ConfigMissing`].

use crate::error::AccessError;
use crate::os_shim_internal::Env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub(crate) const ACCESS_KEY: &str = "CFTEST_ACCESS_KEY";
pub(crate) const SECRET_KEY: &str = "CFTEST_SECRET_KEY";
pub(crate) const S3_BUCKET: &str = "CFTEST_S3_BUCKET";
pub(crate) const DISTRIBUTION: &str = "CFTEST_DISTRIBUTION";
pub(crate) const CLOUDFRONT_KEY_ID: &str = "CFTEST_CLOUDFRONT_KEY_ID";
pub(crate) const PRIVATE_KEY_FILE: &str = "CFTEST_PRIVATE_KEY_FILE";
pub(crate) const DOMAIN: &str = "CFTEST_DOMAIN";
pub(crate) const COOKIE_DOMAIN: &str = "CFTEST_COOKIE_DOMAIN";
const URL_TTL_MINUTES: &str = "CFTEST_URL_TTL_MINUTES";
const COOKIE_TTL_MINUTES: &str = "CFTEST_COOKIE_TTL_MINUTES";

/// Default lifetime of a signed URL.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(60 * 60);
/// Default lifetime of a set of signed cookies.
pub const DEFAULT_COOKIE_TTL: Duration = Duration::from_secs(60 * 60);

/// Credentials, distribution, and signing key settings.
#[derive(Clone, Default)]
pub struct AccessConfig {
    access_key: Option<String>,
    secret_key: Option<String>,
    bucket: Option<String>,
    distribution_id: Option<String>,
    key_pair_id: Option<String>,
    private_key_file: Option<PathBuf>,
    domain: Option<String>,
    cookie_domain: Option<String>,
    url_ttl: Option<Duration>,
    cookie_ttl: Option<Duration>,
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("access_key", &self.access_key)
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "** redacted **"),
            )
            .field("bucket", &self.bucket)
            .field("distribution_id", &self.distribution_id)
            .field("key_pair_id", &self.key_pair_id)
            .field("private_key_file", &self.private_key_file)
            .field("domain", &self.domain)
            .field("cookie_domain", &self.cookie_domain)
            .field("url_ttl", &self.url_ttl())
            .field("cookie_ttl", &self.cookie_ttl())
            .finish()
    }
}

impl AccessConfig {
    /// Creates a new builder.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Loads settings from `CFTEST_*` environment variables. Empty values count as unset.
    pub fn from_env(env: &Env) -> Result<Self, AccessError> {
        let var = |name: &str| env.get(name).ok().filter(|v| !v.trim().is_empty());
        let minutes = |name: &'static str| -> Result<Option<Duration>, AccessError> {
            var(name)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|m| *m > 0)
                        .and_then(|m| m.checked_mul(60))
                        .map(Duration::from_secs)
                        .ok_or(AccessError::InvalidConfig { name, value: v })
                })
                .transpose()
        };

        let config = AccessConfig {
            access_key: var(ACCESS_KEY),
            secret_key: var(SECRET_KEY),
            bucket: var(S3_BUCKET),
            distribution_id: var(DISTRIBUTION),
            key_pair_id: var(CLOUDFRONT_KEY_ID),
            private_key_file: var(PRIVATE_KEY_FILE).map(PathBuf::from),
            domain: var(DOMAIN),
            cookie_domain: var(COOKIE_DOMAIN),
            url_ttl: minutes(URL_TTL_MINUTES)?,
            cookie_ttl: minutes(COOKIE_TTL_MINUTES)?,
        };
        tracing::debug!(config = ?config, "loaded access configuration from environment");
        Ok(config)
    }

    /// Storage access key.
    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    /// Storage secret key.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }

    /// Origin bucket name.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// CloudFront distribution ID.
    pub fn distribution_id(&self) -> Option<&str> {
        self.distribution_id.as_deref()
    }

    /// CloudFront key pair ID used in `Key-Pair-Id`.
    pub fn key_pair_id(&self) -> Option<&str> {
        self.key_pair_id.as_deref()
    }

    /// Path of the PEM private key for `key_pair_id`.
    pub fn private_key_file(&self) -> Option<&Path> {
        self.private_key_file.as_deref()
    }

    /// CNAME that maps to the distribution, used instead of its own domain for cookies.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Domain attribute attached to signed cookies.
    pub fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }

    /// Lifetime of signed URLs.
    pub fn url_ttl(&self) -> Duration {
        self.url_ttl.unwrap_or(DEFAULT_URL_TTL)
    }

    /// Lifetime of signed cookies.
    pub fn cookie_ttl(&self) -> Duration {
        self.cookie_ttl.unwrap_or(DEFAULT_COOKIE_TTL)
    }

    pub(crate) fn require_distribution_id(&self) -> Result<&str, AccessError> {
        self.distribution_id()
            .ok_or(AccessError::ConfigMissing(DISTRIBUTION))
    }

    pub(crate) fn require_key_pair_id(&self) -> Result<&str, AccessError> {
        self.key_pair_id()
            .ok_or(AccessError::ConfigMissing(CLOUDFRONT_KEY_ID))
    }

    pub(crate) fn require_private_key_file(&self) -> Result<&Path, AccessError> {
        self.private_key_file()
            .ok_or(AccessError::ConfigMissing(PRIVATE_KEY_FILE))
    }
}

/// Builder for [`AccessConfig`].
#[derive(Debug, Default)]
pub struct Builder {
    inner: AccessConfig,
}

impl Builder {
    /// Sets the storage access key.
    pub fn access_key(mut self, v: impl Into<String>) -> Self {
        self.inner.access_key = Some(v.into());
        self
    }

    /// Sets the storage secret key.
    pub fn secret_key(mut self, v: impl Into<String>) -> Self {
        self.inner.secret_key = Some(v.into());
        self
    }

    /// Sets the origin bucket.
    pub fn bucket(mut self, v: impl Into<String>) -> Self {
        self.inner.bucket = Some(v.into());
        self
    }

    /// Sets the distribution ID.
    pub fn distribution_id(mut self, v: impl Into<String>) -> Self {
        self.inner.distribution_id = Some(v.into());
        self
    }

    /// Sets the key pair ID.
    pub fn key_pair_id(mut self, v: impl Into<String>) -> Self {
        self.inner.key_pair_id = Some(v.into());
        self
    }

    /// Sets the private key path.
    pub fn private_key_file(mut self, v: impl Into<PathBuf>) -> Self {
        self.inner.private_key_file = Some(v.into());
        self
    }

    /// Sets the distribution CNAME.
    pub fn domain(mut self, v: impl Into<String>) -> Self {
        self.inner.domain = Some(v.into());
        self
    }

    /// Sets the cookie domain.
    pub fn cookie_domain(mut self, v: impl Into<String>) -> Self {
        self.inner.cookie_domain = Some(v.into());
        self
    }

    /// Sets the signed URL lifetime.
    pub fn url_ttl(mut self, ttl: Duration) -> Self {
        self.inner.url_ttl = Some(ttl);
        self
    }

    /// Sets the signed cookie lifetime.
    pub fn cookie_ttl(mut self, ttl: Duration) -> Self {
        self.inner.cookie_ttl = Some(ttl);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AccessConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_from_env() {
        let env = Env::from_slice(&[
            ("CFTEST_ACCESS_KEY", "AKIDEXAMPLE"),
            ("CFTEST_SECRET_KEY", "wJalrXUtnFEMI"),
            ("CFTEST_S3_BUCKET", "media-origin"),
            ("CFTEST_DISTRIBUTION", "E2EXAMPLE"),
            ("CFTEST_CLOUDFRONT_KEY_ID", "APKAEXAMPLE"),
            ("CFTEST_PRIVATE_KEY_FILE", "/keys/pk-APKAEXAMPLE.pem"),
            ("CFTEST_DOMAIN", ""),
            ("CFTEST_COOKIE_TTL_MINUTES", "3"),
        ]);
        let config = AccessConfig::from_env(&env).unwrap();

        assert_eq!(config.access_key(), Some("AKIDEXAMPLE"));
        assert_eq!(config.bucket(), Some("media-origin"));
        assert_eq!(config.distribution_id(), Some("E2EXAMPLE"));
        assert_eq!(config.key_pair_id(), Some("APKAEXAMPLE"));
        assert_eq!(
            config.private_key_file(),
            Some(Path::new("/keys/pk-APKAEXAMPLE.pem"))
        );
        assert_eq!(config.domain(), None);
        assert_eq!(config.cookie_domain(), None);
        assert_eq!(config.url_ttl(), DEFAULT_URL_TTL);
        assert_eq!(config.cookie_ttl(), Duration::from_secs(180));
    }

    #[test]
    fn rejects_bad_ttl() {
        let env = Env::from_slice(&[("CFTEST_URL_TTL_MINUTES", "soon")]);
        let err = AccessConfig::from_env(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration value `CFTEST_URL_TTL_MINUTES` has invalid value `soon`"
        );
        let env = Env::from_slice(&[("CFTEST_URL_TTL_MINUTES", "0")]);
        assert!(AccessConfig::from_env(&env).is_err());
    }

    #[test]
    fn rejects_ttl_that_overflows_seconds() {
        let minutes = (u64::MAX / 60 + 1).to_string();
        let env = Env::from_slice(&[("CFTEST_COOKIE_TTL_MINUTES", minutes.as_str())]);
        assert!(matches!(
            AccessConfig::from_env(&env),
            Err(AccessError::InvalidConfig {
                name: "CFTEST_COOKIE_TTL_MINUTES",
                ..
            })
        ));
    }

    #[test]
    fn require_reports_variable_name() {
        let config = AccessConfig::builder().build();
        assert!(matches!(
            config.require_key_pair_id(),
            Err(AccessError::ConfigMissing("CFTEST_CLOUDFRONT_KEY_ID"))
        ));
    }

    #[test]
    fn debug_redacts_secret_key() {
        let config = AccessConfig::builder().secret_key("hunter2").build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("** redacted **"));
    }
}
