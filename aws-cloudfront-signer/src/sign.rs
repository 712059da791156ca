/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::encoding::url_safe_encode;
use crate::error::SigningError;
use crate::key::PrivateKey;
use crate::policy::Policy;
use aws_smithy_async::time::SharedTimeSource;
use aws_smithy_types::DateTime;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Name of the cookie carrying the encoded policy.
pub const COOKIE_POLICY: &str = "CloudFront-Policy";
/// Name of the cookie carrying the encoded signature.
pub const COOKIE_SIGNATURE: &str = "CloudFront-Signature";
/// Name of the cookie carrying the key pair ID.
pub const COOKIE_KEY_PAIR_ID: &str = "CloudFront-Key-Pair-Id";

/// How the policy travels in a signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyParam {
    /// Canned policy: only the expiry is sent, CloudFront rebuilds the policy from the URL.
    Expires(i64),
    /// Custom policy: the full encoded policy document is sent.
    Policy(String),
}

impl PolicyParam {
    /// Chooses the parameter for `policy`: `Expires` when canned and scoped to `url` itself.
    pub fn for_policy(policy: &Policy, url: &str) -> Self {
        if policy.is_canned() && policy.resource() == url {
            PolicyParam::Expires(policy.expires_at())
        } else {
            PolicyParam::Policy(policy.encoded())
        }
    }
}

/// Appends the signing query parameters to `base_url`.
pub fn make_signed_url(
    base_url: &str,
    key_pair_id: &str,
    policy: PolicyParam,
    signature: &[u8],
) -> SignedUrl {
    let separator = if base_url.contains('?') { "&" } else { "?" };
    let signature = url_safe_encode(signature);
    let url = match policy {
        PolicyParam::Expires(expires) => format!(
            "{base_url}{separator}Expires={expires}&Signature={signature}&Key-Pair-Id={key_pair_id}"
        ),
        PolicyParam::Policy(policy) => format!(
            "{base_url}{separator}Policy={policy}&Signature={signature}&Key-Pair-Id={key_pair_id}"
        ),
    };
    SignedUrl::new(url)
}

/// Builds the three CloudFront cookies for an already-signed policy.
pub fn make_signed_cookies(policy: &Policy, signature: &[u8], key_pair_id: &str) -> SignedCookies {
    SignedCookies::new(vec![
        (Cow::Borrowed(COOKIE_POLICY), policy.encoded()),
        (Cow::Borrowed(COOKIE_SIGNATURE), url_safe_encode(signature)),
        (Cow::Borrowed(COOKIE_KEY_PAIR_ID), key_pair_id.to_string()),
    ])
}

#[derive(Debug, Clone)]
enum Expiration {
    DateTime(DateTime),
    Duration(Duration),
}

/// Request to sign a CloudFront URL or generate signed cookies.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    resource_url: String,
    resource_pattern: Option<String>,
    key_pair_id: String,
    private_key: PrivateKey,
    expiration: DateTime,
    active_date: Option<DateTime>,
    ip_range: Option<String>,
    time_source: SharedTimeSource,
}

impl SigningRequest {
    /// Creates a new builder for constructing a signing request.
    pub fn builder() -> SigningRequestBuilder {
        SigningRequestBuilder::default()
    }

    /// Expiry of the grant.
    pub fn expiration(&self) -> DateTime {
        self.expiration
    }
}

/// Builder for [`SigningRequest`].
#[derive(Default, Debug)]
pub struct SigningRequestBuilder {
    resource_url: Option<String>,
    resource_pattern: Option<String>,
    key_pair_id: Option<String>,
    private_key: Option<PrivateKey>,
    expiration: Option<Expiration>,
    active_date: Option<DateTime>,
    ip_range: Option<String>,
    time_source: Option<SharedTimeSource>,
}

impl SigningRequestBuilder {
    /// Sets the CloudFront resource URL to sign.
    pub fn resource_url(mut self, url: impl Into<String>) -> Self {
        self.resource_url = Some(url.into());
        self
    }

    /// Sets a wildcard pattern for the policy's `Resource` field.
    ///
    /// When set (and different from the resource URL) the request uses a custom policy, so one
    /// signature can cover every object matching the pattern. `*` matches any run of
    /// characters and `?` exactly one; matching is done by CloudFront, not here.
    pub fn resource_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.resource_pattern = Some(pattern.into());
        self
    }

    /// Sets the CloudFront key pair ID.
    pub fn key_pair_id(mut self, id: impl Into<String>) -> Self {
        self.key_pair_id = Some(id.into());
        self
    }

    /// Sets the private key for signing.
    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Sets an absolute expiration time.
    pub fn expires_at(mut self, time: DateTime) -> Self {
        self.expiration = Some(Expiration::DateTime(time));
        self
    }

    /// Sets a relative expiration time from now. Sub-second precision is dropped.
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expiration = Some(Expiration::Duration(duration));
        self
    }

    /// Sets an activation time (not-before date). Forces a custom policy.
    pub fn active_at(mut self, time: DateTime) -> Self {
        self.active_date = Some(time);
        self
    }

    /// Sets an IP range restriction (CIDR notation). Forces a custom policy.
    pub fn ip_range(mut self, cidr: impl Into<String>) -> Self {
        self.ip_range = Some(cidr.into());
        self
    }

    /// Sets the clock used for `expires_in` and for the future-expiry check.
    pub fn time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Builds the signing request.
    pub fn build(self) -> Result<SigningRequest, SigningError> {
        let resource_url = self
            .resource_url
            .ok_or_else(|| SigningError::invalid_input("resource_url is required"))?;
        if resource_url.is_empty() {
            return Err(SigningError::invalid_resource(
                "resource_url must not be empty",
            ));
        }
        if matches!(self.resource_pattern.as_deref(), Some("")) {
            return Err(SigningError::invalid_resource(
                "resource_pattern must not be empty",
            ));
        }

        let key_pair_id = self
            .key_pair_id
            .ok_or_else(|| SigningError::invalid_input("key_pair_id is required"))?;

        let private_key = self
            .private_key
            .ok_or_else(|| SigningError::invalid_input("private_key is required"))?;

        let expiration = self.expiration.ok_or_else(|| {
            SigningError::invalid_input("expiration is required (use expires_at or expires_in)")
        })?;

        let time_source = self.time_source.unwrap_or_default();
        let expiration = match expiration {
            Expiration::DateTime(dt) => dt,
            Expiration::Duration(dur) => {
                let now = DateTime::from(time_source.now());
                DateTime::from_secs(now.secs() + dur.as_secs() as i64)
            }
        };

        Ok(SigningRequest {
            resource_url,
            resource_pattern: self.resource_pattern,
            key_pair_id,
            private_key,
            expiration,
            active_date: self.active_date,
            ip_range: self.ip_range,
            time_source,
        })
    }
}

/// A signed CloudFront URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
}

impl SignedUrl {
    pub(crate) fn new(url: String) -> Self {
        Self { url }
    }

    /// Returns the complete signed URL as a string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Consumes self and returns the URL.
    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// Signed cookies for CloudFront.
#[derive(Debug, Clone)]
pub struct SignedCookies {
    cookies: Vec<(Cow<'static, str>, String)>,
}

impl SignedCookies {
    pub(crate) fn new(cookies: Vec<(Cow<'static, str>, String)>) -> Self {
        Self { cookies }
    }

    /// Returns all cookies as name-value pairs.
    pub fn cookies(&self) -> &[(Cow<'static, str>, String)] {
        &self.cookies
    }

    /// Gets a specific cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }
}

impl SigningRequest {
    pub(crate) fn sign_url(&self) -> Result<SignedUrl, SigningError> {
        let policy = self.build_policy()?;
        let signature = self.private_key.sign(policy.to_json().as_bytes())?;
        let param = PolicyParam::for_policy(&policy, &self.resource_url);
        tracing::debug!(
            resource = %policy.resource(),
            expires = policy.expires_at(),
            canned = matches!(param, PolicyParam::Expires(_)),
            "signed CloudFront URL"
        );
        Ok(make_signed_url(
            &self.resource_url,
            &self.key_pair_id,
            param,
            &signature,
        ))
    }

    pub(crate) fn sign_cookies(&self) -> Result<SignedCookies, SigningError> {
        let policy = self.build_policy()?;
        let signature = self.private_key.sign(policy.to_json().as_bytes())?;
        tracing::debug!(
            resource = %policy.resource(),
            expires = policy.expires_at(),
            "signed CloudFront cookies"
        );
        Ok(make_signed_cookies(&policy, &signature, &self.key_pair_id))
    }

    fn build_policy(&self) -> Result<Policy, SigningError> {
        let resource = self
            .resource_pattern
            .as_deref()
            .unwrap_or(&self.resource_url);
        let mut builder = Policy::builder()
            .resource(resource)
            .expires_at(self.expiration)
            .time_source(self.time_source.clone());

        if let Some(active) = self.active_date {
            builder = builder.starts_at(active);
        }
        if let Some(ref ip) = self.ip_range {
            builder = builder.ip_range(ip);
        }

        builder.build()
    }
}
