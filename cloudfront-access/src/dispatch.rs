/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Turns an access request into a redirect target, with or without signed cookies.

use crate::client::{Clients, DistributionInfo};
use crate::config::AccessConfig;
use crate::cookie::SignedCookieDistribution;
use crate::error::AccessError;
use crate::key::KeyPairSource;
use crate::os_shim_internal::Fs;
use aws_cloudfront_signer::error::SigningError;
use aws_cloudfront_signer::{sign_url, SigningRequest};
use aws_smithy_async::time::{SharedTimeSource, StaticTimeSource};
use aws_smithy_types::DateTime;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::Instrument;

/// Object requested by [`AccessDispatcher::streaming_url`].
pub const STREAMING_TEST_KEY: &str = "video.mp4";

/// URL scheme of the distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    /// `http`
    #[default]
    Http,
    /// `https`
    Https,
}

impl Scheme {
    /// The scheme without `://`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(format!("unsupported scheme `{other}` (expected http or https)")),
        }
    }
}

/// How the grant reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Signature in the query string of the redirect target.
    Url,
    /// Signature in cookies; the redirect target itself is unsigned.
    Cookie,
}

/// A request for access to one distribution resource.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    resource_key: String,
    scheme: Scheme,
    delivery: DeliveryMode,
    ttl_minutes: Option<u64>,
    resource: Option<String>,
    cookie_domain: Option<String>,
}

impl AccessRequest {
    /// Requests `resource_key` (an object key such as `dir/video.mp4`).
    pub fn new(resource_key: impl Into<String>, scheme: Scheme, delivery: DeliveryMode) -> Self {
        Self {
            resource_key: resource_key.into(),
            scheme,
            delivery,
            ttl_minutes: None,
            resource: None,
            cookie_domain: None,
        }
    }

    /// Grant lifetime in minutes. Defaults to the configured TTL for the delivery mode.
    pub fn ttl_minutes(mut self, minutes: u64) -> Self {
        self.ttl_minutes = Some(minutes);
        self
    }

    /// Scope the grant to `resource` (which may be a pattern such as `dir/*`) instead of
    /// only the requested key.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Cookie domain for this request, overriding the configured one.
    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// The requested object key.
    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }
}

/// A cookie to set on the response before redirecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: Cow<'static, str>,
    /// Cookie value.
    pub value: String,
    /// `Domain` attribute, if any.
    pub domain: Option<String>,
}

/// What the transport layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Redirect to a signed URL.
    Redirect {
        /// The signed URL.
        location: String,
    },
    /// Set the cookies, then redirect to the plain resource URL.
    CookieRedirect {
        /// The unsigned resource URL.
        location: String,
        /// The three CloudFront cookies.
        cookies: Vec<Cookie>,
    },
}

impl Grant {
    /// Redirect target.
    pub fn location(&self) -> &str {
        match self {
            Grant::Redirect { location } | Grant::CookieRedirect { location, .. } => location,
        }
    }

    /// Cookies to set; empty for URL delivery.
    pub fn cookies(&self) -> &[Cookie] {
        match self {
            Grant::Redirect { .. } => &[],
            Grant::CookieRedirect { cookies, .. } => cookies,
        }
    }
}

/// Issues signed URLs and signed cookies for the configured distribution.
#[derive(Debug, Clone)]
pub struct AccessDispatcher {
    config: Arc<AccessConfig>,
    clients: Clients,
    fs: Fs,
    time_source: SharedTimeSource,
}

impl AccessDispatcher {
    /// Creates a dispatcher reading keys from the real file system and using the system clock.
    pub fn new(config: AccessConfig, clients: Clients) -> Self {
        Self {
            config: Arc::new(config),
            clients,
            fs: Fs::real(),
            time_source: SharedTimeSource::default(),
        }
    }

    /// Replaces the file system used to read private keys.
    pub fn with_fs(mut self, fs: Fs) -> Self {
        self.fs = fs;
        self
    }

    /// Replaces the clock.
    pub fn with_time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// Issues a grant that expires a TTL after now.
    pub async fn dispatch(&self, request: &AccessRequest) -> Result<Grant, AccessError> {
        self.dispatch_at(request, self.time_source.now()).await
    }

    /// Issues a grant as if at `issued_at`.
    ///
    /// Use a shared `issued_at` when several grants must expire at the same second.
    pub async fn dispatch_at(
        &self,
        request: &AccessRequest,
        issued_at: SystemTime,
    ) -> Result<Grant, AccessError> {
        let span = tracing::info_span!(
            "dispatch",
            resource_key = %request.resource_key,
            delivery = ?request.delivery,
        );
        self.dispatch_inner(request, issued_at).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        request: &AccessRequest,
        issued_at: SystemTime,
    ) -> Result<Grant, AccessError> {
        if request.resource_key.is_empty() {
            return Err(AccessError::InvalidResource(
                "resource key must not be empty".into(),
            ));
        }
        if matches!(request.resource.as_deref(), Some("")) {
            return Err(AccessError::InvalidResource(
                "resource must not be empty".into(),
            ));
        }
        let key = KeyPairSource::from_config(&self.config, self.fs.clone())?;
        let distribution = self.distribution().await?;

        let expires_at = self.expires_at(request, issued_at)?;
        let clock = SharedTimeSource::new(StaticTimeSource::new(issued_at));

        let grant = match request.delivery {
            DeliveryMode::Url => {
                let domain = distribution.domain_name();
                let location = format!(
                    "{}://{}/{}",
                    request.scheme, domain, request.resource_key
                );
                let mut signing = SigningRequest::builder()
                    .resource_url(location)
                    .key_pair_id(key.key_pair_id())
                    .private_key(key.load()?)
                    .expires_at(expires_at)
                    .time_source(clock);
                if let Some(pattern) = &request.resource {
                    signing = signing
                        .resource_pattern(format!("{}://{}/{}", request.scheme, domain, pattern));
                }
                let signed = sign_url(signing.build()?)?;
                Grant::Redirect {
                    location: signed.into_string(),
                }
            }
            DeliveryMode::Cookie => {
                let cookie_distribution =
                    SignedCookieDistribution::new(distribution, self.config.domain());
                let scoped = request
                    .resource
                    .as_deref()
                    .unwrap_or(&request.resource_key);
                let signed = cookie_distribution.create_signed_cookies(
                    scoped,
                    &key,
                    expires_at,
                    request.scheme,
                    clock,
                )?;
                let domain = request
                    .cookie_domain
                    .as_deref()
                    .or(self.config.cookie_domain())
                    .map(str::to_string);
                Grant::CookieRedirect {
                    location: cookie_distribution
                        .resource_url(&request.resource_key, request.scheme),
                    cookies: signed
                        .cookies()
                        .iter()
                        .map(|(name, value)| Cookie {
                            name: name.clone(),
                            value: value.clone(),
                            domain: domain.clone(),
                        })
                        .collect(),
                }
            }
        };
        tracing::debug!(
            expires_at = expires_at.secs(),
            location = %grant.location(),
            "issued grant"
        );
        Ok(grant)
    }

    /// Signed `https` URL for [`STREAMING_TEST_KEY`], valid for every object on the distribution.
    pub async fn streaming_url(&self) -> Result<String, AccessError> {
        let request = AccessRequest::new(STREAMING_TEST_KEY, Scheme::Https, DeliveryMode::Url)
            .resource("*");
        Ok(self.dispatch(&request).await?.location().to_string())
    }

    fn expires_at(
        &self,
        request: &AccessRequest,
        issued_at: SystemTime,
    ) -> Result<DateTime, AccessError> {
        let ttl_secs = match request.ttl_minutes {
            Some(minutes) => minutes.checked_mul(60),
            None => Some(
                match request.delivery {
                    DeliveryMode::Url => self.config.url_ttl(),
                    DeliveryMode::Cookie => self.config.cookie_ttl(),
                }
                .as_secs(),
            ),
        };
        ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from(issued_at).secs().checked_add(secs))
            .map(DateTime::from_secs)
            .ok_or_else(|| {
                AccessError::InvalidPolicy(SigningError::invalid_policy(
                    "grant lifetime is too long to express as an expiry time",
                ))
            })
    }

    async fn distribution(&self) -> Result<DistributionInfo, AccessError> {
        let id = self.config.require_distribution_id()?;
        let client = self
            .clients
            .distribution()
            .ok_or_else(|| AccessError::RemoteAccess {
                service: "distribution",
                source: "no distribution client configured".into(),
            })?;
        client
            .distribution_info(id)
            .await
            .map_err(|source| AccessError::RemoteAccess {
                service: "distribution",
                source,
            })
    }
}
