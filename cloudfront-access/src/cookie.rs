/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::client::DistributionInfo;
use crate::dispatch::Scheme;
use crate::error::AccessError;
use crate::key::KeyPairSource;
use aws_cloudfront_signer::{sign_cookies, SignedCookies, SigningRequest};
use aws_smithy_async::time::SharedTimeSource;
use aws_smithy_types::DateTime;

/// Issues signed cookies for one distribution.
#[derive(Debug, Clone)]
pub struct SignedCookieDistribution {
    distribution: DistributionInfo,
    domain: String,
}

impl SignedCookieDistribution {
    /// `domain` overrides the distribution's own domain name; pass the CNAME that maps to the
    /// distribution, if there is one, so that cookies match the host the browser talks to.
    pub fn new(distribution: DistributionInfo, domain: Option<&str>) -> Self {
        let domain = domain
            .map(str::to_string)
            .unwrap_or_else(|| distribution.domain_name().to_string());
        Self {
            distribution,
            domain,
        }
    }

    /// Host used in resource URLs.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `scheme://domain/resource`. The resource is appended verbatim, wildcards included.
    pub fn resource_url(&self, resource: &str, scheme: Scheme) -> String {
        format!("{}://{}/{}", scheme.as_str(), self.domain, resource)
    }

    /// Signs a canned policy for `resource` and returns the three CloudFront cookies.
    ///
    /// `resource` may be an object key (`dir/object.mp4`) or a pattern (`dir/*`, `*`). An
    /// empty resource is rejected before the key file is read.
    pub fn create_signed_cookies(
        &self,
        resource: &str,
        key: &KeyPairSource,
        expires_at: DateTime,
        scheme: Scheme,
        time_source: SharedTimeSource,
    ) -> Result<SignedCookies, AccessError> {
        if resource.is_empty() {
            return Err(AccessError::InvalidResource(
                "resource must not be empty".into(),
            ));
        }
        tracing::debug!(
            distribution_id = %self.distribution.id(),
            domain = %self.domain,
            resource,
            "signing cookies"
        );
        let request = SigningRequest::builder()
            .resource_url(self.resource_url(resource, scheme))
            .key_pair_id(key.key_pair_id())
            .private_key(key.load()?)
            .expires_at(expires_at)
            .time_source(time_source)
            .build()?;
        Ok(sign_cookies(request)?)
    }
}
