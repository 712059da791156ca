/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Access policy documents.
//!
//! The serialized form of a [`Policy`] is exactly what gets signed, so [`Policy::to_json`]
//! must be byte-for-byte stable: fixed key order and no whitespace.

use crate::encoding::url_safe_encode;
use crate::error::SigningError;
use aws_smithy_async::time::SharedTimeSource;
use aws_smithy_types::{DateTime, Number};

/// Builds a canned policy granting access to `resource_url` until `expires_at`.
///
/// `expires_at` must be in the future according to the system clock.
pub fn build_canned_policy(
    resource_url: impl Into<String>,
    expires_at: DateTime,
) -> Result<Policy, SigningError> {
    Policy::builder()
        .resource(resource_url)
        .expires_at(expires_at)
        .build()
}

/// A single-statement CloudFront access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    resource: String,
    expires_at: i64,
    starts_at: Option<i64>,
    ip_range: Option<String>,
}

impl Policy {
    /// Creates a new builder.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// The resource URL or pattern this policy scopes.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// True when the policy carries nothing beyond a resource and an expiry.
    pub fn is_canned(&self) -> bool {
        self.starts_at.is_none() && self.ip_range.is_none()
    }

    /// Serializes the policy into its canonical JSON form.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        let mut root = aws_smithy_json::serialize::JsonObjectWriter::new(&mut out);

        let mut statement_array = root.key("Statement").start_array();
        let mut statement = statement_array.value().start_object();

        statement.key("Resource").string(&self.resource);

        let mut condition = statement.key("Condition").start_object();

        let mut date_less = condition.key("DateLessThan").start_object();
        date_less
            .key("AWS:EpochTime")
            .number(Number::PosInt(self.expires_at as u64));
        date_less.finish();

        if let Some(starts) = self.starts_at {
            let mut date_greater = condition.key("DateGreaterThan").start_object();
            date_greater
                .key("AWS:EpochTime")
                .number(Number::PosInt(starts as u64));
            date_greater.finish();
        }

        if let Some(ref ip) = self.ip_range {
            let mut ip_addr = condition.key("IpAddress").start_object();
            ip_addr.key("AWS:SourceIp").string(ip);
            ip_addr.finish();
        }

        condition.finish();
        statement.finish();
        statement_array.finish();
        root.finish();

        out
    }

    /// The canonical JSON, CloudFront-base64 encoded.
    pub fn encoded(&self) -> String {
        url_safe_encode(self.to_json())
    }
}

/// Builder for [`Policy`].
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    resource: Option<String>,
    expires_at: Option<DateTime>,
    starts_at: Option<DateTime>,
    ip_range: Option<String>,
    time_source: Option<SharedTimeSource>,
}

impl PolicyBuilder {
    /// Sets the resource URL or wildcard pattern.
    pub fn resource(mut self, url: impl Into<String>) -> Self {
        self.resource = Some(url.into());
        self
    }

    /// Sets the expiry. Required.
    pub fn expires_at(mut self, time: DateTime) -> Self {
        self.expires_at = Some(time);
        self
    }

    /// Sets a not-before time. Makes the policy custom.
    pub fn starts_at(mut self, time: DateTime) -> Self {
        self.starts_at = Some(time);
        self
    }

    /// Restricts the source IP range (CIDR). Makes the policy custom.
    pub fn ip_range(mut self, cidr: impl Into<String>) -> Self {
        self.ip_range = Some(cidr.into());
        self
    }

    /// Overrides the clock used to check that the expiry lies in the future.
    pub fn time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Validates and builds the policy.
    pub fn build(self) -> Result<Policy, SigningError> {
        let resource = self
            .resource
            .ok_or_else(|| SigningError::invalid_policy("resource is required"))?;
        if resource.is_empty() {
            return Err(SigningError::invalid_resource("resource must not be empty"));
        }

        let expires_at = self
            .expires_at
            .ok_or_else(|| SigningError::invalid_policy("expires_at is required"))?;

        let now = DateTime::from(self.time_source.unwrap_or_default().now());
        if expires_at.secs() <= now.secs() || expires_at.secs() <= 0 {
            return Err(SigningError::invalid_policy(
                "expires_at must be in the future",
            ));
        }

        let expires_epoch = expires_at.secs();
        let starts_epoch = self.starts_at.map(|dt| dt.secs());

        if let Some(starts) = starts_epoch {
            // epoch times are serialized unsigned
            if starts < 0 {
                return Err(SigningError::invalid_policy(
                    "starts_at must not be before the Unix epoch",
                ));
            }
            if starts >= expires_epoch {
                return Err(SigningError::invalid_policy(
                    "starts_at must be before expires_at",
                ));
            }
        }

        Ok(Policy {
            resource,
            expires_at: expires_epoch,
            starts_at: starts_epoch,
            ip_range: self.ip_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::url_safe_decode;
    use crate::error::ErrorKind;
    use aws_smithy_async::time::StaticTimeSource;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::time::{Duration, UNIX_EPOCH};

    const NOW: u64 = 1_767_200_000;

    fn clock() -> SharedTimeSource {
        SharedTimeSource::new(StaticTimeSource::new(
            UNIX_EPOCH + Duration::from_secs(NOW),
        ))
    }

    fn builder() -> PolicyBuilder {
        Policy::builder().time_source(clock())
    }

    #[test]
    fn canned_policy_json_is_exact() {
        let policy = builder()
            .resource("https://d111111abcdef8.cloudfront.net/image.jpg")
            .expires_at(DateTime::from_secs(1767290400))
            .build()
            .expect("valid canned policy");

        assert!(policy.is_canned());
        assert_eq!(
            policy.to_json(),
            r#"{"Statement":[{"Resource":"https://d111111abcdef8.cloudfront.net/image.jpg","Condition":{"DateLessThan":{"AWS:EpochTime":1767290400}}}]}"#
        );
    }

    #[test]
    fn build_canned_policy_uses_system_clock() {
        let far_future = DateTime::from_secs(4_102_444_800);
        let policy = build_canned_policy("https://example.com/dir/*", far_future).unwrap();
        assert_eq!(policy.resource(), "https://example.com/dir/*");
        assert_eq!(policy.expires_at(), 4_102_444_800);

        let err =
            build_canned_policy("https://example.com/a", DateTime::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn custom_policy_condition_order() {
        let policy = builder()
            .resource("https://d111111abcdef8.cloudfront.net/*")
            .expires_at(DateTime::from_secs(1767290400))
            .starts_at(DateTime::from_secs(1767200000))
            .ip_range("192.0.2.0/24")
            .build()
            .expect("valid custom policy");

        assert!(!policy.is_canned());
        assert_eq!(
            policy.to_json(),
            r#"{"Statement":[{"Resource":"https://d111111abcdef8.cloudfront.net/*","Condition":{"DateLessThan":{"AWS:EpochTime":1767290400},"DateGreaterThan":{"AWS:EpochTime":1767200000},"IpAddress":{"AWS:SourceIp":"192.0.2.0/24"}}}]}"#
        );
    }

    #[test]
    fn expiry_must_be_in_the_future() {
        for expires in [NOW as i64, NOW as i64 - 60] {
            let err = builder()
                .resource("https://example.com/file.txt")
                .expires_at(DateTime::from_secs(expires))
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
        }
    }

    #[test]
    fn missing_fields() {
        let err = builder()
            .expires_at(DateTime::from_secs(1767290400))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);

        let err = builder()
            .resource("https://example.com/file.txt")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn empty_resource() {
        let err = builder()
            .resource("")
            .expires_at(DateTime::from_secs(1767290400))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResource);
    }

    #[test]
    fn starts_at_after_expires_at() {
        let err = builder()
            .resource("https://example.com/file.txt")
            .expires_at(DateTime::from_secs(1767290400))
            .starts_at(DateTime::from_secs(1767290400))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn starts_at_before_epoch() {
        let err = builder()
            .resource("https://example.com/file.txt")
            .expires_at(DateTime::from_secs(1767290400))
            .starts_at(DateTime::from_secs(-5))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
        assert_eq!(
            err.to_string(),
            "invalid policy: starts_at must not be before the Unix epoch"
        );
    }

    #[test]
    fn expiry_before_epoch_with_pre_epoch_clock() {
        let err = Policy::builder()
            .resource("https://example.com/file.txt")
            .expires_at(DateTime::from_secs(-10))
            .time_source(SharedTimeSource::new(StaticTimeSource::new(
                UNIX_EPOCH - Duration::from_secs(60),
            )))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn encoded_policy_decodes_to_json() {
        let policy = builder()
            .resource("https://example.com/test")
            .expires_at(DateTime::from_secs(1767290400))
            .build()
            .unwrap();

        let encoded = policy.encoded();
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(
            url_safe_decode(&encoded).unwrap(),
            policy.to_json().into_bytes()
        );
    }

    proptest! {
        #[test]
        fn serialization_is_deterministic(
            path in "[a-z0-9/]{1,40}\\*?",
            offset in 1i64..10_000_000,
        ) {
            let resource = format!("https://d111111abcdef8.cloudfront.net/{path}");
            let expires = DateTime::from_secs(NOW as i64 + offset);
            let first = builder().resource(&resource).expires_at(expires).build().unwrap();
            let second = builder().resource(&resource).expires_at(expires).build().unwrap();
            prop_assert_eq!(first.to_json(), second.to_json());
            prop_assert!(!first.to_json().contains(' '));
        }
    }
}
