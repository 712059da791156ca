/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Diagnostic report on configuration and collaborator reachability.
//!
//! Unlike issuance, the report never fails: a remote error becomes a failed check carrying
//! the error text, and a probe with no client to run it is reported as not checked.

use crate::client::Clients;
use crate::config::{self, AccessConfig};
use crate::os_shim_internal::Fs;

/// Which part of the setup a check covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckGroup {
    /// Required settings.
    Configuration,
    /// Reachability of the bucket and distribution.
    Connection,
    /// Optional settings used only by signed cookies. Not counted in `all_passed`.
    SignedCookies,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Stable identifier.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
    /// Group the check belongs to.
    pub group: CheckGroup,
    /// False when the check could not run, e.g. no client was configured for a probe.
    pub checked: bool,
    /// Outcome. Always false when not checked.
    pub passed: bool,
    /// Why the check failed, when known.
    pub detail: Option<String>,
}

/// Result of [`check_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Checks in display order.
    pub checks: Vec<Check>,
    /// True when every configuration and connection check that ran passed.
    pub all_passed: bool,
}

impl StatusReport {
    /// Looks up a check by name.
    pub fn get(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }
}

fn defined(
    name: &'static str,
    description: &'static str,
    group: CheckGroup,
    value: Option<&str>,
    var: &str,
) -> Check {
    Check {
        name,
        description,
        group,
        checked: true,
        passed: value.is_some(),
        detail: value.is_none().then(|| format!("{var} is not set")),
    }
}

/// Evaluates every check once, in display order.
pub async fn check_status(config: &AccessConfig, clients: &Clients, fs: &Fs) -> StatusReport {
    use CheckGroup::*;

    let mut checks = vec![
        defined(
            "access_key_defined",
            "Access key defined in config",
            Configuration,
            config.access_key(),
            config::ACCESS_KEY,
        ),
        defined(
            "secret_key_defined",
            "Secret key defined in config",
            Configuration,
            config.secret_key(),
            config::SECRET_KEY,
        ),
        defined(
            "s3_bucket_defined",
            "Storage bucket defined in config",
            Configuration,
            config.bucket(),
            config::S3_BUCKET,
        ),
        defined(
            "distribution_defined",
            "Distribution defined in config",
            Configuration,
            config.distribution_id(),
            config::DISTRIBUTION,
        ),
        defined(
            "cf_key_id_defined",
            "Signing key pair ID defined",
            Configuration,
            config.key_pair_id(),
            config::CLOUDFRONT_KEY_ID,
        ),
    ];

    checks.push(match config.private_key_file() {
        Some(path) if fs.exists(path) => Check {
            name: "private_key",
            description: "Private key file defined and exists",
            group: Configuration,
            checked: true,
            passed: true,
            detail: None,
        },
        Some(path) => Check {
            name: "private_key",
            description: "Private key file defined and exists",
            group: Configuration,
            checked: true,
            passed: false,
            detail: Some(format!("{} does not exist", path.display())),
        },
        None => Check {
            name: "private_key",
            description: "Private key file defined and exists",
            group: Configuration,
            checked: true,
            passed: false,
            detail: Some(format!("{} is not set", config::PRIVATE_KEY_FILE)),
        },
    });

    let bucket = match (config.bucket(), clients.storage()) {
        (None, _) => Some(Err(format!("{} is not set", config::S3_BUCKET).into())),
        (Some(_), None) => None,
        (Some(bucket), Some(storage)) => Some(storage.head_bucket(bucket).await),
    };
    checks.push(probe("access_bucket", "Has access to bucket", bucket));

    let distribution = match (config.distribution_id(), clients.distribution()) {
        (None, _) => Some(Err(format!("{} is not set", config::DISTRIBUTION).into())),
        (Some(_), None) => None,
        (Some(id), Some(api)) => Some(api.distribution_info(id).await.map(|_| ())),
    };
    checks.push(probe(
        "access_distribution",
        "Has access to distribution",
        distribution,
    ));

    checks.push(defined(
        "domain_defined",
        "Distribution domain/CNAME defined",
        SignedCookies,
        config.domain(),
        config::DOMAIN,
    ));
    checks.push(defined(
        "cookie_domain_defined",
        "Cookie domain defined",
        SignedCookies,
        config.cookie_domain(),
        config::COOKIE_DOMAIN,
    ));

    let all_passed = checks
        .iter()
        .filter(|c| c.group != SignedCookies && c.checked)
        .all(|c| c.passed);
    StatusReport { checks, all_passed }
}

fn probe(
    name: &'static str,
    description: &'static str,
    result: Option<Result<(), crate::error::BoxError>>,
) -> Check {
    let (checked, detail) = match result {
        None => (false, Some("no client configured".to_string())),
        Some(Ok(())) => (true, None),
        Some(Err(err)) => {
            tracing::warn!(check = name, err = %err, "connectivity check failed");
            (true, Some(err.to_string()))
        }
    };
    Check {
        name,
        description,
        group: CheckGroup::Connection,
        checked,
        passed: checked && detail.is_none(),
        detail,
    }
}
