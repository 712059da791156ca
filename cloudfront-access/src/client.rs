/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Collaborator services: the origin object store and the CloudFront control API.
//!
//! Callers construct these clients once and hand them to the dispatcher and the status
//! report through [`Clients`]; nothing here connects lazily or caches behind the caller's back.

use crate::error::BoxError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Public facts about a CloudFront distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionInfo {
    id: String,
    domain_name: String,
}

impl DistributionInfo {
    /// Creates distribution info.
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
        }
    }

    /// Distribution ID, e.g. `E2EXAMPLE`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Domain assigned by CloudFront, e.g. `d111111abcdef8.cloudfront.net`.
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }
}

/// Object storage lookups.
#[async_trait]
pub trait ObjectStorage: Send + Sync + fmt::Debug {
    /// Succeeds if `name` exists and the configured credentials can see it.
    async fn head_bucket(&self, name: &str) -> Result<(), BoxError>;
}

/// CloudFront control-plane lookups.
#[async_trait]
pub trait DistributionApi: Send + Sync + fmt::Debug {
    /// Fetches the distribution with the given ID.
    async fn distribution_info(&self, id: &str) -> Result<DistributionInfo, BoxError>;
}

/// The collaborator clients used by one process.
///
/// Either client may be absent, e.g. in an offline process. Issuance needs a distribution
/// client; the status report marks probes against a missing client as not checked.
#[derive(Clone, Debug, Default)]
pub struct Clients {
    storage: Option<Arc<dyn ObjectStorage>>,
    distribution: Option<Arc<dyn DistributionApi>>,
}

impl Clients {
    /// Bundles the two clients.
    pub fn new(
        storage: impl ObjectStorage + 'static,
        distribution: impl DistributionApi + 'static,
    ) -> Self {
        Self::default()
            .with_storage(storage)
            .with_distribution(distribution)
    }

    /// Sets the object store client.
    pub fn with_storage(mut self, storage: impl ObjectStorage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Sets the distribution API client.
    pub fn with_distribution(mut self, distribution: impl DistributionApi + 'static) -> Self {
        self.distribution = Some(Arc::new(distribution));
        self
    }

    /// The object store client, if any.
    pub fn storage(&self) -> Option<&dyn ObjectStorage> {
        self.storage.as_deref()
    }

    /// The distribution API client, if any.
    pub fn distribution(&self) -> Option<&dyn DistributionApi> {
        self.distribution.as_deref()
    }
}

/// A [`DistributionApi`] that answers every lookup with a fixed domain, without network calls.
#[derive(Debug, Clone)]
pub struct StaticDistribution {
    domain_name: String,
}

impl StaticDistribution {
    /// Serves `domain_name` for any distribution ID.
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
        }
    }
}

#[async_trait]
impl DistributionApi for StaticDistribution {
    async fn distribution_info(&self, id: &str) -> Result<DistributionInfo, BoxError> {
        Ok(DistributionInfo::new(id, self.domain_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_distribution_echoes_id() {
        let clients =
            Clients::default().with_distribution(StaticDistribution::new("cdn.example.com"));
        let info = clients
            .distribution()
            .unwrap()
            .distribution_info("E2EXAMPLE")
            .await
            .unwrap();
        assert_eq!(info, DistributionInfo::new("E2EXAMPLE", "cdn.example.com"));
        assert!(clients.storage().is_none());
    }
}
