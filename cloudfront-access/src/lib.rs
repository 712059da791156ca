/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Issues CloudFront signed URLs and signed cookies for objects behind a distribution.
//!
//! [`AccessDispatcher`] is the entry point: given an [`AccessRequest`] it looks up the
//! distribution, signs a policy with the configured key pair, and returns a [`Grant`] for the
//! HTTP layer to turn into a redirect (plus cookies). [`check_status`] reports which settings
//! are missing and whether the bucket and distribution are reachable.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod config;
mod cookie;
mod dispatch;
pub mod error;
mod key;
pub mod os_shim_internal;
mod status;

pub use client::{Clients, DistributionApi, DistributionInfo, ObjectStorage, StaticDistribution};
pub use config::AccessConfig;
pub use cookie::SignedCookieDistribution;
pub use dispatch::{
    AccessDispatcher, AccessRequest, Cookie, DeliveryMode, Grant, Scheme, STREAMING_TEST_KEY,
};
pub use error::AccessError;
pub use key::KeyPairSource;
pub use status::{check_status, Check, CheckGroup, StatusReport};
