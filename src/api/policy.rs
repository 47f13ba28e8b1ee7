//! Endpoint Policies
//!
//! Declarative per-endpoint configuration, attached at route
//! registration: which action an endpoint performs, which quota class
//! admits it, and what cache-control advice its responses carry.

use serde::{Deserialize, Serialize};

use crate::config::RateLimitConfig;
use crate::rate_limit::QuotaClass;

/// Cache lifetime advertised on read responses, in seconds
pub const CACHE_MAX_AGE_SECS: u64 = 30;

/// How long a stale response may be served while revalidating, in seconds
pub const CACHE_MAX_STALE_SECS: u64 = 3000;

/// Actions the resource supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Get,
    Create,
    Replace,
    Patch,
    Delete,
    Reset,
}

impl Action {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Get => "get",
            Action::Create => "create",
            Action::Replace => "replace",
            Action::Patch => "patch",
            Action::Delete => "delete",
            Action::Reset => "reset",
        }
    }
}

/// Advisory cache-control semantics for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Seconds a response stays fresh
    pub max_age_secs: u64,

    /// Seconds a stale response may still be served
    pub max_stale_secs: u64,

    /// Require revalidation once expired
    pub must_revalidate: bool,
}

impl CachePolicy {
    /// Policy applied to read endpoints
    pub fn read_default() -> Self {
        Self {
            max_age_secs: CACHE_MAX_AGE_SECS,
            max_stale_secs: CACHE_MAX_STALE_SECS,
            must_revalidate: true,
        }
    }

    /// Render the `Cache-Control` header value
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}, max-stale={}", self.max_age_secs, self.max_stale_secs);
        if self.must_revalidate {
            value.push_str(", must-revalidate");
        }
        value
    }
}

/// Policy for one endpoint: action, quota class, cache advice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPolicy {
    /// Action performed by the endpoint
    pub action: Action,

    /// Quota class admitting requests
    pub quota: QuotaClass,

    /// Cache advice for successful responses, if any
    pub cache: Option<CachePolicy>,
}

impl EndpointPolicy {
    /// Policy with no cache advice
    pub fn new(action: Action, quota: QuotaClass) -> Self {
        Self {
            action,
            quota,
            cache: None,
        }
    }

    /// Policy carrying the read cache advice
    pub fn cached(action: Action, quota: QuotaClass) -> Self {
        Self {
            action,
            quota,
            cache: Some(CachePolicy::read_default()),
        }
    }
}

/// The full policy set, one entry per endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPolicies {
    pub list: EndpointPolicy,
    pub get: EndpointPolicy,
    pub create: EndpointPolicy,
    pub replace: EndpointPolicy,
    pub patch: EndpointPolicy,
    pub delete: EndpointPolicy,
    pub reset: EndpointPolicy,
}

impl EndpointPolicies {
    /// Build the policy set from a default class for CRUD actions and a
    /// separate, more permissive class for the administrative reset
    pub fn new(default_class: QuotaClass, reset_class: QuotaClass) -> Self {
        Self {
            list: EndpointPolicy::cached(Action::List, default_class),
            get: EndpointPolicy::cached(Action::Get, default_class),
            create: EndpointPolicy::new(Action::Create, default_class),
            replace: EndpointPolicy::new(Action::Replace, default_class),
            patch: EndpointPolicy::new(Action::Patch, default_class),
            delete: EndpointPolicy::new(Action::Delete, default_class),
            reset: EndpointPolicy::new(Action::Reset, reset_class),
        }
    }

    /// Build the policy set from configuration
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            QuotaClass::per_second(config.default_per_second),
            QuotaClass::per_hour(config.reset_per_hour),
        )
    }
}

impl Default for EndpointPolicies {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
