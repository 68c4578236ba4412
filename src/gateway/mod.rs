//! Shared request layer in front of every upstream provider.
//!
//! # Module layout
//!
//! - [`client`] -- [`GatewayClient`], the request executor.
//! - [`rate_limit`] -- Sliding-window plus max-rate admission control.
//! - [`cache`] -- TTL response cache keyed by canonical request URL.
//! - [`query`] -- Ordered query parameters.
//!
//! Each provider client owns exactly one [`GatewayClient`], and with it its
//! own limiter and cache; nothing is shared across providers.

pub mod cache;
pub mod client;
pub mod query;
pub mod rate_limit;

pub use cache::{cache_key, CacheStats, ResponseCache};
pub use client::{GatewayClient, GatewayOptions};
pub use query::QueryParams;
pub use rate_limit::RateLimiter;
