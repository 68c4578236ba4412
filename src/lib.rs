//! Mediagate - gateway to external media providers
//!
//! Rate-limited, cache-aware clients for the TMDB catalog API and for
//! Jellyfin/Emby media servers. Failures are normalized into the error kinds
//! of [`mediagate_common::GatewayError`].

pub mod config;
pub mod gateway;
pub mod jellyfin;
pub mod tmdb;

pub use mediagate_common::{ErrorKind, GatewayError, Result};
