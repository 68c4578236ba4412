//! Mediagate-Common: Shared error kinds and media types.
//!
//! This crate provides the vocabulary shared by every provider integration:
//!
//! - **Error Handling**: the four gateway error kinds and a result alias
//! - **Core Types**: library kinds and media-server flavours
//!
//! # Examples
//!
//! ```
//! use mediagate_common::{ErrorKind, GatewayError, LibraryKind, Result};
//!
//! fn example() -> Result<LibraryKind> {
//!     Err(GatewayError::unknown(Some(502), "bad gateway"))
//! }
//!
//! let err = example().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Unknown);
//! assert_eq!(err.status(), Some(502));
//! ```

pub mod error;
pub mod types;

pub use error::{ErrorKind, GatewayError, Result};
pub use types::*;
