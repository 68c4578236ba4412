//! Error kinds surfaced by every provider gateway.
//!
//! Transport failures are normalized into one of four kinds before they
//! leave the gateway. Each kind keeps the upstream HTTP status when one was
//! obtained so callers can log it or re-classify the failure.

use std::fmt;

/// Discriminant of a [`GatewayError`], convenient for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The upstream host could not be reached at all.
    InvalidUrl,
    /// A login attempt was rejected.
    InvalidCredentials,
    /// An established session or token was rejected.
    InvalidAuthToken,
    /// Any other transport or upstream failure.
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "INVALID_URL",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::InvalidAuthToken => "INVALID_AUTH_TOKEN",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Normalized failure of a provider call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No HTTP status could be obtained: the host is unreachable or the
    /// configured URL is wrong.
    #[error("Upstream unreachable: {message}")]
    InvalidUrl {
        /// Transport error description.
        message: String,
    },

    /// The upstream rejected a login with an unauthorized status.
    #[error("Invalid credentials (status {status})")]
    InvalidCredentials {
        /// HTTP status returned by the upstream (normally 401).
        status: u16,
    },

    /// A data fetch was rejected for an established session.
    #[error("Auth token rejected (status {})", status_label(.status))]
    InvalidAuthToken {
        /// HTTP status returned by the upstream, if any.
        status: Option<u16>,
    },

    /// Catch-all for every other failure.
    #[error("Upstream error (status {}): {message}", status_label(.status))]
    Unknown {
        /// HTTP status returned by the upstream, if any.
        status: Option<u16>,
        /// Human-readable error description.
        message: String,
    },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl GatewayError {
    /// Convenience constructor for [`GatewayError::InvalidUrl`].
    pub fn invalid_url(message: impl Into<String>) -> Self {
        GatewayError::InvalidUrl {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`GatewayError::Unknown`].
    pub fn unknown(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::Unknown {
            status,
            message: message.into(),
        }
    }

    /// Classify a failed call from its HTTP status alone.
    ///
    /// `None` means the transport never produced a response.
    pub fn from_status(status: Option<u16>, message: impl Into<String>) -> Self {
        match status {
            None => Self::invalid_url(message),
            Some(401) => GatewayError::InvalidAuthToken { status },
            Some(_) => Self::unknown(status, message),
        }
    }

    /// The discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            GatewayError::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            GatewayError::InvalidAuthToken { .. } => ErrorKind::InvalidAuthToken,
            GatewayError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The upstream HTTP status, when one was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::InvalidUrl { .. } => None,
            GatewayError::InvalidCredentials { status } => Some(*status),
            GatewayError::InvalidAuthToken { status } => *status,
            GatewayError::Unknown { status, .. } => *status,
        }
    }

    /// Status code a server-facing caller should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::InvalidUrl { .. } => 404,
            GatewayError::InvalidCredentials { status } => *status,
            GatewayError::InvalidAuthToken { status } => status.unwrap_or(401),
            GatewayError::Unknown { status, .. } => status.unwrap_or(500),
        }
    }

    /// Re-classify a failed media-server data fetch as a session failure.
    ///
    /// Unreachable hosts stay [`GatewayError::InvalidUrl`].
    pub fn into_session_error(self) -> Self {
        match self {
            GatewayError::InvalidUrl { .. } => self,
            other => GatewayError::InvalidAuthToken {
                status: other.status(),
            },
        }
    }

    /// Re-classify any failure as [`GatewayError::Unknown`], keeping its status.
    pub fn into_unknown(self) -> Self {
        match self {
            GatewayError::Unknown { .. } => self,
            other => {
                let status = other.status();
                GatewayError::Unknown {
                    status,
                    message: other.to_string(),
                }
            }
        }
    }
}

/// Result type alias using [`GatewayError`].
pub type Result<T> = std::result::Result<T, GatewayError>;
