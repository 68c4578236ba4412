//! Media-server login negotiation.
//!
//! A login is tried first with the end user's address in `X-Forwarded-For`
//! (so the server's per-IP policies apply to the real client), then once more
//! without it when the server rejected the first attempt for any reason other
//! than bad credentials.

use async_trait::async_trait;
use mediagate_common::{GatewayError, Result};
use tracing::{debug, error};

use super::models::LoginResponse;

/// Performs a single login request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        forwarded_for: Option<&str>,
    ) -> Result<LoginResponse>;
}

/// Step of a login negotiation.
#[derive(Debug)]
pub enum LoginState {
    /// First attempt, forwarding the client address when known.
    Forwarded,
    /// Second attempt, without the forwarded address.
    Direct,
    Done(LoginResponse),
    Failed(GatewayError),
}

impl LoginState {
    /// Next state after the forwarded attempt produced `outcome`.
    pub fn after_forwarded(outcome: Result<LoginResponse>) -> Self {
        match outcome {
            Ok(login) => LoginState::Done(login),
            Err(err) => match err.status() {
                None => LoginState::Failed(GatewayError::invalid_url(err.to_string())),
                Some(401) => LoginState::Failed(GatewayError::InvalidCredentials { status: 401 }),
                Some(_) => LoginState::Direct,
            },
        }
    }

    /// Next state after the direct attempt produced `outcome`.
    pub fn after_direct(outcome: Result<LoginResponse>) -> Self {
        match outcome {
            Ok(login) => LoginState::Done(login),
            Err(err) => match err.status() {
                Some(401) => LoginState::Failed(GatewayError::InvalidCredentials { status: 401 }),
                status => LoginState::Failed(GatewayError::unknown(status, err.to_string())),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoginState::Done(_) | LoginState::Failed(_))
    }
}

/// Run the login negotiation against `authenticator`.
pub async fn negotiate_login<A>(
    authenticator: &A,
    username: &str,
    password: &str,
    client_ip: Option<&str>,
) -> Result<LoginResponse>
where
    A: Authenticator + ?Sized,
{
    let mut state = LoginState::Forwarded;

    loop {
        state = match state {
            LoginState::Forwarded => {
                let outcome = authenticator.authenticate(username, password, client_ip).await;
                if let Err(e) = &outcome {
                    debug!(
                        status = ?e.status(),
                        ip = ?client_ip,
                        error = %e,
                        "Login with forwarded address failed"
                    );
                }
                LoginState::after_forwarded(outcome)
            }
            LoginState::Direct => {
                let outcome = authenticator.authenticate(username, password, None).await;
                let next = LoginState::after_direct(outcome);
                if let LoginState::Failed(e) = &next {
                    if e.status() != Some(401) {
                        error!(
                            status = ?e.status(),
                            ip = ?client_ip,
                            error = %e,
                            "Something went wrong while authenticating with the media server"
                        );
                    }
                }
                next
            }
            LoginState::Done(login) => return Ok(login),
            LoginState::Failed(err) => return Err(err),
        };
    }
}
