// Remote credential check and the login screen flow

use crate::nav::{Navigator, Screen};
use crate::presenter::Presenter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Message shown for every login failure, whatever the cause
pub const AUTH_FAILURE_MESSAGE: &str = "Invalid email or password";

/// Why a login attempt failed; only ever logged, never shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    Transport(String),
    Status(u16),
    MalformedResponse(String),
    MissingToken,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "login transport error: {err}"),
            Self::Status(code) => write!(f, "login failed with http status {code}"),
            Self::MalformedResponse(err) => write!(f, "malformed login response: {err}"),
            Self::MissingToken => write!(f, "login response carried no token"),
        }
    }
}

impl std::error::Error for AuthFailure {}

/// Remote credential check
pub trait AuthClient {
    /// Exchange credentials for a non-empty token
    fn login(&self, email: &str, password: &str) -> Result<String, AuthFailure>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

/// JSON-over-HTTP login endpoint
pub struct HttpAuthClient {
    login_url: String,
    agent: ureq::Agent,
}

impl HttpAuthClient {
    pub fn new(login_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            login_url: login_url.into(),
            agent,
        }
    }
}

impl AuthClient for HttpAuthClient {
    fn login(&self, email: &str, password: &str) -> Result<String, AuthFailure> {
        debug!(url = %self.login_url, "Sending login request");

        let response = self
            .agent
            .post(&self.login_url)
            .set("content-type", "application/json")
            .send_json(LoginRequest { email, password });

        match response {
            Ok(resp) => {
                if !(200..=299).contains(&resp.status()) {
                    return Err(AuthFailure::Status(resp.status()));
                }
                let body: LoginResponse = resp
                    .into_json()
                    .map_err(|e| AuthFailure::MalformedResponse(e.to_string()))?;
                match body.token {
                    Some(token) if !token.is_empty() => Ok(token),
                    _ => Err(AuthFailure::MissingToken),
                }
            }
            Err(ureq::Error::Status(code, _)) => Err(AuthFailure::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(AuthFailure::Transport(err.to_string())),
        }
    }
}

/// How a login submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    Rejected,
    Incomplete,
}

/// Login screen input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the credentials and move to the records screen on success
    ///
    /// Empty input is rejected before any request is made. Every remote
    /// failure is shown as the same generic message.
    pub fn submit<A, N, P>(&self, client: &A, navigator: &mut N, presenter: &mut P) -> LoginOutcome
    where
        A: AuthClient + ?Sized,
        N: Navigator + ?Sized,
        P: Presenter + ?Sized,
    {
        if self.email.is_empty() || self.password.is_empty() {
            presenter.alert("Login", "Please enter email and password");
            return LoginOutcome::Incomplete;
        }

        match client.login(&self.email, &self.password) {
            Ok(_token) => {
                info!(email = %self.email, "Login succeeded");
                navigator.replace(Screen::Records);
                LoginOutcome::LoggedIn
            }
            Err(failure) => {
                warn!(email = %self.email, error = %failure, "Login failed");
                presenter.alert("Login failed", AUTH_FAILURE_MESSAGE);
                LoginOutcome::Rejected
            }
        }
    }
}
