//
//  open-toolchain-sdk
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! This module provides the credentials the SDK attaches to outgoing requests.
//! Authentication is a closed set of variants behind one capability,
//! [`Authenticator::authenticate`].
//!
//! ## Supported Authentication Methods
//!
//! - **NoAuth**: no credential header; for mock servers and gateways that
//!   authenticate upstream.
//! - **Basic**: RFC 7617 `Authorization: Basic ...` from a username and password.
//! - **Bearer Token**: a caller-managed `Authorization: Bearer <token>`.
//! - **IAM**: an API key exchanged for short-lived bearer tokens.
//! - **Container**: a compute-resource token exchanged through a trusted profile.
//!
//! ## Module Structure
//!
//! - `iam`: IAM and container token exchange ([`IamAuthenticator`],
//!   [`ContainerAuthenticator`])
//! - `token`: cached tokens and single-flight refresh ([`IamToken`])
//!
//! ## Example
//!
//! ```rust
//! use open_toolchain::auth::{AuthType, Authenticator};
//!
//! let basic = Authenticator::basic("user", "secret")?;
//! assert_eq!(basic.auth_type(), AuthType::Basic);
//!
//! // Empty credentials fail at construction time
//! assert!(Authenticator::bearer("").is_err());
//! # Ok::<(), open_toolchain::SdkError>(())
//! ```

mod iam;
mod token;

pub use iam::*;
pub use token::IamToken;

use std::fmt;
use std::str::FromStr;

use reqwest::RequestBuilder;

use crate::api::client::has_bad_first_or_last_char;
use crate::api::common::{Result, SdkError};
use crate::api::context::RequestContext;

/// The authentication kinds the SDK recognizes.
///
/// Parsing is case-insensitive and matches the values accepted in the
/// `<SERVICE>_AUTH_TYPE` configuration property.
///
/// | Value | Variant |
/// |-------|---------|
/// | `noauth` | [`AuthType::NoAuth`] |
/// | `basic` | [`AuthType::Basic`] |
/// | `bearertoken` | [`AuthType::BearerToken`] |
/// | `iam` | [`AuthType::Iam`] |
/// | `container` | [`AuthType::Container`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    NoAuth,
    Basic,
    BearerToken,
    Iam,
    Container,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAuth => "noauth",
            Self::Basic => "basic",
            Self::BearerToken => "bearertoken",
            Self::Iam => "iam",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noauth" => Ok(Self::NoAuth),
            "basic" => Ok(Self::Basic),
            "bearertoken" => Ok(Self::BearerToken),
            "iam" => Ok(Self::Iam),
            "container" => Ok(Self::Container),
            _ => Err(SdkError::UnknownAuthType(s.to_string())),
        }
    }
}

/// Username and password for HTTP Basic authentication.
#[derive(Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    /// Creates a validated basic authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] if either value is empty or wrapped in
    /// braces or quotes.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();

        for (field, value) in [("username", &username), ("password", &password)] {
            if value.is_empty() {
                return Err(SdkError::Config(format!(
                    "basic authentication requires a non-empty {field}"
                )));
            }
            if has_bad_first_or_last_char(value) {
                return Err(SdkError::Config(format!(
                    "the {field} must not start or end with braces or quotes"
                )));
            }
        }

        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// A caller-supplied bearer token.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    /// Creates a validated bearer authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SdkError::Config(
                "bearer token authentication requires a non-empty token".into(),
            ));
        }
        Ok(Self { token })
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"[redacted]")
            .finish()
    }
}

/// Credentials applied to every request a service sends.
///
/// A service holds its authenticator behind an `Arc`, so clones of a service
/// share one token cache.
#[derive(Debug)]
pub enum Authenticator {
    /// No credentials are sent.
    NoAuth,
    /// HTTP Basic authentication.
    Basic(BasicAuthenticator),
    /// A static bearer token.
    BearerToken(BearerTokenAuthenticator),
    /// API key exchanged for IAM bearer tokens.
    Iam(IamAuthenticator),
    /// Compute-resource token exchanged for IAM bearer tokens.
    Container(ContainerAuthenticator),
}

impl Authenticator {
    pub fn no_auth() -> Self {
        Self::NoAuth
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Ok(Self::Basic(BasicAuthenticator::new(username, password)?))
    }

    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        Ok(Self::BearerToken(BearerTokenAuthenticator::new(token)?))
    }

    pub fn iam(apikey: impl Into<String>) -> Result<Self> {
        Ok(Self::Iam(IamAuthenticator::new(apikey)?))
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::NoAuth => AuthType::NoAuth,
            Self::Basic(_) => AuthType::Basic,
            Self::BearerToken(_) => AuthType::BearerToken,
            Self::Iam(_) => AuthType::Iam,
            Self::Container(_) => AuthType::Container,
        }
    }

    /// Applies the credentials to an outgoing request.
    ///
    /// IAM and container variants may contact the token service first; that
    /// exchange runs inside `ctx` and is abandoned if it fires.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use open_toolchain::api::RequestContext;
    /// use open_toolchain::auth::Authenticator;
    /// use reqwest::Client;
    ///
    /// # async fn example() -> open_toolchain::Result<()> {
    /// let auth = Authenticator::bearer("token")?;
    /// let request = Client::new().get("https://cloud.ibm.com/devops/toolchains");
    /// let request = auth.authenticate(&RequestContext::background(), request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> Result<RequestBuilder> {
        match self {
            Self::NoAuth => Ok(request),
            Self::Basic(basic) => Ok(request.basic_auth(&basic.username, Some(&basic.password))),
            Self::BearerToken(bearer) => Ok(request.bearer_auth(&bearer.token)),
            Self::Iam(iam) => {
                let token = ctx.run(iam.access_token()).await?;
                Ok(request.bearer_auth(token))
            }
            Self::Container(container) => {
                let token = ctx.run(container.access_token()).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}
