//
//  open-toolchain-sdk
//  auth/iam.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # IAM Token Exchange
//!
//! This module implements the two authenticators that trade a long-lived
//! credential for a short-lived bearer token at the IAM token endpoint:
//!
//! - [`IamAuthenticator`]: exchanges an API key
//!   (`grant_type=urn:ibm:params:oauth:grant-type:apikey`)
//! - [`ContainerAuthenticator`]: exchanges a compute-resource token read from
//!   a file mounted into the workload
//!   (`grant_type=urn:ibm:params:oauth:grant-type:cr-token`)
//!
//! Both post a form to `{url}/identity/token` and cache the result in a
//! [`TokenCache`](super::token) with a 20% safety margin.
//!
//! ## Example
//!
//! ```rust,no_run
//! use open_toolchain::auth::{Authenticator, IamAuthenticator};
//!
//! let iam = IamAuthenticator::builder("my-api-key")
//!     .url("https://iam.cloud.ibm.com")
//!     .build()?;
//! let authenticator = Authenticator::Iam(iam);
//! # Ok::<(), open_toolchain::SdkError>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use reqwest::header::ACCEPT;
use reqwest::Client;

use super::token::{IamToken, TokenCache, TokenResponseRaw};
use crate::api::client::{format_api_error, has_bad_first_or_last_char, normalize_service_url};
use crate::api::common::{Result, SdkError};

/// Default IAM token service.
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

/// Compute-resource token file mounted by default.
pub const DEFAULT_CR_TOKEN_FILENAME: &str = "/var/run/secrets/tokens/vault-token";

/// Fallback compute-resource token file.
pub const FALLBACK_CR_TOKEN_FILENAME: &str = "/var/run/secrets/tokens/sa-token";

const IAM_TOKEN_PATH: &str = "/identity/token";
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const CR_TOKEN_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:cr-token";

/// Token endpoint settings shared by both IAM authenticators.
struct TokenService {
    url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    disable_ssl: bool,
    http: Client,
    cache: TokenCache,
}

impl TokenService {
    fn new(
        url: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        scope: Option<String>,
        disable_ssl: bool,
    ) -> Result<Self> {
        let url = match url.filter(|u| !u.trim().is_empty()) {
            Some(u) => normalize_service_url(&u)?,
            None => DEFAULT_IAM_URL.to_string(),
        };
        let url = url
            .trim_end_matches(IAM_TOKEN_PATH)
            .trim_end_matches('/')
            .to_string();

        let client_id = client_id.filter(|s| !s.is_empty());
        let client_secret = client_secret.filter(|s| !s.is_empty());
        if client_id.is_some() != client_secret.is_some() {
            return Err(SdkError::Config(
                "client_id and client_secret must both be provided or both be omitted".into(),
            ));
        }

        let http = Client::builder()
            .user_agent(format!("open-toolchain-sdk/{}", crate::VERSION))
            .danger_accept_invalid_certs(disable_ssl)
            .build()
            .map_err(SdkError::Transport)?;

        Ok(Self {
            url,
            client_id,
            client_secret,
            scope: scope.filter(|s| !s.is_empty()),
            disable_ssl,
            http,
            cache: TokenCache::new(),
        })
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.url, IAM_TOKEN_PATH)
    }

    /// Posts the token form and parses the response.
    async fn request_token(&self, mut params: Vec<(&'static str, String)>) -> Result<IamToken> {
        params.push(("response_type", "cloud_iam".to_string()));
        if let Some(scope) = &self.scope {
            params.push(("scope", scope.clone()));
        }

        let mut request = self
            .http
            .post(self.token_url())
            .header(ACCEPT, "application/json")
            .form(&params);
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SdkError::Authentication(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::Authentication(format!("token response unreadable: {e}")))?;

        if !status.is_success() {
            let (message, _) = format_api_error(status, &body);
            return Err(SdkError::Authentication(format!(
                "token exchange failed ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let raw: TokenResponseRaw = serde_json::from_str(&body)
            .map_err(|e| SdkError::Authentication(format!("failed to parse token response: {e}")))?;

        Ok(IamToken::from_raw(raw, chrono::Utc::now().timestamp()))
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("disable_ssl", &self.disable_ssl)
            .finish_non_exhaustive()
    }
}

/// Authenticator that exchanges an API key for IAM bearer tokens.
pub struct IamAuthenticator {
    apikey: String,
    service: TokenService,
}

impl IamAuthenticator {
    /// Starts building an authenticator for `apikey`.
    pub fn builder(apikey: impl Into<String>) -> IamAuthenticatorBuilder {
        IamAuthenticatorBuilder {
            apikey: apikey.into(),
            ..Default::default()
        }
    }

    /// Shorthand for `builder(apikey).build()`.
    pub fn new(apikey: impl Into<String>) -> Result<Self> {
        Self::builder(apikey).build()
    }

    /// The token service base URL.
    pub fn url(&self) -> &str {
        &self.service.url
    }

    /// Returns a valid access token, refreshing it when due.
    pub async fn access_token(&self) -> Result<String> {
        self.service
            .cache
            .access_token(|| {
                self.service.request_token(vec![
                    ("grant_type", APIKEY_GRANT_TYPE.to_string()),
                    ("apikey", self.apikey.clone()),
                ])
            })
            .await
    }

    /// Forgets the cached token.
    pub async fn invalidate(&self) {
        self.service.cache.invalidate().await;
    }
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("apikey", &"[redacted]")
            .field("service", &self.service)
            .finish()
    }
}

/// Builder for [`IamAuthenticator`].
#[derive(Default)]
pub struct IamAuthenticatorBuilder {
    apikey: String,
    url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    disable_ssl: bool,
}

impl IamAuthenticatorBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret;
        self
    }

    pub fn scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn disable_ssl_verification(mut self, disable: bool) -> Self {
        self.disable_ssl = disable;
        self
    }

    /// Validates the settings and builds the authenticator.
    ///
    /// # Errors
    ///
    /// - the API key is empty or wrapped in braces/quotes
    /// - only one of client id and client secret is set
    /// - the token URL is not a valid absolute URL
    pub fn build(self) -> Result<IamAuthenticator> {
        if self.apikey.trim().is_empty() {
            return Err(SdkError::Config("IAM authentication requires an apikey".into()));
        }
        if has_bad_first_or_last_char(&self.apikey) {
            return Err(SdkError::Config(
                "the apikey must not start or end with braces or quotes".into(),
            ));
        }

        Ok(IamAuthenticator {
            apikey: self.apikey,
            service: TokenService::new(
                self.url,
                self.client_id,
                self.client_secret,
                self.scope,
                self.disable_ssl,
            )?,
        })
    }
}

impl fmt::Debug for IamAuthenticatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticatorBuilder")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Authenticator for workloads running with a trusted profile.
///
/// The compute-resource token is re-read from disk on every refresh since the
/// platform rotates it.
#[derive(Debug)]
pub struct ContainerAuthenticator {
    cr_token_filename: Option<PathBuf>,
    iam_profile_name: Option<String>,
    iam_profile_id: Option<String>,
    service: TokenService,
}

impl ContainerAuthenticator {
    pub fn builder() -> ContainerAuthenticatorBuilder {
        ContainerAuthenticatorBuilder::default()
    }

    pub fn url(&self) -> &str {
        &self.service.url
    }

    /// Returns a valid access token, refreshing it when due.
    pub async fn access_token(&self) -> Result<String> {
        self.service
            .cache
            .access_token(|| async {
                let cr_token = self.read_cr_token().await?;
                let mut params = vec![
                    ("grant_type", CR_TOKEN_GRANT_TYPE.to_string()),
                    ("cr_token", cr_token),
                ];
                if let Some(name) = &self.iam_profile_name {
                    params.push(("profile_name", name.clone()));
                }
                if let Some(id) = &self.iam_profile_id {
                    params.push(("profile_id", id.clone()));
                }
                self.service.request_token(params).await
            })
            .await
    }

    /// Forgets the cached token.
    pub async fn invalidate(&self) {
        self.service.cache.invalidate().await;
    }

    async fn read_cr_token(&self) -> Result<String> {
        let candidates: Vec<PathBuf> = match &self.cr_token_filename {
            Some(path) => vec![path.clone()],
            None => vec![
                PathBuf::from(DEFAULT_CR_TOKEN_FILENAME),
                PathBuf::from(FALLBACK_CR_TOKEN_FILENAME),
            ],
        };

        let mut last_error = None;
        for path in &candidates {
            match tokio::fs::read_to_string(path).await {
                Ok(contents) if !contents.trim().is_empty() => return Ok(contents.trim().to_string()),
                Ok(_) => last_error = Some(format!("{} is empty", path.display())),
                Err(e) => last_error = Some(format!("{}: {e}", path.display())),
            }
        }

        Err(SdkError::Authentication(format!(
            "unable to read compute resource token: {}",
            last_error.unwrap_or_default()
        )))
    }
}

/// Builder for [`ContainerAuthenticator`].
#[derive(Default)]
pub struct ContainerAuthenticatorBuilder {
    cr_token_filename: Option<String>,
    iam_profile_name: Option<String>,
    iam_profile_id: Option<String>,
    url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    disable_ssl: bool,
}

impl ContainerAuthenticatorBuilder {
    pub fn cr_token_filename(mut self, filename: Option<String>) -> Self {
        self.cr_token_filename = filename;
        self
    }

    pub fn iam_profile_name(mut self, name: Option<String>) -> Self {
        self.iam_profile_name = name;
        self
    }

    pub fn iam_profile_id(mut self, id: Option<String>) -> Self {
        self.iam_profile_id = id;
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn client_secret(mut self, client_secret: Option<String>) -> Self {
        self.client_secret = client_secret;
        self
    }

    pub fn scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn disable_ssl_verification(mut self, disable: bool) -> Self {
        self.disable_ssl = disable;
        self
    }

    /// Validates the settings and builds the authenticator.
    ///
    /// # Errors
    ///
    /// - neither an IAM profile name nor an id is set
    /// - only one of client id and client secret is set
    pub fn build(self) -> Result<ContainerAuthenticator> {
        let name = self.iam_profile_name.filter(|s| !s.trim().is_empty());
        let id = self.iam_profile_id.filter(|s| !s.trim().is_empty());
        if name.is_none() && id.is_none() {
            return Err(SdkError::Config(
                "container authentication requires an IAM profile name or id".into(),
            ));
        }

        Ok(ContainerAuthenticator {
            cr_token_filename: self
                .cr_token_filename
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            iam_profile_name: name,
            iam_profile_id: id,
            service: TokenService::new(
                self.url,
                self.client_id,
                self.client_secret,
                self.scope,
                self.disable_ssl,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iam_requires_apikey() {
        assert!(IamAuthenticator::new("").is_err());
        assert!(IamAuthenticator::new("{apikey}").is_err());
        assert!(IamAuthenticator::new("valid-key").is_ok());
    }

    #[test]
    fn test_iam_client_credentials_pair() {
        let err = IamAuthenticator::builder("key")
            .client_id(Some("id".into()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("client_secret"));

        assert!(IamAuthenticator::builder("key")
            .client_id(Some("id".into()))
            .client_secret(Some("secret".into()))
            .build()
            .is_ok());
    }

    #[test]
    fn test_iam_url_normalization() {
        let iam = IamAuthenticator::builder("key")
            .url("https://iam.test.cloud.ibm.com/identity/token")
            .build()
            .unwrap();
        assert_eq!(iam.url(), "https://iam.test.cloud.ibm.com");
        assert_eq!(IamAuthenticator::new("key").unwrap().url(), DEFAULT_IAM_URL);
    }

    #[test]
    fn test_container_requires_profile() {
        assert!(ContainerAuthenticator::builder().build().is_err());
        assert!(ContainerAuthenticator::builder()
            .iam_profile_name(Some("profile".into()))
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn test_container_reads_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cr-token");
        std::fs::write(&path, "  cr-token-value\n").unwrap();

        let auth = ContainerAuthenticator::builder()
            .cr_token_filename(Some(path.display().to_string()))
            .iam_profile_id(Some("iam-id".into()))
            .build()
            .unwrap();
        assert_eq!(auth.read_cr_token().await.unwrap(), "cr-token-value");
    }

    #[tokio::test]
    async fn test_container_missing_token_file() {
        let auth = ContainerAuthenticator::builder()
            .cr_token_filename(Some("/nonexistent/cr-token".into()))
            .iam_profile_id(Some("iam-id".into()))
            .build()
            .unwrap();
        let err = auth.read_cr_token().await.unwrap_err();
        assert!(err.to_string().contains("compute resource token"));
    }
}
