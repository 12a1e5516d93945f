//
//  open-toolchain-sdk
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module resolves the external configuration of a service: its URL, the
//! authenticator to use, and its retry and TLS settings.
//!
//! ## Overview
//!
//! Properties are keyed by a prefix derived from the service name. For the
//! default `open_toolchain` service the prefix is `OPEN_TOOLCHAIN_`:
//!
//! | Property | Meaning |
//! |----------|---------|
//! | `URL` | Base service URL |
//! | `AUTH_TYPE` | `noauth`, `basic`, `bearertoken`, `iam` or `container` |
//! | `APIKEY` | IAM API key |
//! | `USERNAME` / `PASSWORD` | Basic credentials |
//! | `BEARER_TOKEN` | Static bearer token |
//! | `AUTH_URL` | IAM token service URL |
//! | `CLIENT_ID` / `CLIENT_SECRET` / `SCOPE` | Optional IAM client settings |
//! | `CR_TOKEN_FILENAME` / `IAM_PROFILE_NAME` / `IAM_PROFILE_ID` | Container auth |
//! | `DISABLE_SSL` / `AUTH_DISABLE_SSL` | Skip certificate verification |
//! | `ENABLE_RETRIES` / `MAX_RETRIES` / `RETRY_INTERVAL` | Retry policy (seconds) |
//!
//! ## Precedence
//!
//! Values from the credentials file (see [`file`]) override environment
//! variables of the same name. Explicit service options override both.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use open_toolchain::config::{authenticator_from_properties, get_service_properties};
//!
//! let props = get_service_properties("open_toolchain")?;
//! let authenticator = authenticator_from_properties(&props)?;
//! println!("auth: {}", authenticator.auth_type());
//! # Ok::<(), open_toolchain::SdkError>(())
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: credentials file discovery and parsing
//! - [`regions`]: regional endpoint table

mod file;
mod regions;

pub use file::*;
pub use regions::*;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::api::common::{Result, SdkError};
use crate::auth::{AuthType, Authenticator, ContainerAuthenticator, IamAuthenticator};

pub const PROPNAME_SVC_URL: &str = "URL";
pub const PROPNAME_AUTH_TYPE: &str = "AUTH_TYPE";
pub const PROPNAME_APIKEY: &str = "APIKEY";
pub const PROPNAME_USERNAME: &str = "USERNAME";
pub const PROPNAME_PASSWORD: &str = "PASSWORD";
pub const PROPNAME_BEARER_TOKEN: &str = "BEARER_TOKEN";
pub const PROPNAME_AUTH_URL: &str = "AUTH_URL";
pub const PROPNAME_CLIENT_ID: &str = "CLIENT_ID";
pub const PROPNAME_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const PROPNAME_SCOPE: &str = "SCOPE";
pub const PROPNAME_CR_TOKEN_FILENAME: &str = "CR_TOKEN_FILENAME";
pub const PROPNAME_IAM_PROFILE_NAME: &str = "IAM_PROFILE_NAME";
pub const PROPNAME_IAM_PROFILE_ID: &str = "IAM_PROFILE_ID";
pub const PROPNAME_SVC_DISABLE_SSL: &str = "DISABLE_SSL";
pub const PROPNAME_AUTH_DISABLE_SSL: &str = "AUTH_DISABLE_SSL";
pub const PROPNAME_SVC_ENABLE_RETRIES: &str = "ENABLE_RETRIES";
pub const PROPNAME_SVC_MAX_RETRIES: &str = "MAX_RETRIES";
pub const PROPNAME_SVC_RETRY_INTERVAL: &str = "RETRY_INTERVAL";

const SECRET_PROPERTIES: [&str; 4] = [
    PROPNAME_APIKEY,
    PROPNAME_PASSWORD,
    PROPNAME_BEARER_TOKEN,
    PROPNAME_CLIENT_SECRET,
];

/// Returns the property prefix for a service name.
///
/// ```rust
/// use open_toolchain::config::env_prefix;
///
/// assert_eq!(env_prefix("open_toolchain"), "OPEN_TOOLCHAIN_");
/// assert_eq!(env_prefix("open-toolchain"), "OPEN_TOOLCHAIN_");
/// ```
pub fn env_prefix(service_name: &str) -> String {
    format!("{}_", service_name.to_ascii_uppercase().replace('-', "_"))
}

/// Resolved properties for one service, keyed without the prefix.
///
/// Keys are upper-case property names such as `URL` or `AUTH_TYPE`. Empty
/// values are treated as absent.
#[derive(Clone, Default, PartialEq)]
pub struct ServiceProperties {
    values: HashMap<String, String>,
}

impl ServiceProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds properties from environment-style pairs and a credentials file.
    ///
    /// Only keys starting with the service prefix are kept. File entries are
    /// applied after the environment, so they win.
    pub fn from_sources<I>(service_name: &str, env: I, file: &HashMap<String, String>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = env_prefix(service_name);
        let mut values = HashMap::new();

        let file_entries = file.iter().map(|(k, v)| (k.clone(), v.clone()));
        for (key, value) in env.into_iter().chain(file_entries) {
            if let Some(name) = key.strip_prefix(&prefix) {
                if !name.is_empty() {
                    values.insert(name.to_string(), value);
                }
            }
        }

        Self { values }
    }

    /// Sets a property, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// A non-empty property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn get_owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the property is set to `true` (case-insensitive).
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Parses an unsigned integer property.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] when the value is present but not a number.
    pub fn parse_u32(&self, key: &str) -> Result<Option<u32>> {
        self.get(key)
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    SdkError::Config(format!("property {key} must be a non-negative integer, got '{v}'"))
                })
            })
            .transpose()
    }

    /// Parses a property given in whole seconds.
    pub fn parse_seconds(&self, key: &str) -> Result<Option<Duration>> {
        Ok(self.parse_u32(key)?.map(|secs| Duration::from_secs(u64::from(secs))))
    }

    /// The configured service URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.get(PROPNAME_SVC_URL)
    }

    /// The configured authentication kind; IAM when unset.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::UnknownAuthType`] for unrecognized values.
    pub fn auth_type(&self) -> Result<AuthType> {
        match self.get(PROPNAME_AUTH_TYPE) {
            Some(value) => value.parse(),
            None => Ok(AuthType::Iam),
        }
    }
}

impl fmt::Debug for ServiceProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        for key in keys {
            if SECRET_PROPERTIES.contains(&key.as_str()) {
                map.entry(key, &"[redacted]");
            } else {
                map.entry(key, &self.values[key]);
            }
        }
        map.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServiceProperties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Loads the properties of `service_name` from the process environment and the
/// credentials file.
///
/// # Errors
///
/// Returns [`SdkError::Config`] when an explicitly named credentials file
/// cannot be read.
pub fn get_service_properties(service_name: &str) -> Result<ServiceProperties> {
    let file = match credentials_file_path() {
        Some(path) => read_credentials_file(&path)?,
        None => HashMap::new(),
    };
    Ok(ServiceProperties::from_sources(
        service_name,
        std::env::vars(),
        &file,
    ))
}

/// Builds the authenticator described by `props`.
///
/// Missing credentials are reported by the chosen variant's own validation.
///
/// # Example
///
/// ```rust
/// use open_toolchain::auth::AuthType;
/// use open_toolchain::config::{authenticator_from_properties, ServiceProperties};
///
/// let props: ServiceProperties = [("AUTH_TYPE", "basic"), ("USERNAME", "u"), ("PASSWORD", "p")]
///     .into_iter()
///     .collect();
/// let auth = authenticator_from_properties(&props)?;
/// assert_eq!(auth.auth_type(), AuthType::Basic);
/// # Ok::<(), open_toolchain::SdkError>(())
/// ```
pub fn authenticator_from_properties(props: &ServiceProperties) -> Result<Authenticator> {
    let auth_disable_ssl = props.flag(PROPNAME_AUTH_DISABLE_SSL);

    match props.auth_type()? {
        AuthType::NoAuth => Ok(Authenticator::no_auth()),
        AuthType::Basic => Authenticator::basic(
            props.get(PROPNAME_USERNAME).unwrap_or_default(),
            props.get(PROPNAME_PASSWORD).unwrap_or_default(),
        ),
        AuthType::BearerToken => {
            Authenticator::bearer(props.get(PROPNAME_BEARER_TOKEN).unwrap_or_default())
        }
        AuthType::Iam => {
            let mut builder = IamAuthenticator::builder(props.get(PROPNAME_APIKEY).unwrap_or_default())
                .client_id(props.get_owned(PROPNAME_CLIENT_ID))
                .client_secret(props.get_owned(PROPNAME_CLIENT_SECRET))
                .scope(props.get_owned(PROPNAME_SCOPE))
                .disable_ssl_verification(auth_disable_ssl);
            if let Some(url) = props.get(PROPNAME_AUTH_URL) {
                builder = builder.url(url);
            }
            Ok(Authenticator::Iam(builder.build()?))
        }
        AuthType::Container => {
            let container = ContainerAuthenticator::builder()
                .cr_token_filename(props.get_owned(PROPNAME_CR_TOKEN_FILENAME))
                .iam_profile_name(props.get_owned(PROPNAME_IAM_PROFILE_NAME))
                .iam_profile_id(props.get_owned(PROPNAME_IAM_PROFILE_ID))
                .url(props.get_owned(PROPNAME_AUTH_URL))
                .client_id(props.get_owned(PROPNAME_CLIENT_ID))
                .client_secret(props.get_owned(PROPNAME_CLIENT_SECRET))
                .scope(props.get_owned(PROPNAME_SCOPE))
                .disable_ssl_verification(auth_disable_ssl)
                .build()?;
            Ok(Authenticator::Container(container))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ErrorKind;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_filtering() {
        let props = ServiceProperties::from_sources(
            "open_toolchain",
            env(&[
                ("OPEN_TOOLCHAIN_URL", "https://example.com"),
                ("OTHER_SERVICE_URL", "https://other.com"),
                ("PATH", "/usr/bin"),
            ]),
            &HashMap::new(),
        );
        assert_eq!(props.len(), 1);
        assert_eq!(props.url(), Some("https://example.com"));
    }

    #[test]
    fn test_file_overrides_environment() {
        let file = HashMap::from([(
            "OPEN_TOOLCHAIN_AUTH_TYPE".to_string(),
            "bearerToken".to_string(),
        )]);
        let props = ServiceProperties::from_sources(
            "open_toolchain",
            env(&[
                ("OPEN_TOOLCHAIN_AUTH_TYPE", "noauth"),
                ("OPEN_TOOLCHAIN_BEARER_TOKEN", "tok"),
            ]),
            &file,
        );
        assert_eq!(props.auth_type().unwrap(), AuthType::BearerToken);
        assert_eq!(props.get(PROPNAME_BEARER_TOKEN), Some("tok"));
    }

    #[test]
    fn test_auth_type_defaults_to_iam() {
        let props = ServiceProperties::new();
        assert_eq!(props.auth_type().unwrap(), AuthType::Iam);

        let err = authenticator_from_properties(&props).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("apikey"));
    }

    #[test]
    fn test_unknown_auth_type() {
        let props: ServiceProperties = [("AUTH_TYPE", "someOtherAuth")].into_iter().collect();
        let err = authenticator_from_properties(&props).unwrap_err();
        assert!(err.to_string().contains("unrecognized authentication kind"));
    }

    #[test]
    fn test_numeric_and_flag_properties() {
        let props: ServiceProperties = [
            ("ENABLE_RETRIES", "TRUE"),
            ("MAX_RETRIES", "5"),
            ("RETRY_INTERVAL", "12"),
            ("DISABLE_SSL", "no"),
        ]
        .into_iter()
        .collect();
        assert!(props.flag(PROPNAME_SVC_ENABLE_RETRIES));
        assert!(!props.flag(PROPNAME_SVC_DISABLE_SSL));
        assert_eq!(props.parse_u32(PROPNAME_SVC_MAX_RETRIES).unwrap(), Some(5));
        assert_eq!(
            props.parse_seconds(PROPNAME_SVC_RETRY_INTERVAL).unwrap(),
            Some(Duration::from_secs(12))
        );

        let bad: ServiceProperties = [("MAX_RETRIES", "many")].into_iter().collect();
        assert!(bad.parse_u32(PROPNAME_SVC_MAX_RETRIES).is_err());
    }

    #[test]
    fn test_authenticators_from_properties() {
        let noauth: ServiceProperties = [("AUTH_TYPE", "NOAUTH")].into_iter().collect();
        assert_eq!(
            authenticator_from_properties(&noauth).unwrap().auth_type(),
            AuthType::NoAuth
        );

        let iam: ServiceProperties = [
            ("AUTH_TYPE", "iam"),
            ("APIKEY", "my-key"),
            ("AUTH_URL", "https://iam.test.cloud.ibm.com"),
        ]
        .into_iter()
        .collect();
        match authenticator_from_properties(&iam).unwrap() {
            Authenticator::Iam(auth) => assert_eq!(auth.url(), "https://iam.test.cloud.ibm.com"),
            other => panic!("unexpected authenticator: {other:?}"),
        }

        let container: ServiceProperties = [
            ("AUTH_TYPE", "container"),
            ("IAM_PROFILE_NAME", "profile"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            authenticator_from_properties(&container).unwrap().auth_type(),
            AuthType::Container
        );

        let basic: ServiceProperties = [("AUTH_TYPE", "basic")].into_iter().collect();
        assert!(authenticator_from_properties(&basic).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let props: ServiceProperties = [("APIKEY", "super-secret"), ("URL", "https://x.com")]
            .into_iter()
            .collect();
        let rendered = format!("{props:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("https://x.com"));
    }
}
