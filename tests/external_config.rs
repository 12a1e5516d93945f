//
//  open-toolchain-sdk
//  tests/external_config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Environment variables are process-wide, so every scenario lives in one
//! test function and runs in sequence.

mod common;

use std::env;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use mockito::{Matcher, Server};
use open_toolchain::auth::{AuthType, Authenticator};
use open_toolchain::{DeleteToolchainOptions, ErrorKind, OpenToolchainV1, ServiceOptions};
use tempfile::NamedTempFile;

use common::{init_tracing, ENV_ID};

const VARS: [&str; 7] = [
    "OPEN_TOOLCHAIN_URL",
    "OPEN_TOOLCHAIN_AUTH_TYPE",
    "OPEN_TOOLCHAIN_BEARER_TOKEN",
    "OPEN_TOOLCHAIN_ENABLE_RETRIES",
    "OPEN_TOOLCHAIN_MAX_RETRIES",
    "OPEN_TOOLCHAIN_RETRY_INTERVAL",
    "IBM_CREDENTIALS_FILE",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[tokio::test]
async fn test_service_from_external_config() -> Result<()> {
    init_tracing();
    clear_env();

    // An empty credentials file keeps files in $HOME or the cwd out of the way.
    let empty = NamedTempFile::new()?;
    env::set_var("IBM_CREDENTIALS_FILE", empty.path());

    // Environment only.
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/devops/toolchains/testString")
        .match_query(Matcher::UrlEncoded("env_id".into(), ENV_ID.into()))
        .match_header("authorization", "Bearer from-env")
        .with_status(200)
        .create_async()
        .await;

    env::set_var("OPEN_TOOLCHAIN_URL", server.url());
    env::set_var("OPEN_TOOLCHAIN_AUTH_TYPE", "bearerToken");
    env::set_var("OPEN_TOOLCHAIN_BEARER_TOKEN", "from-env");
    env::set_var("OPEN_TOOLCHAIN_ENABLE_RETRIES", "true");
    env::set_var("OPEN_TOOLCHAIN_MAX_RETRIES", "2");
    env::set_var("OPEN_TOOLCHAIN_RETRY_INTERVAL", "5");

    let service = OpenToolchainV1::new_using_external_config(ServiceOptions::new())?;
    assert_eq!(service.service_url(), server.url());
    assert_eq!(service.authenticator().auth_type(), AuthType::BearerToken);
    let policy = service.retry_policy();
    assert!(policy.enabled);
    assert_eq!(policy.max_retries, 2);
    assert_eq!(policy.max_interval, Duration::from_secs(5));

    service
        .delete_toolchain(&DeleteToolchainOptions::new("testString", ENV_ID))
        .await?;
    mock.assert_async().await;

    // An explicit URL and authenticator win over the environment, even when
    // the configured URL is malformed.
    env::set_var("OPEN_TOOLCHAIN_URL", "{https://bad.example.com}");
    let err = OpenToolchainV1::new_using_external_config(ServiceOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let service = OpenToolchainV1::new_using_external_config(
        ServiceOptions::new()
            .url("https://override.example.com")
            .authenticator(Authenticator::no_auth()),
    )?;
    assert_eq!(service.service_url(), "https://override.example.com");
    assert_eq!(service.authenticator().auth_type(), AuthType::NoAuth);

    // Unknown authentication type.
    env::set_var("OPEN_TOOLCHAIN_AUTH_TYPE", "someOtherAuth");
    let err = OpenToolchainV1::new_using_external_config(ServiceOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("someOtherAuth"));

    // Credentials file values override the environment.
    env::set_var("OPEN_TOOLCHAIN_AUTH_TYPE", "noauth");
    let mut file = NamedTempFile::new()?;
    writeln!(file, "# generated for tests")?;
    writeln!(file, "OPEN_TOOLCHAIN_URL=https://from-file.example.com/")?;
    writeln!(file, "OPEN_TOOLCHAIN_AUTH_TYPE=basic")?;
    writeln!(file, "OPEN_TOOLCHAIN_USERNAME=user")?;
    writeln!(file, "OPEN_TOOLCHAIN_PASSWORD=\"pass word\"")?;
    writeln!(file, "OTHER_SERVICE_URL=https://ignored.example.com")?;
    env::set_var("IBM_CREDENTIALS_FILE", file.path());

    let service = OpenToolchainV1::new_using_external_config(ServiceOptions::new())?;
    assert_eq!(service.service_url(), "https://from-file.example.com");
    assert_eq!(service.authenticator().auth_type(), AuthType::Basic);

    // A custom service name reads its own prefix.
    env::set_var("MY_TOOLCHAINS_URL", "https://named.example.com");
    env::set_var("MY_TOOLCHAINS_AUTH_TYPE", "noauth");
    let service = OpenToolchainV1::new_using_external_config(
        ServiceOptions::new().service_name("my-toolchains"),
    )?;
    assert_eq!(service.service_url(), "https://named.example.com");
    env::remove_var("MY_TOOLCHAINS_URL");
    env::remove_var("MY_TOOLCHAINS_AUTH_TYPE");

    clear_env();
    Ok(())
}
