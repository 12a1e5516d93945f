//
//  open-toolchain-sdk
//  tests/service_instances.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

mod common;

use anyhow::Result;
use mockito::{Matcher, Server};
use open_toolchain::{
    CreateServiceInstanceOptions, DeleteServiceInstanceOptions, ErrorKind,
    GetServiceInstanceOptions, PatchServiceInstanceOptions, ServiceInstanceParameters,
};
use serde_json::json;

use common::{custom_headers, service, ENV_ID};

#[tokio::test]
async fn test_create_service_instance() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/devops/service_instances")
        .match_query(Matcher::UrlEncoded("env_id".into(), ENV_ID.into()))
        .match_header("x-custom-header", "x-custom-value")
        .match_body(Matcher::Json(json!({
            "toolchainId": "testString",
            "serviceId": "testString",
            "parameters": {
                "name": "testString",
                "type": "new",
                "repo_url": "https://github.com/o/r",
                "private_repo": false,
                "has_issues": true
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "Status"}"#)
        .create_async()
        .await;

    let service = service(&server.url());
    let parameters = ServiceInstanceParameters {
        name: Some("testString".into()),
        instance_type: Some("new".into()),
        repo_url: Some("https://github.com/o/r".into()),
        private_repo: Some(false),
        has_issues: Some(true),
        ..Default::default()
    };
    let options = CreateServiceInstanceOptions::new(ENV_ID)
        .toolchain_id("testString")
        .service_id("testString")
        .parameters(parameters)
        .headers(custom_headers());
    let response = service.create_service_instance(&options).await?;

    mock.assert_async().await;
    assert_eq!(response.result.unwrap().status.as_deref(), Some("Status"));
    Ok(())
}

#[tokio::test]
async fn test_create_service_instance_requires_env_id() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = service(&server.url());
    let err = service
        .create_service_instance(&CreateServiceInstanceOptions::default())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.kind(), ErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn test_get_service_instance_wrapped() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/devops/service_instances/testString")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("env_id".into(), ENV_ID.into()),
            Matcher::UrlEncoded("toolchainId".into(), "toolchain".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"serviceInstance": {
                "instance_id": "InstanceID",
                "dashboard_url": "DashboardURL",
                "service_id": "ServiceID",
                "toolchain_id": "toolchain",
                "parameters": {"anyKey": "anyValue"}
            }}"#,
        )
        .create_async()
        .await;

    let service = service(&server.url());
    let response = service
        .get_service_instance(&GetServiceInstanceOptions::new("testString", ENV_ID, "toolchain"))
        .await?;

    mock.assert_async().await;
    let instance = response.result.unwrap().service_instance.unwrap();
    assert_eq!(instance.instance_id.as_deref(), Some("InstanceID"));
    assert_eq!(instance.parameters.unwrap()["anyKey"], json!("anyValue"));
    Ok(())
}

#[tokio::test]
async fn test_get_service_instance_bare() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/devops/service_instances/testString")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"{"instance_id": "InstanceID", "service_id": "github"}"#)
        .create_async()
        .await;

    let service = service(&server.url());
    let response = service
        .get_service_instance(&GetServiceInstanceOptions::new("testString", ENV_ID, "toolchain"))
        .await?;

    let instance = response.result.unwrap().service_instance.unwrap();
    assert_eq!(instance.service_id.as_deref(), Some("github"));
    Ok(())
}

#[tokio::test]
async fn test_get_service_instance_requires_toolchain_id() -> Result<()> {
    let service = service("https://opentoolchainv1/api");
    let err = service
        .get_service_instance(&GetServiceInstanceOptions {
            guid: Some("testString".into()),
            env_id: Some(ENV_ID.into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("toolchain_id"));
    Ok(())
}

#[tokio::test]
async fn test_patch_service_instance() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/devops/service_instances/testString")
        .match_query(Matcher::UrlEncoded("env_id".into(), ENV_ID.into()))
        .match_body(Matcher::Json(json!({
            "toolchainId": "toolchain",
            "serviceId": "slack",
            "parameters": {"channel_name": "#deploys"}
        })))
        .with_status(200)
        .create_async()
        .await;

    let service = service(&server.url());
    let options = PatchServiceInstanceOptions::new("testString", ENV_ID)
        .toolchain_id("toolchain")
        .service_id("slack")
        .parameters(ServiceInstanceParameters {
            channel_name: Some("#deploys".into()),
            ..Default::default()
        });
    let raw = service.patch_service_instance(&options).await?;

    mock.assert_async().await;
    assert_eq!(raw.status_code, 200);
    Ok(())
}

#[tokio::test]
async fn test_delete_service_instance() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/devops/service_instances/testString")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("env_id".into(), ENV_ID.into()),
            Matcher::UrlEncoded("toolchainId".into(), "toolchain".into()),
        ]))
        .with_status(204)
        .create_async()
        .await;

    let service = service(&server.url());
    let raw = service
        .delete_service_instance(
            &DeleteServiceInstanceOptions::new("testString", ENV_ID).toolchain_id("toolchain"),
        )
        .await?;

    mock.assert_async().await;
    assert_eq!(raw.status_code, 204);
    Ok(())
}
