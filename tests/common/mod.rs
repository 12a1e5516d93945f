//
//  open-toolchain-sdk
//  tests/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

#![allow(dead_code)]

use std::collections::HashMap;

use open_toolchain::auth::Authenticator;
use open_toolchain::{OpenToolchainV1, ServiceOptions};

pub const ENV_ID: &str = "ibm:yp:us-south";

pub const TOOLCHAIN_JSON: &str = r#"{
    "toolchain_guid": "ToolchainGUID",
    "name": "Name",
    "description": "Description",
    "key": "Key",
    "container": {"guid": "GUID", "type": "organization"},
    "crn": "CRN",
    "created": "2019-01-01T12:00:00.000Z",
    "updated_at": "2019-01-01T12:00:00.000Z",
    "creator": "Creator",
    "generator": "Generator",
    "template": {
        "getting_started": "GettingStarted",
        "services_total": 13,
        "name": "Name",
        "type": "Type",
        "url": "URL",
        "source": "Source",
        "locale": "Locale"
    },
    "tags": ["Tags"],
    "lifecycle_messaging_webhook_id": "LifecycleMessagingWebhookID",
    "region_id": "RegionID",
    "services": [{
        "broker_id": "BrokerID",
        "service_id": "ServiceID",
        "container": {"guid": "GUID", "type": "organization"},
        "updated_at": "2019-01-01T12:00:00.000Z",
        "parameters": {"anyKey": "anyValue"},
        "status": {"state": "configuring"},
        "dashboard_url": "DashboardURL",
        "region_id": "RegionID",
        "instance_id": "InstanceID",
        "description": "Description",
        "tags": ["Tags"],
        "url": "URL",
        "toolchain_binding": {
            "status": {"state": "configuring"},
            "name": "Name",
            "webhook_id": "WebhookID"
        }
    }]
}"#;

/// Routes SDK logs to the test output; `RUST_LOG=open_toolchain=debug` shows requests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A service without authentication pointed at `url`.
pub fn service(url: &str) -> OpenToolchainV1 {
    init_tracing();
    OpenToolchainV1::new(
        ServiceOptions::new()
            .url(url)
            .authenticator(Authenticator::no_auth()),
    )
    .expect("service should build")
}

pub fn custom_headers() -> HashMap<String, String> {
    HashMap::from([("x-custom-header".to_string(), "x-custom-value".to_string())])
}
