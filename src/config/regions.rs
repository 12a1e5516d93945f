//
//  open-toolchain-sdk
//  config/regions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Regional endpoints of the Open Toolchain API.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::api::common::{Result, SdkError};

static REGION_URLS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("us-south", "https://devops-api.us-south.devops.cloud.ibm.com"),
        ("us-east", "https://devops-api.us-east.devops.cloud.ibm.com"),
        ("eu-de", "https://devops-api.eu-de.devops.cloud.ibm.com"),
        ("eu-gb", "https://devops-api.eu-gb.devops.cloud.ibm.com"),
        ("jp-tok", "https://devops-api.jp-tok.devops.cloud.ibm.com"),
        ("jp-osa", "https://devops-api.jp-osa.devops.cloud.ibm.com"),
        ("au-syd", "https://devops-api.au-syd.devops.cloud.ibm.com"),
        ("ca-tor", "https://devops-api.ca-tor.devops.cloud.ibm.com"),
        ("br-sao", "https://devops-api.br-sao.devops.cloud.ibm.com"),
    ])
});

/// Returns the base URL of the service in `region`.
///
/// # Errors
///
/// Returns [`SdkError::RegionNotFound`] for regions without an endpoint.
///
/// # Example
///
/// ```rust
/// use open_toolchain::config::get_service_url_for_region;
///
/// let url = get_service_url_for_region("eu-de")?;
/// assert_eq!(url, "https://devops-api.eu-de.devops.cloud.ibm.com");
///
/// assert!(get_service_url_for_region("INVALID_REGION").is_err());
/// # Ok::<(), open_toolchain::SdkError>(())
/// ```
pub fn get_service_url_for_region(region: &str) -> Result<String> {
    REGION_URLS
        .get(region)
        .map(|url| (*url).to_string())
        .ok_or_else(|| SdkError::RegionNotFound(region.to_string()))
}

/// All known region identifiers, sorted.
pub fn regions() -> impl Iterator<Item = &'static str> {
    REGION_URLS.keys().copied()
}
