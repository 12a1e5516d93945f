//
//  open-toolchain-sdk
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Credentials File I/O
//!
//! Reading and parsing of the `ibm-credentials.env` file that can carry
//! service properties alongside (and overriding) environment variables.
//!
//! ## File Location
//!
//! The first match wins:
//!
//! 1. the path named by `IBM_CREDENTIALS_FILE`
//! 2. `<home>/ibm-credentials.env`
//! 3. `./ibm-credentials.env`
//!
//! ## Format
//!
//! ```text
//! # comments and blank lines are ignored
//! export OPEN_TOOLCHAIN_URL=https://devops-api.us-south.devops.cloud.ibm.com
//! OPEN_TOOLCHAIN_AUTH_TYPE="iam"  # inline comment
//! OPEN_TOOLCHAIN_APIKEY='my-api-key'
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::api::common::{Result, SdkError};

/// Environment variable naming an explicit credentials file.
pub const CREDENTIALS_FILE_ENV: &str = "IBM_CREDENTIALS_FILE";

/// File name searched for in the home and working directories.
pub const DEFAULT_CREDENTIALS_FILE_NAME: &str = "ibm-credentials.env";

/// Locates the credentials file, if any.
///
/// An explicit `IBM_CREDENTIALS_FILE` is returned even when it does not exist
/// so the caller can report the problem; the implicit locations are only
/// returned when a file is present.
pub fn credentials_file_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CREDENTIALS_FILE_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }

    let home = BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_CREDENTIALS_FILE_NAME));
    let cwd = Some(PathBuf::from(DEFAULT_CREDENTIALS_FILE_NAME));

    [home, cwd].into_iter().flatten().find(|path| path.is_file())
}

/// Reads and parses a credentials file.
///
/// The file is read with `dotenvy`, so `export` prefixes, inline comments and
/// quoting follow the usual `.env` rules. The process environment is left
/// untouched.
///
/// # Errors
///
/// Returns [`SdkError::Config`] if the file cannot be read or a line does not
/// parse.
pub fn read_credentials_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .map_err(|e| credentials_error(path, e))?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(|e| credentials_error(path, e))?;
    debug!(path = %path.display(), entries = entries.len(), "Loaded credentials file");
    Ok(entries)
}

/// Parses credentials file content already held in memory.
///
/// ```rust
/// use open_toolchain::config::parse_credentials;
///
/// let map = parse_credentials("# comment\nA=1\nexport B=\"two\"\n")?;
/// assert_eq!(map.get("A").map(String::as_str), Some("1"));
/// assert_eq!(map.get("B").map(String::as_str), Some("two"));
/// # Ok::<(), open_toolchain::SdkError>(())
/// ```
///
/// # Errors
///
/// Returns [`SdkError::Config`] for a line that does not parse.
pub fn parse_credentials(content: &str) -> Result<HashMap<String, String>> {
    dotenvy::from_read_iter(content.as_bytes())
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(|e| SdkError::Config(format!("invalid credentials: {e}")))
}

fn credentials_error(path: &Path, err: dotenvy::Error) -> SdkError {
    SdkError::Config(format!(
        "unable to read credentials file {}: {err}",
        path.display()
    ))
}
