//! Access token lookup
//!
//! Tokens are minted outside fbctl (e.g. `gcloud auth print-access-token`);
//! this module only finds one.

use crate::error::{Error, Result};
use std::env;

/// Environment variables checked for an access token, in order
const TOKEN_ENV_VARS: &[&str] = &["FBCTL_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];

/// Resolve an access token from an explicit flag or the environment
pub fn resolve_access_token(flag: Option<&str>) -> Option<String> {
    flag.map(str::to_string).or_else(|| {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|v| !v.trim().is_empty()))
    })
}

/// Fail unless an access token is available
pub fn require_auth(token: Option<&str>) -> Result<&str> {
    token.ok_or(Error::NotAuthenticated)
}
