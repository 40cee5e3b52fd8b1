//! Backend URL construction
//!
//! Endpoints are derived from a single base URL so that deployments only
//! configure one value.

use anyhow::{Context, Result, anyhow};
use url::Url;

use super::constants::{FUNCTIONS_PATH, REST_PATH};

/// Parse and validate a backend base URL.
///
/// Only `http` and `https` are accepted. A trailing slash is added so that
/// relative joins keep any path prefix the deployment uses.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("Invalid backend URL '{raw}'"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Unsupported backend URL scheme '{other}' in '{raw}'")),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// URL of a table on the REST API, e.g. `{base}/rest/v1/stores`
pub fn table_url(base: &Url, table: &str) -> Result<Url> {
    base.join(&format!("{REST_PATH}/{table}"))
        .with_context(|| format!("Failed to build table URL for '{table}'"))
}

/// URL of a server-side function, e.g. `{base}/functions/v1/search`
pub fn function_url(base: &Url, function: &str) -> Result<Url> {
    base.join(&format!("{FUNCTIONS_PATH}/{function}"))
        .with_context(|| format!("Failed to build function URL for '{function}'"))
}
