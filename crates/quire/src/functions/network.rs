//! Network helpers, available with the network capability.

use std::net::ToSocketAddrs;
use std::time::Duration;

use minijinja::{Error, Value};
use url::Url;

use super::{helper_error, invalid, FunctionRegistry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.add("httpGet", |url: String| fetch(&url));
    registry.add("httpGetJson", |url: String| -> Result<Value, Error> {
        let body = fetch(&url)?;
        let parsed: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| helper_error(format!("{} did not return JSON", url), e))?;
        Ok(Value::from_serialize(&parsed))
    });
    registry.add("lookupHost", lookup_host);
    registry
}

/// GETs `url` and returns the body. Non-2xx responses are errors.
fn fetch(url: &str) -> Result<String, Error> {
    let parsed = Url::parse(url).map_err(|e| helper_error(format!("invalid URL {:?}", url), e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported URL scheme {:?} in {}",
            parsed.scheme(),
            url
        )));
    }

    tracing::debug!(url, "fetching");
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| helper_error("failed to build HTTP client", e))?;

    let response = client
        .get(parsed)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| helper_error(format!("GET {} failed", url), e))?;
    response
        .text()
        .map_err(|e| helper_error(format!("cannot read body of {}", url), e))
}

fn lookup_host(host: String) -> Result<Vec<String>, Error> {
    let addrs = (host.as_str(), 0)
        .to_socket_addrs()
        .map_err(|e| helper_error(format!("cannot resolve {}", host), e))?;
    let mut ips: Vec<String> = addrs.map(|a| a.ip().to_string()).collect();
    ips.dedup();
    Ok(ips)
}
