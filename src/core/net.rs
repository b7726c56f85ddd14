// src/core/net.rs
// Blocking HTTP plumbing shared by the portal session and the Slack webhook.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use super::sanitize::excerpt;
use crate::config::consts::{HTTP_TIMEOUT, USER_AGENT};
use crate::error::TransportError;

/// Client with the house timeout. `cookies` keeps a per-client cookie jar,
/// which the portal login needs across its GET/POST/GET steps.
pub fn client(cookies: bool) -> Result<Client, TransportError> {
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .cookie_store(cookies)
        .build()?;
    Ok(client)
}

/// Anything other than 200 is an error; the body excerpt travels with it.
pub fn ensure_ok(resp: Response) -> Result<Response, TransportError> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().unwrap_or_default();
    Err(TransportError::Status {
        url,
        status: status.as_u16(),
        body: excerpt(&body, 200),
    })
}
