// src/notify.rs
use std::collections::HashMap;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::consts::SLACK_USERS_LIST_URL;
use crate::core::net::{client, ensure_ok};
use crate::error::TransportError;

/// Where formatted event lines go.
pub trait Notify {
    fn deliver(&mut self, message: &str) -> Result<(), TransportError>;
}

pub struct SlackWebhook {
    http: Client,
    url: String,
    blocks_workaround: bool,
}

impl SlackWebhook {
    pub fn new(url: &str, blocks_workaround: bool) -> Result<Self, TransportError> {
        Ok(Self { http: client(false)?, url: s!(url), blocks_workaround })
    }
}

impl Notify for SlackWebhook {
    fn deliver(&mut self, message: &str) -> Result<(), TransportError> {
        let body = payload(message, self.blocks_workaround)?;
        debug!("sending: {body}");
        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        ensure_ok(resp)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct TextObject<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    verbatim: bool,
}

#[derive(Serialize)]
struct Section<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextObject<'a>,
}

#[derive(Serialize)]
struct Blocks<'a> {
    blocks: [Section<'a>; 1],
}

/// Webhook body. `verbatim` keeps Slack from linkifying on its own; the
/// block form sidesteps mobile clients mangling `<@..` mentions.
pub fn payload(message: &str, blocks_workaround: bool) -> Result<String, TransportError> {
    let text = TextObject { text: message, kind: "mrkdwn", verbatim: true };
    let json = if blocks_workaround {
        serde_json::to_string(&Blocks { blocks: [Section { kind: "section", text }] })?
    } else {
        serde_json::to_string(&text)?
    };
    Ok(json)
}

#[derive(Deserialize)]
struct UsersList {
    members: Vec<Member>,
}

#[derive(Deserialize)]
struct Member {
    id: String,
    profile: Profile,
}

#[derive(Deserialize)]
struct Profile {
    #[serde(default)]
    display_name: String,
}

/// Lowercase display name → member id. Never fails: without a directory
/// names are just printed instead of mentioned.
pub fn fetch_user_directory(bearer: Option<&str>) -> HashMap<String, String> {
    let Some(bearer) = bearer else {
        warn!("no SLACK_API_BEARER token to get users.list");
        return HashMap::new();
    };
    match users_list(bearer) {
        Ok(users) => user_directory(users),
        Err(e) => {
            warn!("failed to get users.list: {e}");
            HashMap::new()
        }
    }
}

fn users_list(bearer: &str) -> Result<UsersList, TransportError> {
    let resp = client(false)?
        .get(SLACK_USERS_LIST_URL)
        .header(AUTHORIZATION, format!("Bearer {bearer}"))
        .send()?;
    Ok(ensure_ok(resp)?.json::<UsersList>()?)
}

fn user_directory(users: UsersList) -> HashMap<String, String> {
    users
        .members
        .into_iter()
        .map(|m| (m.profile.display_name.to_lowercase(), m.id))
        .collect()
}
