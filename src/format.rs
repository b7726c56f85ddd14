// src/format.rs
//
// One chat line per event:
//   2023-03-14 08:27:42: ALARM_OFF (G14/S0): by <@U0H87MYTC>

use std::collections::{HashMap, HashSet};

use crate::config::consts::CHANNEL_ALERT;
use crate::events::{EventKind, EventRecord};

const ARMED_BY: &str = "VOLL. ING ";
const DISARMED_BY: &str = "UITGESCH. ";
const SELF_TEST_DETAIL: &str = "AUTOTEST (Test)";

/// Who gets pinged when their name shows up as the actor of an event.
/// Keys are lowercase names.
#[derive(Clone, Debug, Default)]
pub struct Mentions {
    user_ids: HashMap<String, String>,
    no_mention: HashSet<String>,
}

impl Mentions {
    pub fn new(user_ids: HashMap<String, String>, no_mention: HashSet<String>) -> Self {
        Self { user_ids, no_mention }
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    /// `<@ID>` for a known user, the plain name otherwise or when the user
    /// opted out of mentions.
    pub fn resolve(&self, name: &str) -> String {
        if self.no_mention.contains(name) {
            return s!(name);
        }
        match self.user_ids.get(name) {
            Some(id) => format!("<@{id}>"),
            None => s!(name),
        }
    }
}

pub fn format_record(record: &EventRecord, mentions: &Mentions) -> String {
    let mut message = format!(
        "{}: {} (G{}/S{})",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.kind,
        record.group,
        record.sector,
    );

    let info = match &record.kind {
        EventKind::AlarmOn => by_actor(&record.detail, ARMED_BY, "In", mentions),
        EventKind::AlarmOff => by_actor(&record.detail, DISARMED_BY, "Uit", mentions),
        EventKind::SelfTest if record.detail == SELF_TEST_DETAIL => s!("(autotest)"),
        kind if !kind.is_common() => join!(&record.detail, CHANNEL_ALERT),
        _ => record.detail.clone(),
    };

    if !info.is_empty() {
        message.push_str(": ");
        message.push_str(&info);
    }
    message
}

fn by_actor(detail: &str, prefix: &str, verb: &str, mentions: &Mentions) -> String {
    match actor(detail, prefix, verb) {
        Some(name) => join!("by ", &mentions.resolve(&name.to_lowercase())),
        None => s!(detail),
    }
}

/// Name between `prefix` and a trailing `" (Verb)"` or `" (hh:mm Verb)"`.
fn actor<'a>(detail: &'a str, prefix: &str, verb: &str) -> Option<&'a str> {
    let rest = detail.strip_prefix(prefix)?;
    if let Some(name) = rest.strip_suffix(&format!(" ({verb})")) {
        return Some(name);
    }
    // "BOB (18:55" → "BOB"
    let head = rest.strip_suffix(&format!(" {verb})"))?;
    let cut = head.len().checked_sub(" (hh:mm".len())?;
    let (name, clock) = (head.get(..cut)?, head.get(cut..)?);
    clock.starts_with(" (").then_some(name)
}
