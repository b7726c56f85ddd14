// src/cli.rs
use clap::{Parser, Subcommand};
use log::info;

use crate::config::consts::{MAX_FAIL_TIME, SLEEP_AFTER_FAIL, SLEEP_AFTER_FETCH};
use crate::config::options::Options;
use crate::error::RelayError;
use crate::events::{parse_history, sorted};
use crate::format::{Mentions, format_record};
use crate::notify::{SlackWebhook, fetch_user_directory};
use crate::publisher::{Publisher, SystemClock};
use crate::session::{CachedFetcher, Fetch};
use crate::store::HealthFile;

#[derive(Debug, Parser)]
#[command(name = "alarm_relay", version, about = "Relay alarm portal history to Slack")]
pub struct Cli {
    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print every event on the portal page, oldest first (default)
    Print,
    /// Poll the portal forever and post new events to Slack
    Publish,
}

pub fn run(cli: Cli) -> Result<(), RelayError> {
    let options = Options::from_env()?;
    match cli.command.unwrap_or(Command::Print) {
        Command::Print => print(&options),
        Command::Publish => publish(&options),
    }
}

fn print(options: &Options) -> Result<(), RelayError> {
    let mut fetcher = CachedFetcher::from_options(options);
    let records = sorted(parse_history(&fetcher.fetch()?)?);
    let plain = Mentions::default();
    for record in &records {
        println!("{}", format_record(record, &plain));
    }

    // Same page again (cached by now) must give the same records
    let again = parse_history(&fetcher.fetch()?)?;
    if let Some(missing) = records.iter().find(|r| !again.contains(r)) {
        return Err(RelayError::Unstable(format_record(missing, &plain)));
    }
    Ok(())
}

fn publish(options: &Options) -> Result<(), RelayError> {
    let webhook = options.webhook_url()?;

    info!("# alarm_relay");
    info!("# - ALERTMOBILE_URL = {}", options.portal_url);
    info!("# - MAX_FAIL_TIME = {}", MAX_FAIL_TIME.as_secs());
    info!("# - SLEEP_AFTER_FETCH = {}", SLEEP_AFTER_FETCH.as_secs());
    info!("# - SLEEP_AFTER_FAIL = {}", SLEEP_AFTER_FAIL.as_secs());

    let user_ids = fetch_user_directory(options.slack_bearer.as_deref());
    let mentions = Mentions::new(user_ids, options.no_mention_users.clone());
    info!("# - SLACK_USERMAP = ({} entries)", mentions.len());

    let mut publisher = Publisher::new(
        CachedFetcher::from_options(options),
        SlackWebhook::new(webhook, options.blocks_workaround)?,
        SystemClock::new(),
        mentions,
    );
    if let Some(path) = &options.health_file {
        publisher = publisher.with_health_file(HealthFile::create(path)?);
    }

    let never = publisher.run_forever()?;
    match never {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_the_default() {
        let cli = Cli::try_parse_from(["alarm_relay"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.verbose);

        let cli = Cli::try_parse_from(["alarm_relay", "publish", "-v"]).unwrap();
        assert_eq!(cli.command, Some(Command::Publish));
        assert!(cli.verbose);

        assert!(Cli::try_parse_from(["alarm_relay", "replay"]).is_err());
    }
}
