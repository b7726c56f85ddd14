// src/config/consts.rs
use std::time::Duration;

// Portal
pub const PORTAL_URL: &str = "https://alertmobile.alert-group.nl/koi_kb.php";
pub const STATUS_QUERY: &str = "?mscherm=status&div=historie";
pub const READY_MARKER: &str = "Recent ontvangen meldingen:";
// Shown instead of the history when the session still serves old data
pub const STALE_SESSION_MARKER: &str = "koi_kb.php?mscherm=gebruiker_wijzigen";
pub const STATUS_ATTEMPTS: usize = 10;
pub const STALE_SESSION_PAUSE: Duration = Duration::from_millis(300);

// Net
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const USER_AGENT: &str = concat!("alarm_relay/", env!("CARGO_PKG_VERSION"));

// Local cache
pub const STORE_DIR: &str = ".store";
pub const CACHE_FILE: &str = "history.cache";

// Publish loop
pub const MAX_FAIL_TIME: Duration = Duration::from_secs(1800);
pub const SLEEP_AFTER_FETCH: Duration = Duration::from_secs(300);
pub const SLEEP_AFTER_FAIL: Duration = Duration::from_secs(180);
pub const FRESHNESS_HOURS: i64 = 4;

// Slack
pub const SLACK_USERS_LIST_URL: &str = "https://slack.com/api/users.list";
pub const CHANNEL_ALERT: &str = " <-- <!channel>";
