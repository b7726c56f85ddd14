// src/session.rs
//
// Portal access. Login is GET (session cookie) → POST (credentials) → GET
// status page, all on one cookie jar. The status page sometimes serves a
// stale-session page first and has to be asked again.

use std::thread;

use log::{debug, info};

use crate::config::consts::{
    READY_MARKER, STALE_SESSION_MARKER, STALE_SESSION_PAUSE, STATUS_ATTEMPTS, STATUS_QUERY,
};
use crate::config::options::Options;
use crate::core::net::{client, ensure_ok};
use crate::error::TransportError;
use crate::store::CacheFile;

/// Source of history pages.
pub trait Fetch {
    /// Forget anything cached so the next `fetch` goes to the portal.
    fn invalidate(&mut self) -> Result<(), TransportError>;
    fn fetch(&mut self) -> Result<String, TransportError>;
}

/// Credentials and endpoint for one portal account.
#[derive(Clone)]
pub struct Session {
    portal_url: String,
    customer: String,
    customer_hash: String,
}

impl Session {
    pub fn new(options: &Options) -> Self {
        Self {
            portal_url: options.portal_url.clone(),
            customer: options.customer.clone(),
            customer_hash: options.customer_hash.clone(),
        }
    }

    /// Log in on a fresh cookie jar and return the history page.
    pub fn login_and_fetch(&self) -> Result<String, TransportError> {
        let http = client(true)?;

        ensure_ok(http.get(&self.portal_url).send()?)?;
        debug!("portal: session opened");

        let form = [
            ("klantnr", self.customer.as_str()),
            ("klantcode", ""),
            ("gecrypt", self.customer_hash.as_str()),
        ];
        ensure_ok(http.post(&self.portal_url).form(&form).send()?)?;
        debug!("portal: logged in as {}", self.customer);

        let status_url = join!(&self.portal_url, STATUS_QUERY);
        poll_status(
            || Ok(ensure_ok(http.get(&status_url).send()?)?.text()?),
            || thread::sleep(STALE_SESSION_PAUSE),
        )
    }
}

/// Ask for the status page until it holds the history. Only the stale-session
/// page is worth asking again for; any other page without history ends it.
fn poll_status<G, P>(mut get: G, mut pause: P) -> Result<String, TransportError>
where
    G: FnMut() -> Result<String, TransportError>,
    P: FnMut(),
{
    let mut body = s!();
    let mut attempts = 0;
    while attempts < STATUS_ATTEMPTS {
        attempts += 1;
        body = get()?;
        if body.contains(READY_MARKER) {
            debug!("portal: history ready after {attempts} request(s)");
            return Ok(body);
        }
        if !body.contains(STALE_SESSION_MARKER) {
            break;
        }
        pause();
    }

    debug!("portal: no history in {} bytes of status page", body.len());
    Err(TransportError::NotReady { attempts })
}

/// Serves the cached page while it is valid, logs in otherwise.
pub struct CachedFetcher {
    cache: CacheFile,
    session: Session,
}

impl CachedFetcher {
    pub fn new(cache: CacheFile, session: Session) -> Self {
        Self { cache, session }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(CacheFile::new(&options.cache_path), Session::new(options))
    }
}

impl Fetch for CachedFetcher {
    fn invalidate(&mut self) -> Result<(), TransportError> {
        self.cache.invalidate()
    }

    fn fetch(&mut self) -> Result<String, TransportError> {
        if let Some(page) = self.cache.read_valid() {
            debug!("cache hit: {}", self.cache.path().display());
            return Ok(page);
        }
        info!("fetching history from {}", self.session.portal_url);
        let page = self.session.login_and_fetch()?;
        self.cache.write(&page)?;
        Ok(page)
    }
}
