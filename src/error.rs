// src/error.rs
//
// Error taxonomy:
// - StructuralParseError: the portal page is malformed; fatal to one fetch+parse attempt.
// - TransportError: fetch, cache or delivery I/O failed.
// - ConfigError: required environment is missing or unreadable; fatal at startup.
// - RelayError: everything the delivery loop and CLI can surface.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructuralParseError {
    #[error("document contains no <table>")]
    NoTable,
    #[error("first table has no header row")]
    NoHeader,
    #[error("row {row} has {cells} cells but the header has {headers} labels: {texts:?}")]
    TooManyCells {
        row: usize,
        cells: usize,
        headers: usize,
        texts: Vec<String>,
    },
    #[error("history table has no {0:?} column")]
    MissingColumn(String),
    #[error("bad date separator {0:?} (expected dd/mm/yy)")]
    BadDate(String),
    #[error("bad time {0:?} (expected hh:mm:ss)")]
    BadTime(String),
    #[error("row {row} appears before any date separator")]
    NoDateContext { row: usize },
    #[error("annotation {annotation} does not match the row after it: {row}")]
    CorrelationMismatch { annotation: String, row: String },
    #[error("rows from two devices in one page: {first:?} and {other:?}")]
    MixedDevices { first: String, other: String },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("history not ready after {attempts} status requests")]
    NotReady { attempts: usize },
    #[error("cache {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Structural(#[from] StructuralParseError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("health file {}: {source}", path.display())]
    Health {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record vanished between two parses of the same page: {0}")]
    Unstable(String),
}
