// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod format;
pub mod logging;
pub mod notify;
pub mod publisher;
pub mod session;
pub mod specs;
pub mod store;
