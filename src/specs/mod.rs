// src/specs/mod.rs
//! # Page specs
//!
//! What the portal's pages look like: column labels, sentinel values and how
//! a generic [`crate::core::Table`] becomes typed rows. Nothing here fetches or
//! reorders; the event pipeline in [`crate::events`] takes it from there.
//!
//! Labels are the portal's Dutch column headers, kept verbatim so a layout
//! change shows up as a `MissingColumn` error instead of silently empty fields.

pub mod history;
