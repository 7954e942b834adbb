//! signalpost is a trade-signal relay bot for Telegram.
//!
//! Owners post `/buy` and `/sell` signals; the bot formats them, posts them to
//! a broadcast channel, pins them and fans out copies to every owner via DM.
//! Owners later reply to their DM copy with status updates (`hit`, `sl`,
//! `tp1`..`tp5`, `cancel`) which are applied idempotently, announced in the
//! channel and, when a fill price is supplied, journaled as a normalized
//! risk-multiple outcome. A daily scheduled task broadcasts the journal.

pub mod config;
pub mod core;
pub mod db;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
pub mod store;
