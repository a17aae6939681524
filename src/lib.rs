//! mailgate - a stateless IMAP/SMTP gateway
//!
//! This crate exposes three mailbox operations over HTTP — credential
//! verification, incremental inbox synchronization, and outbound send with
//! dual-host failover. Every request carries its own mailbox credentials;
//! no session or sync state is kept between calls.

pub mod config;
pub mod domain;
pub mod providers;
pub mod server;
pub mod services;
