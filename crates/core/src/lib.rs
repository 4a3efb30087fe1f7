//! esa gatekeeper core - shared domain types.
//!
//! This crate provides the types shared by the bot and its tests:
//! - [`Email`] - validated invitation address
//! - [`ScreenName`] - esa member handle targeted by deletions
//! - [`RequestId`] - time-derived identifier of a pending request
//! - [`RequestKind`] - which workflow a request belongs to
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no clocks.
//! Everything that talks to Slack or esa lives in the `esa-gatekeeper` crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
