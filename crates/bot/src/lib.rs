//! esa gatekeeper.
//!
//! A Slack bot that invites and removes members of an esa.io team. Every
//! operation is proposed in a Slack channel, confirmed by the requester, and
//! approved by an administrator before it runs.
//!
//! The crate is split the same way requests flow through it:
//! [`commands`] turns channel messages into proposals, [`routes`] receives
//! button clicks, [`workflow`] applies them to pending requests and runs
//! approved operations against [`esa`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commands;
pub mod config;
pub mod error;
pub mod esa;
pub mod listener;
pub mod routes;
pub mod slack;
pub mod state;
pub mod workflow;
