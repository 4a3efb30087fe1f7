//! Core types for the esa gatekeeper.
//!
//! This module provides type-safe wrappers for the values that flow through
//! an approval workflow.

pub mod email;
pub mod request;
pub mod screen_name;

pub use email::{Email, EmailError};
pub use request::{RequestId, RequestKind};
pub use screen_name::{ScreenName, ScreenNameError};
