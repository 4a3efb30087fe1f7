//! esa.io integration.
//!
//! [`AccountDirectory`] is the seam the workflow talks to; [`EsaClient`]
//! implements it against the esa API v1.

mod client;
mod directory;
mod error;
mod types;

pub use client::EsaClient;
pub use directory::AccountDirectory;
pub use error::EsaError;
pub use types::{MAX_PER_PAGE, Member, MemberPage, MemberQuery};
