//! # bsvalias - payment destination and payment request client
//!
//! A Rust client for the payment capabilities of bsvalias identities.
//! It builds optionally signed requests, posts them to the counterparty's
//! advertised capability URL and decodes the returned locking script or
//! transaction template.

pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::IdentityClient;
pub use config::ClientConfig;
pub use crypto::signature::{Signer, SigningKey};
pub use error::{BsvaliasError, Result};
pub use transport::{HttpTransport, Transport};
pub use types::*;

/// Current version of the bsvalias library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
